//! Canvas2D painter
//!
//! Pure paint over `GameState`: nothing here mutates or ages entities.
//! Draw order: flash, saber trail, particles, floating text, cards.

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::consts::CARD_ASPECT;
use crate::sim::{Card, GameState, Tone};

/// Card face fill
const CARD_FILL: &str = "#2d1440";
/// Card border when not highlighted
const CARD_BORDER: &str = "#444";
/// Label color when not highlighted
const CARD_LABEL: &str = "#aaaaaa";
/// Highlighted target border/label
const TARGET_BORDER: &str = "#ff7518";
const TARGET_LABEL: &str = "#ffc064";
const TARGET_GLOW: &str = "rgba(255, 117, 24, 0.7)";
const CARD_CORNER: f64 = 20.0;

/// Solid color for particles and text
fn tone_color(tone: Tone) -> &'static str {
    match tone {
        Tone::Correct => "#ff7518",
        Tone::Wrong => "#ff4444",
    }
}

/// "r, g, b" triple for the translucent flash
fn flash_rgb(tone: Tone) -> &'static str {
    match tone {
        Tone::Correct => "255, 117, 24",
        Tone::Wrong => "255, 50, 50",
    }
}

/// Paints the playfield onto a 2D canvas
pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    /// Grab the 2D context; fails if the canvas refuses one
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;
        Ok(Self { canvas, ctx })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    /// Paint one frame
    pub fn render(&self, state: &GameState) {
        let (w, h) = self.size();
        let (w, h) = (w as f64, h as f64);
        self.ctx.clear_rect(0.0, 0.0, w, h);

        if state.settings.effective_screen_flash() {
            self.draw_flash(state, w, h);
        }
        self.draw_trail(state);
        self.draw_particles(state);
        self.draw_floating_texts(state);

        let highlight = state.settings.highlight_target;
        for card in state.active_cards() {
            self.draw_card(card, highlight);
        }
    }

    fn draw_flash(&self, state: &GameState, w: f64, h: f64) {
        let (Some(tone), true) = (state.flash.tone, state.flash.is_active()) else {
            return;
        };
        let style = format!("rgba({}, {})", flash_rgb(tone), state.flash.alpha);
        self.ctx.set_fill_style_str(&style);
        self.ctx.fill_rect(0.0, 0.0, w, h);
    }

    fn trail_path(&self, state: &GameState) {
        let ctx = &self.ctx;
        ctx.begin_path();
        let mut points = state.trail.iter();
        if let Some(first) = points.next() {
            ctx.move_to(first.pos.x as f64, first.pos.y as f64);
        }
        for p in points {
            ctx.line_to(p.pos.x as f64, p.pos.y as f64);
        }
    }

    /// Soft green glow under a thin white blade
    fn draw_trail(&self, state: &GameState) {
        if state.trail.len() < 2 {
            return;
        }
        let ctx = &self.ctx;
        ctx.save();
        ctx.set_line_cap("round");
        ctx.set_line_join("round");

        self.trail_path(state);
        ctx.set_stroke_style_str("rgba(0, 255, 100, 0.4)");
        ctx.set_line_width(25.0);
        ctx.set_shadow_blur(15.0);
        ctx.set_shadow_color("#00ff64");
        ctx.stroke();

        self.trail_path(state);
        ctx.set_stroke_style_str("#ffffff");
        ctx.set_line_width(6.0);
        ctx.set_shadow_blur(0.0);
        ctx.stroke();

        ctx.restore();
    }

    fn draw_particles(&self, state: &GameState) {
        let ctx = &self.ctx;
        for p in &state.particles {
            ctx.set_global_alpha(p.life.clamp(0.0, 1.0) as f64);
            ctx.set_fill_style_str(tone_color(p.tone));
            ctx.begin_path();
            ctx.arc(p.pos.x as f64, p.pos.y as f64, p.size as f64, 0.0, TAU).ok();
            ctx.fill();
        }
        ctx.set_global_alpha(1.0);
    }

    /// Rising labels grow as they fade
    fn draw_floating_texts(&self, state: &GameState) {
        let ctx = &self.ctx;
        for text in &state.floating_texts {
            let life = text.life.clamp(0.0, 1.0) as f64;
            let color = tone_color(text.tone);
            ctx.save();
            ctx.set_global_alpha(life);
            ctx.set_fill_style_str(color);
            ctx.set_font(&format!(
                "bold {:.0}px 'Creepster', cursive",
                34.0 + (1.0 - life) * 24.0
            ));
            ctx.set_text_align("center");
            ctx.set_shadow_blur(15.0);
            ctx.set_shadow_color(color);
            ctx.fill_text(&text.text, text.pos.x as f64, text.pos.y as f64).ok();
            ctx.restore();
        }
    }

    fn draw_card(&self, card: &Card, highlight: bool) {
        let ctx = &self.ctx;
        let lit = highlight && card.is_target;
        let size = card.size as f64;
        let w = size;
        let h = size * CARD_ASPECT as f64;

        ctx.save();
        ctx.translate(card.pos.x as f64, card.pos.y as f64).ok();
        ctx.rotate(card.angle as f64).ok();

        if lit {
            ctx.set_shadow_blur(20.0);
            ctx.set_shadow_color(TARGET_GLOW);
        }
        ctx.set_fill_style_str(CARD_FILL);
        ctx.set_stroke_style_str(if lit { TARGET_BORDER } else { CARD_BORDER });
        ctx.set_line_width(6.0);
        rounded_rect(ctx, w, h, CARD_CORNER);
        ctx.fill();
        ctx.stroke();

        ctx.set_shadow_blur(0.0);
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_font(&format!("{:.0}px Arial", size * 0.6));
        ctx.fill_text(card.entry.emoji, 0.0, -size * 0.15).ok();

        ctx.set_fill_style_str(if lit { TARGET_LABEL } else { CARD_LABEL });
        ctx.set_font(&format!("bold {:.0}px sans-serif", size * 0.18));
        ctx.fill_text(&card.entry.word.to_uppercase(), 0.0, size * 0.45).ok();

        ctx.restore();
    }
}

/// Rounded rectangle centered on the origin
fn rounded_rect(ctx: &CanvasRenderingContext2d, w: f64, h: f64, r: f64) {
    let (hw, hh) = (w / 2.0, h / 2.0);
    ctx.begin_path();
    ctx.move_to(-hw + r, -hh);
    ctx.line_to(hw - r, -hh);
    ctx.quadratic_curve_to(hw, -hh, hw, -hh + r);
    ctx.line_to(hw, hh - r);
    ctx.quadratic_curve_to(hw, hh, hw - r, hh);
    ctx.line_to(-hw + r, hh);
    ctx.quadratic_curve_to(-hw, hh, -hw, hh - r);
    ctx.line_to(-hw, -hh + r);
    ctx.quadratic_curve_to(-hw, -hh, -hw + r, -hh);
    ctx.close_path();
}
