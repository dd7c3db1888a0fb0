//! Halloween Slasher entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{EventTarget, HtmlCanvasElement, HtmlElement, MouseEvent, TouchEvent};

    use halloween_slasher::consts::TICK_MS;
    use halloween_slasher::narration::SpeechNarrator;
    use halloween_slasher::renderer::CanvasRenderer;
    use halloween_slasher::sim::{Arena, GamePhase, Session};
    use halloween_slasher::{Catalog, Settings};

    /// Game instance holding all state
    struct Game {
        session: Session,
        renderer: Option<CanvasRenderer>,
        canvas: HtmlCanvasElement,
        last_time: f64,
        last_phase: Option<GamePhase>,
    }

    impl Game {
        /// Convert client coordinates to canvas space
        fn to_canvas(&self, client_x: i32, client_y: i32) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            Vec2::new(
                client_x as f32 - rect.left() as f32,
                client_y as f32 - rect.top() as f32,
            )
        }

        /// One display frame: simulate, paint, report
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                time - self.last_time
            } else {
                TICK_MS
            };
            self.last_time = time;

            self.session.step(dt);

            if let Some(renderer) = &self.renderer {
                renderer.render(self.session.state());
            }

            let events = self.session.drain_events();
            for event in &events {
                log::debug!("{:?}", event);
            }
            let phase = self.session.phase();
            if !events.is_empty() || self.last_phase != Some(phase) {
                self.update_hud();
                self.last_phase = Some(phase);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let state = self.session.state();
            let max = state.score_bridge.max_score();

            set_hidden(&document, "hud", state.phase == GamePhase::Start);
            set_hidden(&document, "start-panel", state.phase != GamePhase::Start);
            set_hidden(&document, "victory-panel", state.phase != GamePhase::Victory);

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{}/{}", state.score, max)));
            }

            if let Some(fill) = document
                .get_element_by_id("hud-progress-fill")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let pct = state.score_bridge.progress(state.score) * 100.0;
                let _ = fill.style().set_property("width", &format!("{pct:.0}%"));
            }
        }
    }

    fn set_hidden(document: &web_sys::Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
    type Listener = (EventTarget, &'static str, Closure<dyn FnMut(web_sys::Event)>);

    /// Everything teardown has to undo
    struct Runtime {
        game: Rc<RefCell<Game>>,
        frame: FrameCallback,
        frame_id: Rc<Cell<Option<i32>>>,
        listeners: Vec<Listener>,
    }

    thread_local! {
        static RUNTIME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Halloween Slasher starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let Some(canvas) = document.get_element_by_id("canvas") else {
            log::error!("No #canvas element - nothing to draw on");
            return Ok(());
        };
        let canvas: HtmlCanvasElement = canvas.dyn_into()?;

        // Full-window canvas in CSS pixels, sized once
        let width = window.inner_width()?.as_f64().unwrap_or(1280.0);
        let height = window.inner_height()?.as_f64().unwrap_or(720.0);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
        let _ = canvas.style().set_property("cursor", "none");

        let renderer = match CanvasRenderer::new(canvas.clone()) {
            Ok(r) => Some(r),
            Err(e) => {
                log::error!("Canvas 2D unavailable: {:?}", e);
                None
            }
        };

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let narrator = SpeechNarrator::new(&settings);
        let session = Session::with_catalog(
            seed,
            Catalog::halloween(),
            settings,
            Arena::new(width as f32, height as f32),
            Box::new(narrator),
        );
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            session,
            renderer,
            canvas: canvas.clone(),
            last_time: 0.0,
            last_phase: None,
        }));
        game.borrow().update_hud();

        let mut listeners = setup_input_handlers(&canvas, game.clone())?;
        listeners.extend(setup_buttons(&document, &canvas, game.clone())?);
        setup_teardown(&window);

        let frame: FrameCallback = Rc::new(RefCell::new(None));
        let frame_id = Rc::new(Cell::new(None));
        start_loop(game.clone(), frame.clone(), frame_id.clone());

        RUNTIME.with(|rt| {
            rt.replace(Some(Runtime {
                game,
                frame,
                frame_id,
                listeners,
            }))
        });

        log::info!("Halloween Slasher running!");
        Ok(())
    }

    fn listen(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Listener, JsValue> {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        Ok((target.clone(), kind, closure))
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<Vec<Listener>, JsValue> {
        let mut listeners = Vec::new();

        // Mouse move
        {
            let game = game.clone();
            listeners.push(listen(canvas, "mousemove", move |event| {
                if let Some(event) = event.dyn_ref::<MouseEvent>() {
                    let mut g = game.borrow_mut();
                    let pos = g.to_canvas(event.client_x(), event.client_y());
                    g.session.handle_input(pos);
                }
            })?);
        }

        // Touch move (first finger only)
        {
            listeners.push(listen(canvas, "touchmove", move |event| {
                event.prevent_default();
                if let Some(touch) = event
                    .dyn_ref::<TouchEvent>()
                    .and_then(|e| e.touches().get(0))
                {
                    let mut g = game.borrow_mut();
                    let pos = g.to_canvas(touch.client_x(), touch.client_y());
                    g.session.handle_input(pos);
                }
            })?);
        }

        Ok(listeners)
    }

    fn setup_buttons(
        document: &web_sys::Document,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<Vec<Listener>, JsValue> {
        let mut listeners = Vec::new();

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            listeners.push(listen(&btn, "click", move |_event| {
                let mut g = game.borrow_mut();
                g.session.start();
                g.update_hud();
            })?);
        } else {
            // Bare page without the panel markup: a click on the canvas starts
            log::warn!("No #start-btn - click the canvas to start");
            let game = game.clone();
            listeners.push(listen(canvas, "click", move |_event| {
                let mut g = game.borrow_mut();
                match g.session.phase() {
                    GamePhase::Playing => return,
                    GamePhase::Victory => g.session.reset(js_sys::Date::now() as u64),
                    GamePhase::Start => {}
                }
                g.session.start();
                g.update_hud();
            })?);
        }

        if let Some(btn) = document.get_element_by_id("play-again-btn") {
            listeners.push(listen(&btn, "click", move |_event| {
                let seed = js_sys::Date::now() as u64;
                let mut g = game.borrow_mut();
                g.session.reset(seed);
                g.session.start();
                g.update_hud();
                log::info!("Game restarted with seed: {}", seed);
            })?);
        }

        Ok(listeners)
    }

    /// Tear the session down when the page goes away
    fn setup_teardown(window: &web_sys::Window) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| teardown());
        let _ =
            window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> Option<i32> {
        web_sys::window()?
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .ok()
    }

    fn start_loop(game: Rc<RefCell<Game>>, frame: FrameCallback, frame_id: Rc<Cell<Option<i32>>>) {
        let f = frame.clone();
        let id = frame_id.clone();
        *frame.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            game.borrow_mut().frame(time);
            if let Some(callback) = f.borrow().as_ref() {
                id.set(request_frame(callback));
            }
        }));
        if let Some(callback) = frame.borrow().as_ref() {
            frame_id.set(request_frame(callback));
        }
    }

    /// Cancel the frame, detach listeners, cancel pending transitions
    pub fn teardown() {
        let Some(rt) = RUNTIME.with(|rt| rt.borrow_mut().take()) else {
            return;
        };

        if let (Some(window), Some(id)) = (web_sys::window(), rt.frame_id.take()) {
            let _ = window.cancel_animation_frame(id);
        }
        rt.frame.borrow_mut().take();

        for (target, kind, closure) in &rt.listeners {
            let _ =
                target.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        }

        rt.game.borrow_mut().session.teardown();
        log::info!("Session torn down");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Halloween Slasher (native) starting...");
    log::info!("Native mode runs a headless auto-play session");
    log::info!("Use `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2024);
    let summary = headless::play(seed);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not encode summary: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted session that slashes cards on its own
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use serde::Serialize;

    use halloween_slasher::consts::TICK_MS;
    use halloween_slasher::sim::{Arena, GameEvent, GamePhase, LogNarrator, Session};
    use halloween_slasher::{Catalog, Settings};

    /// Give up after this many simulated frames
    const FRAME_LIMIT: u32 = 60 * 60 * 5;
    /// Chance the auto-slasher goes for the right card
    const ACCURACY: f64 = 0.8;
    /// Chance it swings at all in a given round
    const SWING_RATE: f64 = 0.9;

    #[derive(Debug, Serialize)]
    pub struct Summary {
        seed: u64,
        phase: GamePhase,
        score: u32,
        frames: u32,
        correct: u32,
        wrong: u32,
        missed: u32,
    }

    pub fn play(seed: u64) -> Summary {
        let mut session = Session::with_catalog(
            seed,
            Catalog::halloween(),
            Settings::load(),
            Arena::default(),
            Box::new(LogNarrator),
        );
        let mut player = Pcg32::seed_from_u64(seed ^ 0x5EED);
        let mut summary = Summary {
            seed,
            phase: GamePhase::Start,
            score: 0,
            frames: 0,
            correct: 0,
            wrong: 0,
            missed: 0,
        };

        session.start();
        // None: undecided for this throw; Some(None): let it fall
        let mut plan: Option<Option<bool>> = None;
        while summary.frames < FRAME_LIMIT && session.phase() == GamePhase::Playing {
            summary.frames += 1;

            // Decide once per throw, then keep the blade on the chosen card
            if session.state().cards.is_empty() {
                plan = None;
            } else if plan.is_none() {
                plan = Some(
                    player
                        .random_bool(SWING_RATE)
                        .then(|| player.random_bool(ACCURACY)),
                );
            }
            if let Some(Some(aim_target)) = plan {
                let chosen = session
                    .state()
                    .cards
                    .iter()
                    .find(|c| c.is_target == aim_target)
                    .map(|c| c.pos);
                // Wait until the card is up in view before swinging
                if let Some(pos) = chosen.filter(|p| p.y < session.state().arena.height * 0.6) {
                    session.handle_input(pos);
                }
            }

            session.step(TICK_MS);
            for event in session.drain_events() {
                log::debug!("{:?}", event);
                match event {
                    GameEvent::Slashed { correct: true, .. } => summary.correct += 1,
                    GameEvent::Slashed { correct: false, .. } => summary.wrong += 1,
                    GameEvent::CardMissed { .. } => summary.missed += 1,
                    GameEvent::Victory => log::info!("Victory after {} frames", summary.frames),
                    _ => {}
                }
            }
        }

        summary.phase = session.phase();
        summary.score = session.score();
        summary
    }
}
