//! Game settings and preferences
//!
//! Read once at startup from an optional JSON blob embedded in the page.
//! Nothing is written back; a session lives entirely in memory.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Gameplay ===
    /// Score that ends the session with a victory
    pub max_score: u32,
    /// Pause between the spoken prompt and the card throw (ms)
    pub reveal_delay_ms: f64,
    /// Pause after a correct slash (ms)
    pub correct_delay_ms: f64,
    /// Pause after a wrong slash (ms)
    pub wrong_delay_ms: f64,
    /// Card gravity per tick
    pub gravity: f32,
    /// Trail point lifetime in ticks
    pub saber_life: u32,
    /// Half the particle burst size
    pub particle_count: usize,

    // === Narration ===
    /// Speak prompts and feedback
    pub narration: bool,
    /// Speech rate (1.0 = normal)
    pub speech_rate: f32,
    /// BCP-47 voice language
    pub speech_lang: String,

    // === Visual Effects ===
    /// Particle effects on slashes
    pub particles: bool,
    /// Full-screen color flash on slashes
    pub screen_flash: bool,
    /// Glow/border on the target card (gives the answer away)
    pub highlight_target: bool,

    // === Accessibility ===
    /// Reduced motion (no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_score: MAX_SCORE,
            reveal_delay_ms: REVEAL_DELAY_MS,
            correct_delay_ms: CORRECT_DELAY_MS,
            wrong_delay_ms: WRONG_DELAY_MS,
            gravity: GRAVITY,
            saber_life: SABER_LIFE,
            particle_count: PARTICLE_COUNT,

            narration: true,
            speech_rate: 0.95,
            speech_lang: "en-US".to_string(),

            particles: true,
            screen_flash: true,
            highlight_target: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Clamp values that would stall or break a session
    fn sanitize(&mut self) {
        self.max_score = self.max_score.max(1);
        self.saber_life = self.saber_life.max(1);
        self.reveal_delay_ms = self.reveal_delay_ms.max(0.0);
        self.correct_delay_ms = self.correct_delay_ms.max(0.0);
        self.wrong_delay_ms = self.wrong_delay_ms.max(0.0);
        self.speech_rate = self.speech_rate.clamp(0.1, 10.0);
    }

    /// Effective screen flash (respects reduced_motion)
    pub fn effective_screen_flash(&self) -> bool {
        self.screen_flash && !self.reduced_motion
    }

    /// Particles emitted per slash
    pub fn max_particle_burst(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.particle_count * 2
        }
    }

    /// DOM element holding optional settings JSON
    #[cfg(target_arch = "wasm32")]
    const ELEMENT_ID: &'static str = "slasher-settings";

    /// Load settings from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::ELEMENT_ID))
            .and_then(|el| el.text_content());

        if let Some(json) = json {
            match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from #{}", Self::ELEMENT_ID);
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
