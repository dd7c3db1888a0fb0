//! Halloween Slasher - a spoken-word vocabulary slash game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (round flow, physics, collisions, effects)
//! - `content`: Word/emoji catalog
//! - `settings`: Data-driven game tuning and preferences
//! - `renderer`: Canvas2D painting (web only)
//! - `narration`: speechSynthesis narrator (web only)

pub mod content;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod narration;
#[cfg(target_arch = "wasm32")]
pub mod renderer;

pub use content::{Catalog, ContentError, WordEntry};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (physics is tuned per 60 Hz frame)
    pub const TICK_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 6;
    /// Largest frame delta accepted by the loop (tab switches, breakpoints)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Score needed to win a session
    pub const MAX_SCORE: u32 = 10;
    /// Downward acceleration applied to cards each tick
    pub const GRAVITY: f32 = 0.15;
    /// Trail point countdown, in ticks
    pub const SABER_LIFE: u32 = 10;
    /// Half the particle burst size (a burst emits twice this)
    pub const PARTICLE_COUNT: usize = 15;

    /// Pause between narrating the prompt and spawning cards
    pub const REVEAL_DELAY_MS: f64 = 1000.0;
    /// Pause after a correct slash before the next prompt
    pub const CORRECT_DELAY_MS: f64 = 1000.0;
    /// Pause after a wrong slash (longer, so the correction sinks in)
    pub const WRONG_DELAY_MS: f64 = 1200.0;

    /// Card size as a fraction of the shorter arena side
    pub const CARD_SIZE_FRACTION: f32 = 0.22;
    /// Card height relative to its width
    pub const CARD_ASPECT: f32 = 1.3;
    /// Cards spawn this far below the bottom edge and are thrown upward
    pub const CARD_SPAWN_BELOW: f32 = 100.0;
    /// Cards are discarded once this far below the bottom edge
    pub const CARD_EXIT_MARGIN: f32 = 250.0;
    /// Hit radius is card size divided by this
    pub const HIT_RADIUS_DIVISOR: f32 = 1.5;

    /// Particle gravity per tick
    pub const PARTICLE_GRAVITY: f32 = 0.3;
    /// Particle life lost per tick
    pub const PARTICLE_DECAY: f32 = 0.025;
    /// Floating text rise per tick (negative is up)
    pub const FLOATING_TEXT_VELOCITY: f32 = -2.5;
    /// Floating text life lost per tick
    pub const FLOATING_TEXT_DECAY: f32 = 0.015;
    /// Screen flash alpha lost per tick
    pub const FLASH_DECAY: f32 = 0.02;
}

/// Euclidean distance check used for trail/card hits
#[inline]
pub fn within_radius(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance(b) < radius
}

/// Uniform value in [-0.5, 0.5) scaled by `spread`
#[inline]
pub fn centered(unit: f32, spread: f32) -> f32 {
    (unit - 0.5) * spread
}
