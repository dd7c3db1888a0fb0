//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Fixed timestep only (timers run on simulation time)
//! - Seeded RNG only
//! - No rendering or platform dependencies (narration is injected)

pub mod collision;
pub mod narrator;
pub mod round;
pub mod score;
pub mod session;
pub mod state;
pub mod tick;
pub mod timer;

pub use collision::{below_exit, card_is_hit, trail_hit};
pub use narrator::{LogNarrator, Narrator, RecordingNarrator};
pub use round::{pick_pair, start_next_round};
pub use score::ScoreBridge;
pub use session::Session;
pub use state::{
    Arena, Card, FloatingText, GameEvent, GamePhase, GameState, Particle, SaberPoint, ScreenFlash,
    Tone,
};
pub use tick::{resolve_card, tick};
pub use timer::{Scheduler, TimerToken, Transition};
