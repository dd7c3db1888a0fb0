//! Game state and core simulation types
//!
//! Everything the loop mutates lives in `GameState`; the renderer only reads it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::score::ScoreBridge;
use super::timer::{Scheduler, TimerToken};
use crate::content::{Catalog, WordEntry};
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Waiting on the start panel
    Start,
    /// Rounds are running
    Playing,
    /// Score reached the maximum; play has ended
    Victory,
}

/// Color family for feedback effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tone {
    /// Target slashed
    Correct,
    /// Distractor slashed
    Wrong,
}

/// A falling prompt card
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Rotation (radians)
    pub angle: f32,
    /// Rotation per tick (radians)
    pub spin: f32,
    /// Card width; height is `size * CARD_ASPECT`
    pub size: f32,
    pub entry: WordEntry,
    /// Slashing this card scores
    pub is_target: bool,
    /// Resolved; never collides or renders again
    pub is_slashed: bool,
}

impl Card {
    /// Integrate one tick of motion
    pub fn advance(&mut self, gravity: f32) {
        self.pos += self.vel;
        self.vel.y += gravity;
        self.angle += self.spin;
    }

    /// Distance from the center within which a trail point slashes the card
    pub fn hit_radius(&self) -> f32 {
        self.size / HIT_RADIUS_DIVISOR
    }
}

/// An explosion fragment
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub tone: Tone,
    pub life: f32, // 0-1, decreases over time
    pub size: f32,
}

/// Rising feedback label
#[derive(Debug, Clone, Serialize)]
pub struct FloatingText {
    pub pos: Vec2,
    /// Vertical velocity per tick (negative rises)
    pub velocity: f32,
    pub tone: Tone,
    pub life: f32,
    pub text: String,
}

/// Trail sample from pointer/touch movement
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SaberPoint {
    pub pos: Vec2,
    /// Ticks left before the point expires
    pub life: u32,
}

/// Full-frame color flash
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScreenFlash {
    pub alpha: f32,
    pub tone: Option<Tone>,
}

impl ScreenFlash {
    pub fn trigger(&mut self, tone: Tone, alpha: f32) {
        self.tone = Some(tone);
        self.alpha = alpha;
    }

    pub fn is_active(&self) -> bool {
        self.alpha > 0.0
    }
}

/// Playfield size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn card_size(&self) -> f32 {
        self.width.min(self.height) * CARD_SIZE_FRACTION
    }

    /// y beyond which a card has fallen out of play
    pub fn exit_line(&self) -> f32 {
        self.height + CARD_EXIT_MARGIN
    }
}

/// Things the presentation layer reacts to, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// A prompt was spoken; cards follow after the reveal pause
    RoundStarted { target: &'static str },
    /// Target and distractor are in the air
    CardsSpawned,
    /// A card was slashed
    Slashed { word: &'static str, correct: bool },
    /// A card fell out without being slashed
    CardMissed { word: &'static str },
    /// Score after a correct slash
    ScoreChanged(u32),
    /// Score reached the maximum (fires once per session)
    Victory,
}

/// Complete session state
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    pub score: u32,
    /// A prompt is out and its cards have not spawned yet
    pub awaiting_spawn: bool,
    /// Word the current round is asking for
    pub round_target: Option<WordEntry>,
    /// Next-round timer scheduled after a slash
    pub pending_round: Option<TimerToken>,
    pub arena: Arena,
    pub settings: Settings,
    pub catalog: Catalog,
    pub cards: Vec<Card>,
    pub particles: Vec<Particle>,
    pub floating_texts: Vec<FloatingText>,
    pub trail: Vec<SaberPoint>,
    pub flash: ScreenFlash,
    pub timers: Scheduler,
    pub score_bridge: ScoreBridge,
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a fresh state with the given seed
    pub fn new(seed: u64, catalog: Catalog, settings: Settings, arena: Arena) -> Self {
        Self {
            seed,
            phase: GamePhase::Start,
            score: 0,
            awaiting_spawn: false,
            round_target: None,
            pending_round: None,
            arena,
            score_bridge: ScoreBridge::new(settings.max_score),
            settings,
            catalog,
            cards: Vec::new(),
            particles: Vec::new(),
            floating_texts: Vec::new(),
            trail: Vec::new(),
            flash: ScreenFlash::default(),
            timers: Scheduler::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Cards still in play
    pub fn active_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| !c.is_slashed)
    }

    /// Record a trail sample
    pub fn push_trail_point(&mut self, pos: Vec2) {
        self.trail.push(SaberPoint {
            pos,
            life: self.settings.saber_life,
        });
    }
}
