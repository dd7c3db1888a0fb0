//! Score/status bridge
//!
//! Turns score updates into presentation events and decides when the session
//! has been won.

use super::state::GameEvent;

/// Reports score changes and latches victory
#[derive(Debug, Clone)]
pub struct ScoreBridge {
    max_score: u32,
    victory_fired: bool,
}

impl ScoreBridge {
    pub fn new(max_score: u32) -> Self {
        Self {
            max_score,
            victory_fired: false,
        }
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn victory_fired(&self) -> bool {
        self.victory_fired
    }

    /// Publish a new score; returns true the first time it reaches the maximum
    pub fn report(&mut self, score: u32, events: &mut Vec<GameEvent>) -> bool {
        events.push(GameEvent::ScoreChanged(score));
        if score >= self.max_score && !self.victory_fired {
            self.victory_fired = true;
            events.push(GameEvent::Victory);
            log::info!("Victory at score {}", score);
            return true;
        }
        false
    }

    /// Progress toward victory in [0, 1]
    pub fn progress(&self, score: u32) -> f32 {
        (score as f32 / self.max_score.max(1) as f32).min(1.0)
    }
}
