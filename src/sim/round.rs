//! Round controller
//!
//! Speaks a prompt, waits out the reveal pause, then throws one target card
//! and one distractor card into the arena.

use glam::Vec2;
use rand::Rng;

use super::narrator::Narrator;
use super::state::{Card, GameEvent, GameState};
use super::timer::{TimerToken, Transition};
use crate::centered;
use crate::consts::CARD_SPAWN_BELOW;
use crate::content::WordEntry;

/// Horizontal slots for the two cards, as fractions of arena width
const SLOTS: [f32; 2] = [0.3, 0.7];

/// Pick a target and a distinct distractor by rejection sampling.
///
/// `len` must be at least 2 (guaranteed by `Catalog`); with `len == 1` this
/// never returns.
pub fn pick_pair<R: Rng + ?Sized>(rng: &mut R, len: usize) -> (usize, usize) {
    debug_assert!(len >= crate::content::MIN_CATALOG_SIZE);
    let target = rng.random_range(0..len);
    loop {
        let distractor = rng.random_range(0..len);
        if distractor != target {
            return (target, distractor);
        }
    }
}

/// Speak through the narrator unless narration is switched off
pub(crate) fn say(state: &GameState, narrator: &mut dyn Narrator, text: &str) {
    if state.settings.narration {
        narrator.speak(text);
    }
}

/// Begin the next round. No-op while not playing or while a prompt is
/// already waiting for its cards. Returns the reveal timer if a round started.
pub fn start_next_round(
    state: &mut GameState,
    narrator: &mut dyn Narrator,
) -> Option<TimerToken> {
    if !state.is_playing() || state.awaiting_spawn {
        return None;
    }
    state.awaiting_spawn = true;

    let (target_idx, distractor_idx) = pick_pair(&mut state.rng, state.catalog.len());
    let target = state.catalog.entries()[target_idx];
    state.round_target = Some(target);

    say(state, narrator, target.word);

    let delay = state.settings.reveal_delay_ms;
    let token = state.timers.schedule(
        delay,
        Transition::Reveal {
            target: target_idx,
            distractor: distractor_idx,
        },
    );
    state.events.push(GameEvent::RoundStarted {
        target: target.word,
    });
    log::info!(
        "Round: target '{}', distractor '{}'",
        target.word,
        state.catalog.entries()[distractor_idx].word
    );
    Some(token)
}

/// Reveal timer fired: throw the cards, or stand down if play has stopped
pub fn reveal(state: &mut GameState, target_idx: usize, distractor_idx: usize) {
    let entries = state.catalog.entries();
    match (entries.get(target_idx), entries.get(distractor_idx)) {
        (Some(&target), Some(&distractor)) if state.is_playing() => {
            spawn_cards(state, target, distractor);
        }
        _ => {
            state.awaiting_spawn = false;
        }
    }
}

/// Replace any cards with a fresh target/distractor pair in random slots
pub fn spawn_cards(state: &mut GameState, target: WordEntry, distractor: WordEntry) {
    let arena = state.arena;
    let size = arena.card_size();
    let pair = if state.rng.random_bool(0.5) {
        [(target, true), (distractor, false)]
    } else {
        [(distractor, false), (target, true)]
    };

    state.cards.clear();
    for (slot, (entry, is_target)) in SLOTS.iter().zip(pair) {
        let id = state.next_entity_id();
        let vx = centered(state.rng.random::<f32>(), 3.0);
        let vy = -arena.height * 0.012 - state.rng.random::<f32>() * 3.0;
        let spin = centered(state.rng.random::<f32>(), 0.1);
        state.cards.push(Card {
            id,
            pos: Vec2::new(arena.width * slot, arena.height + CARD_SPAWN_BELOW),
            vel: Vec2::new(vx, vy),
            angle: 0.0,
            spin,
            size,
            entry,
            is_target,
            is_slashed: false,
        });
    }

    state.awaiting_spawn = false;
    state.events.push(GameEvent::CardsSpawned);
}
