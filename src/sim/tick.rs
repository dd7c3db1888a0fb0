//! Fixed timestep simulation tick
//!
//! One tick = one 60 Hz display frame. Per-tick constants (gravity, decay)
//! are tuned for that rate; `Session::step` keeps wall-clock time in sync.

use glam::Vec2;
use rand::Rng;

use super::collision::{below_exit, card_is_hit};
use super::narrator::{Narrator, PRAISE_LINE, correction_line};
use super::round::{reveal, say, start_next_round};
use super::state::{FloatingText, GameEvent, GameState, Particle, Tone};
use super::timer::Transition;
use crate::centered;
use crate::consts::*;

/// Flash strength after a correct slash
const CORRECT_FLASH: f32 = 0.5;
/// Flash strength after a wrong slash
const WRONG_FLASH: f32 = 0.4;
/// Feedback text appears this far above the card
const TEXT_OFFSET: f32 = 40.0;

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, narrator: &mut dyn Narrator) {
    // Delayed transitions first, so a reveal that lands this tick is
    // simulated this tick.
    for (token, transition) in state.timers.advance(TICK_MS) {
        match transition {
            Transition::Reveal { target, distractor } => reveal(state, target, distractor),
            Transition::NextRound => {
                if state.pending_round == Some(token) {
                    state.pending_round = None;
                }
                start_next_round(state, narrator);
            }
        }
    }

    age_effects(state);

    if state.is_playing() {
        step_cards(state, narrator);
    }
}

/// Decay flash, trail, particles and floating text; purge the expired
pub fn age_effects(state: &mut GameState) {
    if state.flash.is_active() {
        state.flash.alpha = (state.flash.alpha - FLASH_DECAY).max(0.0);
    }

    for point in state.trail.iter_mut() {
        point.life = point.life.saturating_sub(1);
    }
    state.trail.retain(|p| p.life > 0);

    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel;
        particle.vel.y += PARTICLE_GRAVITY;
        particle.life -= PARTICLE_DECAY;
    }
    state.particles.retain(|p| p.life > 0.0);

    for text in state.floating_texts.iter_mut() {
        text.pos.y += text.velocity;
        text.life -= FLOATING_TEXT_DECAY;
    }
    state.floating_texts.retain(|t| t.life > 0.0);
}

/// Move cards, check slashes, drop cards that fell out
fn step_cards(state: &mut GameState, narrator: &mut dyn Narrator) {
    let gravity = state.settings.gravity;

    let mut i = state.cards.len();
    while i > 0 {
        i -= 1;
        if state.cards[i].is_slashed {
            continue;
        }
        state.cards[i].advance(gravity);

        if card_is_hit(&state.trail, &state.cards[i]) {
            if resolve_card(state, i, narrator) {
                // Resolution clears the board
                return;
            }
            continue;
        }

        if below_exit(&state.cards[i], &state.arena) {
            let card = state.cards.remove(i);
            log::debug!("'{}' fell out", card.entry.word);
            state.events.push(GameEvent::CardMissed {
                word: card.entry.word,
            });
            if state.cards.is_empty() && !transition_pending(state) {
                start_next_round(state, narrator);
            }
        }
    }
}

/// A prompt is waiting for its cards, or a next round is already queued
pub fn transition_pending(state: &GameState) -> bool {
    state.awaiting_spawn || state.pending_round.is_some()
}

/// Resolve a slash on the card at `index`.
///
/// Idempotent: returns false without side effects if the card is already
/// slashed, missing, or a transition is pending.
pub fn resolve_card(state: &mut GameState, index: usize, narrator: &mut dyn Narrator) -> bool {
    if state.awaiting_spawn {
        return false;
    }
    let Some(card) = state.cards.get_mut(index) else {
        return false;
    };
    if card.is_slashed {
        return false;
    }
    card.is_slashed = true;
    let card = card.clone();

    let tone = if card.is_target {
        Tone::Correct
    } else {
        Tone::Wrong
    };
    let target_word = state
        .round_target
        .map(|t| t.word)
        .or_else(|| state.cards.iter().find(|c| c.is_target).map(|c| c.entry.word))
        .unwrap_or(card.entry.word);

    emit_burst(state, card.pos, tone);
    state.events.push(GameEvent::Slashed {
        word: card.entry.word,
        correct: card.is_target,
    });
    let text_pos = card.pos - Vec2::new(0.0, TEXT_OFFSET);

    if card.is_target {
        state.score += 1;
        log::debug!("Correct slash on '{}' (score {})", card.entry.word, state.score);
        if state.settings.effective_screen_flash() {
            state.flash.trigger(Tone::Correct, CORRECT_FLASH);
        }
        add_floating_text(state, text_pos, "CORRECT! +1".to_string(), Tone::Correct);
        say(state, narrator, PRAISE_LINE);
        state.cards.clear();
        state.score_bridge.report(state.score, &mut state.events);
        let delay = state.settings.correct_delay_ms;
        schedule_next_round(state, delay);
    } else {
        log::debug!(
            "Wrong slash on '{}' (wanted '{}')",
            card.entry.word,
            target_word
        );
        if state.settings.effective_screen_flash() {
            state.flash.trigger(Tone::Wrong, WRONG_FLASH);
        }
        add_floating_text(
            state,
            text_pos,
            format!("WRONG! It was {}", target_word.to_uppercase()),
            Tone::Wrong,
        );
        say(state, narrator, &correction_line(card.entry.word, target_word));
        state.cards.clear();
        let delay = state.settings.wrong_delay_ms;
        schedule_next_round(state, delay);
    }
    true
}

/// Queue the next prompt unless one is already queued
fn schedule_next_round(state: &mut GameState, delay_ms: f64) {
    if state.pending_round.is_some() {
        return;
    }
    let token = state.timers.schedule(delay_ms, Transition::NextRound);
    state.pending_round = Some(token);
}

/// Explosion of particles at `pos`
fn emit_burst(state: &mut GameState, pos: Vec2, tone: Tone) {
    let count = state.settings.max_particle_burst();
    state.particles.reserve(count);
    for _ in 0..count {
        let vel = Vec2::new(
            centered(state.rng.random::<f32>(), 20.0),
            centered(state.rng.random::<f32>(), 20.0),
        );
        let size = state.rng.random::<f32>() * 6.0 + 2.0;
        state.particles.push(Particle {
            pos,
            vel,
            tone,
            life: 1.0,
            size,
        });
    }
}

fn add_floating_text(state: &mut GameState, pos: Vec2, text: String, tone: Tone) {
    state.floating_texts.push(FloatingText {
        pos,
        velocity: FLOATING_TEXT_VELOCITY,
        tone,
        life: 1.0,
        text,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Catalog;
    use crate::settings::Settings;
    use crate::sim::narrator::RecordingNarrator;
    use crate::sim::state::{Arena, GamePhase, SaberPoint};
    use proptest::prelude::*;

    fn state_with_cards() -> (GameState, RecordingNarrator) {
        let mut state = GameState::new(
            42,
            Catalog::halloween(),
            Settings::default(),
            Arena::new(800.0, 600.0),
        );
        state.phase = GamePhase::Playing;
        let mut narrator = RecordingNarrator::new();
        start_next_round(&mut state, &mut narrator);
        // Jump straight past the reveal pause
        for _ in 0..70 {
            tick(&mut state, &mut narrator);
            if !state.cards.is_empty() {
                break;
            }
        }
        assert_eq!(state.cards.len(), 2, "cards should spawn after reveal");
        (state, narrator)
    }

    fn index_of(state: &GameState, target: bool) -> usize {
        state
            .cards
            .iter()
            .position(|c| c.is_target == target)
            .unwrap()
    }

    #[test]
    fn test_cards_follow_gravity() {
        let (mut state, mut narrator) = state_with_cards();
        let before = state.cards[0].clone();
        tick(&mut state, &mut narrator);
        let after = state.cards.iter().find(|c| c.id == before.id).unwrap();

        assert_eq!(after.pos, before.pos + before.vel);
        assert!((after.vel.y - (before.vel.y + GRAVITY)).abs() < 1e-5);
        assert!((after.angle - (before.angle + before.spin)).abs() < 1e-6);
    }

    #[test]
    fn test_resolve_target_is_idempotent() {
        let (mut state, mut narrator) = state_with_cards();
        let i = index_of(&state, true);

        assert!(resolve_card(&mut state, i, &mut narrator));
        assert_eq!(state.score, 1);
        assert_eq!(state.particles.len(), 2 * PARTICLE_COUNT);
        assert!(state.cards.is_empty());

        // Second call has nothing left to resolve
        assert!(!resolve_card(&mut state, i, &mut narrator));
        assert_eq!(state.score, 1);
        assert_eq!(state.particles.len(), 2 * PARTICLE_COUNT);
    }

    #[test]
    fn test_resolve_skips_slashed_card() {
        let (mut state, mut narrator) = state_with_cards();
        let i = index_of(&state, true);
        state.cards[i].is_slashed = true;

        assert!(!resolve_card(&mut state, i, &mut narrator));
        assert_eq!(state.score, 0);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_resolve_blocked_while_awaiting_spawn() {
        let (mut state, mut narrator) = state_with_cards();
        state.awaiting_spawn = true;
        assert!(!resolve_card(&mut state, 0, &mut narrator));
        assert!(!state.cards[0].is_slashed);
    }

    #[test]
    fn test_correct_slash_feedback() {
        let (mut state, mut narrator) = state_with_cards();
        let i = index_of(&state, true);
        resolve_card(&mut state, i, &mut narrator);

        assert_eq!(state.flash.tone, Some(Tone::Correct));
        assert!((state.flash.alpha - CORRECT_FLASH).abs() < f32::EPSILON);
        assert_eq!(state.floating_texts[0].text, "CORRECT! +1");
        assert_eq!(narrator.last().as_deref(), Some(PRAISE_LINE));
        assert!(state.events.contains(&GameEvent::ScoreChanged(1)));

        let token = state.pending_round.unwrap();
        let delay = state.timers.due_ms(token).unwrap() - state.timers.now_ms();
        assert!((delay - CORRECT_DELAY_MS).abs() < 1e-6);
    }

    #[test]
    fn test_wrong_slash_feedback() {
        let (mut state, mut narrator) = state_with_cards();
        let target = state.round_target.unwrap().word;
        let i = index_of(&state, false);
        resolve_card(&mut state, i, &mut narrator);

        assert_eq!(state.score, 0);
        assert_eq!(state.flash.tone, Some(Tone::Wrong));
        assert!(state.floating_texts[0].text.contains(&target.to_uppercase()));
        assert!(narrator.last().unwrap().contains(target));
        assert!(state.particles.iter().all(|p| p.tone == Tone::Wrong));

        let token = state.pending_round.unwrap();
        let delay = state.timers.due_ms(token).unwrap() - state.timers.now_ms();
        assert!((delay - WRONG_DELAY_MS).abs() < 1e-6);
    }

    #[test]
    fn test_trail_point_slashes_card_on_tick() {
        let (mut state, mut narrator) = state_with_cards();
        let i = index_of(&state, true);
        let pos = state.cards[i].pos;
        state.push_trail_point(pos);

        tick(&mut state, &mut narrator);
        assert_eq!(state.score, 1);
        assert!(state.cards.is_empty());
    }

    #[test]
    fn test_reduced_motion_skips_flash() {
        let (mut state, mut narrator) = state_with_cards();
        state.settings.reduced_motion = true;
        let i = index_of(&state, true);
        resolve_card(&mut state, i, &mut narrator);
        assert!(!state.flash.is_active());
    }

    #[test]
    fn test_trail_countdown_expires() {
        let mut state = GameState::new(
            1,
            Catalog::halloween(),
            Settings::default(),
            Arena::default(),
        );
        state.trail.push(SaberPoint {
            pos: Vec2::ZERO,
            life: 3,
        });
        age_effects(&mut state);
        age_effects(&mut state);
        assert_eq!(state.trail[0].life, 1);
        age_effects(&mut state);
        assert!(state.trail.is_empty());
    }

    #[test]
    fn test_flash_decays_to_zero() {
        let mut state = GameState::new(
            1,
            Catalog::halloween(),
            Settings::default(),
            Arena::default(),
        );
        state.flash.trigger(Tone::Wrong, WRONG_FLASH);
        for _ in 0..30 {
            age_effects(&mut state);
        }
        assert!(!state.flash.is_active());
        assert_eq!(state.flash.alpha, 0.0);
    }

    proptest! {
        #[test]
        fn prop_effects_purged_after_life_budget(
            seed in any::<u64>(),
            ticks in 0usize..120,
        ) {
            let mut state = GameState::new(
                seed,
                Catalog::halloween(),
                Settings::default(),
                Arena::default(),
            );
            emit_burst(&mut state, Vec2::new(100.0, 100.0), Tone::Correct);
            add_floating_text(&mut state, Vec2::ZERO, "boo".to_string(), Tone::Wrong);
            state.push_trail_point(Vec2::ZERO);

            let mut last_life = 1.0f32;
            for _ in 0..ticks {
                age_effects(&mut state);
                if let Some(p) = state.particles.first() {
                    prop_assert!(p.life < last_life);
                    last_life = p.life;
                }
            }
            prop_assert!(state.particles.iter().all(|p| p.life > 0.0));
            prop_assert!(state.floating_texts.iter().all(|t| t.life > 0.0));
            prop_assert!(state.trail.iter().all(|p| p.life > 0));

            // 1.0 / 0.025 = 40 ticks, 1.0 / 0.015 ~ 67 ticks, 10 ticks
            if ticks >= 41 {
                prop_assert!(state.particles.is_empty());
            }
            if ticks >= 68 {
                prop_assert!(state.floating_texts.is_empty());
            }
            if ticks >= SABER_LIFE as usize {
                prop_assert!(state.trail.is_empty());
            }
        }
    }
}
