//! Game session
//!
//! Owns the simulation state, the narrator and the fixed-timestep
//! accumulator. The frontend calls `step` once per display frame, feeds
//! pointer samples through `handle_input`, and drains events for the HUD.

use glam::Vec2;

use super::narrator::Narrator;
use super::round::start_next_round;
use super::state::{Arena, GameEvent, GamePhase, GameState};
use super::tick::tick;
use crate::consts::*;
use crate::content::{Catalog, ContentError, WordEntry};
use crate::settings::Settings;

pub struct Session {
    state: GameState,
    narrator: Box<dyn Narrator>,
    accumulator: f64,
}

impl Session {
    /// Build a session over `entries`; fails if the catalog cannot form a round
    pub fn new(
        seed: u64,
        entries: &'static [WordEntry],
        settings: Settings,
        arena: Arena,
        narrator: Box<dyn Narrator>,
    ) -> Result<Self, ContentError> {
        let catalog = Catalog::new(entries)?;
        Ok(Self::with_catalog(seed, catalog, settings, arena, narrator))
    }

    pub fn with_catalog(
        seed: u64,
        catalog: Catalog,
        settings: Settings,
        arena: Arena,
        narrator: Box<dyn Narrator>,
    ) -> Self {
        Self {
            state: GameState::new(seed, catalog, settings, arena),
            narrator,
            accumulator: 0.0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    /// Start playing from score 0 (ignored while already playing)
    pub fn start(&mut self) {
        if self.state.is_playing() {
            return;
        }
        let state = &mut self.state;
        state.score = 0;
        state.score_bridge = super::score::ScoreBridge::new(state.settings.max_score);
        state.phase = GamePhase::Playing;
        log::info!("Game started (seed {})", state.seed);

        if !state.awaiting_spawn && state.cards.is_empty() {
            start_next_round(state, self.narrator.as_mut());
        }
    }

    /// Discard everything and return to the start panel with a new seed
    pub fn reset(&mut self, seed: u64) {
        self.teardown();
        let catalog = self.state.catalog;
        let settings = self.state.settings.clone();
        let arena = self.state.arena;
        self.state = GameState::new(seed, catalog, settings, arena);
        self.accumulator = 0.0;
        log::info!("Session reset (seed {})", seed);
    }

    /// Stop play and cancel every pending transition
    pub fn teardown(&mut self) {
        let state = &mut self.state;
        state.timers.cancel_all();
        state.pending_round = None;
        state.awaiting_spawn = false;
        state.cards.clear();
        if state.phase == GamePhase::Playing {
            state.phase = GamePhase::Start;
        }
    }

    /// Record a pointer/touch sample for the saber trail
    pub fn handle_input(&mut self, pos: Vec2) {
        self.state.push_trail_point(pos);
    }

    /// Advance by `dt_ms` of wall-clock time; returns ticks simulated
    pub fn step(&mut self, dt_ms: f64) -> u32 {
        self.accumulator += dt_ms.clamp(0.0, MAX_FRAME_MS);

        let mut substeps = 0;
        while self.accumulator >= TICK_MS && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, self.narrator.as_mut());
            self.accumulator -= TICK_MS;
            substeps += 1;

            if self.state.score_bridge.victory_fired() && self.state.is_playing() {
                self.finish();
            }
        }
        substeps
    }

    /// Victory: play ends and nothing else spawns
    fn finish(&mut self) {
        self.teardown();
        self.state.phase = GamePhase::Victory;
        log::info!("Session won with score {}", self.state.score);
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::narrator::RecordingNarrator;
    use proptest::prelude::*;

    static SPOOKY_PAIR: &[WordEntry] = &[
        WordEntry::new("witch", "🧙‍♀️"),
        WordEntry::new("ghost", "👻"),
    ];

    fn session(max_score: u32) -> (Session, RecordingNarrator) {
        let narrator = RecordingNarrator::new();
        let settings = Settings {
            max_score,
            ..Settings::default()
        };
        let session = Session::new(
            5,
            SPOOKY_PAIR,
            settings,
            Arena::new(800.0, 600.0),
            Box::new(narrator.clone()),
        )
        .unwrap();
        (session, narrator)
    }

    /// Step until cards are in the air
    fn until_spawned(session: &mut Session) {
        for _ in 0..200 {
            session.step(TICK_MS);
            if !session.state().cards.is_empty() {
                return;
            }
        }
        panic!("cards never spawned");
    }

    fn card_pos(session: &Session, target: bool) -> Vec2 {
        session
            .state()
            .cards
            .iter()
            .find(|c| c.is_target == target)
            .map(|c| c.pos)
            .unwrap()
    }

    fn count(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn test_start_to_playing() {
        let (mut session, narrator) = session(10);
        assert_eq!(session.phase(), GamePhase::Start);

        // No rounds before start
        session.step(500.0);
        assert!(narrator.lines().is_empty());

        session.start();
        assert_eq!(session.phase(), GamePhase::Playing);
        assert!(session.state().awaiting_spawn);
        let prompt = narrator.lines();
        assert_eq!(prompt.len(), 1);
        assert!(prompt[0] == "witch" || prompt[0] == "ghost");

        until_spawned(&mut session);
        let cards = &session.state().cards;
        assert_eq!(cards.len(), 2);
        assert_ne!(cards[0].entry, cards[1].entry);
        let target = cards.iter().find(|c| c.is_target).unwrap();
        assert_eq!(target.entry.word, prompt[0]);
    }

    #[test]
    fn test_rejects_tiny_catalog() {
        static ONE: &[WordEntry] = &[WordEntry::new("bat", "🦇")];
        let result = Session::new(
            1,
            ONE,
            Settings::default(),
            Arena::default(),
            Box::new(RecordingNarrator::new()),
        );
        assert!(matches!(
            result,
            Err(ContentError::TooFewEntries { found: 1 })
        ));
    }

    #[test]
    fn test_target_hit_wins_single_point_game() {
        let (mut session, _narrator) = session(1);
        session.start();
        until_spawned(&mut session);

        let pos = card_pos(&session, true);
        session.handle_input(pos);
        session.step(TICK_MS);

        assert_eq!(session.score(), 1);
        assert_eq!(session.phase(), GamePhase::Victory);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::ScoreChanged(1)));
        assert_eq!(count(&events, |e| *e == GameEvent::Victory), 1);

        // Nothing else ever spawns
        for _ in 0..300 {
            session.step(TICK_MS);
        }
        assert!(session.state().cards.is_empty());
        assert!(session.state().timers.is_empty());
        let later = session.drain_events();
        assert_eq!(count(&later, |e| *e == GameEvent::CardsSpawned), 0);
        assert_eq!(count(&later, |e| *e == GameEvent::Victory), 0);
    }

    #[test]
    fn test_distractor_hit_corrects_and_waits_longer() {
        let (mut session, narrator) = session(10);
        session.start();
        until_spawned(&mut session);
        let target = session.state().round_target.unwrap().word;

        let pos = card_pos(&session, false);
        session.handle_input(pos);
        session.step(TICK_MS);

        assert_eq!(session.score(), 0);
        assert!(narrator.last().unwrap().contains(target));

        let state = session.state();
        let token = state.pending_round.expect("next round scheduled");
        let delay = state.timers.due_ms(token).unwrap() - state.timers.now_ms();
        assert!((delay - WRONG_DELAY_MS).abs() < 1e-6);

        // The next prompt arrives once the delay has passed
        let events = session.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, GameEvent::Slashed { correct: false, .. })),
            1
        );
        for _ in 0..80 {
            session.step(TICK_MS);
        }
        let events = session.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, GameEvent::RoundStarted { .. })),
            1
        );
    }

    #[test]
    fn test_missed_cards_start_next_round_once() {
        let (mut session, _narrator) = session(10);
        session.start();
        until_spawned(&mut session);
        session.drain_events();

        for _ in 0..1000 {
            session.step(TICK_MS);
            if session.state().cards.is_empty() {
                break;
            }
        }
        assert!(session.state().cards.is_empty(), "cards never fell out");

        let events = session.drain_events();
        assert_eq!(count(&events, |e| matches!(e, GameEvent::CardMissed { .. })), 2);
        assert_eq!(
            count(&events, |e| matches!(e, GameEvent::RoundStarted { .. })),
            1
        );
        assert_eq!(session.score(), 0);
        assert!(session.state().awaiting_spawn);
    }

    #[test]
    fn test_teardown_cancels_pending_reveal() {
        let (mut session, _narrator) = session(10);
        session.start();
        assert!(!session.state().timers.is_empty());

        session.teardown();
        assert_eq!(session.phase(), GamePhase::Start);
        assert!(session.state().timers.is_empty());
        assert!(!session.state().awaiting_spawn);

        for _ in 0..120 {
            session.step(TICK_MS);
        }
        assert!(session.state().cards.is_empty());
    }

    #[test]
    fn test_reset_after_victory() {
        let (mut session, _narrator) = session(1);
        session.start();
        until_spawned(&mut session);
        let pos = card_pos(&session, true);
        session.handle_input(pos);
        session.step(TICK_MS);
        assert_eq!(session.phase(), GamePhase::Victory);

        session.reset(99);
        assert_eq!(session.phase(), GamePhase::Start);
        assert_eq!(session.score(), 0);
        assert!(session.state().particles.is_empty());

        session.start();
        until_spawned(&mut session);
        assert_eq!(session.state().cards.len(), 2);
    }

    #[test]
    fn test_step_clamps_long_frames() {
        let (mut session, _narrator) = session(10);
        // A stalled tab only catches up one clamped frame's worth of ticks
        assert_eq!(session.step(10_000.0), 5);
        assert_eq!(session.step(0.0), 0);
        assert_eq!(session.step(-50.0), 0);
    }

    #[test]
    fn test_step_carries_leftover_time() {
        let (mut session, _narrator) = session(10);
        assert_eq!(session.step(16.0), 0);
        // 16 + 100 ms of accumulated time is six whole ticks
        assert_eq!(session.step(MAX_FRAME_MS), MAX_SUBSTEPS);
    }

    proptest! {
        #[test]
        fn prop_step_never_exceeds_substep_cap(
            frames in proptest::collection::vec(0.0f64..500.0, 1..40),
        ) {
            let (mut session, _narrator) = session(10);
            session.start();
            let mut total = 0u32;
            let mut elapsed = 0.0;
            for dt in frames {
                let ticks = session.step(dt);
                prop_assert!(ticks <= MAX_SUBSTEPS);
                total += ticks;
                elapsed += dt.min(MAX_FRAME_MS);
            }
            // Never runs ahead of the clamped wall clock
            prop_assert!(f64::from(total) * TICK_MS <= elapsed + 1e-6);
        }

        #[test]
        fn prop_score_counts_target_hits(
            seed in any::<u64>(),
            choices in proptest::collection::vec(any::<bool>(), 1..8),
        ) {
            let narrator = RecordingNarrator::new();
            let mut session = Session::with_catalog(
                seed,
                Catalog::halloween(),
                Settings { max_score: 100, ..Settings::default() },
                Arena::new(800.0, 600.0),
                Box::new(narrator),
            );
            session.start();

            let mut expected = 0;
            let mut last = 0;
            for hit_target in choices {
                until_spawned(&mut session);
                let pos = card_pos(&session, hit_target);
                session.handle_input(pos);
                session.step(TICK_MS);

                if hit_target {
                    expected += 1;
                }
                prop_assert_eq!(session.score(), expected);
                prop_assert!(session.score() >= last);
                last = session.score();
            }
        }
    }
}
