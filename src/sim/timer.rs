//! Delayed round transitions
//!
//! Timers run on simulation time, advanced one tick at a time, so they stay
//! in lockstep with physics and can be cancelled wholesale on teardown.

/// Handle for a scheduled transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// What happens when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Throw the cards for a prompt that was already spoken
    Reveal { target: usize, distractor: usize },
    /// Speak the next prompt
    NextRound,
}

#[derive(Debug, Clone)]
struct Scheduled {
    token: TimerToken,
    due_ms: f64,
    transition: Transition,
}

/// Ordered queue of pending transitions
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: f64,
    next_token: u64,
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation clock (ms)
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Queue `transition` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: f64, transition: Transition) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending.push(Scheduled {
            token,
            due_ms: self.now_ms + delay_ms.max(0.0),
            transition,
        });
        token
    }

    /// Drop everything still pending
    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Cancelling {} pending transition(s)", self.pending.len());
        }
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Due time of a pending transition
    pub fn due_ms(&self, token: TimerToken) -> Option<f64> {
        self.pending
            .iter()
            .find(|s| s.token == token)
            .map(|s| s.due_ms)
    }

    /// Advance the clock and return due transitions in firing order
    pub fn advance(&mut self, dt_ms: f64) -> Vec<(TimerToken, Transition)> {
        self.now_ms += dt_ms;
        let now = self.now_ms;

        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|s| {
            if s.due_ms <= now {
                due.push(s.clone());
                false
            } else {
                true
            }
        });
        // Stable sort keeps scheduling order for equal due times
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due.into_iter().map(|s| (s.token, s.transition)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_only_when_due() {
        let mut timers = Scheduler::new();
        timers.schedule(100.0, Transition::NextRound);

        assert!(timers.advance(60.0).is_empty());
        let fired = timers.advance(40.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].1, Transition::NextRound);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut timers = Scheduler::new();
        let late = timers.schedule(50.0, Transition::NextRound);
        let early = timers.schedule(
            10.0,
            Transition::Reveal {
                target: 0,
                distractor: 1,
            },
        );

        let fired: Vec<_> = timers.advance(100.0).into_iter().map(|(t, _)| t).collect();
        assert_eq!(fired, vec![early, late]);
    }

    #[test]
    fn test_cancel_all() {
        let mut timers = Scheduler::new();
        timers.schedule(10.0, Transition::NextRound);
        let b = timers.schedule(20.0, Transition::NextRound);
        assert_eq!(timers.due_ms(b), Some(20.0));

        timers.cancel_all();
        assert!(timers.is_empty());
        assert_eq!(timers.due_ms(b), None);
        assert!(timers.advance(1000.0).is_empty());
    }

    #[test]
    fn test_delay_measured_from_current_clock() {
        let mut timers = Scheduler::new();
        timers.advance(250.0);
        let token = timers.schedule(100.0, Transition::NextRound);
        assert_eq!(timers.due_ms(token), Some(350.0));

        // Negative delays fire on the next advance
        timers.schedule(-5.0, Transition::NextRound);
        assert_eq!(timers.advance(0.0).len(), 1);
    }
}
