//! Narration capability
//!
//! Speech is fire-and-forget: implementations swallow their own failures and
//! never block the loop.

/// Speaks prompts and feedback
pub trait Narrator {
    fn speak(&mut self, text: &str);
}

/// Narrator that writes lines to the log (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNarrator;

impl Narrator for LogNarrator {
    fn speak(&mut self, text: &str) {
        log::info!("🔊 {}", text);
    }
}

/// Narrator that keeps every line, shared so a test can read it back
#[derive(Debug, Default, Clone)]
pub struct RecordingNarrator {
    lines: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
}

impl RecordingNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.lines.borrow().last().cloned()
    }
}

impl Narrator for RecordingNarrator {
    fn speak(&mut self, text: &str) {
        self.lines.borrow_mut().push(text.to_string());
    }
}

/// Praise after a correct slash
pub const PRAISE_LINE: &str = "Great job!";

/// Correction after slashing the distractor
pub fn correction_line(slashed: &str, target: &str) -> String {
    format!("Not quite! That was the {slashed}. The word was {target}.")
}
