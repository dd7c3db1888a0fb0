//! Narration using the Web Speech API
//!
//! Spoken prompts and feedback via `speechSynthesis`. Every failure is logged
//! and swallowed; a browser without speech simply plays silently.

use web_sys::{SpeechSynthesis, SpeechSynthesisUtterance};

use crate::settings::Settings;
use crate::sim::Narrator;

/// Narrator backed by the browser's speech synthesizer
pub struct SpeechNarrator {
    synth: Option<SpeechSynthesis>,
    lang: String,
    rate: f32,
}

impl SpeechNarrator {
    pub fn new(settings: &Settings) -> Self {
        // Not every browser (or embedded webview) exposes speechSynthesis
        let synth = web_sys::window().and_then(|w| w.speech_synthesis().ok());
        if synth.is_none() {
            log::warn!("speechSynthesis unavailable - narration disabled");
        }
        Self {
            synth,
            lang: settings.speech_lang.clone(),
            rate: settings.speech_rate,
        }
    }

    /// Cut off whatever is being spoken
    pub fn stop(&self) {
        if let Some(synth) = &self.synth {
            synth.cancel();
        }
    }

    fn utterance(&self, text: &str) -> Option<SpeechSynthesisUtterance> {
        let utterance = match SpeechSynthesisUtterance::new_with_text(text) {
            Ok(u) => u,
            Err(e) => {
                log::warn!("Speech error: {:?}", e);
                return None;
            }
        };
        utterance.set_lang(&self.lang);
        utterance.set_rate(self.rate);
        Some(utterance)
    }
}

impl Narrator for SpeechNarrator {
    fn speak(&mut self, text: &str) {
        let Some(utterance) = self.utterance(text) else {
            return;
        };

        // A new line replaces the old one rather than queueing behind it
        self.stop();
        if let Some(synth) = &self.synth {
            synth.speak(&utterance);
        }
    }
}
