//! Routes raw user input to either the contact form or free-form chat.

use serde::{Deserialize, Serialize};

/// Phrases that pull an utterance into the booking form instead of chat.
const FORM_TRIGGERS: &[&str] = &["call me", "book an appointment"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Appointment / call-back request: render the contact form.
    Form,
    /// Anything else: relay to the model as a question.
    Chat,
}

impl Intent {
    /// Case-insensitive substring test, first match wins. No other signals
    /// are considered.
    pub fn classify(input: &str) -> Intent {
        let lowered = input.to_lowercase();
        if FORM_TRIGGERS.iter().any(|t| lowered.contains(t)) {
            Intent::Form
        } else {
            Intent::Chat
        }
    }
}
