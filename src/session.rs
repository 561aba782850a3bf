//! Per-session state: the chat transcript and the current form record.
//!
//! One `Session` exists per terminal run or per WebSocket connection and
//! is only ever touched by that one interaction loop.

use serde::Serialize;

use crate::form::{FormError, FormRecord, FormState, FormSubmission};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Speaker {
    You,
    Bot,
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::You => write!(f, "You"),
            Speaker::Bot => write!(f, "Bot"),
        }
    }
}

/// One line of the transcript. Appended, never mutated or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct Session {
    transcript: Vec<TranscriptEntry>,
    form_state: FormState,
    form_record: Option<FormRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.transcript.push(TranscriptEntry {
            speaker,
            text: text.into(),
        });
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn form_state(&self) -> FormState {
        self.form_state
    }

    /// The form was rendered; subsequent input is a form submission.
    pub fn open_form(&mut self) {
        self.form_state = FormState::Collecting;
    }

    /// Abandon the form without submitting. The stored record, if any,
    /// is untouched.
    pub fn cancel_form(&mut self) {
        self.form_state = FormState::Idle;
    }

    /// Validate a submission. On success the record is stored, replacing
    /// any previous one, and the form closes. On failure the form stays
    /// open for another attempt. The form never feeds the transcript.
    pub fn submit_form(&mut self, submission: &FormSubmission) -> Result<&FormRecord, FormError> {
        match submission.validate() {
            Ok(record) => {
                self.form_state = FormState::Idle;
                Ok(&*self.form_record.insert(record))
            }
            Err(e) => Err(e),
        }
    }

    pub fn form_record(&self) -> Option<&FormRecord> {
        self.form_record.as_ref()
    }
}
