//! Conversational booking form: submission checks and the accepted record.
//!
//! Checks run in a fixed order (name, phone, email, date) and stop at the
//! first failure, so each rejected submission reports exactly one problem.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates::{self, DateError};
use crate::validate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Name is required.")]
    NameRequired,
    #[error("Invalid phone number. Use a valid format (e.g., +1234567890).")]
    InvalidPhone,
    #[error("Invalid email address.")]
    InvalidEmail,
    #[error("{0}")]
    Date(#[from] DateError),
}

/// Whether the contact form is currently on screen for this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Collecting,
}

/// Raw field values as typed by the user, prior to validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormSubmission {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub date_phrase: String,
}

/// A fully validated submission. Only ever constructed once every field
/// has passed; the date is resolved to ISO `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Date")]
    pub date: String,
}

impl FormSubmission {
    /// Validate against the current local date.
    pub fn validate(&self) -> Result<FormRecord, FormError> {
        self.validate_on(chrono::Local::now().date_naive())
    }

    /// Validate with an explicit `today` for the date resolver.
    pub fn validate_on(&self, today: NaiveDate) -> Result<FormRecord, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::NameRequired);
        }
        if !validate::valid_phone(&self.phone) {
            return Err(FormError::InvalidPhone);
        }
        if !validate::valid_email(&self.email) {
            return Err(FormError::InvalidEmail);
        }
        let date = dates::resolve_on(&self.date_phrase, today)?;
        Ok(FormRecord {
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            date: date.format("%Y-%m-%d").to_string(),
        })
    }
}
