// Configuration constants, loaded from the environment (or a .env file via dotenvy).

use std::env;

lazy_static::lazy_static! {
    /// API key for the hosted generative-language model. Empty when unset;
    /// the relay treats that as an initialization failure.
    pub static ref GOOGLE_API_KEY: String = env::var("GOOGLE_API_KEY").unwrap_or_default();
    /// Base URL of the generative-language API. Overridable so tests can
    /// point the relay at a local mock server.
    pub static ref GEMINI_API_URL: String = env::var("GEMINI_API_URL")
        .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
    pub static ref GEMINI_MODEL: String =
        env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-pro".to_string());
}

/// Fixed bot message surfaced when a chat turn fails in transit.
pub const GEMINI_ERROR_MESSAGE: &str =
    "Error fetching response from Gemini model. Please try again later.";

/// Fixed message surfaced once when the relay cannot be initialized.
pub const GEMINI_INIT_ERROR_MESSAGE: &str =
    "Error initializing Gemini model. Check your API key or setup.";
