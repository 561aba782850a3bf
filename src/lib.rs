pub mod chat;
pub mod constants;
pub mod dates;
pub mod form;
pub mod gemini;
pub mod intent;
pub mod session;
pub mod validate;
pub mod web_server;
