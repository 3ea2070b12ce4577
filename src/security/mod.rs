// src/security/mod.rs
//! Secret handling for the wallet engine: zeroizing key buffers and
//! redaction helpers for anything that might reach a log line.

pub mod redaction;
pub mod secret;

pub use redaction::{redact_key, truncate_body};
pub use secret::SecretString;
