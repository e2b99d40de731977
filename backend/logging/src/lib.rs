//! Structured logging for bibtag.
//!
//! Console output plus optional NDJSON file rotation, and scrubbing of
//! credentials from messages that end up in logs or reports.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_secrets;
