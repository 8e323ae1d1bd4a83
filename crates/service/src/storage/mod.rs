//! Storage backends for the service layer.
//!
//! The message collection lives in a single pretty-printed JSON file that is
//! read in full and rewritten in full on every operation.

pub mod json_file_store;

pub use json_file_store::{InitOutcome, JsonFileStore};
