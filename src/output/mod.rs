//! Serialize computed fields so they can be persisted or sent elsewhere.

pub mod file;

pub use file::{serialize, write_field, Binary, Format, Json, Text};
