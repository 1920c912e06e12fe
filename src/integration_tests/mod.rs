//! Integration tests that run the full pipeline, from configuration to serialized field.

pub mod solenoid_field;
