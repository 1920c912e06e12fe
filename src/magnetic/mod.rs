//! Magnetic fields of circular current loops and solenoids

pub mod loop_field;
pub mod solenoid;

pub use loop_field::CurrentLoop;
pub use solenoid::{layer_pool, Solenoid, SolenoidBuilder};
