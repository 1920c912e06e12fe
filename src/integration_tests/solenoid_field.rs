//! Integration tests for the solenoid field engine
//!
//! This module compares the field of the reference solenoid, computed by the grid engine,
//! with the analytic result for a continuous current sheet, and checks that the engine
//! returns the same field whatever the number of workers.
