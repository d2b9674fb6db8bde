//! Configuration and constants
//!
//! Compile-time defaults for the boot orchestrator.

pub mod defaults;
