//! Infrastructure layer
//!
//! Handles all I/O operations: the filesystem, the console, and the
//! simulated platform the orchestrator runs against on the host.

pub mod console;
pub mod filesystem;
pub mod sim;
