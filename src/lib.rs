//! atboot - Boot orchestrator for AT command firmware images
//!
//! This library models how a capability-configured firmware image comes up:
//! mandatory subsystems in dependency order, optional command modules chosen
//! by build-time capability flags, and a one-shot release of Bluetooth
//! controller memory no enabled module needs.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Boot orchestration logic (no I/O operations)
//! - [`infra`] - Infrastructure layer (filesystem, console, simulated platform)
//! - [`config`] - Configuration constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
