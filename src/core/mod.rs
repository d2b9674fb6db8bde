//! Core business logic module
//!
//! This module contains the boot orchestration logic. It performs no I/O of
//! its own: subsystems are reached through the traits in [`platform`].
//!
//! # Submodules
//!
//! - [`capability`] - Capability flags and the build configuration
//! - [`config`] - Capability file (atboot.toml) parsing and validation
//! - [`platform`] - Collaborator traits and the in-memory diagnostic sink
//! - [`bootstrap`] - Mandatory subsystem bring-up
//! - [`registry`] - Command module activation
//! - [`reclaim`] - Bluetooth controller memory reclamation
//! - [`version`] - Version descriptor
//! - [`orchestrator`] - The full boot sequence
//! - [`plan`] - Boot preview without a platform

pub mod bootstrap;
pub mod capability;
pub mod config;
pub mod orchestrator;
pub mod plan;
pub mod platform;
pub mod reclaim;
pub mod registry;
pub mod version;
