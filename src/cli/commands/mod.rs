//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod boot;
pub mod flags;
pub mod init;
pub mod plan;
pub mod version;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::core::capability::CapabilityConfiguration;
use crate::core::config::{BuildSettings, CapabilityFile};

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a capability file
    Init {
        /// Overwrite an existing capability file
        #[arg(short, long)]
        force: bool,
    },

    /// Show what a boot would do without running it
    Plan,

    /// Simulate a boot against the host platform
    Boot {
        /// Firmware version shown in the version descriptor
        #[arg(long, env = "ATBOOT_FW_VERSION")]
        fw_version: Option<String>,
    },

    /// Print the version descriptor handed to the AT core
    Version {
        /// Firmware version shown in the version descriptor
        #[arg(long, env = "ATBOOT_FW_VERSION")]
        fw_version: Option<String>,
    },

    /// List known capability flags
    Flags,
}

impl Commands {
    /// Execute the command
    pub fn run(self, config_path: &Path) -> Result<()> {
        match self {
            Self::Init { force } => init::execute(config_path, force),
            Self::Plan => plan::execute(config_path),
            Self::Boot { fw_version } => boot::execute(config_path, fw_version),
            Self::Version { fw_version } => version::execute(config_path, fw_version),
            Self::Flags => flags::execute(),
        }
    }
}

/// A capability file with its validated contents
pub(crate) struct LoadedConfig {
    pub file: CapabilityFile,
    pub capabilities: CapabilityConfiguration,
    pub settings: BuildSettings,
}

/// Load and validate a capability file
pub(crate) fn load_config(path: &Path) -> Result<LoadedConfig> {
    let file = CapabilityFile::load(path)
        .with_context(|| format!("Failed to load capability file {}", path.display()))?;
    let capabilities = file
        .capabilities()
        .with_context(|| format!("Invalid capabilities in {}", path.display()))?;
    let settings = file
        .build_settings()
        .with_context(|| format!("Invalid build settings in {}", path.display()))?;

    tracing::info!(
        "Loaded {} ({} capabilities enabled)",
        path.display(),
        capabilities.len()
    );

    Ok(LoadedConfig {
        file,
        capabilities,
        settings,
    })
}
