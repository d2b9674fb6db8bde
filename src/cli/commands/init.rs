//! CLI implementation for `atboot init` command
//!
//! Writes a starter capability file.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output::{print_detail, print_success};
use crate::core::capability::CapabilityFlag;
use crate::core::config::CapabilityFile;
use crate::error::ConfigError;
use crate::infra::filesystem;

/// Flags enabled in a freshly created capability file
pub const STARTER_CAPABILITIES: [CapabilityFlag; 6] = [
    CapabilityFlag::Base,
    CapabilityFlag::User,
    CapabilityFlag::Wifi,
    CapabilityFlag::Net,
    CapabilityFlag::Mqtt,
    CapabilityFlag::Http,
];

/// Starter capability file: every flag listed, the common ones enabled
pub fn starter_file() -> CapabilityFile {
    let mut file = CapabilityFile::default();
    for flag in CapabilityFlag::ALL {
        file.capabilities
            .insert(flag, STARTER_CAPABILITIES.contains(&flag));
    }
    file
}

/// Execute the init command
pub fn execute(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        }
        .into());
    }

    let content = starter_file()
        .to_toml()
        .context("Failed to serialize capability file")?;
    filesystem::write_file(path, &content)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    print_success(&format!("Created capability file {}", path.display()));
    print_detail(&format!(
        "Enabled: {}",
        STARTER_CAPABILITIES.map(CapabilityFlag::key).join(", ")
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_file_is_valid() {
        let file = starter_file();
        let config = file.capabilities().unwrap();
        assert_eq!(config.len(), STARTER_CAPABILITIES.len());
        assert!(file.build_settings().is_ok());
    }
}
