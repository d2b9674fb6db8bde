//! Capability file (atboot.toml) parsing and validation
//!
//! The capability file fixes what a firmware image is built with:
//!
//! ```toml
//! [build]
//! fw_version = "v4.0.0.0"
//! socket_max_conn = 5
//! command_terminator = "\n"
//!
//! [capabilities]
//! base = true
//! wifi = true
//! bluetooth-controller = true
//! bluetooth-low-energy = true
//!
//! [simulate]
//! fail_operations = ["wifi-start"]
//! fail_modules = ["mqtt"]
//! ```
//!
//! Unknown capability names are rejected by the parser, so the flag set can
//! never grow past the closed [`CapabilityFlag`] enumeration.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::defaults::DEFAULT_SOCKET_MAX_CONN;
use crate::core::capability::{CapabilityConfiguration, CapabilityFlag};
use crate::core::registry::CommandModule;
use crate::error::ConfigError;
use crate::infra::filesystem;
use crate::infra::sim::Operation;

/// Parsed capability file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilityFile {
    /// Non-flag build settings
    #[serde(default)]
    pub build: BuildSection,

    /// Capability flags; absent flags are disabled
    #[serde(default)]
    pub capabilities: BTreeMap<CapabilityFlag, bool>,

    /// Failure injection for the simulated platform
    #[serde(default)]
    pub simulate: SimulateSection,
}

/// `[build]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Firmware version shown in the version descriptor
    #[serde(default)]
    pub fw_version: Option<String>,

    /// Socket connections handed to the AT core
    #[serde(default = "default_socket_max_conn")]
    pub socket_max_conn: u8,

    /// Single-character command-line terminator override
    #[serde(default)]
    pub command_terminator: Option<String>,
}

fn default_socket_max_conn() -> u8 {
    DEFAULT_SOCKET_MAX_CONN
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            fw_version: None,
            socket_max_conn: default_socket_max_conn(),
            command_terminator: None,
        }
    }
}

/// `[simulate]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulateSection {
    /// Platform operations that report failure
    #[serde(default)]
    pub fail_operations: BTreeSet<Operation>,

    /// Command modules whose registration fails
    #[serde(default)]
    pub fail_modules: BTreeSet<CommandModule>,

    /// Module name the simulated platform reports
    #[serde(default)]
    pub module_name: Option<String>,
}

/// Validated non-flag build settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSettings {
    /// Firmware version shown in the version descriptor
    pub fw_version: Option<String>,
    /// Socket connections handed to the AT core (at least 1)
    pub socket_max_conn: u8,
    /// Command-line terminator byte
    pub command_terminator: Option<u8>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            fw_version: None,
            socket_max_conn: DEFAULT_SOCKET_MAX_CONN,
            command_terminator: None,
        }
    }
}

impl CapabilityFile {
    /// Load a capability file from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = filesystem::read_file(path)?;
        Self::from_toml(&content)
    }

    /// Parse a capability file from TOML
    ///
    /// Rejects `[simulate]` failures on operations that cannot report one.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: Self = toml::from_str(content).map_err(|source| ConfigError::Parse { source })?;
        if let Some(&operation) = file
            .simulate
            .fail_operations
            .iter()
            .find(|operation| !operation.can_fail())
        {
            return Err(ConfigError::InfallibleOperation { operation });
        }
        Ok(file)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Enabled flags, with every prerequisite checked
    pub fn capabilities(&self) -> Result<CapabilityConfiguration, ConfigError> {
        let config: CapabilityConfiguration = self
            .capabilities
            .iter()
            .filter(|&(_, &enabled)| enabled)
            .map(|(&flag, _)| flag)
            .collect();

        if let Some(&(flag, missing)) = config.unmet_prerequisites().first() {
            return Err(ConfigError::MissingPrerequisite { flag, missing });
        }

        tracing::debug!("Loaded {} enabled capabilities", config.len());
        Ok(config)
    }

    /// Validated build settings
    pub fn build_settings(&self) -> Result<BuildSettings, ConfigError> {
        if self.build.socket_max_conn == 0 {
            return Err(ConfigError::ZeroSocketConnections);
        }

        let command_terminator = self
            .build
            .command_terminator
            .as_deref()
            .map(parse_terminator)
            .transpose()?;

        Ok(BuildSettings {
            fw_version: self.build.fw_version.clone(),
            socket_max_conn: self.build.socket_max_conn,
            command_terminator,
        })
    }
}

fn parse_terminator(value: &str) -> Result<u8, ConfigError> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() && *byte != 0 => Ok(*byte),
        _ => Err(ConfigError::InvalidTerminator {
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = CapabilityFile::from_toml("").unwrap();
        assert!(file.capabilities().unwrap().is_empty());
        assert_eq!(file.build_settings().unwrap(), BuildSettings::default());
    }

    #[test]
    fn test_parse_full_file() {
        let file = CapabilityFile::from_toml(
            r#"
[build]
fw_version = "v4.0.0.0"
socket_max_conn = 5
command_terminator = "\n"

[capabilities]
base = true
wifi = true
mqtt = false
bluetooth-controller = true
bluetooth-low-energy = true

[simulate]
fail_operations = ["wifi-start"]
fail_modules = ["ble"]
module_name = "MINI-1"
"#,
        )
        .unwrap();

        let config = file.capabilities().unwrap();
        assert!(config.contains(CapabilityFlag::Wifi));
        assert!(!config.contains(CapabilityFlag::Mqtt));
        assert_eq!(config.len(), 4);

        let settings = file.build_settings().unwrap();
        assert_eq!(settings.socket_max_conn, 5);
        assert_eq!(settings.command_terminator, Some(b'\n'));
        assert_eq!(settings.fw_version.as_deref(), Some("v4.0.0.0"));

        assert!(file.simulate.fail_operations.contains(&Operation::WifiStart));
        assert!(file.simulate.fail_modules.contains(&CommandModule::Ble));
    }

    #[test]
    fn test_unknown_capability_rejected() {
        let err = CapabilityFile::from_toml("[capabilities]\nzigbee = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_infallible_operations_cannot_be_failed() {
        for name in ["wifi-stop", "set-command-terminator"] {
            let toml = format!("[simulate]\nfail_operations = [\"{name}\"]\n");
            let err = CapabilityFile::from_toml(&toml).unwrap_err();
            let ConfigError::InfallibleOperation { operation } = err else {
                panic!("{name}: unexpected error {err}");
            };
            assert_eq!(operation.to_string(), name);
        }
    }

    #[test]
    fn test_missing_prerequisite_rejected() {
        let file = CapabilityFile::from_toml(
            "[capabilities]\nbluetooth-controller = true\nbt-spp = true\n",
        )
        .unwrap();
        let err = file.capabilities().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingPrerequisite {
                flag: CapabilityFlag::BtSpp,
                missing: CapabilityFlag::BluetoothClassic,
            }
        ));
    }

    #[test]
    fn test_invalid_terminator() {
        for value in ["", "ab", "é", "\u{0}"] {
            let mut file = CapabilityFile::default();
            file.build.command_terminator = Some(value.to_string());
            assert!(
                matches!(file.build_settings(), Err(ConfigError::InvalidTerminator { .. })),
                "{value:?}"
            );
        }
    }

    #[test]
    fn test_zero_socket_connections() {
        let file = CapabilityFile::from_toml("[build]\nsocket_max_conn = 0\n").unwrap();
        assert!(matches!(
            file.build_settings(),
            Err(ConfigError::ZeroSocketConnections)
        ));
    }

    #[test]
    fn test_toml_roundtrip_keeps_flags() {
        let mut file = CapabilityFile::default();
        file.capabilities.insert(CapabilityFlag::WebSocket, true);
        let text = file.to_toml().unwrap();
        assert!(text.contains("web-socket = true"));
        assert_eq!(CapabilityFile::from_toml(&text).unwrap(), file);
    }
}
