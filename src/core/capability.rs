//! Capability flags and the build-time capability configuration
//!
//! A firmware image is built with a fixed set of optional features. Every
//! other component branches on membership in that set instead of on what
//! happened to be compiled in.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Bluetooth operating mode whose memory footprint can be reclaimed on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RadioProfile {
    /// Bluetooth Low Energy
    LowEnergy,
    /// Bluetooth Classic (BR/EDR)
    Classic,
}

impl fmt::Display for RadioProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowEnergy => write!(f, "low-energy"),
            Self::Classic => write!(f, "classic"),
        }
    }
}

/// An optional feature that may be built into the firmware image
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityFlag {
    /// Basic AT commands
    Base,
    /// User-defined AT commands
    User,
    /// Wi-Fi radio and Wi-Fi commands
    Wifi,
    /// TCP/IP commands
    Net,
    /// MQTT client commands
    Mqtt,
    /// HTTP client commands
    Http,
    /// WebSocket client commands
    WebSocket,
    /// Bluetooth controller present in the image
    BluetoothController,
    /// Bluetooth LE commands
    BluetoothLowEnergy,
    /// BLE HID commands
    BleHid,
    /// BluFi provisioning commands
    Blufi,
    /// Bluetooth Classic commands
    BluetoothClassic,
    /// Bluetooth Classic SPP commands
    BtSpp,
    /// Bluetooth Classic A2DP commands
    BtA2dp,
    /// mDNS commands
    Mdns,
    /// WPS commands
    Wps,
    /// Peripheral driver commands
    Driver,
    /// SmartConfig provisioning commands
    SmartConfig,
    /// Ping command
    Ping,
    /// Ethernet commands
    Ethernet,
    /// Filesystem commands
    Fs,
    /// WPA2-Enterprise commands
    Eap,
    /// Firmware update commands
    Ota,
    /// Factory signaling test commands
    Signaling,
    /// Web provisioning server commands
    WebServer,
    /// RainMaker cloud commands
    Rainmaker,
}

impl CapabilityFlag {
    /// Every flag, in declaration order
    pub const ALL: [Self; 26] = [
        Self::Base,
        Self::User,
        Self::Wifi,
        Self::Net,
        Self::Mqtt,
        Self::Http,
        Self::WebSocket,
        Self::BluetoothController,
        Self::BluetoothLowEnergy,
        Self::BleHid,
        Self::Blufi,
        Self::BluetoothClassic,
        Self::BtSpp,
        Self::BtA2dp,
        Self::Mdns,
        Self::Wps,
        Self::Driver,
        Self::SmartConfig,
        Self::Ping,
        Self::Ethernet,
        Self::Fs,
        Self::Eap,
        Self::Ota,
        Self::Signaling,
        Self::WebServer,
        Self::Rainmaker,
    ];

    /// Key used for this flag in capability files
    pub fn key(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::User => "user",
            Self::Wifi => "wifi",
            Self::Net => "net",
            Self::Mqtt => "mqtt",
            Self::Http => "http",
            Self::WebSocket => "web-socket",
            Self::BluetoothController => "bluetooth-controller",
            Self::BluetoothLowEnergy => "bluetooth-low-energy",
            Self::BleHid => "ble-hid",
            Self::Blufi => "blufi",
            Self::BluetoothClassic => "bluetooth-classic",
            Self::BtSpp => "bt-spp",
            Self::BtA2dp => "bt-a2dp",
            Self::Mdns => "mdns",
            Self::Wps => "wps",
            Self::Driver => "driver",
            Self::SmartConfig => "smart-config",
            Self::Ping => "ping",
            Self::Ethernet => "ethernet",
            Self::Fs => "fs",
            Self::Eap => "eap",
            Self::Ota => "ota",
            Self::Signaling => "signaling",
            Self::WebServer => "web-server",
            Self::Rainmaker => "rainmaker",
        }
    }

    /// Radio profile this flag's modules depend on, if any
    pub fn radio_profile(self) -> Option<RadioProfile> {
        match self {
            Self::BluetoothLowEnergy | Self::BleHid | Self::Blufi => Some(RadioProfile::LowEnergy),
            Self::BluetoothClassic | Self::BtSpp | Self::BtA2dp => Some(RadioProfile::Classic),
            _ => None,
        }
    }

    /// Flags that must also be enabled for this one to be meaningful
    pub fn prerequisites(self) -> &'static [Self] {
        match self {
            Self::BluetoothLowEnergy | Self::BleHid | Self::Blufi | Self::BluetoothClassic => {
                &[Self::BluetoothController]
            }
            Self::BtSpp | Self::BtA2dp => &[Self::BluetoothController, Self::BluetoothClassic],
            _ => &[],
        }
    }
}

impl fmt::Display for CapabilityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The set of capability flags enabled for this build
///
/// Membership never changes once constructed; all queries are pure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapabilityConfiguration {
    enabled: BTreeSet<CapabilityFlag>,
}

impl CapabilityConfiguration {
    /// Configuration with nothing enabled
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a configuration from enabled flags without validating prerequisites
    pub fn from_flags<I>(flags: I) -> Self
    where
        I: IntoIterator<Item = CapabilityFlag>,
    {
        Self {
            enabled: flags.into_iter().collect(),
        }
    }

    /// Check whether a flag is enabled
    pub fn contains(&self, flag: CapabilityFlag) -> bool {
        self.enabled.contains(&flag)
    }

    /// Check whether any enabled flag depends on the given radio profile
    pub fn uses_profile(&self, profile: RadioProfile) -> bool {
        self.enabled
            .iter()
            .any(|flag| flag.radio_profile() == Some(profile))
    }

    /// Enabled flags in declaration order
    pub fn iter(&self) -> impl Iterator<Item = CapabilityFlag> + '_ {
        self.enabled.iter().copied()
    }

    /// Number of enabled flags
    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    /// Whether no flag is enabled
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// Unmet prerequisites as `(flag, missing prerequisite)` pairs
    pub fn unmet_prerequisites(&self) -> Vec<(CapabilityFlag, CapabilityFlag)> {
        self.enabled
            .iter()
            .flat_map(|&flag| {
                flag.prerequisites()
                    .iter()
                    .filter(|req| !self.enabled.contains(req))
                    .map(move |&req| (flag, req))
            })
            .collect()
    }
}

impl FromIterator<CapabilityFlag> for CapabilityConfiguration {
    fn from_iter<I: IntoIterator<Item = CapabilityFlag>>(iter: I) -> Self {
        Self::from_flags(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique() {
        let keys: BTreeSet<&str> = CapabilityFlag::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(keys.len(), CapabilityFlag::ALL.len());
    }

    #[test]
    fn test_key_matches_serde_name() {
        for flag in CapabilityFlag::ALL {
            let json = serde_json::to_string(&flag).unwrap();
            assert_eq!(json, format!("\"{}\"", flag.key()));
        }
    }

    #[test]
    fn test_radio_profiles() {
        assert_eq!(CapabilityFlag::BleHid.radio_profile(), Some(RadioProfile::LowEnergy));
        assert_eq!(CapabilityFlag::BtA2dp.radio_profile(), Some(RadioProfile::Classic));
        assert_eq!(CapabilityFlag::BluetoothController.radio_profile(), None);
        assert_eq!(CapabilityFlag::Wifi.radio_profile(), None);
    }

    #[test]
    fn test_uses_profile() {
        let config = CapabilityConfiguration::from_flags([
            CapabilityFlag::BluetoothController,
            CapabilityFlag::Blufi,
        ]);
        assert!(config.uses_profile(RadioProfile::LowEnergy));
        assert!(!config.uses_profile(RadioProfile::Classic));
    }

    #[test]
    fn test_unmet_prerequisites() {
        let config = CapabilityConfiguration::from_flags([CapabilityFlag::BtSpp]);
        let unmet = config.unmet_prerequisites();
        assert_eq!(
            unmet,
            vec![
                (CapabilityFlag::BtSpp, CapabilityFlag::BluetoothController),
                (CapabilityFlag::BtSpp, CapabilityFlag::BluetoothClassic),
            ]
        );

        let config = CapabilityConfiguration::from_flags([
            CapabilityFlag::BluetoothController,
            CapabilityFlag::BluetoothClassic,
            CapabilityFlag::BtSpp,
        ]);
        assert!(config.unmet_prerequisites().is_empty());
    }

    #[test]
    fn test_empty_configuration() {
        let config = CapabilityConfiguration::empty();
        assert!(config.is_empty());
        assert!(CapabilityFlag::ALL.iter().all(|&f| !config.contains(f)));
    }
}
