//! Command module activation
//!
//! The module table is fixed for a build. Each entry whose capability flag is
//! enabled gets exactly one registration attempt, in table order. A failed
//! registration costs the device that module's commands and nothing else.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::capability::{CapabilityConfiguration, CapabilityFlag};
use crate::core::platform::{CommandSet, DiagnosticSink};

/// An AT command module that can be registered with the AT core
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandModule {
    /// Basic commands (AT, AT+RST, AT+GMR...)
    Base,
    /// User-defined commands
    User,
    /// Wi-Fi station and soft-AP commands
    Wifi,
    /// TCP/IP commands
    Net,
    /// MQTT client
    Mqtt,
    /// HTTP client
    Http,
    /// WebSocket client
    WebSocket,
    /// Bluetooth LE
    Ble,
    /// Bluetooth LE HID device
    BleHid,
    /// BluFi provisioning
    Blufi,
    /// Bluetooth Classic
    Bt,
    /// Bluetooth Classic serial port profile
    BtSpp,
    /// Bluetooth Classic A2DP sink
    BtA2dp,
    /// mDNS
    Mdns,
    /// Wi-Fi Protected Setup
    Wps,
    /// Peripheral drivers
    Driver,
    /// SmartConfig provisioning
    SmartConfig,
    /// Ping
    Ping,
    /// Ethernet
    Ethernet,
    /// Filesystem access
    Fs,
    /// WPA2 Enterprise
    Eap,
    /// Firmware update
    Ota,
    /// Factory test and signaling
    Fact,
    /// Web configuration server
    WebServer,
    /// RainMaker cloud
    Rainmaker,
}

impl fmt::Display for CommandModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = DEFAULT_MODULES.iter().find(|m| m.module == *self);
        match entry {
            Some(entry) => f.write_str(entry.name),
            None => write!(f, "{self:?}"),
        }
    }
}

/// One row of the module table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleRegistration {
    /// Flag that must be enabled for the module to be attempted
    pub flag: CapabilityFlag,
    /// Module handed to [`CommandSet::register`]
    pub module: CommandModule,
    /// Display name
    pub name: &'static str,
    /// Name used in the failure diagnostic line
    pub label: &'static str,
    /// Registered only once the command terminator has been set
    pub after_terminator: bool,
}

impl ModuleRegistration {
    /// Create a table entry
    pub const fn new(flag: CapabilityFlag, module: CommandModule, name: &'static str) -> Self {
        Self {
            flag,
            module,
            name,
            label: name,
            after_terminator: false,
        }
    }

    /// Use a different name in the failure diagnostic line
    #[must_use]
    pub const fn labelled(self, label: &'static str) -> Self {
        Self { label, ..self }
    }

    /// Register this entry after the command terminator override
    #[must_use]
    pub const fn after_terminator(self) -> Self {
        Self {
            after_terminator: true,
            ..self
        }
    }

    /// Whether this module needs controller memory of some radio profile
    pub fn is_radio_dependent(&self) -> bool {
        self.flag.radio_profile().is_some()
    }
}

/// Module table in registration order
pub const DEFAULT_MODULES: [ModuleRegistration; 25] = [
    ModuleRegistration::new(CapabilityFlag::Base, CommandModule::Base, "base"),
    ModuleRegistration::new(CapabilityFlag::User, CommandModule::User, "user"),
    ModuleRegistration::new(CapabilityFlag::Wifi, CommandModule::Wifi, "wifi"),
    ModuleRegistration::new(CapabilityFlag::Net, CommandModule::Net, "net"),
    ModuleRegistration::new(CapabilityFlag::Mqtt, CommandModule::Mqtt, "mqtt"),
    ModuleRegistration::new(CapabilityFlag::Http, CommandModule::Http, "http"),
    ModuleRegistration::new(CapabilityFlag::WebSocket, CommandModule::WebSocket, "ws"),
    ModuleRegistration::new(CapabilityFlag::BluetoothLowEnergy, CommandModule::Ble, "ble"),
    ModuleRegistration::new(CapabilityFlag::BleHid, CommandModule::BleHid, "ble hid"),
    ModuleRegistration::new(CapabilityFlag::Blufi, CommandModule::Blufi, "blufi"),
    ModuleRegistration::new(CapabilityFlag::BluetoothClassic, CommandModule::Bt, "bt"),
    ModuleRegistration::new(CapabilityFlag::BtSpp, CommandModule::BtSpp, "bt spp"),
    ModuleRegistration::new(CapabilityFlag::BtA2dp, CommandModule::BtA2dp, "bt a2dp"),
    ModuleRegistration::new(CapabilityFlag::Mdns, CommandModule::Mdns, "mdns"),
    ModuleRegistration::new(CapabilityFlag::Wps, CommandModule::Wps, "wps"),
    ModuleRegistration::new(CapabilityFlag::Driver, CommandModule::Driver, "driver"),
    ModuleRegistration::new(
        CapabilityFlag::SmartConfig,
        CommandModule::SmartConfig,
        "smartconfig",
    ),
    ModuleRegistration::new(CapabilityFlag::Ping, CommandModule::Ping, "ping"),
    ModuleRegistration::new(CapabilityFlag::Ethernet, CommandModule::Ethernet, "ethernet"),
    ModuleRegistration::new(CapabilityFlag::Fs, CommandModule::Fs, "fs"),
    ModuleRegistration::new(CapabilityFlag::Eap, CommandModule::Eap, "eap"),
    ModuleRegistration::new(CapabilityFlag::Ota, CommandModule::Ota, "ota"),
    ModuleRegistration::new(CapabilityFlag::Signaling, CommandModule::Fact, "fact"),
    ModuleRegistration::new(CapabilityFlag::WebServer, CommandModule::WebServer, "web server")
        .labelled("web conf wifi"),
    ModuleRegistration::new(CapabilityFlag::Rainmaker, CommandModule::Rainmaker, "rainmaker")
        .after_terminator(),
];

/// Points in the table walk where the caller gets control back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableBoundary {
    /// Every radio-dependent entry has been considered
    RadioSettled,
    /// The next entry needs the command terminator in place
    CommandTerminator,
}

/// What happened to a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleStatus {
    /// Registration succeeded
    Registered,
    /// Registration was attempted and failed
    Failed,
    /// Flag not enabled, not attempted
    Disabled,
}

/// Recorded result of one table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleOutcome {
    /// Module
    pub module: CommandModule,
    /// Display name
    pub name: String,
    /// Flag the entry required
    pub flag: CapabilityFlag,
    /// Result
    pub status: ModuleStatus,
}

/// Outcomes for the whole table, in table order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryReport {
    /// One outcome per table entry
    pub outcomes: Vec<ModuleOutcome>,
}

impl RegistryReport {
    /// Modules that were attempted, in attempt order
    pub fn attempted(&self) -> impl Iterator<Item = &ModuleOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status != ModuleStatus::Disabled)
    }

    /// Number of failed registrations
    pub fn failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == ModuleStatus::Failed)
            .count()
    }

    /// Number of successful registrations
    pub fn registered_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == ModuleStatus::Registered)
            .count()
    }
}

/// Diagnostic line for a failed registration
pub fn failure_message(label: &str) -> String {
    format!("regist {label} cmd fail")
}

/// Activates the command modules enabled for a build
#[derive(Debug, Clone)]
pub struct CommandModuleRegistry {
    entries: Vec<ModuleRegistration>,
}

impl Default for CommandModuleRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MODULES.to_vec())
    }
}

impl CommandModuleRegistry {
    /// Create a registry over the given table
    pub fn new(entries: Vec<ModuleRegistration>) -> Self {
        Self { entries }
    }

    /// Table entries in order
    pub fn entries(&self) -> &[ModuleRegistration] {
        &self.entries
    }

    /// Entries that would be attempted for a configuration
    pub fn enabled<'a>(
        &'a self,
        config: &'a CapabilityConfiguration,
    ) -> impl Iterator<Item = &'a ModuleRegistration> + 'a {
        self.entries.iter().filter(|e| config.contains(e.flag))
    }

    /// Number of entries considered before radio memory can be settled
    ///
    /// Everything up to and including the last radio-dependent entry.
    pub fn radio_boundary(&self) -> usize {
        self.entries
            .iter()
            .rposition(ModuleRegistration::is_radio_dependent)
            .map_or(self.entries.len(), |idx| idx + 1)
    }

    /// Number of entries registered before the command terminator is set
    ///
    /// Everything before the first entry marked as needing the terminator.
    pub fn terminator_boundary(&self) -> usize {
        self.entries
            .iter()
            .position(|e| e.after_terminator)
            .unwrap_or(self.entries.len())
    }

    /// Attempt every enabled module once
    ///
    /// `on_boundary` runs exactly once per [`TableBoundary`], at that
    /// boundary's position in the table. When both fall at the same
    /// position the radio boundary comes first. Consuming the registry rules
    /// out a second pass.
    pub fn run<C, D, F>(
        self,
        config: &CapabilityConfiguration,
        commands: &mut C,
        diagnostics: &mut D,
        mut on_boundary: F,
    ) -> RegistryReport
    where
        C: CommandSet + ?Sized,
        D: DiagnosticSink + ?Sized,
        F: FnMut(TableBoundary),
    {
        let radio_at = self.radio_boundary();
        let terminator_at = self.terminator_boundary();
        let mut report = RegistryReport::default();

        for idx in 0..=self.entries.len() {
            if idx == radio_at {
                on_boundary(TableBoundary::RadioSettled);
            }
            if idx == terminator_at {
                on_boundary(TableBoundary::CommandTerminator);
            }
            if let Some(entry) = self.entries.get(idx) {
                report
                    .outcomes
                    .push(attempt(entry, config, commands, diagnostics));
            }
        }

        tracing::info!(
            "Registered {} command modules, {} failed",
            report.registered_count(),
            report.failure_count()
        );

        report
    }
}

fn attempt<C, D>(
    entry: &ModuleRegistration,
    config: &CapabilityConfiguration,
    commands: &mut C,
    diagnostics: &mut D,
) -> ModuleOutcome
where
    C: CommandSet + ?Sized,
    D: DiagnosticSink + ?Sized,
{
    let status = if !config.contains(entry.flag) {
        ModuleStatus::Disabled
    } else if commands.register(entry.module) {
        tracing::debug!("Registered {} commands", entry.name);
        ModuleStatus::Registered
    } else {
        tracing::warn!("Failed to register {} commands", entry.name);
        diagnostics.emit(&failure_message(entry.label));
        ModuleStatus::Failed
    };

    ModuleOutcome {
        module: entry.module,
        name: entry.name.to_string(),
        flag: entry.flag,
        status,
    }
}
