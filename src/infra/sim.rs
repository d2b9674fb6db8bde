//! Simulated platform for host-side boots
//!
//! Records every collaborator call in order and fails the operations it was
//! told to fail. Used by the CLI to preview a capability file and by tests to
//! observe ordering.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::defaults::SIMULATED_MODULE_NAME;
use crate::core::config::SimulateSection;
use crate::core::platform::{CommandSet, Platform};
use crate::core::reclaim::RadioMemoryMode;
use crate::core::registry::CommandModule;
use crate::error::PlatformError;

/// A platform operation the simulation can observe or fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Platform pre-initialization hook
    Preprocess,
    /// Non-volatile storage bring-up
    StorageInit,
    /// Default event loop creation
    EventLoopCreate,
    /// AT partition lookup
    AtPartitionInit,
    /// Network interface layer bring-up
    NetifInit,
    /// Default Wi-Fi station interface
    WifiStaCreate,
    /// Default Wi-Fi access point interface
    WifiApCreate,
    /// Wi-Fi driver initialization
    WifiInit,
    /// Wi-Fi radio start
    WifiStart,
    /// Wi-Fi radio stop during rollback
    WifiStop,
    /// Wi-Fi driver teardown during rollback
    WifiDeinit,
    /// Command transport bring-up
    TransportInit,
    /// Board-specific initialization
    BoardInit,
    /// AT core initialization
    CoreInit,
    /// Bluetooth controller memory release
    ReleaseRadioMemory,
    /// Command-line terminator override
    SetCommandTerminator,
    /// Custom initialization hook
    CustomInit,
}

impl Operation {
    /// Whether the platform call behind this operation can report failure
    pub fn can_fail(self) -> bool {
        !matches!(self, Self::WifiStop | Self::SetCommandTerminator)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Same spelling as the capability file
        let name = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{self:?}"));
        f.write_str(&name)
    }
}

/// One recorded platform call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "kebab-case")]
pub enum PlatformCall {
    /// A call without arguments worth recording
    Op { operation: Operation },
    /// AT core initialization
    CoreInit { max_conn: u8, descriptor: String },
    /// Controller memory release
    Release { mode: RadioMemoryMode },
    /// Terminator override
    Terminator { byte: u8 },
}

impl PlatformCall {
    /// Operation behind the call
    pub fn operation(&self) -> Operation {
        match self {
            Self::Op { operation } => *operation,
            Self::CoreInit { .. } => Operation::CoreInit,
            Self::Release { .. } => Operation::ReleaseRadioMemory,
            Self::Terminator { .. } => Operation::SetCommandTerminator,
        }
    }
}

/// Host stand-in for the device's subsystems
#[derive(Debug, Clone)]
pub struct SimulatedPlatform {
    failing: BTreeSet<Operation>,
    module_name: String,
    calls: Vec<PlatformCall>,
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self {
            failing: BTreeSet::new(),
            module_name: SIMULATED_MODULE_NAME.to_string(),
            calls: Vec::new(),
        }
    }
}

impl SimulatedPlatform {
    /// Platform where every operation succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform configured from a `[simulate]` table
    pub fn from_section(section: &SimulateSection) -> Self {
        let mut platform = Self::new().failing(section.fail_operations.iter().copied());
        if let Some(name) = &section.module_name {
            platform.module_name.clone_from(name);
        }
        platform
    }

    /// Make the given operations report failure
    #[must_use]
    pub fn failing<I>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = Operation>,
    {
        self.failing.extend(operations);
        self
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> &[PlatformCall] {
        &self.calls
    }

    /// Operations called so far, in order
    pub fn operations(&self) -> Vec<Operation> {
        self.calls.iter().map(PlatformCall::operation).collect()
    }

    fn record(&mut self, call: PlatformCall) -> Result<(), PlatformError> {
        let operation = call.operation();
        tracing::trace!("Simulated platform call: {operation}");
        self.calls.push(call);
        if self.failing.contains(&operation) {
            Err(PlatformError::new(operation.to_string(), "simulated failure"))
        } else {
            Ok(())
        }
    }

    fn op(&mut self, operation: Operation) -> Result<(), PlatformError> {
        self.record(PlatformCall::Op { operation })
    }
}

impl Platform for SimulatedPlatform {
    fn preprocess(&mut self) -> Result<(), PlatformError> {
        self.op(Operation::Preprocess)
    }

    fn storage_init(&mut self) -> Result<(), PlatformError> {
        self.op(Operation::StorageInit)
    }

    fn event_loop_create_default(&mut self) -> Result<(), PlatformError> {
        self.op(Operation::EventLoopCreate)
    }

    fn at_partition_init(&mut self) -> Result<(), PlatformError> {
        self.op(Operation::AtPartitionInit)
    }

    fn netif_init(&mut self) -> Result<(), PlatformError> {
        self.op(Operation::NetifInit)
    }

    fn create_default_wifi_sta(&mut self) -> Result<(), PlatformError> {
        self.op(Operation::WifiStaCreate)
    }

    fn create_default_wifi_ap(&mut self) -> Result<(), PlatformError> {
        self.op(Operation::WifiApCreate)
    }

    fn wifi_init(&mut self) -> Result<(), PlatformError> {
        self.op(Operation::WifiInit)
    }

    fn wifi_start(&mut self) -> Result<(), PlatformError> {
        self.op(Operation::WifiStart)
    }

    fn wifi_stop(&mut self) {
        if let Err(e) = self.op(Operation::WifiStop) {
            tracing::debug!("Ignoring {e}");
        }
    }

    fn wifi_deinit(&mut self) -> Result<(), PlatformError> {
        self.op(Operation::WifiDeinit)
    }

    fn transport_init(&mut self) -> Result<(), PlatformError> {
        self.op(Operation::TransportInit)
    }

    fn board_init(&mut self) -> Result<(), PlatformError> {
        self.op(Operation::BoardInit)
    }

    fn current_module_name(&self) -> String {
        self.module_name.clone()
    }

    fn core_init(&mut self, max_conn: u8, descriptor: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::CoreInit {
            max_conn,
            descriptor: descriptor.to_string(),
        })
    }

    fn release_radio_memory(&mut self, mode: RadioMemoryMode) -> Result<(), PlatformError> {
        self.record(PlatformCall::Release { mode })
    }

    fn set_command_terminator(&mut self, terminator: &[u8; 2]) {
        if let Err(e) = self.record(PlatformCall::Terminator {
            byte: terminator[0],
        }) {
            tracing::debug!("Ignoring {e}");
        }
    }

    fn custom_init(&mut self) -> Result<(), PlatformError> {
        self.op(Operation::CustomInit)
    }
}

/// Host stand-in for the command-module registration functions
#[derive(Debug, Clone, Default)]
pub struct SimulatedCommands {
    failing: BTreeSet<CommandModule>,
    attempted: Vec<CommandModule>,
}

impl SimulatedCommands {
    /// Command set where every registration succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Command set configured from a `[simulate]` table
    pub fn from_section(section: &SimulateSection) -> Self {
        Self::new().failing(section.fail_modules.iter().copied())
    }

    /// Make the given modules fail to register
    #[must_use]
    pub fn failing<I>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = CommandModule>,
    {
        self.failing.extend(modules);
        self
    }

    /// Modules attempted so far, in order
    pub fn attempted(&self) -> &[CommandModule] {
        &self.attempted
    }
}

impl CommandSet for SimulatedCommands {
    fn register(&mut self, module: CommandModule) -> bool {
        self.attempted.push(module);
        !self.failing.contains(&module)
    }
}
