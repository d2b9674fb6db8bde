//! Collaborator interfaces the orchestrator drives
//!
//! Everything behind these traits (storage, radios, the AT transport, the
//! command implementations) lives outside this crate. The simulated
//! implementations in [`crate::infra::sim`] stand in for them on the host.

use crate::core::reclaim::RadioMemoryMode;
use crate::core::registry::CommandModule;
use crate::error::PlatformError;

/// Subsystem initializers and radio controllers
pub trait Platform {
    /// Early platform hook run before anything else
    fn preprocess(&mut self) -> Result<(), PlatformError>;

    /// Initialize the default persistent-storage partition
    fn storage_init(&mut self) -> Result<(), PlatformError>;

    /// Create the default event loop
    fn event_loop_create_default(&mut self) -> Result<(), PlatformError>;

    /// Initialize the AT-specific storage partitions
    fn at_partition_init(&mut self) -> Result<(), PlatformError>;

    /// Initialize the network interface layer
    fn netif_init(&mut self) -> Result<(), PlatformError>;

    /// Create the default Wi-Fi station interface
    fn create_default_wifi_sta(&mut self) -> Result<(), PlatformError>;

    /// Create the default Wi-Fi soft-AP interface
    fn create_default_wifi_ap(&mut self) -> Result<(), PlatformError>;

    /// Initialize the Wi-Fi radio with the default configuration
    fn wifi_init(&mut self) -> Result<(), PlatformError>;

    /// Start the Wi-Fi radio
    fn wifi_start(&mut self) -> Result<(), PlatformError>;

    /// Stop the Wi-Fi radio
    fn wifi_stop(&mut self);

    /// Release the Wi-Fi driver
    fn wifi_deinit(&mut self) -> Result<(), PlatformError>;

    /// Bring up the transport the AT commands arrive on
    fn transport_init(&mut self) -> Result<(), PlatformError>;

    /// Board-specific pin and peripheral setup
    fn board_init(&mut self) -> Result<(), PlatformError>;

    /// Name of the hardware module the image is running on
    fn current_module_name(&self) -> String;

    /// Initialize the AT core with the connection budget and version descriptor
    fn core_init(&mut self, max_conn: u8, descriptor: &str) -> Result<(), PlatformError>;

    /// Hand a reserved Bluetooth controller memory region back to the heap
    fn release_radio_memory(&mut self, mode: RadioMemoryMode) -> Result<(), PlatformError>;

    /// Override the command-line terminator (one byte plus NUL)
    fn set_command_terminator(&mut self, terminator: &[u8; 2]);

    /// Application hook run after every module had its chance to register
    fn custom_init(&mut self) -> Result<(), PlatformError>;
}

/// Command-module registration functions
pub trait CommandSet {
    /// Register one module's AT commands, returning whether it succeeded
    fn register(&mut self, module: CommandModule) -> bool;
}

/// Operator-visible diagnostic output
///
/// Write-only and best-effort: a lost line is never a boot failure.
pub trait DiagnosticSink {
    /// Emit one diagnostic line (without line terminator)
    fn emit(&mut self, line: &str);
}

/// Diagnostic sink that keeps every line in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines emitted so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Take ownership of the collected lines
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &mut T {
    fn emit(&mut self, line: &str) {
        (**self).emit(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects_in_order() {
        let mut sink = MemorySink::new();
        sink.emit("first");
        sink.emit("second");
        assert_eq!(sink.lines(), ["first", "second"]);
        assert_eq!(sink.into_lines().len(), 2);
    }
}
