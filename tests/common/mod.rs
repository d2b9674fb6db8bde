//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory holding a capability file and runs the
/// atboot binary inside it.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a test project with `atboot.toml` already written
    #[allow(dead_code)]
    pub fn with_config(content: &str) -> Self {
        let project = Self::new();
        project.create_file("atboot.toml", content);
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    #[allow(dead_code)]
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    #[allow(dead_code)]
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Run atboot with arguments inside the project
    pub fn run(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_atboot"));
        cmd.current_dir(self.path());
        cmd.env_remove("ATBOOT_FW_VERSION");
        cmd.env_remove("RUST_LOG");
        for arg in args {
            cmd.arg(arg);
        }
        cmd.output().expect("Failed to execute atboot")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse stdout as JSON
#[allow(dead_code)]
pub fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

/// Wi-Fi station image without Bluetooth
#[allow(dead_code)]
pub const SAMPLE_WIFI: &str = r#"
[build]
fw_version = "v4.0.0.0"
socket_max_conn = 5

[capabilities]
base = true
user = true
wifi = true
net = true
mqtt = true
"#;

/// Image with a controller and only Low Energy modules
#[allow(dead_code)]
pub const SAMPLE_BLE: &str = r#"
[capabilities]
base = true
bluetooth-controller = true
bluetooth-low-energy = true
blufi = true
mdns = true
"#;

/// Image whose storage bring-up fails
#[allow(dead_code)]
pub const SAMPLE_STORAGE_FAILURE: &str = r#"
[capabilities]
base = true
bluetooth-controller = true

[simulate]
fail_operations = ["storage-init"]
"#;

/// Image with a failing command module
#[allow(dead_code)]
pub const SAMPLE_MODULE_FAILURE: &str = r#"
[capabilities]
base = true
wifi = true
mqtt = true

[simulate]
fail_modules = ["mqtt"]
"#;
