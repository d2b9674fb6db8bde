//! Boot command implementation
//!
//! Implements `atboot boot`: runs the full boot sequence against the
//! simulated platform described by the capability file's `[simulate]` table.

use std::path::Path;

use anyhow::{Context, Result};

use super::load_config;
use crate::cli::output::{
    is_json, is_quiet, print_detail, print_info, print_json, print_success, print_warning, status,
};
use crate::core::bootstrap::StepStatus;
use crate::core::orchestrator::{BootReport, Orchestrator};
use crate::core::platform::{DiagnosticSink, MemorySink};
use crate::core::registry::ModuleStatus;
use crate::infra::console::ConsoleSink;
use crate::infra::sim::{SimulatedCommands, SimulatedPlatform};

/// Execute the boot command
pub fn execute(config_path: &Path, fw_version: Option<String>) -> Result<()> {
    let loaded = load_config(config_path)?;
    let mut settings = loaded.settings;
    if fw_version.is_some() {
        settings.fw_version = fw_version;
    }

    let mut platform = SimulatedPlatform::from_section(&loaded.file.simulate);
    let mut commands = SimulatedCommands::from_section(&loaded.file.simulate);

    // Diagnostic lines go straight to the console unless output is captured
    let mut memory = MemorySink::new();
    let mut console = ConsoleSink::new();
    let sink: &mut dyn DiagnosticSink = if is_json() || is_quiet() {
        &mut memory
    } else {
        &mut console
    };

    let result = Orchestrator::new(&loaded.capabilities, &settings).boot(
        &mut platform,
        &mut commands,
        sink,
    );

    match result {
        Ok(report) => {
            if is_json() {
                print_json(&serde_json::json!({
                    "status": "success",
                    "report": report,
                    "diagnostics": memory.lines(),
                }));
            } else {
                print_report(&report);
            }
            Ok(())
        }
        Err(e) => {
            if is_json() {
                print_json(&serde_json::json!({
                    "status": "error",
                    "error": e.to_string(),
                    "operations": platform.operations(),
                    "diagnostics": memory.lines(),
                }));
            }
            Err(e).context("Boot halted")
        }
    }
}

fn print_report(report: &BootReport) {
    if is_quiet() {
        return;
    }

    println!("\nBoot steps:");
    for step in &report.steps {
        match &step.status {
            StepStatus::Completed => println!("  {} {}", status::SUCCESS, step.kind),
            StepStatus::Skipped => println!("  {} {} (skipped)", status::SKIPPED, step.kind),
            StepStatus::Failed { reason } => {
                println!("  {} {}: {reason}", status::WARNING, step.kind);
            }
        }
    }

    println!("\nCommand modules:");
    for module in report
        .modules
        .iter()
        .filter(|m| m.status != ModuleStatus::Disabled)
    {
        let marker = if module.status == ModuleStatus::Registered {
            status::SUCCESS
        } else {
            status::ERROR
        };
        println!("  {marker} {}", module.name);
    }

    match &report.reclamation {
        Some(outcome) => {
            print_info(&format!("Controller memory: {}", outcome.decision));
            if let Some(error) = &outcome.error {
                print_warning(&format!("Release failed: {error}"));
            }
        }
        None => print_detail("No Bluetooth controller, nothing to reclaim"),
    }

    let failures = report.module_failures();
    if report.is_clean() {
        print_success("Boot complete");
    } else if failures > 0 {
        print_warning(&format!(
            "Boot complete with {failures} failed module registration(s)"
        ));
    } else {
        print_warning("Boot complete with best-effort step failures");
    }
}
