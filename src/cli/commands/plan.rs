//! Plan command implementation
//!
//! Implements `atboot plan` to preview a boot without running it.

use std::path::Path;

use anyhow::Result;

use super::load_config;
use crate::cli::output::{is_json, is_quiet, print_detail, print_info, print_json, status};
use crate::core::bootstrap::Criticality;
use crate::core::plan::BootPlan;

/// Execute the plan command
pub fn execute(config_path: &Path) -> Result<()> {
    let loaded = load_config(config_path)?;
    let plan = BootPlan::compute(&loaded.capabilities, &loaded.settings);

    if is_json() {
        print_json(&serde_json::to_value(&plan)?);
        return Ok(());
    }
    if is_quiet() {
        return Ok(());
    }

    print_info(&format!("Boot plan for {}", config_path.display()));

    println!("\nBoot steps:");
    for step in &plan.steps {
        let marker = if step.runs { "•" } else { status::SKIPPED };
        let critical = match step.criticality {
            Criticality::Critical => " [critical]",
            Criticality::BestEffort => "",
        };
        let skipped = if step.runs { "" } else { " (skipped)" };
        println!("  {marker} {}{critical}{skipped}", step.kind);
    }

    println!("\nCommand modules:");
    if plan.modules.is_empty() {
        println!("  (none)");
    }
    for module in &plan.modules {
        println!("  • {} ({})", module.name, module.flag);
    }

    println!("\nController memory:");
    let reclamation = &plan.reclamation;
    if reclamation.controller_present {
        println!("  Decision: {}", reclamation.decision);
        match (&reclamation.releases, &reclamation.after_module) {
            (Some(mode), Some(after)) => print_detail(&format!("Releases {mode} after '{after}'")),
            (Some(mode), None) => print_detail(&format!("Releases {mode} before any module")),
            (None, _) => print_detail("Nothing released"),
        }
    } else {
        println!("  No Bluetooth controller in this image");
    }

    println!("\nBuild settings:");
    println!("  Socket connections: {}", plan.socket_max_conn);
    match plan.command_terminator {
        Some(byte) => println!("  Command terminator: {:?}", char::from(byte)),
        None => println!("  Command terminator: default"),
    }

    Ok(())
}
