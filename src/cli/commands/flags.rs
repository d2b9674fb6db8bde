//! Flags command implementation
//!
//! Implements `atboot flags` to list every capability flag a capability file
//! may set.

use anyhow::Result;

use crate::cli::output::{is_json, is_quiet, print_json};
use crate::core::capability::CapabilityFlag;

/// Execute the flags command
pub fn execute() -> Result<()> {
    if is_json() {
        let flags: Vec<_> = CapabilityFlag::ALL
            .iter()
            .map(|flag| {
                serde_json::json!({
                    "flag": flag,
                    "radio_profile": flag.radio_profile(),
                    "requires": flag.prerequisites(),
                })
            })
            .collect();
        print_json(&serde_json::Value::Array(flags));
        return Ok(());
    }
    if is_quiet() {
        return Ok(());
    }

    for flag in CapabilityFlag::ALL {
        let mut line = format!("{:<22}", flag.key());
        if let Some(profile) = flag.radio_profile() {
            line.push_str(&format!(" [{profile}]"));
        }
        let requires = flag.prerequisites();
        if !requires.is_empty() {
            let names: Vec<&str> = requires.iter().map(|f| f.key()).collect();
            line.push_str(&format!(" requires {}", names.join(", ")));
        }
        println!("{}", line.trim_end());
    }
    Ok(())
}
