//! Version command implementation
//!
//! Implements `atboot version`: prints the descriptor the AT core would
//! receive. The capability file is optional here; without one the defaults
//! apply.

use std::path::Path;

use anyhow::Result;

use super::load_config;
use crate::cli::output::{is_json, is_quiet, print_detail, print_json};
use crate::config::defaults::SIMULATED_MODULE_NAME;
use crate::core::version::{
    is_displayable_fw_version, BuildInfo, VersionDescriptor, CURRENT_VERSION,
};

/// Execute the version command
pub fn execute(config_path: &Path, fw_version: Option<String>) -> Result<()> {
    let (configured, module_name) = if config_path.exists() {
        let loaded = load_config(config_path)?;
        let module_name = loaded.file.simulate.module_name.clone();
        (loaded.settings.fw_version, module_name)
    } else {
        tracing::debug!("{} not found, using defaults", config_path.display());
        (None, None)
    };
    let fw_version = fw_version.or(configured);
    let module_name = module_name.unwrap_or_else(|| SIMULATED_MODULE_NAME.to_string());

    let build_info = BuildInfo::current();
    let descriptor = VersionDescriptor::build(&build_info, fw_version.as_deref(), &module_name);

    if is_json() {
        print_json(&serde_json::json!({
            "atboot_version": CURRENT_VERSION,
            "build": build_info,
            "descriptor": descriptor.as_str(),
            "fw_version": descriptor.fw_version(),
        }));
        return Ok(());
    }
    if is_quiet() {
        return Ok(());
    }

    print!("{descriptor}");
    if let Some(requested) = fw_version.as_deref() {
        if descriptor.fw_version().is_none() {
            let why = if is_displayable_fw_version(requested) {
                "descriptor capacity exceeded"
            } else {
                "invalid length"
            };
            print_detail(&format!("Firmware version omitted ({why})"));
        }
    }
    Ok(())
}
