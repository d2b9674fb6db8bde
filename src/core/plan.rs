//! Boot plan preview
//!
//! Reports what a boot would do for a configuration without touching any
//! platform: which steps run, which modules are attempted, and what happens
//! to the controller memory.

use serde::Serialize;

use crate::core::bootstrap::{BootStepKind, Criticality, SubsystemBootstrapper};
use crate::core::capability::{CapabilityConfiguration, CapabilityFlag};
use crate::core::config::BuildSettings;
use crate::core::reclaim::{self, RadioMemoryMode, RadioMemoryReservation, ReclamationDecision};
use crate::core::registry::{CommandModule, CommandModuleRegistry};

/// Planned step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStep {
    /// Which step
    pub kind: BootStepKind,
    /// Failure handling
    pub criticality: Criticality,
    /// Whether the step's condition is met
    pub runs: bool,
}

/// Planned module attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedModule {
    /// Module
    pub module: CommandModule,
    /// Display name
    pub name: String,
    /// Flag the module requires
    pub flag: CapabilityFlag,
}

/// Planned controller memory handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedReclamation {
    /// Decision for the configuration
    pub decision: ReclamationDecision,
    /// Region that would be released; `None` when nothing is released or
    /// the image has no controller
    pub releases: Option<RadioMemoryMode>,
    /// Whether the image has a controller reservation at all
    pub controller_present: bool,
    /// Module after which the release happens
    pub after_module: Option<String>,
}

/// Everything a boot would do
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootPlan {
    /// Enabled capabilities
    pub capabilities: Vec<CapabilityFlag>,
    /// Steps in order
    pub steps: Vec<PlannedStep>,
    /// Modules that would be attempted, in order
    pub modules: Vec<PlannedModule>,
    /// Controller memory handling
    pub reclamation: PlannedReclamation,
    /// Socket connections handed to the AT core
    pub socket_max_conn: u8,
    /// Terminator override
    pub command_terminator: Option<u8>,
}

impl BootPlan {
    /// Compute the plan for the default boot plan and module table
    pub fn compute(config: &CapabilityConfiguration, settings: &BuildSettings) -> Self {
        Self::compute_with(
            config,
            settings,
            &SubsystemBootstrapper::default(),
            &CommandModuleRegistry::default(),
        )
    }

    /// Compute the plan for an explicit bootstrapper and registry
    pub fn compute_with(
        config: &CapabilityConfiguration,
        settings: &BuildSettings,
        bootstrapper: &SubsystemBootstrapper,
        registry: &CommandModuleRegistry,
    ) -> Self {
        let steps = bootstrapper
            .plan()
            .iter()
            .map(|step| PlannedStep {
                kind: step.kind,
                criticality: step.criticality,
                runs: step.applies_to(config),
            })
            .collect();

        let modules = registry
            .enabled(config)
            .map(|entry| PlannedModule {
                module: entry.module,
                name: entry.name.to_string(),
                flag: entry.flag,
            })
            .collect();

        let decision = reclaim::decide(config);
        let controller_present = RadioMemoryReservation::for_config(config).is_some();
        let boundary = registry.radio_boundary();
        let after_module = registry.entries()[..boundary]
            .iter()
            .rev()
            .find(|entry| config.contains(entry.flag))
            .map(|entry| entry.name.to_string());

        Self {
            capabilities: config.iter().collect(),
            steps,
            modules,
            reclamation: PlannedReclamation {
                decision,
                releases: decision.mode().filter(|_| controller_present),
                controller_present,
                after_module,
            },
            socket_max_conn: settings.socket_max_conn,
            command_terminator: settings.command_terminator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_without_controller_releases_nothing() {
        let config =
            CapabilityConfiguration::from_flags([CapabilityFlag::Base, CapabilityFlag::Wifi]);
        let plan = BootPlan::compute(&config, &BuildSettings::default());

        assert_eq!(plan.reclamation.decision, ReclamationDecision::ReleaseAll);
        assert!(!plan.reclamation.controller_present);
        assert!(plan.reclamation.releases.is_none());
        assert_eq!(plan.modules.len(), 2);
        assert!(plan.steps.iter().all(|s| s.runs));
    }

    #[test]
    fn test_plan_with_controller() {
        let config = CapabilityConfiguration::from_flags([
            CapabilityFlag::Base,
            CapabilityFlag::BluetoothController,
            CapabilityFlag::BluetoothClassic,
            CapabilityFlag::BtSpp,
            CapabilityFlag::Mdns,
        ]);
        let plan = BootPlan::compute(&config, &BuildSettings::default());

        assert_eq!(plan.reclamation.decision, ReclamationDecision::ReleaseLowEnergy);
        assert_eq!(plan.reclamation.releases, Some(RadioMemoryMode::Ble));
        assert_eq!(plan.reclamation.after_module.as_deref(), Some("bt spp"));
        let names: Vec<&str> = plan.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["base", "bt", "bt spp", "mdns"]);
    }

    #[test]
    fn test_wifi_steps_skipped_without_wifi() {
        let plan = BootPlan::compute(&CapabilityConfiguration::empty(), &BuildSettings::default());
        let skipped: Vec<BootStepKind> = plan
            .steps
            .iter()
            .filter(|s| !s.runs)
            .map(|s| s.kind)
            .collect();
        assert_eq!(
            skipped,
            vec![BootStepKind::WifiInterfaces, BootStepKind::WifiRadio]
        );
    }
}
