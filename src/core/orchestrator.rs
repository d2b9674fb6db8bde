//! Boot orchestration
//!
//! Threads a [`BootReport`] through the boot in its mandated order:
//!
//! 1. mandatory subsystem bring-up (halts on critical failure)
//! 2. AT core initialization with the version descriptor
//! 3. command module registration, with controller memory reclaimed right
//!    after the last radio-dependent module has been considered and the
//!    command-line terminator overridden before the modules that need it
//! 4. the best-effort custom init hook

use serde::Serialize;

use crate::core::bootstrap::{
    record_step, BootStep, BootStepKind, Criticality, StepOutcome, StepStatus,
    SubsystemBootstrapper,
};
use crate::core::capability::CapabilityConfiguration;
use crate::core::config::BuildSettings;
use crate::core::platform::{CommandSet, DiagnosticSink, Platform};
use crate::core::reclaim::{self, RadioMemoryReservation, ReclamationOutcome};
use crate::core::registry::{
    CommandModuleRegistry, ModuleOutcome, ModuleRegistration, ModuleStatus, TableBoundary,
};
use crate::core::version::{BuildInfo, VersionDescriptor};
use crate::error::BootError;

/// Everything that happened during one boot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootReport {
    /// Step outcomes in execution order
    pub steps: Vec<StepOutcome>,
    /// Descriptor handed to the AT core
    pub version_descriptor: String,
    /// Module outcomes in table order
    pub modules: Vec<ModuleOutcome>,
    /// Controller memory reclamation, if the image has a controller
    pub reclamation: Option<ReclamationOutcome>,
    /// Terminator byte applied to the command parser
    pub command_terminator: Option<u8>,
}

impl BootReport {
    /// Number of failed module registrations
    pub fn module_failures(&self) -> usize {
        self.modules
            .iter()
            .filter(|m| m.status == ModuleStatus::Failed)
            .count()
    }

    /// Whether every attempted step and module succeeded
    pub fn is_clean(&self) -> bool {
        self.module_failures() == 0
            && self
                .steps
                .iter()
                .all(|s| !matches!(s.status, StepStatus::Failed { .. }))
    }
}

/// Drives one boot of a firmware image
#[derive(Debug, Clone)]
pub struct Orchestrator<'a> {
    config: &'a CapabilityConfiguration,
    settings: &'a BuildSettings,
    build_info: BuildInfo,
    bootstrapper: SubsystemBootstrapper,
    registry: CommandModuleRegistry,
}

impl<'a> Orchestrator<'a> {
    /// Orchestrator with the default boot plan and module table
    pub fn new(config: &'a CapabilityConfiguration, settings: &'a BuildSettings) -> Self {
        Self {
            config,
            settings,
            build_info: BuildInfo::current(),
            bootstrapper: SubsystemBootstrapper::default(),
            registry: CommandModuleRegistry::default(),
        }
    }

    /// Use explicit build metadata instead of the compiled-in values
    #[must_use]
    pub fn with_build_info(mut self, build_info: BuildInfo) -> Self {
        self.build_info = build_info;
        self
    }

    /// Replace the boot plan
    #[must_use]
    pub fn with_boot_plan(mut self, plan: Vec<BootStep>) -> Self {
        self.bootstrapper = SubsystemBootstrapper::new(plan);
        self
    }

    /// Replace the module table
    #[must_use]
    pub fn with_modules(mut self, modules: Vec<ModuleRegistration>) -> Self {
        self.registry = CommandModuleRegistry::new(modules);
        self
    }

    /// Run the boot
    ///
    /// A critical failure returns immediately: nothing after the failed step
    /// runs, no module is attempted and no controller memory is released.
    pub fn boot<P, C, D>(
        self,
        platform: &mut P,
        commands: &mut C,
        diagnostics: &mut D,
    ) -> Result<BootReport, BootError>
    where
        P: Platform + ?Sized,
        C: CommandSet + ?Sized,
        D: DiagnosticSink + ?Sized,
    {
        let Self {
            config,
            settings,
            build_info,
            bootstrapper,
            registry,
        } = self;

        tracing::info!("Booting with {} capabilities enabled", config.len());
        let mut steps = bootstrapper.run(config, platform)?;

        let module_name = platform.current_module_name();
        let descriptor =
            VersionDescriptor::build(&build_info, settings.fw_version.as_deref(), &module_name);
        if let Some(fw_version) = descriptor.fw_version() {
            diagnostics.emit(fw_version);
        }
        let core = platform.core_init(settings.socket_max_conn, descriptor.as_str());
        steps.push(record_step(BootStepKind::CoreInit, Criticality::Critical, core)?);

        let mut reservation = RadioMemoryReservation::for_config(config);
        let mut reclamation = None;
        let modules = registry.run(config, commands, diagnostics, |boundary| match boundary {
            TableBoundary::RadioSettled => {
                reclamation = reservation.take().map(|reservation| {
                    let decision = reclaim::decide(config);
                    tracing::debug!("Reclamation decision: {decision}");
                    reservation.release(decision, platform)
                });
            }
            TableBoundary::CommandTerminator => {
                if let Some(byte) = settings.command_terminator {
                    tracing::debug!("Overriding command terminator with {byte:#04x}");
                    platform.set_command_terminator(&[byte, 0]);
                }
            }
        });

        let custom = platform.custom_init();
        steps.push(record_step(BootStepKind::CustomInit, Criticality::BestEffort, custom)?);

        let report = BootReport {
            steps,
            version_descriptor: descriptor.as_str().to_string(),
            modules: modules.outcomes,
            reclamation,
            command_terminator: settings.command_terminator,
        };

        tracing::info!(
            "Boot complete, {} module registration(s) failed",
            report.module_failures()
        );
        Ok(report)
    }
}
