//! Mandatory subsystem bring-up
//!
//! Runs the ordered boot plan against a [`Platform`]. Each step carries its
//! own criticality: a critical failure halts the boot, a best-effort failure
//! is recorded and the plan continues.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::capability::{CapabilityConfiguration, CapabilityFlag};
use crate::core::platform::Platform;
use crate::error::{BootError, PlatformError};

/// Identifies a boot step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BootStepKind {
    /// Early platform hook
    Preprocess,
    /// Persistent-storage partition
    Storage,
    /// Default event loop
    EventLoop,
    /// AT storage partitions
    AtPartition,
    /// Network interface layer
    NetworkInterface,
    /// Default Wi-Fi station and soft-AP interfaces
    WifiInterfaces,
    /// Wi-Fi radio init and start
    WifiRadio,
    /// AT command transport
    Transport,
    /// Board setup
    Board,
    /// AT core with version descriptor
    CoreInit,
    /// Application hook after module registration
    CustomInit,
}

impl fmt::Display for BootStepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Preprocess => "preprocess",
            Self::Storage => "storage",
            Self::EventLoop => "event-loop",
            Self::AtPartition => "at-partition",
            Self::NetworkInterface => "network-interface",
            Self::WifiInterfaces => "wifi-interfaces",
            Self::WifiRadio => "wifi-radio",
            Self::Transport => "transport",
            Self::Board => "board",
            Self::CoreInit => "core-init",
            Self::CustomInit => "custom-init",
        };
        f.write_str(name)
    }
}

/// How a step failure is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Criticality {
    /// Failure halts the boot
    Critical,
    /// Failure is logged and the boot continues
    BestEffort,
}

/// One ordered unit of initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootStep {
    /// Which step
    pub kind: BootStepKind,
    /// Failure handling
    pub criticality: Criticality,
    /// Flag that must be enabled for the step to run
    pub condition: Option<CapabilityFlag>,
}

impl BootStep {
    /// A step that halts the boot on failure
    pub const fn critical(kind: BootStepKind) -> Self {
        Self {
            kind,
            criticality: Criticality::Critical,
            condition: None,
        }
    }

    /// A step whose failure is only recorded
    pub const fn best_effort(kind: BootStepKind) -> Self {
        Self {
            kind,
            criticality: Criticality::BestEffort,
            condition: None,
        }
    }

    /// Only run the step when `flag` is enabled
    #[must_use]
    pub const fn when(self, flag: CapabilityFlag) -> Self {
        Self {
            condition: Some(flag),
            ..self
        }
    }

    /// Whether the step applies to this configuration
    pub fn applies_to(&self, config: &CapabilityConfiguration) -> bool {
        self.condition.map_or(true, |flag| config.contains(flag))
    }
}

/// Bring-up order every image follows
///
/// Storage precedes the event loop, the event loop precedes the network
/// interface layer, and the radio attaches to interfaces that must exist.
pub const DEFAULT_BOOT_PLAN: [BootStep; 9] = [
    BootStep::best_effort(BootStepKind::Preprocess),
    BootStep::critical(BootStepKind::Storage),
    BootStep::critical(BootStepKind::EventLoop),
    BootStep::best_effort(BootStepKind::AtPartition),
    BootStep::critical(BootStepKind::NetworkInterface),
    BootStep::best_effort(BootStepKind::WifiInterfaces).when(CapabilityFlag::Wifi),
    BootStep::critical(BootStepKind::WifiRadio).when(CapabilityFlag::Wifi),
    BootStep::critical(BootStepKind::Transport),
    BootStep::best_effort(BootStepKind::Board),
];

/// What happened to a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum StepStatus {
    /// Step ran and succeeded
    Completed,
    /// Step condition was not met
    Skipped,
    /// Best-effort step failed
    Failed { reason: String },
}

/// Recorded result of a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Which step
    pub kind: BootStepKind,
    /// Failure handling that applied
    pub criticality: Criticality,
    /// Result
    #[serde(flatten)]
    pub status: StepStatus,
}

/// Runs the mandatory bring-up sequence
#[derive(Debug, Clone)]
pub struct SubsystemBootstrapper {
    plan: Vec<BootStep>,
}

impl Default for SubsystemBootstrapper {
    fn default() -> Self {
        Self::new(DEFAULT_BOOT_PLAN.to_vec())
    }
}

impl SubsystemBootstrapper {
    /// Create a bootstrapper for the given plan
    pub fn new(plan: Vec<BootStep>) -> Self {
        Self { plan }
    }

    /// Steps in execution order
    pub fn plan(&self) -> &[BootStep] {
        &self.plan
    }

    /// Execute every step in order
    ///
    /// Returns the outcome of each step, or the first critical failure.
    pub fn run<P>(
        &self,
        config: &CapabilityConfiguration,
        platform: &mut P,
    ) -> Result<Vec<StepOutcome>, BootError>
    where
        P: Platform + ?Sized,
    {
        let mut outcomes = Vec::with_capacity(self.plan.len());

        for step in &self.plan {
            if !step.applies_to(config) {
                tracing::debug!("Skipping boot step {}", step.kind);
                outcomes.push(StepOutcome {
                    kind: step.kind,
                    criticality: step.criticality,
                    status: StepStatus::Skipped,
                });
                continue;
            }

            tracing::debug!("Running boot step {}", step.kind);
            let result = execute_step(step.kind, platform);
            outcomes.push(record_step(step.kind, step.criticality, result)?);
        }

        Ok(outcomes)
    }
}

/// Turn a step result into an outcome, or a fatal error for critical steps
pub(crate) fn record_step(
    kind: BootStepKind,
    criticality: Criticality,
    result: Result<(), PlatformError>,
) -> Result<StepOutcome, BootError> {
    let status = match result {
        Ok(()) => StepStatus::Completed,
        Err(source) if criticality == Criticality::Critical => {
            tracing::error!("Boot step {kind} failed: {source}");
            return Err(BootError::StepFailed { step: kind, source });
        }
        Err(e) => {
            tracing::warn!("Boot step {kind} failed, continuing: {e}");
            StepStatus::Failed {
                reason: e.to_string(),
            }
        }
    };

    Ok(StepOutcome {
        kind,
        criticality,
        status,
    })
}

fn execute_step<P>(kind: BootStepKind, platform: &mut P) -> Result<(), PlatformError>
where
    P: Platform + ?Sized,
{
    match kind {
        BootStepKind::Preprocess => platform.preprocess(),
        BootStepKind::Storage => platform.storage_init(),
        BootStepKind::EventLoop => platform.event_loop_create_default(),
        BootStepKind::AtPartition => platform.at_partition_init(),
        BootStepKind::NetworkInterface => platform.netif_init(),
        BootStepKind::WifiInterfaces => {
            // Both interfaces are attempted even if the first one fails
            let sta = platform.create_default_wifi_sta();
            let ap = platform.create_default_wifi_ap();
            sta.and(ap)
        }
        BootStepKind::WifiRadio => bring_up_wifi(platform),
        BootStepKind::Transport => platform.transport_init(),
        BootStepKind::Board => platform.board_init(),
        BootStepKind::CoreInit | BootStepKind::CustomInit => Err(PlatformError::new(
            kind.to_string(),
            "step is driven by the orchestrator, not the boot plan",
        )),
    }
}

fn bring_up_wifi<P>(platform: &mut P) -> Result<(), PlatformError>
where
    P: Platform + ?Sized,
{
    platform.wifi_init()?;

    if let Err(e) = platform.wifi_start() {
        platform.wifi_stop();
        if let Err(deinit) = platform.wifi_deinit() {
            tracing::warn!("Wi-Fi deinit after failed start also failed: {deinit}");
        }
        return Err(e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_order() {
        let kinds: Vec<BootStepKind> = DEFAULT_BOOT_PLAN.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BootStepKind::Preprocess,
                BootStepKind::Storage,
                BootStepKind::EventLoop,
                BootStepKind::AtPartition,
                BootStepKind::NetworkInterface,
                BootStepKind::WifiInterfaces,
                BootStepKind::WifiRadio,
                BootStepKind::Transport,
                BootStepKind::Board,
            ]
        );
    }

    #[test]
    fn test_mandatory_steps_are_critical() {
        for kind in [
            BootStepKind::Storage,
            BootStepKind::EventLoop,
            BootStepKind::NetworkInterface,
        ] {
            let step = DEFAULT_BOOT_PLAN.iter().find(|s| s.kind == kind).unwrap();
            assert_eq!(step.criticality, Criticality::Critical, "{kind}");
            assert!(step.condition.is_none(), "{kind}");
        }
    }

    #[test]
    fn test_wifi_steps_are_conditional() {
        let empty = CapabilityConfiguration::empty();
        let wifi = CapabilityConfiguration::from_flags([CapabilityFlag::Wifi]);
        for step in DEFAULT_BOOT_PLAN
            .iter()
            .filter(|s| matches!(s.kind, BootStepKind::WifiInterfaces | BootStepKind::WifiRadio))
        {
            assert!(!step.applies_to(&empty));
            assert!(step.applies_to(&wifi));
        }
    }

    #[test]
    fn test_record_step_best_effort_failure() {
        let outcome = record_step(
            BootStepKind::Board,
            Criticality::BestEffort,
            Err(PlatformError::new("board_init", "no pins")),
        )
        .unwrap();
        assert_eq!(
            outcome.status,
            StepStatus::Failed {
                reason: "board_init failed: no pins".to_string()
            }
        );
    }

    #[test]
    fn test_record_step_critical_failure() {
        let err = record_step(
            BootStepKind::Storage,
            Criticality::Critical,
            Err(PlatformError::new("storage_init", "no free pages")),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BootError::StepFailed {
                step: BootStepKind::Storage,
                ..
            }
        ));
    }
}
