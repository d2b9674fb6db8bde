//! Bluetooth controller memory reclamation
//!
//! The controller reserves memory for both radio profiles at startup. Once
//! every radio-dependent command module has been considered, the profiles
//! no enabled module uses are handed back to the heap. The hand-back is
//! one-shot: a released region belongs to the general allocator for the rest
//! of the process lifetime.

use std::fmt;

use serde::Serialize;

use crate::core::capability::{CapabilityConfiguration, CapabilityFlag, RadioProfile};
use crate::core::platform::Platform;

/// Controller memory region selector passed to the release primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RadioMemoryMode {
    /// Memory used only by Bluetooth Classic
    Classic,
    /// Memory used only by Bluetooth LE
    Ble,
    /// Memory used by the whole dual-mode stack
    Dual,
}

impl fmt::Display for RadioMemoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classic => write!(f, "classic"),
            Self::Ble => write!(f, "ble"),
            Self::Dual => write!(f, "dual"),
        }
    }
}

/// Which reserved region goes back to the heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReclamationDecision {
    /// Only LE modules are enabled
    ReleaseClassic,
    /// Only Classic modules are enabled
    ReleaseLowEnergy,
    /// No radio-dependent module is enabled
    ReleaseAll,
    /// Both profiles are in use
    ReleaseNothing,
}

impl ReclamationDecision {
    /// Region handed to the release primitive, if any
    pub fn mode(self) -> Option<RadioMemoryMode> {
        match self {
            Self::ReleaseClassic => Some(RadioMemoryMode::Classic),
            Self::ReleaseLowEnergy => Some(RadioMemoryMode::Ble),
            Self::ReleaseAll => Some(RadioMemoryMode::Dual),
            Self::ReleaseNothing => None,
        }
    }
}

impl fmt::Display for ReclamationDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReleaseClassic => write!(f, "release classic memory"),
            Self::ReleaseLowEnergy => write!(f, "release low-energy memory"),
            Self::ReleaseAll => write!(f, "release all radio memory"),
            Self::ReleaseNothing => write!(f, "release nothing"),
        }
    }
}

/// Compute the reclamation decision for a configuration
pub fn decide(config: &CapabilityConfiguration) -> ReclamationDecision {
    let low_energy = config.uses_profile(RadioProfile::LowEnergy);
    let classic = config.uses_profile(RadioProfile::Classic);

    match (low_energy, classic) {
        (true, false) => ReclamationDecision::ReleaseClassic,
        (false, true) => ReclamationDecision::ReleaseLowEnergy,
        (false, false) => ReclamationDecision::ReleaseAll,
        (true, true) => ReclamationDecision::ReleaseNothing,
    }
}

/// Result of applying a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReclamationOutcome {
    /// Decision that was reached
    pub decision: ReclamationDecision,
    /// Region passed to the release primitive
    pub released: Option<RadioMemoryMode>,
    /// Error reported by the release primitive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Controller memory still owned by the radio subsystem
///
/// Only exists when the image carries a Bluetooth controller. Releasing it
/// consumes the value, so the region cannot be handed back twice.
#[derive(Debug)]
pub struct RadioMemoryReservation {
    _owned: (),
}

impl RadioMemoryReservation {
    /// Reservation made by the controller, if the image has one
    pub(crate) fn for_config(config: &CapabilityConfiguration) -> Option<Self> {
        config
            .contains(CapabilityFlag::BluetoothController)
            .then_some(Self { _owned: () })
    }

    /// Apply a decision, handing the selected region back to the heap
    pub fn release<P>(self, decision: ReclamationDecision, platform: &mut P) -> ReclamationOutcome
    where
        P: Platform + ?Sized,
    {
        let Some(mode) = decision.mode() else {
            tracing::info!("Both radio profiles in use, keeping controller memory");
            return ReclamationOutcome {
                decision,
                released: None,
                error: None,
            };
        };

        tracing::info!("Releasing {mode} controller memory");
        let error = platform
            .release_radio_memory(mode)
            .err()
            .map(|e| {
                tracing::warn!("Controller memory release failed: {e}");
                e.to_string()
            });

        ReclamationOutcome {
            decision,
            released: Some(mode),
            error,
        }
    }
}
