//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    use crate::core::capability::{CapabilityConfiguration, CapabilityFlag};

    /// Generate any single capability flag
    pub fn capability_flag() -> impl Strategy<Value = CapabilityFlag> {
        proptest::sample::select(CapabilityFlag::ALL.to_vec())
    }

    /// Generate an arbitrary flag set, prerequisites not guaranteed
    pub fn capability_configuration() -> impl Strategy<Value = CapabilityConfiguration> {
        proptest::collection::btree_set(capability_flag(), 0..CapabilityFlag::ALL.len())
            .prop_map(CapabilityConfiguration::from_flags)
    }

    /// Generate a flag set whose prerequisites are all met
    pub fn valid_capability_configuration() -> impl Strategy<Value = CapabilityConfiguration> {
        capability_configuration().prop_map(|config| {
            let mut flags: Vec<CapabilityFlag> = config.iter().collect();
            let required: Vec<CapabilityFlag> = flags
                .iter()
                .flat_map(|flag| flag.prerequisites().iter().copied())
                .collect();
            flags.extend(required);
            CapabilityConfiguration::from_flags(flags)
        })
    }

    /// Generate a firmware version string of 0 to 200 printable characters
    pub fn fw_version() -> impl Strategy<Value = String> {
        "[ -~]{0,200}"
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        #[test]
        fn test_valid_configuration_generator(config in valid_capability_configuration()) {
            prop_assert!(config.unmet_prerequisites().is_empty());
        }

        #[test]
        fn test_fw_version_generator(version in fw_version()) {
            prop_assert!(version.len() <= 200);
            prop_assert!(version.is_ascii());
        }
    }
}
