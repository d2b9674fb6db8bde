//! Version descriptor for the AT core
//!
//! The descriptor names the commit and build time of the image and, when the
//! operator configured one, the firmware version and module name. It is a
//! bounded string: the optional part is dropped rather than cut short.

use serde::Serialize;

use crate::config::defaults::{MAX_FW_VERSION_LEN, MAX_VERSION_DESCRIPTOR_LEN};

/// Current atboot version from Cargo.toml
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

const UNKNOWN: &str = "unknown";

/// Build metadata embedded at compile time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    /// Commit the image was built from
    pub commit_id: String,
    /// Build date (YYYY-MM-DD)
    pub build_date: String,
    /// Build time (HH:MM:SS)
    pub build_time: String,
}

impl BuildInfo {
    /// Create build info from explicit values
    pub fn new(
        commit_id: impl Into<String>,
        build_date: impl Into<String>,
        build_time: impl Into<String>,
    ) -> Self {
        Self {
            commit_id: commit_id.into(),
            build_date: build_date.into(),
            build_time: build_time.into(),
        }
    }

    /// Metadata emitted by the build script
    pub fn current() -> Self {
        let commit = option_env!("VERGEN_GIT_SHA").unwrap_or(UNKNOWN);
        let timestamp = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("");
        Self::from_timestamp(commit, timestamp)
    }

    /// Split an RFC 3339 timestamp (`2024-05-01T10:20:30.123Z`) into date and time
    pub fn from_timestamp(commit_id: &str, timestamp: &str) -> Self {
        let (date, time) = match timestamp.split_once('T') {
            Some((date, rest)) => (date, rest.get(..8).unwrap_or(rest)),
            None => (UNKNOWN, UNKNOWN),
        };
        let commit_id = if commit_id.is_empty() { UNKNOWN } else { commit_id };
        Self::new(commit_id, date, time)
    }
}

/// Check whether an operator-supplied firmware version can be shown
pub fn is_displayable_fw_version(fw_version: &str) -> bool {
    !fw_version.is_empty() && fw_version.len() <= MAX_FW_VERSION_LEN
}

/// The diagnostic string handed to the AT core
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionDescriptor {
    text: String,
    fw_version: Option<String>,
}

impl VersionDescriptor {
    /// Assemble the descriptor
    ///
    /// Never fails: an empty, oversized, or non-fitting firmware version is
    /// left out entirely.
    pub fn build(info: &BuildInfo, fw_version: Option<&str>, module_name: &str) -> Self {
        let mut text = format!(
            "compile time({}):{} {}\r\n",
            info.commit_id, info.build_date, info.build_time
        );
        clamp_to_char_boundary(&mut text, MAX_VERSION_DESCRIPTOR_LEN);

        let fw_version = fw_version.filter(|v| is_displayable_fw_version(v)).and_then(|v| {
            let line = format!("Bin version:{v}({module_name})\r\n");
            if text.len() + line.len() <= MAX_VERSION_DESCRIPTOR_LEN {
                text.push_str(&line);
                Some(v.to_string())
            } else {
                tracing::warn!("Firmware version does not fit the version descriptor, omitting it");
                None
            }
        });

        Self { text, fw_version }
    }

    /// Descriptor text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Firmware version, when it made it into the descriptor
    pub fn fw_version(&self) -> Option<&str> {
        self.fw_version.as_deref()
    }
}

impl std::fmt::Display for VersionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

fn clamp_to_char_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::VERSION_DESCRIPTOR_CAPACITY;

    fn info() -> BuildInfo {
        BuildInfo::new("3f2a1b0", "2024-05-01", "10:20:30")
    }

    #[test]
    fn test_base_line_only() {
        let d = VersionDescriptor::build(&info(), None, "WROOM-32");
        assert_eq!(d.as_str(), "compile time(3f2a1b0):2024-05-01 10:20:30\r\n");
        assert!(d.fw_version().is_none());
    }

    #[test]
    fn test_includes_fw_version() {
        let d = VersionDescriptor::build(&info(), Some("v4.0.0.0"), "WROOM-32");
        assert_eq!(
            d.as_str(),
            "compile time(3f2a1b0):2024-05-01 10:20:30\r\nBin version:v4.0.0.0(WROOM-32)\r\n"
        );
        assert_eq!(d.fw_version(), Some("v4.0.0.0"));
    }

    #[test]
    fn test_empty_fw_version_omitted() {
        let d = VersionDescriptor::build(&info(), Some(""), "WROOM-32");
        assert!(!d.as_str().contains("Bin version"));
    }

    #[test]
    fn test_fw_version_at_limit_included() {
        let v = "v".repeat(MAX_FW_VERSION_LEN);
        let d = VersionDescriptor::build(&info(), Some(&v), "M");
        assert_eq!(d.fw_version(), Some(v.as_str()));
        assert!(d.as_str().len() < VERSION_DESCRIPTOR_CAPACITY);
    }

    #[test]
    fn test_oversized_fw_version_omitted() {
        let v = "v".repeat(MAX_FW_VERSION_LEN + 1);
        let d = VersionDescriptor::build(&info(), Some(&v), "M");
        assert!(d.fw_version().is_none());
        assert!(!d.as_str().contains("Bin version"));
    }

    #[test]
    fn test_descriptor_leaves_room_for_nul() {
        // 43-byte base line plus an 18-byte line around the module name
        let fits = VersionDescriptor::build(&info(), Some("v1"), &"m".repeat(194));
        assert_eq!(fits.as_str().len(), MAX_VERSION_DESCRIPTOR_LEN);
        assert_eq!(fits.fw_version(), Some("v1"));

        let overflows = VersionDescriptor::build(&info(), Some("v1"), &"m".repeat(195));
        assert!(overflows.fw_version().is_none());
        assert_eq!(overflows.as_str().len(), 43);
    }

    #[test]
    fn test_long_module_name_drops_optional_line() {
        let module = "m".repeat(VERSION_DESCRIPTOR_CAPACITY);
        let d = VersionDescriptor::build(&info(), Some("v1"), &module);
        assert!(d.fw_version().is_none());
        assert!(d.as_str().ends_with("\r\n"));
    }

    #[test]
    fn test_base_line_clamped_on_char_boundary() {
        let commit = "é".repeat(VERSION_DESCRIPTOR_CAPACITY);
        let d = VersionDescriptor::build(&BuildInfo::new(commit, "d", "t"), None, "M");
        assert!(d.as_str().len() < VERSION_DESCRIPTOR_CAPACITY);
    }

    #[test]
    fn test_from_timestamp() {
        let info = BuildInfo::from_timestamp("abc", "2024-05-01T10:20:30.123456789Z");
        assert_eq!(info.build_date, "2024-05-01");
        assert_eq!(info.build_time, "10:20:30");

        let info = BuildInfo::from_timestamp("", "garbage");
        assert_eq!(info.commit_id, "unknown");
        assert_eq!(info.build_date, "unknown");
    }

    mod properties {
        use super::*;
        use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
        use crate::test_utils::generators::fw_version;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

            #[test]
            fn test_fw_version_shown_whole_or_not_at_all(version in fw_version()) {
                let d = VersionDescriptor::build(&info(), Some(&version), "WROOM-32");

                prop_assert!(d.as_str().len() < VERSION_DESCRIPTOR_CAPACITY);
                prop_assert_eq!(d.fw_version().is_some(), is_displayable_fw_version(&version));
                if let Some(shown) = d.fw_version() {
                    let expected = format!("Bin version:{version}(WROOM-32)\r\n");
                    prop_assert_eq!(shown, version.as_str());
                    prop_assert!(d.as_str().ends_with(&expected));
                }
            }
        }
    }
}
