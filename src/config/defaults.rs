//! Default configuration values

/// Default capability file name
pub const CAPABILITY_FILE: &str = "atboot.toml";

/// Default number of socket connections handed to the AT core
pub const DEFAULT_SOCKET_MAX_CONN: u8 = 1;

/// Longest operator-supplied firmware version shown in the descriptor
pub const MAX_FW_VERSION_LEN: usize = 128;

/// Size of the buffer the version descriptor must fit in, NUL included
pub const VERSION_DESCRIPTOR_CAPACITY: usize = 256;

/// Longest descriptor text, leaving room for the NUL
pub const MAX_VERSION_DESCRIPTOR_LEN: usize = VERSION_DESCRIPTOR_CAPACITY - 1;

/// Module name reported by the simulated platform
pub const SIMULATED_MODULE_NAME: &str = "HOST-SIM";

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
