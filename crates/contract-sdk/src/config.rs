//! Reference host limits from environment variables.

use std::env;

/// Default nesting limit for cross-contract calls.
pub const DEFAULT_MAX_CALL_DEPTH: u32 = 8;

/// Default upper bound of a parameter blob.
pub const DEFAULT_MAX_PARAM_BYTES: usize = 64 * 1024;

/// Default upper bound of an account, contract, method or table name.
pub const DEFAULT_MAX_NAME_BYTES: usize = 64;

/// Externally enforced limits of the in-memory host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    /// Deepest nesting allowed; a user-initiated invocation is depth 0.
    pub max_call_depth: u32,

    /// Largest accepted parameter blob, in bytes.
    pub max_param_bytes: usize,

    /// Longest accepted name, in bytes.
    pub max_name_bytes: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_param_bytes: DEFAULT_MAX_PARAM_BYTES,
            max_name_bytes: DEFAULT_MAX_NAME_BYTES,
        }
    }
}

impl HostConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CONTRACT_MAX_CALL_DEPTH`: Nesting limit (default: 8)
    /// - `CONTRACT_MAX_PARAM_BYTES`: Parameter blob limit (default: 65536)
    /// - `CONTRACT_MAX_NAME_BYTES`: Name length limit (default: 64)
    ///
    /// Absent or unparsable values fall back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_call_depth: env::var("CONTRACT_MAX_CALL_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_CALL_DEPTH),

            max_param_bytes: env::var("CONTRACT_MAX_PARAM_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_PARAM_BYTES),

            max_name_bytes: env::var("CONTRACT_MAX_NAME_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_NAME_BYTES),
        }
    }

    /// Same limits with a different nesting limit.
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: u32) -> Self {
        self.max_call_depth = depth;
        self
    }
}
