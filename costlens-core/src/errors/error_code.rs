//! Stable error codes surfaced to callers of the scan entry points.

/// Every costlens error maps to a stable string code.
pub trait CostlensErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const SCAN_ERROR: &str = "SCAN_ERROR";
pub const ROOT_NOT_FOUND: &str = "ROOT_NOT_FOUND";
pub const NOT_A_DIRECTORY: &str = "NOT_A_DIRECTORY";
pub const SCAN_CANCELLED: &str = "SCAN_CANCELLED";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const CONFIG_NOT_FOUND: &str = "CONFIG_NOT_FOUND";
pub const CONFIG_INVALID: &str = "CONFIG_INVALID";
