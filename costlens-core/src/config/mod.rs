//! Configuration: scan settings and the top-level TOML document.

pub mod costlens_config;
pub mod scan_config;

pub use costlens_config::CostlensConfig;
pub use scan_config::ScanConfig;
