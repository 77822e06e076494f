//! Project scanning: file discovery, per-file analysis, correlation.

pub mod cancellation;
pub mod correlation;
#[allow(clippy::module_inception)]
pub mod scanner;
pub mod types;
pub mod walker;

pub use cancellation::ScanCancellation;
pub use correlation::correlate;
pub use scanner::Scanner;
pub use types::{DiscoveredFile, ScanEstimate, ScanReport, ScanWarning};
pub use walker::{walk_directory, WalkOutcome};
