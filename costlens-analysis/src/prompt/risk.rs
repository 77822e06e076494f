//! Cross-region inference combined with prompt caching.

use costlens_core::Severity;

use crate::model_id::CrossRegionScope;

/// Severity of caching a prompt behind a cross-region inference profile.
///
/// | scope        | caching | static | result |
/// |--------------|---------|--------|--------|
/// | none         | any     | any    | `None` |
/// | any          | no      | any    | `None` |
/// | any          | yes     | yes    | info   |
/// | global       | yes     | no     | high   |
/// | geographic   | yes     | no     | medium |
pub fn cross_region_caching_severity(
    scope: CrossRegionScope,
    caching_requested: bool,
    is_static: bool,
) -> Option<Severity> {
    if !caching_requested {
        return None;
    }
    match (scope, is_static) {
        (CrossRegionScope::None, _) => None,
        (_, true) => Some(Severity::Info),
        (CrossRegionScope::Global, false) => Some(Severity::High),
        (CrossRegionScope::Geographic, false) => Some(Severity::Medium),
    }
}
