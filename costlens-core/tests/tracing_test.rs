//! Subscriber installation is idempotent.

use costlens_core::tracing::{init_tracing, init_tracing_with_filter};

#[test]
fn repeated_initialisation_is_a_no_op() {
    init_tracing_with_filter("costlens_analysis=debug");
    init_tracing();
    init_tracing_with_filter("not a valid [directive");
    tracing::info!("still logging");
}
