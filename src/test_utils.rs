use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Routes allocator traces to the test output, filtered by `RUST_LOG`.
pub fn init_tracing() {
  let _ = tracing_subscriber::registry()
    .with(EnvFilter::from_default_env())
    .with(tracing_subscriber::fmt::layer().with_test_writer())
    .try_init();
}
