/// Install a global fmt subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}
