//! Structured logging setup.

use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber at `default_level`, overridable through
/// `RUST_LOG`. Later calls are ignored.
pub fn init_logging(default_level: tracing::Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_ascii_lowercase()));
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .finish(),
    )
    .ok();
}
