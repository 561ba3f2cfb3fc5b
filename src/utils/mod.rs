pub mod build_info;

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a stderr `fmt` subscriber. `RUST_LOG` wins over `directive` when set.
pub fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    // Another subscriber may already be installed by an embedding process or test harness.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
