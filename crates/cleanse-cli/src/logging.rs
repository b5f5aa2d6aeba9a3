//! Log subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a console subscriber on stderr.
///
/// `RUST_LOG` wins when set; otherwise only library warnings are shown, or
/// everything down to `debug` with `--verbose`.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cleanse={default_level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
