//! Developer diagnostics.
//!
//! User-facing output goes through `cliclack` and `colored`; this module
//! only wires `tracing` to stderr for debugging the generator itself.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`; defaults to `warn`, or `debug` for this crate when
/// `verbose` is set. Output: stderr, compact format.
///
/// ```bash
/// RUST_LOG=stackgen_core=trace stackgen new demo --frontend vite
/// ```
pub fn init(verbose: bool) {
    let default = if verbose {
        "warn,stackgen_core=debug,stackgen=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
