//! Tracing setup shared by the binary and this crate's own integration tests, the
//! same way `forge-fmt`'s test harness calls a shared `init_tracing()` before
//! formatting rather than each test configuring its own subscriber.

use tracing_subscriber::EnvFilter;

/// `-v` raises the default level one step per occurrence; `RUST_LOG` always wins if
/// set, matching `tracing_subscriber::EnvFilter::from_default_env`'s precedence.
pub fn init_tracing(verbosity: u8) {
    let default_directive = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("solace={default_directive}")));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}
