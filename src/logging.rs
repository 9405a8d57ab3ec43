//! Diagnostic logging to stderr.
//!
//! Filter directives come from `PHASEBOARD_LOG` when set, otherwise from the
//! configured `log-level`. Stdout is left for command output.

use std::{env, io};

use tracing_subscriber::EnvFilter;

/// Environment variable holding tracing filter directives.
pub const LOG_ENV: &str = "PHASEBOARD_LOG";

/// Install the global subscriber. Later calls are no-ops.
pub fn init(default_level: &str) {
    let filter = build_filter(env::var(LOG_ENV).ok().as_deref(), default_level);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Env directives if they parse, else the default level.
fn build_filter(env_directives: Option<&str>, default_level: &str) -> EnvFilter {
    env_directives
        .filter(|d| !d.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}
