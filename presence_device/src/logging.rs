use std::env;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `PRESENCE_DEBUG_LOG=1` forces debug output.
pub fn init() {
    let debug_enabled = env::var("PRESENCE_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
