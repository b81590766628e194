//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber
//! - Resolve the log filter (environment overrides configuration)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor configuration set one.
pub const DEFAULT_FILTER: &str = "hanbok_routes=debug,tower_http=debug";

/// Pick the effective filter directive.
pub fn resolve_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        configured
            .and_then(|directive| EnvFilter::try_new(directive).ok())
            .unwrap_or_else(|| DEFAULT_FILTER.into())
    })
}

/// Install the fmt subscriber. Safe to call more than once; later calls are no-ops.
pub fn init_logging(configured: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(resolve_filter(configured))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_noop() {
        init_logging(Some("hanbok_routes=info"));
        init_logging(None);
        tracing::info!("still logging");
    }

    #[test]
    fn test_invalid_directive_still_builds_filter() {
        let filter = resolve_filter(Some("=[not a directive"));
        assert!(!filter.to_string().is_empty());
    }
}
