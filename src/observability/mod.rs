//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch pipeline, server, client produce:
//!     → logging.rs (structured log events through `tracing`)
//!     → metrics.rs (per-route counters and latency histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Log filter comes from `RUST_LOG` first, then configuration
//! - Metrics are recorded even when no exporter is installed; the
//!   `metrics` facade drops them in that case

pub mod logging;
pub mod metrics;
