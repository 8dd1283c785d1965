//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! credential subsystem produces:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms via the metrics facade)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → whatever metrics recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Metrics are cheap no-ops until a recorder is installed
//! - Never record key material or passphrases

pub mod logging;
pub mod metrics;
