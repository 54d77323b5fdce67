//! Logging setup for the Doorstep storefront.
//!
//! Components log through the `tracing` macros; this crate installs the
//! process-wide subscriber that formats those events.
//!
//! - `LoggingConfig` - level, output format and extra filter directives
//! - `init_logging` - install the subscriber (idempotent)

mod logging;

pub use logging::*;
