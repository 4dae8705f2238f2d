//! ---
//! strata_section: "02-observability"
//! strata_subsection: "module"
//! strata_type: "source"
//! strata_scope: "code"
//! strata_description: "Structured logging adapters for the release tooling."
//! strata_version: "v0.1.0-alpha"
//! strata_owner: "tbd"
//! ---
#![warn(missing_docs)]

//! Structured logging for the Strata release tooling, layered on `tracing`.

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

/// Initialize a baseline tracing subscriber suitable for the CLI tools.
///
/// `RUST_LOG` overrides the default `info` filter. Repeated calls are
/// harmless; only the first registration wins.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer())
        .try_init();
}

/// High-level outcome attached to release-step events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStepOutcome {
    /// The step completed successfully.
    Success,
    /// The step failed and blocks the release.
    Fault,
}

impl ReleaseStepOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            ReleaseStepOutcome::Success => "success",
            ReleaseStepOutcome::Fault => "fault",
        }
    }

    fn level(&self) -> Level {
        match self {
            ReleaseStepOutcome::Success => Level::INFO,
            ReleaseStepOutcome::Fault => Level::ERROR,
        }
    }
}

/// Emit a standardized release-step event with a success/fault outcome.
pub fn log_release_step(step: &str, message: &str, outcome: ReleaseStepOutcome) {
    match outcome.level() {
        Level::ERROR => tracing::event!(
            Level::ERROR,
            step,
            outcome = outcome.as_str(),
            message = %message
        ),
        Level::WARN => tracing::event!(
            Level::WARN,
            step,
            outcome = outcome.as_str(),
            message = %message
        ),
        Level::INFO => tracing::event!(
            Level::INFO,
            step,
            outcome = outcome.as_str(),
            message = %message
        ),
        Level::DEBUG => tracing::event!(
            Level::DEBUG,
            step,
            outcome = outcome.as_str(),
            message = %message
        ),
        Level::TRACE => tracing::event!(
            Level::TRACE,
            step,
            outcome = outcome.as_str(),
            message = %message
        ),
    }
}
