//! Logging utilities
//!
//! [`init_tracing`] installs the stderr subscriber used by the binaries.
//! [`Pretty`] renders complex values as YAML inside tracing statements.

use serde::Serialize;
use std::fmt::Debug;
use tracing_subscriber::EnvFilter;

/// Wrapper for pretty-printing types in logs as YAML
///
/// ```ignore
/// use tracker_common::Pretty;
/// use tracing::debug;
///
/// debug!("resolved schema: {}", Pretty(&schema));
/// ```
///
/// Outputs YAML with a leading newline. `Debug` is used as a fallback if YAML
/// serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// Install a `fmt` subscriber writing to stderr.
///
/// `debug` turns on debug output for the tracker crates. Otherwise `RUST_LOG`
/// is honoured, defaulting to `warn`. A second install is ignored.
pub fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("trackerctl=debug,tracker_schema=debug,tracker_fields=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init();
}
