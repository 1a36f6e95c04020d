//! Common types shared by the tracker crates
//!
//! - [`ErrorKind`] and [`Severity`] classify errors so callers can decide how
//!   to surface them (request rejection vs. fatal misconfiguration).
//! - [`Pretty`] formats serializable values as YAML inside log statements.

pub mod error;
pub mod logging;

pub use error::{ErrorKind, ErrorSeverity, Severity};
pub use logging::{init_tracing, Pretty};
