//! Common infrastructure shared by the certparse crates
//!
//! This crate provides:
//! - A diagnostics sink that parsers append fatal and non-fatal findings to
//! - `env_logger`-based logging bootstrap with helpers that never log raw
//!   certificate bytes

pub mod diagnostics;
pub mod logging;

pub use diagnostics::{CertErrors, Diagnostic, Severity};
pub use logging::LoggingTransformer;
