//! Structured logging bootstrap
//!
//! Provides `env_logger`-based logging for binaries and tests. Helpers here
//! only ever log sizes, offsets, OIDs and error types, never certificate
//! contents.

use log::{debug, info, warn};
use std::sync::Once;

use crate::diagnostics::{Diagnostic, Severity};

static INIT_LOGGER: Once = Once::new();

/// Logging infrastructure using `env_logger`
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging (call once at application startup)
    ///
    /// Levels are configured through `RUST_LOG`, e.g.
    /// `RUST_LOG=certparse=debug`.
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            env_logger::Builder::from_default_env()
                .format_timestamp_micros()
                .init();

            info!("Structured logging initialized");
        });
    }

    /// Initialize logging for test environments
    ///
    /// Safe to call from every test; repeated initialization is ignored.
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Log a successfully parsed certificate
    pub fn log_certificate_parsed(der_len: usize, extension_count: usize) {
        debug!("Certificate parsed ({der_len} bytes, {extension_count} extensions)");
    }

    /// Log a rejected certificate without exposing its contents
    pub fn log_certificate_rejected<E: std::error::Error>(der_len: usize, error: &E) {
        warn!(
            "Certificate rejected ({der_len} bytes): {error} (error_type: {})",
            std::any::type_name::<E>()
        );
    }

    /// Log a diagnostic at a level matching its severity
    pub fn log_diagnostic(diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Error => warn!("{diagnostic}"),
            Severity::Warning => debug!("{diagnostic}"),
        }
    }
}
