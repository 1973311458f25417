//! Injected logging capability for geocoding operations.
//!
//! The [`Geocoder`](crate::Geocoder) never writes to process-wide output
//! directly. It reports through a [`GeocodeLogger`] carried by
//! [`GeocodingClients`](crate::GeocodingClients), so tests can capture or
//! silence messages without touching global logger state.

use std::sync::Arc;

/// `log` target used by [`LogCrateLogger`].
pub const LOG_TARGET: &str = "geonorm::geocoder";

/// Sink for geocoder diagnostics.
///
/// Implementations must be `Send + Sync` so a single logger can be shared
/// across concurrently running geocoding calls.
pub trait GeocodeLogger: Send + Sync {
    /// Records request-level detail.
    fn debug(&self, msg: &str);

    /// Records a failed geocoding operation.
    fn error(&self, msg: &str);
}

/// Forwards messages to the `log` crate under [`LOG_TARGET`].
pub struct LogCrateLogger;

impl GeocodeLogger for LogCrateLogger {
    fn debug(&self, msg: &str) {
        log::debug!(target: LOG_TARGET, "{msg}");
    }

    fn error(&self, msg: &str) {
        log::error!(target: LOG_TARGET, "{msg}");
    }
}

/// Discards every message.
pub struct NullLogger;

impl GeocodeLogger for NullLogger {
    fn debug(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}

/// Returns a shared [`LogCrateLogger`].
#[must_use]
pub fn default_logger() -> Arc<dyn GeocodeLogger> {
    Arc::new(LogCrateLogger)
}

/// Returns a shared [`NullLogger`].
#[must_use]
pub fn null_logger() -> Arc<dyn GeocodeLogger> {
    Arc::new(NullLogger)
}
