#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Forward and reverse geocoding against Google Maps or Nominatim.
//!
//! A [`Geocoder`] is built from either an address or a coordinate pair and
//! dispatches to one of two provider adapters:
//!
//! 1. **Google Maps** ([`google`]): one request through a caller-supplied,
//!    already authenticated [`google::GoogleMapsClient`].
//! 2. **Nominatim / OpenStreetMap** ([`nominatim`]): a `search` request
//!    (forward only) followed by a `reverse` request that is the sole source
//!    of address fields in both directions. The public instance allows
//!    1 request per second; throttling is the caller's job.
//!
//! Both adapters normalize into the canonical
//! [`GeocodeResult`](geonorm_geocoder_models::GeocodeResult) via
//! [`normalize`]. Every runtime failure comes back as a descriptive string
//! in [`GeocodeOutcome`]; only malformed constructor input fails eagerly.

pub mod config;
pub mod geocoder;
pub mod google;
pub mod logging;
pub mod nominatim;
pub mod normalize;

pub use geocoder::{GeocodeOutcome, Geocoder, GeocodingClients};
pub use geonorm_geocoder_models::{
    Direction, GeoLocation, GeocodeResult, GeocoderInput, InputError, LocationInput, Provider,
};

use thiserror::Error;

/// Errors raised inside the provider adapters.
///
/// These never leave the crate's public operations; [`Geocoder`] renders
/// them into the failure string of a [`GeocodeOutcome`].
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success HTTP status.
    #[error("HTTP status {status}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The provider returned an empty result set.
    #[error("No results found")]
    NoResults,

    /// Google answered with a status other than `OK`.
    #[error("{status}")]
    ProviderStatus {
        /// The provider's status code (e.g., `ZERO_RESULTS`).
        status: google::GeocoderStatus,
    },

    /// The provider reported an error in its response body.
    #[error("{message}")]
    Upstream {
        /// The provider's own error message.
        message: String,
    },

    /// No client was supplied for the requested provider.
    #[error("{provider} client not configured")]
    NotConfigured {
        /// Human-readable provider name.
        provider: &'static str,
    },
}
