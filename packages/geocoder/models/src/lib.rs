#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical geocoding types.
//!
//! Both supported providers (Google Maps and Nominatim) normalize their
//! responses into [`GeocodeResult`]. This crate contains only data types,
//! input validation, and simple conversions. It performs no I/O.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Errors raised while constructing geocoder input.
///
/// These are the only synchronous failures in the system. They indicate
/// a caller programming error rather than a runtime condition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// A location object lacked a latitude or a longitude.
    #[error("Invalid location object: must contain lat and long properties")]
    InvalidLocation,

    /// Coordinates were present but not a valid WGS84 position.
    #[error("Invalid location: ({lat}, {long}) is outside [-90, 90] x [-180, 180]")]
    OutOfRange {
        /// The rejected latitude.
        lat: f64,
        /// The rejected longitude.
        long: f64,
    },

    /// The address string was empty or whitespace.
    #[error("Invalid address: must be a non-empty string")]
    EmptyAddress,

    /// The input was neither an address string nor a location object.
    #[error("Invalid geocoder input: expected an address string or a location object")]
    UnsupportedInput,
}

/// A WGS84 coordinate pair.
///
/// Deserialization goes through the same checks as [`GeoLocation::new`].
/// Struct literals are not checked; they are meant for coordinates a
/// provider has already resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LocationInput")]
pub struct GeoLocation {
    /// Latitude in degrees, within [-90, 90].
    pub lat: f64,
    /// Longitude in degrees, within [-180, 180].
    pub long: f64,
}

impl GeoLocation {
    /// Creates a validated coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::OutOfRange`] if either axis is non-finite or
    /// outside its valid range.
    pub fn new(lat: f64, long: f64) -> Result<Self, InputError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&long) {
            return Err(InputError::OutOfRange { lat, long });
        }
        Ok(Self { lat, long })
    }
}

/// An untyped location as supplied by a caller, where either axis may be
/// missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationInput {
    /// Latitude, if present.
    pub lat: Option<f64>,
    /// Longitude, if present.
    pub long: Option<f64>,
}

impl TryFrom<LocationInput> for GeoLocation {
    type Error = InputError;

    fn try_from(value: LocationInput) -> Result<Self, Self::Error> {
        match (value.lat, value.long) {
            (Some(lat), Some(long)) => Self::new(lat, long),
            _ => Err(InputError::InvalidLocation),
        }
    }
}

/// What a geocoder was constructed from. Exactly one of the two, decided
/// once.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocoderInput {
    /// A free-form address for forward geocoding.
    Address(String),
    /// A coordinate pair for reverse geocoding.
    Location(GeoLocation),
}

impl GeocoderInput {
    /// Creates address input.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyAddress`] if `address` is blank.
    pub fn address(address: impl Into<String>) -> Result<Self, InputError> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(InputError::EmptyAddress);
        }
        Ok(Self::Address(address))
    }
}

impl From<GeoLocation> for GeocoderInput {
    fn from(value: GeoLocation) -> Self {
        Self::Location(value)
    }
}

impl TryFrom<serde_json::Value> for GeocoderInput {
    type Error = InputError;

    /// Accepts either a JSON string (an address) or an object with numeric
    /// `lat` and `long` members.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::String(address) => Self::address(address),
            serde_json::Value::Object(map) => {
                let input = LocationInput {
                    lat: map.get("lat").and_then(serde_json::Value::as_f64),
                    long: map.get("long").and_then(serde_json::Value::as_f64),
                };
                GeoLocation::try_from(input).map(Self::Location)
            }
            _ => Err(InputError::UnsupportedInput),
        }
    }
}

/// The upstream geocoding service.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Provider {
    /// Google Maps Geocoding API.
    Google,
    /// `OpenStreetMap` Nominatim.
    #[default]
    Nominatim,
}

impl Provider {
    /// Human-readable provider name used in failure messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Nominatim => "Nominatim",
        }
    }
}

/// Which way a geocoding request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum Direction {
    /// Address to coordinates.
    Forward,
    /// Coordinates to address.
    Reverse,
}

/// Canonical, provider-independent geocoding result.
///
/// Every string field is empty when the provider omitted it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    /// Country name.
    pub nation: String,
    /// First-level administrative division (state, province).
    pub province: String,
    /// Second-level administrative division without a trailing " County".
    pub county: String,
    /// Locality name.
    pub town: String,
    /// Sublocality.
    pub borough: String,
    /// House number and road, space-joined.
    pub street: String,
    /// Postal code.
    pub zip: String,
    /// Resolved position. Reverse lookups snap to the nearest known address,
    /// so this may differ from the input.
    pub location: GeoLocation,
    /// Unmodified provider payload for the matched result.
    pub raw_response: serde_json::Value,
}
