//! The [`Geocoder`] facade.
//!
//! A geocoder is a short-lived value holding either an address or a
//! coordinate pair. It owns no network state: the provider clients and the
//! logger travel separately in [`GeocodingClients`] so one bundle can serve
//! any number of geocoders.

use std::sync::Arc;

use geonorm_geocoder_models::{
    Direction, GeoLocation, GeocodeResult, GeocoderInput, InputError, LocationInput, Provider,
};

use crate::GeocodeError;
use crate::google::{self, GoogleMapsClient};
use crate::logging::{GeocodeLogger, default_logger};
use crate::nominatim::{self, NominatimApi, NominatimClient};

/// Returned by [`Geocoder::geocode`] on a location-built geocoder.
pub const NO_ADDRESS_MESSAGE: &str = "No address provided for forward geocoding";

/// Returned by [`Geocoder::reverse_geocode`] on an address-built geocoder.
pub const NO_LOCATION_MESSAGE: &str = "No location coordinates provided for reverse geocoding";

/// Either a canonical result or a description of why there is none.
pub type GeocodeOutcome = Result<GeocodeResult, String>;

/// Provider clients and the logger used by geocoding operations.
pub struct GeocodingClients {
    nominatim: Box<dyn NominatimApi>,
    google: Option<Box<dyn GoogleMapsClient>>,
    logger: Arc<dyn GeocodeLogger>,
}

impl GeocodingClients {
    /// Creates a bundle with only a Nominatim client and the `log`-crate
    /// logger.
    #[must_use]
    pub fn new(nominatim: impl NominatimApi + 'static) -> Self {
        Self {
            nominatim: Box::new(nominatim),
            google: None,
            logger: default_logger(),
        }
    }

    /// Creates a bundle whose Nominatim client uses the embedded
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the Nominatim client cannot be built.
    pub fn from_config() -> Result<Self, GeocodeError> {
        Ok(Self::new(NominatimClient::from_config()?))
    }

    /// Adds a ready-to-use Google Maps client.
    #[must_use]
    pub fn with_google(mut self, google: impl GoogleMapsClient + 'static) -> Self {
        self.google = Some(Box::new(google));
        self
    }

    /// Replaces the logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn GeocodeLogger>) -> Self {
        self.logger = logger;
        self
    }

    fn nominatim(&self) -> &dyn NominatimApi {
        self.nominatim.as_ref()
    }

    fn google(&self) -> Result<&dyn GoogleMapsClient, GeocodeError> {
        self.google.as_deref().ok_or(GeocodeError::NotConfigured {
            provider: "Google Maps",
        })
    }
}

/// Geocodes one address or one coordinate pair, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Geocoder {
    input: GeocoderInput,
}

impl Geocoder {
    /// Wraps already-validated input.
    #[must_use]
    pub const fn new(input: GeocoderInput) -> Self {
        Self { input }
    }

    /// Creates a geocoder for forward geocoding.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyAddress`] if `address` is blank.
    pub fn from_address(address: impl Into<String>) -> Result<Self, InputError> {
        GeocoderInput::address(address).map(Self::new)
    }

    /// Creates a geocoder for reverse geocoding.
    #[must_use]
    pub const fn from_location(location: GeoLocation) -> Self {
        Self::new(GeocoderInput::Location(location))
    }

    /// The held input.
    #[must_use]
    pub const fn input(&self) -> &GeocoderInput {
        &self.input
    }

    /// The held address, if built from one.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match &self.input {
            GeocoderInput::Address(address) => Some(address),
            GeocoderInput::Location(_) => None,
        }
    }

    /// The held coordinates, if built from them.
    #[must_use]
    pub const fn location(&self) -> Option<GeoLocation> {
        match &self.input {
            GeocoderInput::Location(location) => Some(*location),
            GeocoderInput::Address(_) => None,
        }
    }

    /// Resolves the held address to coordinates and canonical fields.
    ///
    /// Never panics and never returns a typed error: mode mismatches and
    /// upstream failures come back as a descriptive string such as
    /// `"Nominatim Forward Geocoding failed: No results found"`.
    pub async fn geocode(&self, clients: &GeocodingClients, provider: Provider) -> GeocodeOutcome {
        let Some(address) = self.address() else {
            clients.logger.error(NO_ADDRESS_MESSAGE);
            return Err(NO_ADDRESS_MESSAGE.to_string());
        };

        clients.logger.debug(&format!(
            "{} forward geocoding \"{address}\"",
            provider.label()
        ));

        let result = match provider {
            Provider::Google => match clients.google() {
                Ok(client) => google::forward(client, address).await,
                Err(e) => Err(e),
            },
            Provider::Nominatim => nominatim::forward(clients.nominatim(), address).await,
        };

        finish(clients, provider, Direction::Forward, result)
    }

    /// Resolves the held coordinates to canonical address fields.
    ///
    /// Never panics and never returns a typed error: mode mismatches and
    /// upstream failures come back as a descriptive string.
    pub async fn reverse_geocode(
        &self,
        clients: &GeocodingClients,
        provider: Provider,
    ) -> GeocodeOutcome {
        let Some(location) = self.location() else {
            clients.logger.error(NO_LOCATION_MESSAGE);
            return Err(NO_LOCATION_MESSAGE.to_string());
        };

        clients.logger.debug(&format!(
            "{} reverse geocoding ({}, {})",
            provider.label(),
            location.lat,
            location.long
        ));

        let result = match provider {
            Provider::Google => match clients.google() {
                Ok(client) => google::reverse(client, location).await,
                Err(e) => Err(e),
            },
            Provider::Nominatim => nominatim::reverse(clients.nominatim(), location).await,
        };

        finish(clients, provider, Direction::Reverse, result)
    }
}

impl From<GeoLocation> for Geocoder {
    fn from(value: GeoLocation) -> Self {
        Self::from_location(value)
    }
}

impl TryFrom<LocationInput> for Geocoder {
    type Error = InputError;

    fn try_from(value: LocationInput) -> Result<Self, Self::Error> {
        GeoLocation::try_from(value).map(Self::from_location)
    }
}

impl TryFrom<serde_json::Value> for Geocoder {
    type Error = InputError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        GeocoderInput::try_from(value).map(Self::new)
    }
}

/// Formats an upstream failure as `"{Provider} {Direction} Geocoding failed: {cause}"`.
#[must_use]
pub fn failure_message(provider: Provider, direction: Direction, error: &GeocodeError) -> String {
    format!("{} {direction} Geocoding failed: {error}", provider.label())
}

fn finish(
    clients: &GeocodingClients,
    provider: Provider,
    direction: Direction,
    result: Result<GeocodeResult, GeocodeError>,
) -> GeocodeOutcome {
    result.map_err(|e| {
        let message = failure_message(provider, direction, &e);
        clients.logger.error(&message);
        message
    })
}
