//! Google Maps Geocoding adapter.
//!
//! The adapter talks to Google through the [`GoogleMapsClient`] trait. The
//! caller owns the client and is responsible for its credentials;
//! [`HttpGoogleMapsClient`] is provided for callers that want to hit the
//! JSON web service directly with an API key.
//!
//! Each operation issues exactly one request and normalizes the first
//! result by folding over the type tags of its address components.
//!
//! See <https://developers.google.com/maps/documentation/geocoding/requests-geocoding>

use geonorm_geocoder_models::{GeoLocation, GeocodeResult};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::GeocodeError;
use crate::config::google_config;
use crate::normalize::{AddressFields, google_field_for_tag};

/// A coordinate pair in Google's vocabulary (`lng`, not `long`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl From<GeoLocation> for LatLng {
    fn from(value: GeoLocation) -> Self {
        Self {
            lat: value.lat,
            lng: value.long,
        }
    }
}

impl From<LatLng> for GeoLocation {
    fn from(value: LatLng) -> Self {
        Self {
            lat: value.lat,
            long: value.lng,
        }
    }
}

/// A single geocoding request: `{ address }` or `{ location: {lat, lng} }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoogleGeocodeRequest {
    /// Forward geocoding of a free-form address.
    Address(String),
    /// Reverse geocoding of a coordinate pair.
    Location(LatLng),
}

/// Status codes returned by the Geocoding API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GeocoderStatus {
    /// At least one result was returned.
    Ok,
    /// The request succeeded but matched nothing.
    ZeroResults,
    /// Billing or key problem.
    OverDailyLimit,
    /// Quota exceeded.
    OverQueryLimit,
    /// The request was refused (usually a key problem).
    RequestDenied,
    /// The request was malformed.
    InvalidRequest,
    /// The request could not reach Google.
    Error,
    /// Server-side error, or a status this crate does not know.
    #[serde(other)]
    UnknownError,
}

/// One typed part of a matched address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    /// Full text of the component (e.g., `"Pennsylvania Avenue Northwest"`).
    pub long_name: String,
    /// Abbreviated text (e.g., `"Pennsylvania Avenue NW"`).
    #[serde(default)]
    pub short_name: String,
    /// Type tags; a component may carry several.
    #[serde(default)]
    pub types: Vec<String>,
}

/// Geometry of a matched result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Resolved position.
    pub location: LatLng,
}

/// The members of a result the adapter reads.
#[derive(Deserialize)]
struct ResultView {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    geometry: Geometry,
}

/// A single match from the Geocoding API.
///
/// The typed fields are a view over the payload exactly as received, which
/// is kept alongside and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub struct GoogleGeocoderResult {
    /// Typed address parts.
    pub address_components: Vec<AddressComponent>,
    /// Resolved geometry.
    pub geometry: Geometry,
    raw: serde_json::Value,
}

impl TryFrom<serde_json::Value> for GoogleGeocoderResult {
    type Error = serde_json::Error;

    fn try_from(raw: serde_json::Value) -> Result<Self, Self::Error> {
        let view = ResultView::deserialize(&raw)?;
        Ok(Self {
            address_components: view.address_components,
            geometry: view.geometry,
            raw,
        })
    }
}

impl From<GoogleGeocoderResult> for serde_json::Value {
    fn from(value: GoogleGeocoderResult) -> Self {
        value.raw
    }
}

impl GoogleGeocoderResult {
    /// The result exactly as Google sent it.
    #[must_use]
    pub const fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    /// Latitude of the resolved position.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.geometry.location.lat
    }

    /// Longitude of the resolved position.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.geometry.location.lng
    }
}

/// The `(results, status)` pair returned for every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleGeocodeResponse {
    /// Matches in ranking order.
    #[serde(default)]
    pub results: Vec<GoogleGeocoderResult>,
    /// Overall request status.
    pub status: GeocoderStatus,
    /// Extra detail Google attaches to some failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// A pre-authenticated Google geocoding client.
#[async_trait::async_trait]
pub trait GoogleMapsClient: Send + Sync {
    /// Runs a single geocoding request.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request cannot be completed. A
    /// completed request with a non-`OK` status is *not* an error here.
    async fn geocode(
        &self,
        request: &GoogleGeocodeRequest,
    ) -> Result<GoogleGeocodeResponse, GeocodeError>;
}

/// [`GoogleMapsClient`] backed by the Geocoding JSON web service.
pub struct HttpGoogleMapsClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl HttpGoogleMapsClient {
    /// Creates a client for the embedded endpoint configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::NotConfigured`] if no Google endpoint is
    /// embedded.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GeocodeError> {
        let config = google_config().ok_or(GeocodeError::NotConfigured {
            provider: "Google Maps",
        })?;
        Ok(Self::with_base_url(api_key, config.base_url))
    }

    /// Creates a client for an explicit endpoint.
    #[must_use]
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl GoogleMapsClient for HttpGoogleMapsClient {
    async fn geocode(
        &self,
        request: &GoogleGeocodeRequest,
    ) -> Result<GoogleGeocodeResponse, GeocodeError> {
        let req = self
            .client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str())]);

        let req = match request {
            GoogleGeocodeRequest::Address(address) => req.query(&[("address", address.as_str())]),
            GoogleGeocodeRequest::Location(LatLng { lat, lng }) => {
                req.query(&[("latlng", format!("{lat},{lng}"))])
            }
        };

        // The request URL carries the API key, so it must not reach the
        // error text.
        let resp = req
            .send()
            .await
            .map_err(|e| GeocodeError::Http(e.without_url()))?;

        if !resp.status().is_success() {
            return Err(GeocodeError::Status {
                status: resp.status().as_u16(),
            });
        }

        resp.json()
            .await
            .map_err(|e| GeocodeError::Http(e.without_url()))
    }
}

/// Forward-geocodes `address`.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the client fails, the status is not `OK`,
/// or no result came back.
pub async fn forward(
    client: &dyn GoogleMapsClient,
    address: &str,
) -> Result<GeocodeResult, GeocodeError> {
    geocode(client, &GoogleGeocodeRequest::Address(address.to_string())).await
}

/// Reverse-geocodes `location`.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the client fails, the status is not `OK`,
/// or no result came back.
pub async fn reverse(
    client: &dyn GoogleMapsClient,
    location: GeoLocation,
) -> Result<GeocodeResult, GeocodeError> {
    geocode(client, &GoogleGeocodeRequest::Location(location.into())).await
}

async fn geocode(
    client: &dyn GoogleMapsClient,
    request: &GoogleGeocodeRequest,
) -> Result<GeocodeResult, GeocodeError> {
    let response = client.geocode(request).await?;
    let first = first_result(response)?;
    Ok(normalize_result(&first))
}

/// Picks the first match of a successful response.
fn first_result(response: GoogleGeocodeResponse) -> Result<GoogleGeocoderResult, GeocodeError> {
    if response.status != GeocoderStatus::Ok {
        return Err(GeocodeError::ProviderStatus {
            status: response.status,
        });
    }
    response
        .results
        .into_iter()
        .next()
        .ok_or(GeocodeError::NoResults)
}

/// Normalizes a Google result into the canonical schema.
///
/// Every type tag of every component is looked up once; unrecognized tags
/// are skipped.
#[must_use]
pub fn normalize_result(result: &GoogleGeocoderResult) -> GeocodeResult {
    let mut fields = AddressFields::default();
    for component in &result.address_components {
        for tag in &component.types {
            if let Some(field) = google_field_for_tag(tag) {
                fields.set(field, &component.long_name);
            }
        }
    }

    let location = GeoLocation {
        lat: result.lat(),
        long: result.lng(),
    };
    fields.into_result(location, result.raw().clone())
}
