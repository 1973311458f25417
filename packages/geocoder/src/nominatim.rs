//! Nominatim / OpenStreetMap geocoder adapter.
//!
//! Forward geocoding runs two sequential requests: `search` to resolve
//! the address to coordinates, then `reverse` on those coordinates. The
//! `reverse` response is the only source of address fields in both
//! directions, so forward and reverse results name things the same way.
//!
//! The public instance allows **1 request per second**. The caller is
//! responsible for throttling; nothing here sleeps or retries.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/> and
//! <https://nominatim.org/release-docs/develop/api/Reverse/>

use geonorm_geocoder_models::{GeoLocation, GeocodeResult};

use crate::GeocodeError;
use crate::config::{NominatimConfig, nominatim_config};
use crate::normalize::AddressFields;

/// The two Nominatim endpoints the adapter consumes.
///
/// Both return the decoded JSON body untouched.
#[async_trait::async_trait]
pub trait NominatimApi: Send + Sync {
    /// `GET search?format=json&q=<query>`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] on transport failure, a non-2xx status, or
    /// an undecodable body.
    async fn search(&self, query: &str) -> Result<serde_json::Value, GeocodeError>;

    /// `GET reverse?format=json&lat=<lat>&lon=<long>`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] on transport failure, a non-2xx status, or
    /// an undecodable body.
    async fn reverse(&self, location: GeoLocation) -> Result<serde_json::Value, GeocodeError>;
}

/// [`NominatimApi`] over HTTP.
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    /// Creates a client for the embedded Nominatim configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if no configuration is embedded or the HTTP
    /// client cannot be built.
    pub fn from_config() -> Result<Self, GeocodeError> {
        let config = nominatim_config().ok_or(GeocodeError::NotConfigured {
            provider: "Nominatim",
        })?;
        Self::new(&config)
    }

    /// Creates a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built
    /// (e.g., the user agent is not a valid header value).
    pub fn new(config: &NominatimConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, GeocodeError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("format", "json")])
            .query(query)
            .send()
            .await
            .map_err(|e| GeocodeError::Http(e.without_url()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

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

#[async_trait::async_trait]
impl NominatimApi for NominatimClient {
    async fn search(&self, query: &str) -> Result<serde_json::Value, GeocodeError> {
        self.get_json("search", &[("q", query.to_string())]).await
    }

    async fn reverse(&self, location: GeoLocation) -> Result<serde_json::Value, GeocodeError> {
        self.get_json(
            "reverse",
            &[
                ("lat", location.lat.to_string()),
                ("lon", location.long.to_string()),
            ],
        )
        .await
    }
}

/// Forward-geocodes `address`: search, then reverse on the first hit.
///
/// # Errors
///
/// Returns [`GeocodeError::NoResults`] if the search matched nothing, or
/// any error from either request or from parsing.
pub async fn forward(
    api: &dyn NominatimApi,
    address: &str,
) -> Result<GeocodeResult, GeocodeError> {
    let query = sanitize_query(address);
    let body = api.search(&query).await?;
    let hit = first_hit(body)?;
    let location = parse_location(&hit, "search")?;

    let details = api.reverse(location).await?;
    normalize_reverse(details, Some(hit))
}

/// Reverse-geocodes `location` with a single `reverse` request.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the request fails or the response cannot be
/// parsed.
pub async fn reverse(
    api: &dyn NominatimApi,
    location: GeoLocation,
) -> Result<GeocodeResult, GeocodeError> {
    let details = api.reverse(location).await?;
    normalize_reverse(details, None)
}

/// Removes single quotes, which break some upstream query parsers.
#[must_use]
pub fn sanitize_query(address: &str) -> String {
    address.replace('\'', "")
}

/// Takes the first element of a `search` response array.
fn first_hit(body: serde_json::Value) -> Result<serde_json::Value, GeocodeError> {
    let serde_json::Value::Array(hits) = body else {
        return Err(GeocodeError::Parse {
            message: "Nominatim search response is not an array".to_string(),
        });
    };
    hits.into_iter().next().ok_or(GeocodeError::NoResults)
}

/// Reads the `lat`/`lon` pair of a search hit or reverse payload.
///
/// Nominatim encodes coordinates as strings; bare numbers are accepted too.
fn parse_location(value: &serde_json::Value, context: &str) -> Result<GeoLocation, GeocodeError> {
    let lat = parse_coordinate(&value["lat"]).ok_or_else(|| GeocodeError::Parse {
        message: format!("Missing lat in Nominatim {context} response"),
    })?;
    let long = parse_coordinate(&value["lon"]).ok_or_else(|| GeocodeError::Parse {
        message: format!("Missing lon in Nominatim {context} response"),
    })?;
    Ok(GeoLocation { lat, long })
}

fn parse_coordinate(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Normalizes a `reverse` payload.
///
/// The raw response is the search hit when there was one, else the whole
/// reverse payload.
fn normalize_reverse(
    details: serde_json::Value,
    search_hit: Option<serde_json::Value>,
) -> Result<GeocodeResult, GeocodeError> {
    if let Some(message) = details.get("error").and_then(serde_json::Value::as_str) {
        return Err(GeocodeError::Upstream {
            message: message.to_string(),
        });
    }

    let location = parse_location(&details, "reverse")?;
    let fields = details
        .get("address")
        .and_then(serde_json::Value::as_object)
        .map(AddressFields::from_nominatim)
        .unwrap_or_default();

    Ok(fields.into_result(location, search_hit.unwrap_or(details)))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Replays canned bodies and records each call in order.
    struct FakeApi {
        search: serde_json::Value,
        reverse: serde_json::Value,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn new(search: serde_json::Value, reverse: serde_json::Value) -> Self {
            Self {
                search,
                reverse,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl NominatimApi for FakeApi {
        async fn search(&self, query: &str) -> Result<serde_json::Value, GeocodeError> {
            self.calls.lock().unwrap().push(format!("search {query}"));
            Ok(self.search.clone())
        }

        async fn reverse(&self, location: GeoLocation) -> Result<serde_json::Value, GeocodeError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("reverse {},{}", location.lat, location.long));
            Ok(self.reverse.clone())
        }
    }

    fn white_house_search() -> serde_json::Value {
        serde_json::json!([{
            "place_id": 299_226_346,
            "lat": "38.8976763",
            "lon": "-77.0365298",
            "display_name": "White House, 1600, Pennsylvania Avenue Northwest, Washington, District of Columbia, 20500, United States",
            "address": { "road": "Ignored Road" }
        }])
    }

    fn white_house_reverse() -> serde_json::Value {
        serde_json::json!({
            "place_id": 299_226_346,
            "lat": "38.89767",
            "lon": "-77.03655",
            "display_name": "White House, 1600, Pennsylvania Avenue Northwest, Washington, District of Columbia, 20500, United States",
            "address": {
                "house_number": "1600",
                "road": "Pennsylvania Avenue Northwest",
                "suburb": "Ward 2",
                "city": "Washington",
                "state": "District of Columbia",
                "postcode": "20500",
                "country": "United States",
                "country_code": "us"
            }
        })
    }

    #[tokio::test]
    async fn forward_searches_then_reverses_the_first_hit() {
        let api = FakeApi::new(white_house_search(), white_house_reverse());

        let result = forward(&api, "1600 Pennsylvania Avenue, Washington DC")
            .await
            .unwrap();

        assert_eq!(
            api.calls(),
            vec![
                "search 1600 Pennsylvania Avenue, Washington DC".to_string(),
                "reverse 38.8976763,-77.0365298".to_string(),
            ]
        );
        assert_eq!(result.street, "1600 Pennsylvania Avenue Northwest");
        assert_eq!(result.town, "Washington");
        assert_eq!(result.province, "District of Columbia");
        assert_eq!(result.nation, "United States");
        assert_eq!(result.zip, "20500");
        assert_eq!(result.county, "");
        assert_eq!(result.borough, "");
    }

    #[tokio::test]
    async fn forward_location_comes_from_reverse_payload() {
        let api = FakeApi::new(white_house_search(), white_house_reverse());
        let result = forward(&api, "White House").await.unwrap();
        assert!((result.location.lat - 38.897_67).abs() < 1e-9);
        assert!((result.location.long - -77.036_55).abs() < 1e-9);
    }

    #[tokio::test]
    async fn forward_raw_response_is_the_search_hit() {
        let api = FakeApi::new(white_house_search(), white_house_reverse());
        let result = forward(&api, "White House").await.unwrap();
        assert_eq!(result.raw_response, white_house_search()[0]);
    }

    #[tokio::test]
    async fn forward_strips_single_quotes() {
        let api = FakeApi::new(white_house_search(), white_house_reverse());
        forward(&api, "O'Hare International Airport").await.unwrap();
        assert_eq!(api.calls()[0], "search OHare International Airport");
    }

    #[tokio::test]
    async fn forward_without_hits_skips_reverse() {
        let api = FakeApi::new(serde_json::json!([]), white_house_reverse());
        let err = forward(&api, "Nowhere at all").await.unwrap_err();
        assert!(matches!(err, GeocodeError::NoResults));
        assert_eq!(err.to_string(), "No results found");
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn forward_rejects_non_array_search() {
        let api = FakeApi::new(serde_json::json!({ "error": "bad" }), white_house_reverse());
        let err = forward(&api, "x").await.unwrap_err();
        assert!(matches!(err, GeocodeError::Parse { .. }));
    }

    #[tokio::test]
    async fn reverse_uses_coordinates_directly() {
        let api = FakeApi::new(serde_json::json!([]), white_house_reverse());
        let location = GeoLocation {
            lat: 38.897_676_3,
            long: -77.036_529_8,
        };

        let result = reverse(&api, location).await.unwrap();

        assert_eq!(api.calls(), vec!["reverse 38.8976763,-77.0365298".to_string()]);
        assert_eq!(result.raw_response, white_house_reverse());
        assert_eq!(result.street, "1600 Pennsylvania Avenue Northwest");
    }

    #[tokio::test]
    async fn reverse_strips_county_and_prefers_town() {
        let api = FakeApi::new(
            serde_json::json!([]),
            serde_json::json!({
                "lat": "39.1157",
                "lon": "-77.5636",
                "address": {
                    "town": "Leesburg",
                    "city": "Ashburn",
                    "county": "Loudoun County",
                    "state": "Virginia",
                    "country": "United States"
                }
            }),
        );
        let result = reverse(&api, GeoLocation { lat: 39.1, long: -77.5 })
            .await
            .unwrap();
        assert_eq!(result.county, "Loudoun");
        assert_eq!(result.town, "Leesburg");
        assert_eq!(result.street, "");
    }

    #[tokio::test]
    async fn reverse_error_payload_is_reported() {
        let api = FakeApi::new(
            serde_json::json!([]),
            serde_json::json!({ "error": "Unable to geocode" }),
        );
        let err = reverse(&api, GeoLocation { lat: 0.0, long: 0.0 })
            .await
            .unwrap_err();
        assert!(matches!(err, GeocodeError::Upstream { .. }));
        assert_eq!(err.to_string(), "Unable to geocode");
    }

    #[tokio::test]
    async fn reverse_without_address_yields_empty_fields() {
        let api = FakeApi::new(
            serde_json::json!([]),
            serde_json::json!({ "lat": "10.5", "lon": "20.25" }),
        );
        let result = reverse(&api, GeoLocation { lat: 10.5, long: 20.25 })
            .await
            .unwrap();
        assert_eq!(result.nation, "");
        assert_eq!(result.street, "");
        assert!((result.location.lat - 10.5).abs() < 1e-9);
    }

    #[test]
    fn parses_string_and_numeric_coordinates() {
        let loc = parse_location(&serde_json::json!({ "lat": "41.8827", "lon": -87.6278 }), "test")
            .unwrap();
        assert!((loc.lat - 41.8827).abs() < 1e-9);
        assert!((loc.long - -87.6278).abs() < 1e-9);

        let err = parse_location(&serde_json::json!({ "lat": "north" }), "test").unwrap_err();
        assert_eq!(err.to_string(), "Parse error: Missing lat in Nominatim test response");
    }

    #[test]
    fn sanitizes_quotes_only() {
        assert_eq!(sanitize_query("Land's End, Cornwall"), "Lands End, Cornwall");
        assert_eq!(sanitize_query("10 Downing St"), "10 Downing St");
    }
}
