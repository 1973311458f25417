//! Compile-time registry of provider endpoint configuration.
//!
//! Each provider is described by a TOML file under `services/`. The files
//! are embedded at compile time and exposed via [`all_services`] and
//! [`service_for`].

use geonorm_geocoder_models::Provider;
use serde::Deserialize;

/// A provider's configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Identifier matching the provider's selector (`"google"`, `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Provider-specific settings.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Google Maps Geocoding web service.
    Google(GoogleConfig),
    /// Nominatim / `OpenStreetMap`.
    Nominatim(NominatimConfig),
}

/// Google Maps endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    /// JSON geocoding endpoint
    /// (e.g., `"https://maps.googleapis.com/maps/api/geocode/json"`).
    pub base_url: String,
}

/// Nominatim endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimConfig {
    /// Service root; `search` and `reverse` are appended
    /// (e.g., `"https://nominatim.openstreetmap.org"`).
    pub base_url: String,
    /// `User-Agent` sent with every request, required by the public
    /// instance's usage policy.
    pub user_agent: String,
}

impl ServiceConfig {
    /// Returns the provider's base URL regardless of variant.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Google(GoogleConfig { base_url })
            | ProviderConfig::Nominatim(NominatimConfig { base_url, .. }) => base_url,
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("google", include_str!("../services/google.toml")),
    ("nominatim", include_str!("../services/nominatim.toml")),
];

/// Returns the configuration of every supported provider.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<ServiceConfig> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse geocoding service '{name}': {e}"))
        })
        .collect()
}

/// Returns the configuration for `provider`, if one is embedded.
#[must_use]
pub fn service_for(provider: Provider) -> Option<ServiceConfig> {
    all_services()
        .into_iter()
        .find(|svc| svc.id == provider.as_ref())
}

/// Returns the embedded Nominatim settings.
#[must_use]
pub fn nominatim_config() -> Option<NominatimConfig> {
    match service_for(Provider::Nominatim)?.provider {
        ProviderConfig::Nominatim(config) => Some(config),
        ProviderConfig::Google(_) => None,
    }
}

/// Returns the embedded Google Maps settings.
#[must_use]
pub fn google_config() -> Option<GoogleConfig> {
    match service_for(Provider::Google)?.provider {
        ProviderConfig::Google(config) => Some(config),
        ProviderConfig::Nominatim(_) => None,
    }
}
