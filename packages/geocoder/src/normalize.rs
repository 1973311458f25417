//! Field normalization into the canonical [`GeocodeResult`] schema.
//!
//! Each provider names address parts differently (Google's
//! `administrative_area_level_1`, Nominatim's `state`, and so on). The
//! adapters translate provider vocabulary into [`CanonicalField`]s and
//! feed values into an [`AddressFields`] accumulator. Rules shared by both
//! providers, such as county suffix stripping and street joining, live
//! here and nowhere else.

use geonorm_geocoder_models::{GeoLocation, GeocodeResult};

const COUNTY_SUFFIX: &str = " County";

/// A field of the canonical address schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    /// Country.
    Nation,
    /// First-level administrative division.
    Province,
    /// Second-level administrative division.
    County,
    /// Locality.
    Town,
    /// Sublocality.
    Borough,
    /// House number, first half of `street`.
    HouseNumber,
    /// Road name, second half of `street`.
    Road,
    /// Postal code.
    Zip,
}

/// Maps a Google address component type tag to a canonical field.
///
/// Unrecognized tags (`political`, `neighborhood`, ...) return `None` and
/// are ignored by the caller.
#[must_use]
pub fn google_field_for_tag(tag: &str) -> Option<CanonicalField> {
    match tag {
        "country" => Some(CanonicalField::Nation),
        "administrative_area_level_1" => Some(CanonicalField::Province),
        "administrative_area_level_2" => Some(CanonicalField::County),
        "locality" => Some(CanonicalField::Town),
        "sublocality_level_1" => Some(CanonicalField::Borough),
        "street_number" => Some(CanonicalField::HouseNumber),
        "route" => Some(CanonicalField::Road),
        "postal_code" => Some(CanonicalField::Zip),
        _ => None,
    }
}

/// Removes every trailing `" County"` from a county name.
///
/// `"Loudoun County"` becomes `"Loudoun"`; names without the suffix pass
/// through unchanged. Stripping an already stripped name is a no-op.
#[must_use]
pub fn strip_county_suffix(county: &str) -> &str {
    let mut name = county;
    while let Some(stripped) = name.strip_suffix(COUNTY_SUFFIX) {
        name = stripped;
    }
    name
}

/// Space-joins a house number and road, trimming the ends so a missing
/// half leaves no stray whitespace.
#[must_use]
pub fn join_street(house_number: &str, road: &str) -> String {
    format!("{house_number} {road}").trim().to_string()
}

/// Accumulates canonical address values before a result is built.
///
/// Missing values stay empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFields {
    nation: String,
    province: String,
    county: String,
    town: String,
    borough: String,
    house_number: String,
    road: String,
    zip: String,
}

impl AddressFields {
    /// Stores `value` in `field`, replacing any earlier value.
    pub fn set(&mut self, field: CanonicalField, value: &str) {
        let slot = match field {
            CanonicalField::Nation => &mut self.nation,
            CanonicalField::Province => &mut self.province,
            CanonicalField::County => &mut self.county,
            CanonicalField::Town => &mut self.town,
            CanonicalField::Borough => &mut self.borough,
            CanonicalField::HouseNumber => &mut self.house_number,
            CanonicalField::Road => &mut self.road,
            CanonicalField::Zip => &mut self.zip,
        };
        value.clone_into(slot);
    }

    /// Builds address fields from a Nominatim `address` object.
    ///
    /// `town` takes precedence over `city`. Non-string values are treated
    /// as absent.
    #[must_use]
    pub fn from_nominatim(address: &serde_json::Map<String, serde_json::Value>) -> Self {
        let get = |key: &str| address.get(key).and_then(serde_json::Value::as_str);

        let mut fields = Self::default();
        let pairs = [
            (CanonicalField::Nation, get("country")),
            (CanonicalField::Province, get("state")),
            (CanonicalField::County, get("county")),
            (CanonicalField::Town, get("town").or_else(|| get("city"))),
            (CanonicalField::Borough, get("borough")),
            (CanonicalField::HouseNumber, get("house_number")),
            (CanonicalField::Road, get("road")),
            (CanonicalField::Zip, get("postcode")),
        ];
        for (field, value) in pairs {
            if let Some(value) = value {
                fields.set(field, value);
            }
        }
        fields
    }

    /// Finishes normalization, applying the shared county and street rules.
    #[must_use]
    pub fn into_result(
        self,
        location: GeoLocation,
        raw_response: serde_json::Value,
    ) -> GeocodeResult {
        GeocodeResult {
            county: strip_county_suffix(&self.county).to_string(),
            street: join_street(&self.house_number, &self.road),
            nation: self.nation,
            province: self.province,
            town: self.town,
            borough: self.borough,
            zip: self.zip,
            location,
            raw_response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_county_suffix() {
        assert_eq!(strip_county_suffix("Loudoun County"), "Loudoun");
        assert_eq!(strip_county_suffix("Loudoun"), "Loudoun");
        assert_eq!(
            strip_county_suffix(strip_county_suffix("Loudoun County")),
            "Loudoun"
        );
    }

    #[test]
    fn strips_repeated_county_suffix() {
        assert_eq!(strip_county_suffix("Foo County County"), "Foo");
        for name in ["Foo County County", "Loudoun County", "Loudoun", "County Cork"] {
            let once = strip_county_suffix(name);
            assert_eq!(strip_county_suffix(once), once, "{name}");
        }
    }

    #[test]
    fn county_suffix_only_at_end() {
        assert_eq!(strip_county_suffix("County Cork"), "County Cork");
        assert_eq!(strip_county_suffix("Orange Countyline"), "Orange Countyline");
        assert_eq!(strip_county_suffix(""), "");
    }

    #[test]
    fn joins_street_parts() {
        assert_eq!(
            join_street("1600", "Pennsylvania Avenue Northwest"),
            "1600 Pennsylvania Avenue Northwest"
        );
        assert_eq!(join_street("", "Main Street"), "Main Street");
        assert_eq!(join_street("12", ""), "12");
        assert_eq!(join_street("", ""), "");
    }

    #[test]
    fn maps_known_google_tags_only() {
        assert_eq!(
            google_field_for_tag("administrative_area_level_1"),
            Some(CanonicalField::Province)
        );
        assert_eq!(
            google_field_for_tag("postal_code"),
            Some(CanonicalField::Zip)
        );
        assert_eq!(google_field_for_tag("political"), None);
        assert_eq!(google_field_for_tag("administrative_area_level_3"), None);
    }

    #[test]
    fn nominatim_town_wins_over_city() {
        let address: serde_json::Map<String, serde_json::Value> = serde_json::from_value(
            serde_json::json!({ "town": "Leesburg", "city": "Ashburn" }),
        )
        .unwrap();
        let result = AddressFields::from_nominatim(&address)
            .into_result(GeoLocation::default(), serde_json::Value::Null);
        assert_eq!(result.town, "Leesburg");

        let address: serde_json::Map<String, serde_json::Value> =
            serde_json::from_value(serde_json::json!({ "city": "Washington" })).unwrap();
        let result = AddressFields::from_nominatim(&address)
            .into_result(GeoLocation::default(), serde_json::Value::Null);
        assert_eq!(result.town, "Washington");
    }

    #[test]
    fn nominatim_missing_fields_are_empty() {
        let address: serde_json::Map<String, serde_json::Value> =
            serde_json::from_value(serde_json::json!({ "country": "France" })).unwrap();
        let result = AddressFields::from_nominatim(&address)
            .into_result(GeoLocation::default(), serde_json::Value::Null);
        assert_eq!(result.nation, "France");
        assert_eq!(result.province, "");
        assert_eq!(result.county, "");
        assert_eq!(result.town, "");
        assert_eq!(result.borough, "");
        assert_eq!(result.street, "");
        assert_eq!(result.zip, "");
    }

    #[test]
    fn into_result_applies_shared_rules() {
        let mut fields = AddressFields::default();
        fields.set(CanonicalField::County, "Fairfax County");
        fields.set(CanonicalField::HouseNumber, "4000");
        fields.set(CanonicalField::Road, "Legato Road");
        let result = fields.into_result(GeoLocation::default(), serde_json::Value::Null);
        assert_eq!(result.county, "Fairfax");
        assert_eq!(result.street, "4000 Legato Road");
    }
}
