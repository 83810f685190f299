//! Raw geocoding results, before validation.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Photon search response (GeoJSON feature collection)
#[derive(Debug, Deserialize)]
pub struct PhotonResponse {
    #[serde(default)]
    pub features: Vec<PhotonFeature>,
}

#[derive(Debug, Deserialize)]
pub struct PhotonFeature {
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
}

/// A single geocoding result: free-text properties plus an optional
/// bounding extent `[min_lon, min_lat, max_lon, max_lat]`.
#[derive(Debug, Clone, Default)]
pub struct AddressCandidate {
    properties: HashMap<String, String>,
    extent: Option<Vec<f64>>,
}

impl AddressCandidate {
    pub fn new(extent: Option<Vec<f64>>) -> Self {
        Self {
            properties: HashMap::new(),
            extent,
        }
    }

    /// Set a property, returning the candidate for chaining
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    /// Get a property value. Empty strings count as absent.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Bounding extent, if the geocoder supplied one
    pub fn extent(&self) -> Option<&[f64]> {
        self.extent.as_deref()
    }
}

impl From<PhotonFeature> for AddressCandidate {
    fn from(feature: PhotonFeature) -> Self {
        let mut properties = HashMap::new();
        let mut extent = None;

        for (key, value) in feature.properties {
            match (key.as_str(), value) {
                ("extent", Value::Array(items)) => {
                    // Non-numeric items are dropped, which leaves the extent
                    // malformed (length != 4) rather than silently repaired.
                    extent = Some(items.iter().filter_map(Value::as_f64).collect());
                }
                (_, Value::String(s)) => {
                    properties.insert(key, s);
                }
                (_, Value::Number(n)) => {
                    properties.insert(key, n.to_string());
                }
                _ => {}
            }
        }

        Self { properties, extent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_conversion() {
        let body = serde_json::json!({
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-0.1585, 51.5237] },
                "properties": {
                    "osm_type": "W",
                    "osm_id": 12345678,
                    "housenumber": "221B",
                    "street": "Baker Street",
                    "city": "London",
                    "country": "United Kingdom",
                    "countrycode": "GB",
                    "extent": [-0.1586, 51.5238, -0.1585, 51.5237],
                    "type": "house"
                }
            }]
        });

        let response: PhotonResponse = serde_json::from_value(body).unwrap();
        let candidate = AddressCandidate::from(response.features.into_iter().next().unwrap());

        assert_eq!(candidate.field("osm_id"), Some("12345678"));
        assert_eq!(candidate.field("street"), Some("Baker Street"));
        assert_eq!(candidate.extent().map(|e| e.len()), Some(4));
        assert_eq!(candidate.field("extent"), None);
    }

    #[test]
    fn test_malformed_extent_is_kept_short() {
        let feature: PhotonFeature = serde_json::from_value(serde_json::json!({
            "properties": { "extent": [1.0, "x", 2.0, 3.0] }
        }))
        .unwrap();

        let candidate = AddressCandidate::from(feature);
        assert_eq!(candidate.extent(), Some(&[1.0, 2.0, 3.0][..]));
    }

    #[test]
    fn test_empty_field_is_absent() {
        let candidate = AddressCandidate::new(None).with("city", "");
        assert_eq!(candidate.field("city"), None);
    }

    #[test]
    fn test_missing_features_key() {
        let response: PhotonResponse = serde_json::from_str("{}").unwrap();
        assert!(response.features.is_empty());
    }
}
