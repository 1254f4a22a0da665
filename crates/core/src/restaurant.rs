//! The restaurant record handed to the discovery engine by the data source.
//!
//! Records are read-only to the engine. Derived values such as the distance
//! from the user are attached to copies via [`Restaurant::with_distance`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tablemate_geo::{BoundingBox, Coordinate};

/// A restaurant as supplied by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Stable unique identifier
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Food category, e.g. "치킨" or "카페"
    #[serde(default)]
    pub category: String,
    /// Street address
    #[serde(default)]
    pub address: String,
    /// Latitude in degrees; untrusted until checked against the national bounds
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude in degrees; untrusted until checked against the national bounds
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Average rating from 0 to 5
    #[serde(default)]
    pub rating: Option<f64>,
    /// Number of reviews
    #[serde(default)]
    pub review_count: u32,
    /// Number of recommendations
    #[serde(default)]
    pub recommend_count: u32,
    /// Free-form price bracket, e.g. "₩₩"
    #[serde(default)]
    pub price_range: Option<String>,
    /// When the record was created upstream
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Distance from the search origin in kilometers (derived, never supplied upstream)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl Restaurant {
    /// Minimal record with an id and a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            address: String::new(),
            latitude: None,
            longitude: None,
            rating: None,
            review_count: 0,
            recommend_count: 0,
            price_range: None,
            created_at: None,
            distance_km: None,
        }
    }

    /// Set the position.
    #[must_use]
    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the rating.
    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Copy of this record carrying a distance from the search origin.
    #[must_use]
    pub fn with_distance(&self, distance_km: Option<f64>) -> Self {
        Self {
            distance_km,
            ..self.clone()
        }
    }

    /// Position if both components are present and finite.
    pub fn raw_coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some(Coordinate::new(lat, lng)),
            _ => None,
        }
    }

    /// Position if it lies inside `bounds`; anything else counts as absent.
    pub fn coordinate(&self, bounds: &BoundingBox) -> Option<Coordinate> {
        self.raw_coordinate().filter(|c| bounds.contains(c))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_camel_case() {
        let value = json!({
            "id": 42,
            "name": "교촌치킨 역삼점",
            "category": "치킨",
            "address": "서울 강남구 역삼동",
            "latitude": 37.5006,
            "longitude": 127.0365,
            "rating": 4.3,
            "reviewCount": 120,
            "recommendCount": 33,
            "priceRange": "₩₩",
            "createdAt": "2024-03-01T09:00:00Z"
        });

        let r: Restaurant = serde_json::from_value(value).unwrap();
        assert_eq!(r.id, "42");
        assert_eq!(r.review_count, 120);
        assert_eq!(r.recommend_count, 33);
        assert_eq!(r.price_range.as_deref(), Some("₩₩"));
        assert!(r.created_at.is_some());
        assert!(r.distance_km.is_none());
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let r: Restaurant = serde_json::from_value(json!({"id": "a", "name": "이름없음"})).unwrap();
        assert!(r.raw_coordinate().is_none());
        assert_eq!(r.review_count, 0);
        assert_eq!(r.category, "");
    }

    #[test]
    fn test_sentinel_coordinate_is_absent() {
        let r = Restaurant::new("1", "sentinel").at(0.0, 0.0);
        assert!(r.raw_coordinate().is_some());
        assert!(r.coordinate(&BoundingBox::SOUTH_KOREA).is_none());
    }

    #[test]
    fn test_nan_coordinate_is_absent() {
        let r = Restaurant::new("1", "nan").at(f64::NAN, 127.0);
        assert!(r.raw_coordinate().is_none());
    }

    #[test]
    fn test_with_distance_copies() {
        let r = Restaurant::new("1", "맥도날드").at(37.5, 127.0);
        let d = r.with_distance(Some(1.25));
        assert_eq!(d.distance_km, Some(1.25));
        assert!(r.distance_km.is_none());
        assert_eq!(d.name, r.name);
    }

    #[test]
    fn test_distance_not_serialized_when_absent() {
        let r = Restaurant::new("1", "맥도날드");
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("distanceKm"));
        let json = serde_json::to_string(&r.with_distance(Some(0.5))).unwrap();
        assert!(json.contains("distanceKm"));
    }
}
