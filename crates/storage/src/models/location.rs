use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub location_id: i32,
    pub city: String,
    pub state: String,
    pub zip_code: i32,
    pub address: String,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: chrono::NaiveDateTime,
}

/// A location that has not been written to the database yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
    pub city: String,
    pub state: String,
    pub zip_code: i32,
    pub address: String,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A postal address that can be resolved to coordinates.
pub trait Geocodable {
    fn address(&self) -> &str;

    fn zip_code(&self) -> i32;

    fn coordinates(&self) -> Option<Coordinates>;

    fn set_coordinates(&mut self, coordinates: Coordinates);

    fn has_coordinates(&self) -> bool {
        self.coordinates().is_some()
    }

    /// Free-text query sent to the geocoding service.
    fn geocode_query(&self) -> String {
        format!("{} {:05}", self.address().trim(), self.zip_code())
    }
}

fn pair(latitude: Option<f64>, longitude: Option<f64>) -> Option<Coordinates> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    }
}

impl Geocodable for Location {
    fn address(&self) -> &str {
        &self.address
    }

    fn zip_code(&self) -> i32 {
        self.zip_code
    }

    fn coordinates(&self) -> Option<Coordinates> {
        pair(self.latitude, self.longitude)
    }

    fn set_coordinates(&mut self, coordinates: Coordinates) {
        self.latitude = Some(coordinates.latitude);
        self.longitude = Some(coordinates.longitude);
    }
}

impl Geocodable for NewLocation {
    fn address(&self) -> &str {
        &self.address
    }

    fn zip_code(&self) -> i32 {
        self.zip_code
    }

    fn coordinates(&self) -> Option<Coordinates> {
        pair(self.latitude, self.longitude)
    }

    fn set_coordinates(&mut self, coordinates: Coordinates) {
        self.latitude = Some(coordinates.latitude);
        self.longitude = Some(coordinates.longitude);
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_location() -> NewLocation {
        NewLocation {
            city: "Nowhere".to_string(),
            state: "NC".to_string(),
            zip_code: 45321,
            address: "111 Main Street".to_string(),
            description: None,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_geocode_query() {
        assert_eq!(new_location().geocode_query(), "111 Main Street 45321");
    }

    #[test]
    fn test_geocode_query_keeps_leading_zeros() {
        let mut location = new_location();
        location.zip_code = 2134;
        assert_eq!(location.geocode_query(), "111 Main Street 02134");
    }

    #[test]
    fn test_has_coordinates_requires_both() {
        let mut location = new_location();
        assert!(!location.has_coordinates());

        location.latitude = Some(35.2);
        assert!(!location.has_coordinates());

        location.longitude = Some(-80.8);
        assert!(location.has_coordinates());
    }

    #[test]
    fn test_set_coordinates() {
        let mut location = new_location();
        location.set_coordinates(Coordinates {
            latitude: 35.99,
            longitude: -78.9,
        });
        assert_eq!(location.latitude, Some(35.99));
        assert_eq!(location.longitude, Some(-78.9));
    }
}
