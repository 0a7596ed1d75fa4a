use serde::{Deserialize, Serialize};
use validator::Validate;

use super::blank_to_none;
use crate::models::{Location, NewLocation};

/// Request payload for creating a new race location
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "City must be between 1 and 100 characters"
    ))]
    pub city: String,

    #[validate(custom(function = "validate_state"))]
    #[serde(default = "default_state")]
    pub state: String,

    #[validate(range(min = 0, max = 99999, message = "Zip code is limited to 5 digits"))]
    pub zip_code: i32,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Address must be between 1 and 200 characters"
    ))]
    pub address: String,

    pub description: Option<String>,
}

/// Request payload for updating an existing location
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateLocationRequest {
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,

    #[validate(custom(function = "validate_state"))]
    pub state: Option<String>,

    #[validate(range(min = 0, max = 99999))]
    pub zip_code: Option<i32>,

    #[validate(length(min = 1, max = 200))]
    pub address: Option<String>,

    pub description: Option<String>,
}

impl From<&CreateLocationRequest> for NewLocation {
    fn from(req: &CreateLocationRequest) -> Self {
        Self {
            city: req.city.trim().to_string(),
            state: req.state.clone(),
            zip_code: req.zip_code,
            address: req.address.trim().to_string(),
            description: blank_to_none(req.description.clone()),
            latitude: None,
            longitude: None,
        }
    }
}

impl UpdateLocationRequest {
    /// Merges the request over `existing`. Coordinates are carried over as-is.
    pub fn apply_to(&self, existing: &Location) -> Location {
        let mut location = existing.clone();

        if let Some(city) = &self.city {
            location.city = city.trim().to_string();
        }
        if let Some(state) = &self.state {
            location.state = state.clone();
        }
        if let Some(zip_code) = self.zip_code {
            location.zip_code = zip_code;
        }
        if let Some(address) = &self.address {
            location.address = address.trim().to_string();
        }
        if self.description.is_some() {
            location.description = blank_to_none(self.description.clone());
        }

        location
    }
}

fn default_state() -> String {
    "NC".to_string()
}

fn validate_state(state: &str) -> Result<(), validator::ValidationError> {
    const STATE_CODES: &[&str] = &[
        "AL", "AK", "AS", "AZ", "AR", "AA", "AE", "AP", "CA", "CO", "CT", "DE", "DC", "FL", "GA",
        "GU", "HI", "ID", "IL", "IN", "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS",
        "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "MP", "OH", "OK", "OR", "PA",
        "PR", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VI", "VA", "WA", "WV", "WI", "WY",
    ];

    if STATE_CODES.contains(&state) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_state"))
    }
}
