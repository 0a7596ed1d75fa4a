use serde::{Deserialize, Serialize};
use validator::Validate;

use super::blank_to_none;
use crate::models::Organizer;

/// Request payload for creating a new organizer
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrganizerRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Name must be between 1 and 200 characters"
    ))]
    pub name: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(url)]
    pub website: Option<String>,
}

/// Request payload for updating an existing organizer
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateOrganizerRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(url)]
    pub website: Option<String>,
}

impl CreateOrganizerRequest {
    /// Returns `(name, phone, email, website)` ready for storage.
    pub fn normalized(
        &self,
    ) -> (
        String,
        Option<String>,
        Option<String>,
        Option<String>,
    ) {
        (
            self.name.trim().to_string(),
            blank_to_none(self.phone.clone()),
            blank_to_none(self.email.clone()),
            blank_to_none(self.website.clone()),
        )
    }
}

impl UpdateOrganizerRequest {
    pub fn apply_to(&self, existing: &Organizer) -> Organizer {
        let mut organizer = existing.clone();

        if let Some(name) = &self.name {
            organizer.name = name.trim().to_string();
        }
        if self.phone.is_some() {
            organizer.phone = blank_to_none(self.phone.clone());
        }
        if self.email.is_some() {
            organizer.email = blank_to_none(self.email.clone());
        }
        if self.website.is_some() {
            organizer.website = blank_to_none(self.website.clone());
        }

        organizer
    }
}

/// Phone numbers are stored as `XXX-XXX-XXXX`.
fn validate_phone(phone: &str) -> Result<(), validator::ValidationError> {
    let groups: Vec<&str> = phone.split('-').collect();
    let is_valid = groups.len() == 3
        && groups
            .iter()
            .zip([3, 3, 4])
            .all(|(group, len)| group.len() == len && group.chars().all(|c| c.is_ascii_digit()));

    if is_valid || phone.is_empty() {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_phone"))
    }
}
