use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::blank_to_none;
use super::upload::validate_file_type;
use crate::models::Season;

/// Request payload for creating a new season
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_year_order"))]
pub struct CreateSeasonRequest {
    #[validate(range(min = 1, message = "Opening year must be a positive year"))]
    pub opening_year: i16,

    #[validate(range(min = 1, message = "Closing year must be a positive year"))]
    pub closing_year: i16,

    #[validate(url)]
    pub results_link: Option<String>,

    #[validate(custom(function = "validate_file_type"))]
    pub results_upload: Option<String>,

    #[serde(default)]
    pub is_current_season: bool,
}

/// Request payload for updating an existing season
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSeasonRequest {
    #[validate(range(min = 1))]
    pub opening_year: Option<i16>,

    #[validate(range(min = 1))]
    pub closing_year: Option<i16>,

    #[validate(url)]
    pub results_link: Option<String>,

    #[validate(custom(function = "validate_file_type"))]
    pub results_upload: Option<String>,

    pub is_current_season: Option<bool>,
}

impl CreateSeasonRequest {
    pub fn slug(&self) -> String {
        Season::slug_for(self.opening_year, self.closing_year)
    }

    pub fn results_link(&self) -> Option<String> {
        blank_to_none(self.results_link.clone())
    }

    pub fn results_upload(&self) -> Option<String> {
        blank_to_none(self.results_upload.clone())
    }
}

impl UpdateSeasonRequest {
    /// Merges the request over `existing`, recomputing the slug from the
    /// resulting years.
    pub fn apply_to(&self, existing: &Season) -> Result<Season, ValidationErrors> {
        let mut season = existing.clone();

        if let Some(opening_year) = self.opening_year {
            season.opening_year = opening_year;
        }
        if let Some(closing_year) = self.closing_year {
            season.closing_year = closing_year;
        }
        if let Err(error) = check_years(season.opening_year, season.closing_year) {
            let mut errors = ValidationErrors::new();
            errors.add("closing_year", error);
            return Err(errors);
        }
        season.slug = Season::slug_for(season.opening_year, season.closing_year);

        if self.results_link.is_some() {
            season.results_link = blank_to_none(self.results_link.clone());
        }
        if self.results_upload.is_some() {
            season.results_upload = blank_to_none(self.results_upload.clone());
        }
        if let Some(is_current) = self.is_current_season {
            season.is_current_season = is_current;
        }

        Ok(season)
    }
}

fn validate_year_order(req: &CreateSeasonRequest) -> Result<(), ValidationError> {
    check_years(req.opening_year, req.closing_year)
}

fn check_years(opening_year: i16, closing_year: i16) -> Result<(), ValidationError> {
    if closing_year < opening_year {
        let mut error = ValidationError::new("closing_before_opening");
        error.message = Some("Closing year must be on or after opening year".into());
        return Err(error);
    }
    Ok(())
}
