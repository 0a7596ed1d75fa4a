use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::blank_to_none;
use super::upload::validate_file_type;
use crate::models::{HasResults, Location, Organizer, Race, Scheduled, Season};

/// Request payload for creating a new race
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRaceRequest {
    pub date: NaiveDate,

    pub season_id: i32,

    pub location_id: i32,

    pub organizer_id: i32,

    #[serde(default)]
    pub description: String,

    #[validate(url)]
    pub pre_registration_link: Option<String>,

    #[validate(custom(function = "validate_file_type"))]
    pub flyer_upload: Option<String>,

    #[validate(url)]
    pub results_link: Option<String>,

    #[validate(custom(function = "validate_file_type"))]
    pub results_upload: Option<String>,
}

/// Request payload for updating an existing race
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRaceRequest {
    pub date: Option<NaiveDate>,

    pub season_id: Option<i32>,

    pub location_id: Option<i32>,

    pub organizer_id: Option<i32>,

    pub description: Option<String>,

    #[validate(url)]
    pub pre_registration_link: Option<String>,

    #[validate(custom(function = "validate_file_type"))]
    pub flyer_upload: Option<String>,

    #[validate(url)]
    pub results_link: Option<String>,

    #[validate(custom(function = "validate_file_type"))]
    pub results_upload: Option<String>,
}

impl CreateRaceRequest {
    /// Copy of the request with blank optional fields cleared.
    pub fn normalized(&self) -> Self {
        Self {
            description: self.description.trim().to_string(),
            pre_registration_link: blank_to_none(self.pre_registration_link.clone()),
            flyer_upload: blank_to_none(self.flyer_upload.clone()),
            results_link: blank_to_none(self.results_link.clone()),
            results_upload: blank_to_none(self.results_upload.clone()),
            ..self.clone()
        }
    }
}

impl UpdateRaceRequest {
    pub fn apply_to(&self, existing: &Race) -> Race {
        let mut race = existing.clone();

        if let Some(date) = self.date {
            race.date = date;
        }
        if let Some(season_id) = self.season_id {
            race.season_id = season_id;
        }
        if let Some(location_id) = self.location_id {
            race.location_id = location_id;
        }
        if let Some(organizer_id) = self.organizer_id {
            race.organizer_id = organizer_id;
        }
        if let Some(description) = &self.description {
            race.description = description.trim().to_string();
        }
        if self.pre_registration_link.is_some() {
            race.pre_registration_link = blank_to_none(self.pre_registration_link.clone());
        }
        if self.flyer_upload.is_some() {
            race.flyer_upload = blank_to_none(self.flyer_upload.clone());
        }
        if self.results_link.is_some() {
            race.results_link = blank_to_none(self.results_link.clone());
        }
        if self.results_upload.is_some() {
            race.results_upload = blank_to_none(self.results_upload.clone());
        }

        race
    }
}

/// A race joined with the fields needed to list it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RaceSummary {
    pub race_id: i32,
    pub date: NaiveDate,
    pub season_id: i32,
    pub season_slug: String,
    pub description: String,
    pub pre_registration_link: Option<String>,
    pub flyer_upload: Option<String>,
    pub results_link: Option<String>,
    pub results_upload: Option<String>,
    pub location_id: i32,
    pub city: String,
    pub state: String,
    pub organizer_id: i32,
    pub organizer_name: String,
}

impl Scheduled for RaceSummary {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl HasResults for RaceSummary {
    fn results_link(&self) -> Option<&str> {
        self.results_link.as_deref()
    }

    fn results_upload(&self) -> Option<&str> {
        self.results_upload.as_deref()
    }
}

/// Everything shown on a race page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceDetail {
    pub label: String,
    pub has_expired: bool,
    pub has_results: bool,
    pub race: Race,
    pub season: Season,
    pub location: Location,
    pub organizer: Organizer,
}

impl RaceDetail {
    pub fn new(
        race: Race,
        season: Season,
        location: Location,
        organizer: Organizer,
        today: NaiveDate,
    ) -> Self {
        Self {
            label: race.label(&location),
            has_expired: race.has_expired(today),
            has_results: race.has_results(),
            race,
            season,
            location,
            organizer,
        }
    }
}
