use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::location::Location;
use super::results::HasResults;

/// Anything held on a single calendar day.
pub trait Scheduled {
    fn date(&self) -> NaiveDate;

    /// Whether the day is strictly before `today`.
    fn has_expired(&self, today: NaiveDate) -> bool {
        self.date() < today
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Race {
    pub race_id: i32,
    pub date: NaiveDate,
    pub season_id: i32,
    pub location_id: i32,
    pub organizer_id: i32,
    pub description: String,
    pub pre_registration_link: Option<String>,
    pub flyer_upload: Option<String>,
    pub results_link: Option<String>,
    pub results_upload: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

impl Race {
    /// Human readable label, e.g. `2015 Jan 03, Raleigh`.
    pub fn label(&self, location: &Location) -> String {
        format!("{}, {}", self.date.format("%Y %b %d"), location.city)
    }
}

impl Scheduled for Race {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl HasResults for Race {
    fn results_link(&self) -> Option<&str> {
        self.results_link.as_deref()
    }

    fn results_upload(&self) -> Option<&str> {
        self.results_upload.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn race(on: NaiveDate) -> Race {
        Race {
            race_id: 1,
            date: on,
            season_id: 1,
            location_id: 1,
            organizer_id: 1,
            description: String::new(),
            pre_registration_link: None,
            flyer_upload: None,
            results_link: None,
            results_upload: None,
            created_at: on.and_hms_opt(0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_has_expired() {
        let today = date(2015, 1, 10);
        assert!(race(date(2015, 1, 9)).has_expired(today));
        assert!(!race(date(2015, 1, 10)).has_expired(today));
        assert!(!race(date(2015, 1, 11)).has_expired(today));
    }

    #[test]
    fn test_results_appear_once_set() {
        let mut r = race(date(2015, 1, 3));
        assert!(!r.has_results());

        r.results_upload = Some("results.pdf".to_string());
        assert!(r.has_results());

        r.results_upload = None;
        r.results_link = Some("https://example.com/results".to_string());
        assert!(r.has_results());
    }

    #[test]
    fn test_label() {
        let location = Location {
            location_id: 1,
            city: "Raleigh".to_string(),
            state: "NC".to_string(),
            zip_code: 27601,
            address: "151 Piedmont Ave".to_string(),
            description: None,
            latitude: None,
            longitude: None,
            created_at: date(2014, 12, 1).and_hms_opt(0, 0, 0).unwrap(),
        };
        assert_eq!(race(date(2015, 1, 3)).label(&location), "2015 Jan 03, Raleigh");
    }
}
