use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::results::HasResults;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Season {
    pub season_id: i32,
    pub opening_year: i16,
    pub closing_year: i16,
    pub slug: String,
    pub results_link: Option<String>,
    pub results_upload: Option<String>,
    pub is_current_season: bool,
    pub created_at: chrono::NaiveDateTime,
}

impl Season {
    /// Slug used in season URLs, e.g. `2014-2015`.
    pub fn slug_for(opening_year: i16, closing_year: i16) -> String {
        format!("{}-{}", opening_year, closing_year)
    }

    /// Picks the current season among `seasons`: the flagged season with the
    /// latest closing year.
    pub fn current(seasons: &[Season]) -> Option<&Season> {
        seasons
            .iter()
            .filter(|s| s.is_current_season)
            .max_by_key(|s| (s.closing_year, s.season_id))
    }
}

impl HasResults for Season {
    fn results_link(&self) -> Option<&str> {
        self.results_link.as_deref()
    }

    fn results_upload(&self) -> Option<&str> {
        self.results_upload.as_deref()
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}",
            self.opening_year,
            self.closing_year.rem_euclid(100)
        )
    }
}
