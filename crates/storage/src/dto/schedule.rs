use chrono::NaiveDate;
use serde::Serialize;

use super::race::RaceSummary;
use crate::models::Season;

/// A season's races split around the reference date.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonSchedule {
    pub season: Season,
    pub today: NaiveDate,
    pub upcoming: Vec<RaceSummary>,
    pub past: Vec<RaceSummary>,
}

/// Races for the club front page.
#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub season: Season,
    pub today: NaiveDate,
    pub weekend_start: NaiveDate,
    pub weekend_end: NaiveDate,
    pub weekend_races: Vec<RaceSummary>,
    pub remaining_races_for_month: Vec<RaceSummary>,
    pub races_for_next_month: Vec<RaceSummary>,
}
