use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Scheduled;

/// Named date buckets used to list races.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RaceWindow {
    Upcoming,
    Past,
    Weekend,
    ThisMonth,
    NextMonth,
}

impl RaceWindow {
    pub const ALL: [RaceWindow; 5] = [
        RaceWindow::Upcoming,
        RaceWindow::Past,
        RaceWindow::Weekend,
        RaceWindow::ThisMonth,
        RaceWindow::NextMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Past => "past",
            Self::Weekend => "weekend",
            Self::ThisMonth => "this-month",
            Self::NextMonth => "next-month",
        }
    }
}

impl fmt::Display for RaceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RaceWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|window| window.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown race window '{}', expected one of: upcoming, past, weekend, this-month, next-month",
                    s
                )
            })
    }
}

/// All five buckets computed against the same reference date.
#[derive(Debug, Serialize)]
pub struct ClassifiedRaces<'a, R> {
    pub upcoming: Vec<&'a R>,
    pub past: Vec<&'a R>,
    pub weekend: Vec<&'a R>,
    pub this_month: Vec<&'a R>,
    pub next_month: Vec<&'a R>,
}

/// Date windows anchored on one reference day.
///
/// The reference date is captured when the value is built, so every bucket
/// computed from the same `RaceWindows` agrees on what "today" is. Build a new
/// one per request rather than keeping one around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceWindows {
    today: NaiveDate,
    saturday: NaiveDate,
    sunday: NaiveDate,
}

impl RaceWindows {
    pub fn new(today: NaiveDate) -> Self {
        // Monday = 0, so Saturday is 5 days after the start of the week.
        let weekday = i64::from(today.weekday().num_days_from_monday());
        let saturday = today + Duration::days(5 - weekday);
        let sunday = today + Duration::days(6 - weekday);

        Self {
            today,
            saturday,
            sunday,
        }
    }

    /// Inclusive `(saturday, sunday)` bounds of the coming weekend.
    pub fn weekend(&self) -> (NaiveDate, NaiveDate) {
        (self.saturday, self.sunday)
    }

    pub fn in_weekend(&self, date: NaiveDate) -> bool {
        self.saturday <= date && date <= self.sunday
    }

    pub fn in_this_month(&self, date: NaiveDate) -> bool {
        date.year() == self.today.year() && date.month() == self.today.month()
    }

    pub fn in_next_month(&self, date: NaiveDate) -> bool {
        let (year, month) = if self.today.month() == 12 {
            (self.today.year() + 1, 1)
        } else {
            (self.today.year(), self.today.month() + 1)
        };
        date.year() == year && date.month() == month
    }

    pub fn upcoming<'a, R: Scheduled>(&self, races: &'a [R]) -> Vec<&'a R> {
        newest_first(races, |date| date >= self.today)
    }

    pub fn past<'a, R: Scheduled>(&self, races: &'a [R]) -> Vec<&'a R> {
        newest_first(races, |date| date < self.today)
    }

    pub fn this_weekend<'a, R: Scheduled>(&self, races: &'a [R]) -> Vec<&'a R> {
        newest_first(races, |date| self.in_weekend(date))
    }

    /// Races in the current month that are not already listed for the weekend.
    pub fn this_month_remaining<'a, R: Scheduled>(&self, races: &'a [R]) -> Vec<&'a R> {
        newest_first(races, |date| {
            self.in_this_month(date) && !self.in_weekend(date)
        })
    }

    /// Races in the following month that are not already listed for the weekend.
    pub fn next_month<'a, R: Scheduled>(&self, races: &'a [R]) -> Vec<&'a R> {
        newest_first(races, |date| {
            self.in_next_month(date) && !self.in_weekend(date)
        })
    }

    pub fn select<'a, R: Scheduled>(&self, window: RaceWindow, races: &'a [R]) -> Vec<&'a R> {
        match window {
            RaceWindow::Upcoming => self.upcoming(races),
            RaceWindow::Past => self.past(races),
            RaceWindow::Weekend => self.this_weekend(races),
            RaceWindow::ThisMonth => self.this_month_remaining(races),
            RaceWindow::NextMonth => self.next_month(races),
        }
    }

    pub fn classify<'a, R: Scheduled>(&self, races: &'a [R]) -> ClassifiedRaces<'a, R> {
        ClassifiedRaces {
            upcoming: self.upcoming(races),
            past: self.past(races),
            weekend: self.this_weekend(races),
            this_month: self.this_month_remaining(races),
            next_month: self.next_month(races),
        }
    }
}

fn newest_first<R: Scheduled>(races: &[R], keep: impl Fn(NaiveDate) -> bool) -> Vec<&R> {
    let mut matched: Vec<&R> = races.iter().filter(|race| keep(race.date())).collect();
    matched.sort_by(|a, b| b.date().cmp(&a.date()));
    matched
}
