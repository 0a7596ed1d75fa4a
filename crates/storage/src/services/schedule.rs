use chrono::NaiveDate;
use sqlx::PgPool;

use crate::dto::race::{RaceDetail, RaceSummary};
use crate::dto::schedule::{HomePage, SeasonSchedule};
use crate::error::Result;
use crate::models::Season;
use crate::repository::{
    LocationRepository, OrganizerRepository, RaceRepository, SeasonRepository,
};
use crate::services::race_windows::{RaceWindow, RaceWindows};

pub async fn current_season(pool: &PgPool) -> Result<Season> {
    SeasonRepository::new(pool).find_current().await
}

pub async fn list_seasons(pool: &PgPool) -> Result<Vec<Season>> {
    SeasonRepository::new(pool).list().await
}

/// Races of one window for a season, or for the current season when
/// `season_slug` is `None`.
pub async fn season_races(
    pool: &PgPool,
    season_slug: Option<&str>,
    window: RaceWindow,
    today: NaiveDate,
) -> Result<Vec<RaceSummary>> {
    let season = match season_slug {
        Some(slug) => SeasonRepository::new(pool).find_by_slug(slug).await?,
        None => current_season(pool).await?,
    };
    let races = RaceRepository::new(pool)
        .list_summaries_for_season(season.season_id)
        .await?;

    Ok(owned(RaceWindows::new(today).select(window, &races)))
}

/// A season's upcoming and past races, each newest first.
pub async fn season_schedule(pool: &PgPool, slug: &str, today: NaiveDate) -> Result<SeasonSchedule> {
    let season = SeasonRepository::new(pool).find_by_slug(slug).await?;
    let races = RaceRepository::new(pool)
        .list_summaries_for_season(season.season_id)
        .await?;

    let windows = RaceWindows::new(today);
    let upcoming = owned(windows.upcoming(&races));
    let past = owned(windows.past(&races));

    Ok(SeasonSchedule {
        season,
        today,
        upcoming,
        past,
    })
}

/// Weekend, rest-of-month and next-month races of the current season.
pub async fn home_page(pool: &PgPool, today: NaiveDate) -> Result<HomePage> {
    let season = current_season(pool).await?;
    let races = RaceRepository::new(pool)
        .list_summaries_for_season(season.season_id)
        .await?;

    let windows = RaceWindows::new(today);
    let (weekend_start, weekend_end) = windows.weekend();
    let classified = windows.classify(&races);

    tracing::debug!(
        "Home page for {}: {} weekend, {} this month, {} next month",
        today,
        classified.weekend.len(),
        classified.this_month.len(),
        classified.next_month.len()
    );

    Ok(HomePage {
        weekend_races: owned(classified.weekend),
        remaining_races_for_month: owned(classified.this_month),
        races_for_next_month: owned(classified.next_month),
        season,
        today,
        weekend_start,
        weekend_end,
    })
}

pub async fn race_detail(
    pool: &PgPool,
    season_slug: &str,
    race_id: i32,
    today: NaiveDate,
) -> Result<RaceDetail> {
    let race = RaceRepository::new(pool)
        .find_in_season(season_slug, race_id)
        .await?;
    let season = SeasonRepository::new(pool).find_by_id(race.season_id).await?;
    let location = LocationRepository::new(pool)
        .find_by_id(race.location_id)
        .await?;
    let organizer = OrganizerRepository::new(pool)
        .find_by_id(race.organizer_id)
        .await?;

    Ok(RaceDetail::new(race, season, location, organizer, today))
}

fn owned(races: Vec<&RaceSummary>) -> Vec<RaceSummary> {
    races.into_iter().cloned().collect()
}
