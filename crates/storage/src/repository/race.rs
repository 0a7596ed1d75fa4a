use sqlx::PgPool;

use crate::dto::race::{CreateRaceRequest, RaceSummary};
use crate::error::{Result, StorageError};
use crate::models::Race;

const RACE_COLUMNS: &str = "race_id, date, season_id, location_id, organizer_id, description, \
     pre_registration_link, flyer_upload, results_link, results_upload, created_at";

const SUMMARY_SELECT: &str = r#"
    SELECT
        r.race_id,
        r.date,
        r.season_id,
        s.slug AS season_slug,
        r.description,
        r.pre_registration_link,
        r.flyer_upload,
        r.results_link,
        r.results_upload,
        l.location_id,
        l.city,
        l.state,
        o.organizer_id,
        o.name AS organizer_name
    FROM races r
    JOIN seasons s ON r.season_id = s.season_id
    JOIN locations l ON r.location_id = l.location_id
    JOIN organizers o ON r.organizer_id = o.organizer_id
"#;

/// Repository for Race database operations
pub struct RaceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RaceRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All races of a season with location and organizer names, latest first
    pub async fn list_summaries_for_season(&self, season_id: i32) -> Result<Vec<RaceSummary>> {
        let races = sqlx::query_as::<_, RaceSummary>(&format!(
            "{SUMMARY_SELECT} WHERE r.season_id = $1 ORDER BY r.date DESC, r.race_id DESC"
        ))
        .bind(season_id)
        .fetch_all(self.pool)
        .await?;

        Ok(races)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Race> {
        sqlx::query_as::<_, Race>(&format!(
            "SELECT {RACE_COLUMNS} FROM races WHERE race_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Get a race by ID, only if it belongs to the season with `season_slug`
    pub async fn find_in_season(&self, season_slug: &str, id: i32) -> Result<Race> {
        sqlx::query_as::<_, Race>(
            r#"
            SELECT r.race_id, r.date, r.season_id, r.location_id, r.organizer_id,
                   r.description, r.pre_registration_link, r.flyer_upload,
                   r.results_link, r.results_upload, r.created_at
            FROM races r
            JOIN seasons s ON r.season_id = s.season_id
            WHERE s.slug = $1 AND r.race_id = $2
            "#,
        )
        .bind(season_slug)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn create(&self, req: &CreateRaceRequest) -> Result<Race> {
        let req = req.normalized();

        let race = sqlx::query_as::<_, Race>(&format!(
            r#"
            INSERT INTO races (
                date, season_id, location_id, organizer_id, description,
                pre_registration_link, flyer_upload, results_link, results_upload
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {RACE_COLUMNS}
            "#
        ))
        .bind(req.date)
        .bind(req.season_id)
        .bind(req.location_id)
        .bind(req.organizer_id)
        .bind(&req.description)
        .bind(&req.pre_registration_link)
        .bind(&req.flyer_upload)
        .bind(&req.results_link)
        .bind(&req.results_upload)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from_write(e, "Race already exists"))?;

        Ok(race)
    }

    pub async fn update(&self, race: &Race) -> Result<Race> {
        sqlx::query_as::<_, Race>(&format!(
            r#"
            UPDATE races
            SET
                date = $2,
                season_id = $3,
                location_id = $4,
                organizer_id = $5,
                description = $6,
                pre_registration_link = $7,
                flyer_upload = $8,
                results_link = $9,
                results_upload = $10
            WHERE race_id = $1
            RETURNING {RACE_COLUMNS}
            "#
        ))
        .bind(race.race_id)
        .bind(race.date)
        .bind(race.season_id)
        .bind(race.location_id)
        .bind(race.organizer_id)
        .bind(&race.description)
        .bind(&race.pre_registration_link)
        .bind(&race.flyer_upload)
        .bind(&race.results_link)
        .bind(&race.results_upload)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| StorageError::from_write(e, "Race already exists"))?
        .ok_or(StorageError::NotFound)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM races WHERE race_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
