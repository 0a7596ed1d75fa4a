use sqlx::{PgPool, Postgres, Transaction};

use crate::dto::season::CreateSeasonRequest;
use crate::error::{Result, StorageError};
use crate::models::Season;

const SEASON_COLUMNS: &str = "season_id, opening_year, closing_year, slug, results_link, \
     results_upload, is_current_season, created_at";

/// Repository for Season database operations
pub struct SeasonRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SeasonRepository<'a> {
    /// Create a new SeasonRepository
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all seasons, latest first
    pub async fn list(&self) -> Result<Vec<Season>> {
        let seasons = sqlx::query_as::<_, Season>(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons ORDER BY closing_year DESC, opening_year DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(seasons)
    }

    /// Get a season by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Season> {
        sqlx::query_as::<_, Season>(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons WHERE season_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Get a season by slug
    pub async fn find_by_slug(&self, slug: &str) -> Result<Season> {
        sqlx::query_as::<_, Season>(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Get the current season. When several seasons are flagged the one with
    /// the latest closing year wins.
    pub async fn find_current(&self) -> Result<Season> {
        let flagged = sqlx::query_as::<_, Season>(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons WHERE is_current_season = true"
        ))
        .fetch_all(self.pool)
        .await?;

        Season::current(&flagged)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    /// Create a new season. A season created as current takes the flag from
    /// every other season.
    pub async fn create(&self, req: &CreateSeasonRequest) -> Result<Season> {
        let mut tx = self.pool.begin().await?;

        let season = sqlx::query_as::<_, Season>(&format!(
            r#"
            INSERT INTO seasons (
                opening_year, closing_year, slug, results_link, results_upload,
                is_current_season
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SEASON_COLUMNS}
            "#
        ))
        .bind(req.opening_year)
        .bind(req.closing_year)
        .bind(req.slug())
        .bind(req.results_link())
        .bind(req.results_upload())
        .bind(req.is_current_season)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StorageError::from_write(e, "Slug already exists"))?;

        if season.is_current_season {
            clear_current_except(&mut tx, season.season_id).await?;
        }

        tx.commit().await?;

        Ok(season)
    }

    /// Write every mutable column of `season` back to its row
    pub async fn update(&self, season: &Season) -> Result<Season> {
        let mut tx = self.pool.begin().await?;

        let season = sqlx::query_as::<_, Season>(&format!(
            r#"
            UPDATE seasons
            SET
                opening_year = $2,
                closing_year = $3,
                slug = $4,
                results_link = $5,
                results_upload = $6,
                is_current_season = $7
            WHERE season_id = $1
            RETURNING {SEASON_COLUMNS}
            "#
        ))
        .bind(season.season_id)
        .bind(season.opening_year)
        .bind(season.closing_year)
        .bind(&season.slug)
        .bind(&season.results_link)
        .bind(&season.results_upload)
        .bind(season.is_current_season)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| StorageError::from_write(e, "Slug already exists"))?
        .ok_or(StorageError::NotFound)?;

        if season.is_current_season {
            clear_current_except(&mut tx, season.season_id).await?;
        }

        tx.commit().await?;

        Ok(season)
    }

    /// Flag `id` as the current season and clear the flag everywhere else
    pub async fn mark_current(&self, id: i32) -> Result<Season> {
        let mut tx = self.pool.begin().await?;

        let season = sqlx::query_as::<_, Season>(&format!(
            r#"
            UPDATE seasons
            SET is_current_season = true
            WHERE season_id = $1
            RETURNING {SEASON_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        clear_current_except(&mut tx, id).await?;

        tx.commit().await?;

        Ok(season)
    }

    /// Delete a season by ID
    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM seasons WHERE season_id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(StorageError::from_delete)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

async fn clear_current_except(tx: &mut Transaction<'_, Postgres>, id: i32) -> Result<()> {
    sqlx::query(
        "UPDATE seasons SET is_current_season = false WHERE season_id <> $1 AND is_current_season",
    )
    .bind(id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
