use sqlx::PgPool;

use crate::error::{Result, StorageError};
use crate::models::{Location, NewLocation};

const LOCATION_COLUMNS: &str =
    "location_id, city, state, zip_code, address, description, latitude, longitude, created_at";

/// Writes used by the geocode-on-save flow.
#[async_trait::async_trait]
pub trait LocationStore: Send + Sync {
    async fn find(&self, id: i32) -> Result<Location>;

    async fn insert(&self, location: &NewLocation) -> Result<Location>;

    async fn update(&self, location: &Location) -> Result<Location>;
}

pub struct LocationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LocationRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all locations by city
    pub async fn list(&self) -> Result<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations ORDER BY city, location_id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(locations)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Location> {
        sqlx::query_as::<_, Location>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE location_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Locations whose geocoding never succeeded
    pub async fn list_missing_coordinates(&self) -> Result<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(&format!(
            r#"
            SELECT {LOCATION_COLUMNS}
            FROM locations
            WHERE latitude IS NULL OR longitude IS NULL
            ORDER BY city, location_id
            "#
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(locations)
    }

    /// Fails with a constraint violation while races still use the location
    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM locations WHERE location_id = $1")
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

#[async_trait::async_trait]
impl<'a> LocationStore for LocationRepository<'a> {
    async fn find(&self, id: i32) -> Result<Location> {
        self.find_by_id(id).await
    }

    async fn insert(&self, location: &NewLocation) -> Result<Location> {
        let location = sqlx::query_as::<_, Location>(&format!(
            r#"
            INSERT INTO locations (
                city, state, zip_code, address, description, latitude, longitude
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(&location.city)
        .bind(&location.state)
        .bind(location.zip_code)
        .bind(&location.address)
        .bind(&location.description)
        .bind(location.latitude)
        .bind(location.longitude)
        .fetch_one(self.pool)
        .await?;

        Ok(location)
    }

    async fn update(&self, location: &Location) -> Result<Location> {
        sqlx::query_as::<_, Location>(&format!(
            r#"
            UPDATE locations
            SET
                city = $2,
                state = $3,
                zip_code = $4,
                address = $5,
                description = $6,
                latitude = $7,
                longitude = $8
            WHERE location_id = $1
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(location.location_id)
        .bind(&location.city)
        .bind(&location.state)
        .bind(location.zip_code)
        .bind(&location.address)
        .bind(&location.description)
        .bind(location.latitude)
        .bind(location.longitude)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }
}
