use sqlx::PgPool;

use crate::dto::organizer::CreateOrganizerRequest;
use crate::error::{Result, StorageError};
use crate::models::Organizer;

const ORGANIZER_COLUMNS: &str = "organizer_id, name, phone, email, website, created_at";

pub struct OrganizerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrganizerRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Organizer>> {
        let organizers = sqlx::query_as::<_, Organizer>(&format!(
            "SELECT {ORGANIZER_COLUMNS} FROM organizers ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(organizers)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Organizer> {
        sqlx::query_as::<_, Organizer>(&format!(
            "SELECT {ORGANIZER_COLUMNS} FROM organizers WHERE organizer_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn create(&self, req: &CreateOrganizerRequest) -> Result<Organizer> {
        let (name, phone, email, website) = req.normalized();

        let organizer = sqlx::query_as::<_, Organizer>(&format!(
            r#"
            INSERT INTO organizers (name, phone, email, website)
            VALUES ($1, $2, $3, $4)
            RETURNING {ORGANIZER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(phone)
        .bind(email)
        .bind(website)
        .fetch_one(self.pool)
        .await?;

        Ok(organizer)
    }

    pub async fn update(&self, organizer: &Organizer) -> Result<Organizer> {
        sqlx::query_as::<_, Organizer>(&format!(
            r#"
            UPDATE organizers
            SET name = $2, phone = $3, email = $4, website = $5
            WHERE organizer_id = $1
            RETURNING {ORGANIZER_COLUMNS}
            "#
        ))
        .bind(organizer.organizer_id)
        .bind(&organizer.name)
        .bind(&organizer.phone)
        .bind(&organizer.email)
        .bind(&organizer.website)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Fails with a constraint violation while races still reference the organizer
    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM organizers WHERE organizer_id = $1")
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
