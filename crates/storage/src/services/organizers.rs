use sqlx::PgPool;
use validator::Validate;

use crate::dto::organizer::{CreateOrganizerRequest, UpdateOrganizerRequest};
use crate::error::Result;
use crate::models::Organizer;
use crate::repository::OrganizerRepository;

pub async fn create_organizer(
    pool: &PgPool,
    request: &CreateOrganizerRequest,
) -> Result<Organizer> {
    request.validate()?;

    OrganizerRepository::new(pool).create(request).await
}

pub async fn update_organizer(
    pool: &PgPool,
    id: i32,
    request: &UpdateOrganizerRequest,
) -> Result<Organizer> {
    request.validate()?;

    let repo = OrganizerRepository::new(pool);
    let existing = repo.find_by_id(id).await?;

    repo.update(&request.apply_to(&existing)).await
}

/// Fails with a constraint violation while races still reference the organizer.
pub async fn delete_organizer(pool: &PgPool, id: i32) -> Result<()> {
    OrganizerRepository::new(pool).delete(id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::services::offline_pool;

    #[tokio::test]
    async fn test_create_rejects_malformed_phone() {
        let pool = offline_pool();
        let req = CreateOrganizerRequest {
            name: "Triangle Cycling".to_string(),
            phone: Some("9195550100".to_string()),
            email: None,
            website: None,
        };

        let result = create_organizer(&pool, &req).await;

        assert!(matches!(result, Err(StorageError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_bad_email() {
        let pool = offline_pool();
        let update = UpdateOrganizerRequest {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };

        let result = update_organizer(&pool, 1, &update).await;

        assert!(matches!(result, Err(StorageError::Validation(_))));
    }
}
