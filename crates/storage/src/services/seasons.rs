use sqlx::PgPool;
use validator::Validate;

use crate::dto::season::{CreateSeasonRequest, UpdateSeasonRequest};
use crate::error::Result;
use crate::models::Season;
use crate::repository::SeasonRepository;

/// Validate and store a new season.
pub async fn create_season(pool: &PgPool, request: &CreateSeasonRequest) -> Result<Season> {
    request.validate()?;

    let season = SeasonRepository::new(pool).create(request).await?;
    tracing::info!("Created season {}", season.slug);

    Ok(season)
}

/// Apply `request` to an existing season. The slug follows the years.
pub async fn update_season(
    pool: &PgPool,
    id: i32,
    request: &UpdateSeasonRequest,
) -> Result<Season> {
    request.validate()?;

    let repo = SeasonRepository::new(pool);
    let existing = repo.find_by_id(id).await?;
    let season = request.apply_to(&existing)?;

    repo.update(&season).await
}

pub async fn set_current_season(pool: &PgPool, id: i32) -> Result<Season> {
    let season = SeasonRepository::new(pool).mark_current(id).await?;
    tracing::info!("Season {} is now the current season", season.slug);

    Ok(season)
}

/// Fails with a constraint violation while races still belong to the season.
pub async fn delete_season(pool: &PgPool, id: i32) -> Result<()> {
    SeasonRepository::new(pool).delete(id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::services::offline_pool;

    fn request() -> CreateSeasonRequest {
        CreateSeasonRequest {
            opening_year: 2014,
            closing_year: 2015,
            results_link: None,
            results_upload: None,
            is_current_season: false,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_unsupported_results_upload() {
        let pool = offline_pool();
        let mut req = request();
        req.results_upload = Some("standings.doc".to_string());

        let result = create_season(&pool, &req).await;

        match result {
            Err(StorageError::Validation(errors)) => {
                assert!(errors.field_errors().contains_key("results_upload"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_closing_before_opening() {
        let pool = offline_pool();
        let mut req = request();
        req.closing_year = 2013;

        let result = create_season(&pool, &req).await;

        assert!(matches!(result, Err(StorageError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_unsupported_results_upload() {
        let pool = offline_pool();
        let update = UpdateSeasonRequest {
            results_upload: Some("standings.xlsx".to_string()),
            ..Default::default()
        };

        let result = update_season(&pool, 1, &update).await;

        assert!(matches!(result, Err(StorageError::Validation(_))));
    }
}
