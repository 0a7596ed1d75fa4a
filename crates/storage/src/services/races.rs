use sqlx::PgPool;
use validator::Validate;

use crate::dto::race::{CreateRaceRequest, UpdateRaceRequest};
use crate::error::Result;
use crate::models::Race;
use crate::repository::RaceRepository;

/// Validate and store a new race. Flyer and results uploads must be images or
/// PDFs.
pub async fn create_race(pool: &PgPool, request: &CreateRaceRequest) -> Result<Race> {
    request.validate()?;

    RaceRepository::new(pool).create(request).await
}

pub async fn update_race(pool: &PgPool, id: i32, request: &UpdateRaceRequest) -> Result<Race> {
    request.validate()?;

    let repo = RaceRepository::new(pool);
    let existing = repo.find_by_id(id).await?;

    repo.update(&request.apply_to(&existing)).await
}

pub async fn delete_race(pool: &PgPool, id: i32) -> Result<()> {
    RaceRepository::new(pool).delete(id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::services::offline_pool;
    use chrono::NaiveDate;

    fn request() -> CreateRaceRequest {
        CreateRaceRequest {
            date: NaiveDate::from_ymd_opt(2015, 1, 3).unwrap(),
            season_id: 1,
            location_id: 1,
            organizer_id: 1,
            description: String::new(),
            pre_registration_link: None,
            flyer_upload: None,
            results_link: None,
            results_upload: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_doc_flyer() {
        let pool = offline_pool();
        let mut req = request();
        req.flyer_upload = Some("flyer.doc".to_string());

        let result = create_race(&pool, &req).await;

        match result {
            Err(StorageError::Validation(errors)) => {
                let flyer = &errors.field_errors()["flyer_upload"];
                assert_eq!(flyer[0].code, "unsupported_file_type");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_rejects_doc_flyer() {
        let pool = offline_pool();
        let update = UpdateRaceRequest {
            flyer_upload: Some("flyer.doc".to_string()),
            ..Default::default()
        };

        let result = update_race(&pool, 1, &update).await;

        assert!(matches!(result, Err(StorageError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_registration_link() {
        let pool = offline_pool();
        let mut req = request();
        req.pre_registration_link = Some("register at the track".to_string());

        let result = create_race(&pool, &req).await;

        assert!(matches!(result, Err(StorageError::Validation(_))));
    }
}
