use chrono::NaiveDate;
use sqlx::PgPool;
use validator::Validate;

use crate::dto::story::{CreateStoryRequest, UpdateStoryRequest};
use crate::error::{Result, StorageError};
use crate::models::{Story, month_from_abbreviation};
use crate::repository::StoryRepository;

pub async fn list_stories(pool: &PgPool, include_drafts: bool) -> Result<Vec<Story>> {
    StoryRepository::new(pool).list(include_drafts).await
}

/// Published story addressed by its permalink parts, e.g. `2015`, `jan`,
/// `3`, `season-opener`.
pub async fn story_by_permalink(
    pool: &PgPool,
    year: i32,
    month: &str,
    day: u32,
    slug: &str,
) -> Result<Story> {
    let date = permalink_date(year, month, day).ok_or(StorageError::NotFound)?;

    StoryRepository::new(pool).find_published(date, slug).await
}

pub async fn create_story(pool: &PgPool, request: &CreateStoryRequest) -> Result<Story> {
    request.validate()?;

    let story = StoryRepository::new(pool).create(request).await?;
    tracing::info!("Created {} story '{}'", story.status, story.slug);

    Ok(story)
}

pub async fn update_story(pool: &PgPool, id: i32, request: &UpdateStoryRequest) -> Result<Story> {
    request.validate()?;

    let repo = StoryRepository::new(pool);
    let existing = repo.find_by_id(id).await?;

    repo.update(&request.apply_to(&existing)).await
}

pub async fn delete_story(pool: &PgPool, id: i32) -> Result<()> {
    StoryRepository::new(pool).delete(id).await
}

fn permalink_date(year: i32, month: &str, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month_from_abbreviation(month)?, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoryStatus;
    use crate::services::offline_pool;

    #[test]
    fn test_permalink_date() {
        assert_eq!(
            permalink_date(2015, "jan", 3),
            NaiveDate::from_ymd_opt(2015, 1, 3)
        );
        assert_eq!(permalink_date(2015, "feb", 30), None);
        assert_eq!(permalink_date(2015, "01", 3), None);
    }

    #[tokio::test]
    async fn test_unknown_month_is_not_found() {
        let pool = offline_pool();

        let result = story_by_permalink(&pool, 2015, "foo", 3, "opener").await;

        assert!(matches!(result, Err(StorageError::NotFound)));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_slug() {
        let pool = offline_pool();
        let req = CreateStoryRequest {
            headline: "Opener".to_string(),
            slug: Some("opener!".to_string()),
            status: StoryStatus::Published,
            body: String::new(),
        };

        let result = create_story(&pool, &req).await;

        assert!(matches!(result, Err(StorageError::Validation(_))));
    }
}
