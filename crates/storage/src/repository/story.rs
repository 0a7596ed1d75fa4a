use chrono::NaiveDate;
use sqlx::PgPool;

use crate::dto::story::CreateStoryRequest;
use crate::error::{Result, StorageError};
use crate::models::{Story, StoryStatus};

const STORY_COLUMNS: &str = "story_id, headline, slug, status, status_changed, pub_date, body";

pub struct StoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoryRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Newest first. Drafts are only included when asked for.
    pub async fn list(&self, include_drafts: bool) -> Result<Vec<Story>> {
        let stories = sqlx::query_as::<_, Story>(&format!(
            r#"
            SELECT {STORY_COLUMNS}
            FROM stories
            WHERE $1 OR status = 'published'
            ORDER BY pub_date DESC, story_id DESC
            "#
        ))
        .bind(include_drafts)
        .fetch_all(self.pool)
        .await?;

        Ok(stories)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Story> {
        sqlx::query_as::<_, Story>(&format!(
            "SELECT {STORY_COLUMNS} FROM stories WHERE story_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Published story with `slug` on `date`
    pub async fn find_published(&self, date: NaiveDate, slug: &str) -> Result<Story> {
        let start = date.and_hms_opt(0, 0, 0).ok_or(StorageError::NotFound)?;
        let end = date
            .succ_opt()
            .and_then(|next| next.and_hms_opt(0, 0, 0))
            .ok_or(StorageError::NotFound)?;

        sqlx::query_as::<_, Story>(&format!(
            r#"
            SELECT {STORY_COLUMNS}
            FROM stories
            WHERE slug = $1
              AND pub_date >= $2
              AND pub_date < $3
              AND status = 'published'
            "#
        ))
        .bind(slug)
        .bind(start)
        .bind(end)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn create(&self, req: &CreateStoryRequest) -> Result<Story> {
        let story = sqlx::query_as::<_, Story>(&format!(
            r#"
            INSERT INTO stories (headline, slug, status, body)
            VALUES ($1, $2, $3, $4)
            RETURNING {STORY_COLUMNS}
            "#
        ))
        .bind(req.headline.trim())
        .bind(req.slug())
        .bind(req.status.as_str())
        .bind(&req.body)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from_write(e, "Slug already used this year"))?;

        Ok(story)
    }

    /// Writes `story` back. `status_changed` moves only when the status does.
    pub async fn update(&self, story: &Story) -> Result<Story> {
        let status = story
            .status
            .parse::<StoryStatus>()
            .map_err(StorageError::ConstraintViolation)?;

        sqlx::query_as::<_, Story>(&format!(
            r#"
            UPDATE stories
            SET
                headline = $2,
                slug = $3,
                status_changed = CASE WHEN status <> $4 THEN NOW() ELSE status_changed END,
                status = $4,
                body = $5
            WHERE story_id = $1
            RETURNING {STORY_COLUMNS}
            "#
        ))
        .bind(story.story_id)
        .bind(&story.headline)
        .bind(&story.slug)
        .bind(status.as_str())
        .bind(&story.body)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| StorageError::from_write(e, "Slug already used this year"))?
        .ok_or(StorageError::NotFound)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM stories WHERE story_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
