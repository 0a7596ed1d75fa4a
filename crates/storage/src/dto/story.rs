use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{Story, StoryStatus};

const SLUG_MAX_LENGTH: usize = 50;

/// Request payload for creating a new story
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateStoryRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Headline must be between 1 and 200 characters"
    ))]
    pub headline: String,

    /// Derived from the headline when omitted
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,

    #[serde(default)]
    pub status: StoryStatus,

    #[serde(default)]
    pub body: String,
}

/// Request payload for updating an existing story
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateStoryRequest {
    #[validate(length(min = 1, max = 200))]
    pub headline: Option<String>,

    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,

    pub status: Option<StoryStatus>,

    pub body: Option<String>,
}

impl CreateStoryRequest {
    pub fn slug(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => slugify(&self.headline),
        }
    }
}

impl UpdateStoryRequest {
    pub fn apply_to(&self, existing: &Story) -> Story {
        let mut story = existing.clone();

        if let Some(headline) = &self.headline {
            story.headline = headline.trim().to_string();
        }
        if let Some(slug) = &self.slug {
            story.slug = slug.trim().to_string();
        }
        if let Some(status) = self.status {
            story.status = status.as_str().to_string();
        }
        if let Some(body) = &self.body {
            story.body = body.clone();
        }

        story
    }
}

/// Lowercase ASCII slug: runs of spaces and hyphens become one hyphen, other
/// punctuation is dropped.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_hyphen = false;

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }

    slug.truncate(SLUG_MAX_LENGTH);
    slug.trim_end_matches('-').to_string()
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let slug = slug.trim();
    let is_valid = slug.len() <= SLUG_MAX_LENGTH
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if is_valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_slug"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateStoryRequest {
        CreateStoryRequest {
            headline: "Season Opener: Moved to Jan. 10!".to_string(),
            slug: None,
            status: StoryStatus::Draft,
            body: String::new(),
        }
    }

    #[test]
    fn test_slug_from_headline() {
        assert_eq!(request().slug(), "season-opener-moved-to-jan-10");
    }

    #[test]
    fn test_explicit_slug_wins() {
        let mut req = request();
        req.slug = Some("opener".to_string());
        assert_eq!(req.slug(), "opener");

        req.slug = Some("  ".to_string());
        assert_eq!(req.slug(), "season-opener-moved-to-jan-10");
    }

    #[test]
    fn test_slugify_limits_length() {
        let slug = slugify(&"word ".repeat(20));
        assert!(slug.len() <= 50);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_invalid_slug_rejected() {
        let mut req = request();
        req.slug = Some("not a slug".to_string());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_headline_rejected() {
        let mut req = request();
        req.headline = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_status_defaults_to_draft() {
        let req: CreateStoryRequest = serde_json::from_str(r#"{"headline": "Hi"}"#).unwrap();
        assert_eq!(req.status, StoryStatus::Draft);
        assert_eq!(req.slug(), "hi");
    }
}
