use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Line that ends the excerpt of a story body.
pub const SPLIT_MARKER: &str = "<!-- split -->";

/// Paragraphs used as the excerpt when the body has no split marker.
pub const DEFAULT_EXCERPT_PARAGRAPHS: usize = 2;

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryStatus {
    #[default]
    Draft,
    Published,
}

impl StoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            other => Err(format!("unknown story status '{}'", other)),
        }
    }
}

/// A news story. The body is Markdown.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Story {
    pub story_id: i32,
    pub headline: String,
    pub slug: String,
    pub status: String,
    pub status_changed: NaiveDateTime,
    pub pub_date: NaiveDateTime,
    pub body: String,
}

impl Story {
    pub fn is_published(&self) -> bool {
        self.status == StoryStatus::Published.as_str()
    }

    /// Body up to the split marker, or the first paragraphs when there is
    /// no marker.
    pub fn excerpt(&self) -> String {
        excerpt_of(&self.body)
    }

    pub fn content(&self) -> &str {
        &self.body
    }

    /// Whether the body continues past its excerpt.
    pub fn has_more(&self) -> bool {
        self.excerpt().trim() != self.body.trim()
    }

    /// `/news/2015/jan/03/slug/`
    pub fn permalink(&self) -> String {
        let month = self.pub_date.month0() as usize;
        format!(
            "/news/{}/{}/{:02}/{}/",
            self.pub_date.year(),
            MONTH_ABBREVIATIONS[month],
            self.pub_date.day(),
            self.slug
        )
    }
}

impl fmt::Display for Story {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.headline)
    }
}

/// Month number (1-12) for a permalink month such as `jan`.
pub fn month_from_abbreviation(abbreviation: &str) -> Option<u32> {
    MONTH_ABBREVIATIONS
        .iter()
        .position(|m| *m == abbreviation)
        .map(|index| index as u32 + 1)
}

fn excerpt_of(body: &str) -> String {
    let mut excerpt = Vec::new();
    let mut default_excerpt = Vec::new();
    let mut paragraphs_seen = 0;

    for line in body.lines() {
        if line.trim().is_empty() {
            paragraphs_seen += 1;
        }
        if paragraphs_seen < DEFAULT_EXCERPT_PARAGRAPHS {
            default_excerpt.push(line);
        }
        if line.trim() == SPLIT_MARKER {
            return excerpt.join("\n");
        }
        excerpt.push(line);
    }

    default_excerpt.join("\n")
}
