pub mod location;
pub mod organizer;
pub mod race;
pub mod schedule;
pub mod season;
pub mod story;
pub mod upload;

/// Blank optional text is stored as NULL.
pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
