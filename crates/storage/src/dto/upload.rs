use std::borrow::Cow;
use std::path::Path;

use validator::ValidationError;

pub const ACCEPTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "pdf"];

/// Accepts flyer and results uploads by file extension only.
pub fn validate_file_type(name: &str) -> Result<(), ValidationError> {
    let accepted = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext));

    if accepted {
        Ok(())
    } else {
        let mut error = ValidationError::new("unsupported_file_type");
        error.message = Some(Cow::Owned(format!(
            "{} is not an accepted file type",
            name
        )));
        Err(error)
    }
}
