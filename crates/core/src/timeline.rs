//! Timeline header rules: title validation and list search.

use crate::error::CoreError;

/// Matches the `VARCHAR(255)` title column.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Title and description given to a timeline started from the editor.
pub const DEFAULT_TITLE: &str = "New timeline";
pub const DEFAULT_DESCRIPTION: &str = "Describe this timeline here";

/// Validate a timeline title: non-blank and at most [`MAX_TITLE_LENGTH`]
/// characters.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Timeline title must not be blank".to_string(),
        ));
    }
    let length = title.chars().count();
    if length > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Timeline title is {length} characters, exceeding the maximum of {MAX_TITLE_LENGTH}"
        )));
    }
    Ok(())
}

/// Case-insensitive substring match used by the timeline list search box.
///
/// A blank search term matches everything.
pub fn matches_search(title: &str, term: &str) -> bool {
    let term = term.trim();
    term.is_empty() || title.to_lowercase().contains(&term.to_lowercase())
}
