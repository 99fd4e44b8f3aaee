//! Filename validation and normalization.
//!
//! Every path the service constructs starts from a name that passed
//! [`sanitize_filename`], which is the single chokepoint for the traversal
//! and collision classes of bugs.

use crate::error::AppError;

/// Maximum accepted filename length in bytes.
pub const MAX_FILENAME_LEN: usize = 255;

/// Normalize and validate a client-supplied file name.
///
/// Spaces are normalized to underscores; everything else must already be a
/// plain name: no path separators, no `..` sequences, no leading dot, no
/// control characters, and only `[A-Za-z0-9._-]` after normalization.
///
/// Idempotent: `sanitize_filename(sanitize_filename(x)) == sanitize_filename(x)`
/// for every accepted `x`.
pub fn sanitize_filename(name: &str) -> Result<String, AppError> {
    if name.is_empty() {
        return Err(AppError::InvalidName("name is empty".to_string()));
    }

    if name.len() > MAX_FILENAME_LEN {
        return Err(AppError::InvalidName(format!(
            "name exceeds {} bytes",
            MAX_FILENAME_LEN
        )));
    }

    let normalized = name.replace(' ', "_");

    if normalized.contains('/') || normalized.contains('\\') {
        return Err(AppError::InvalidName(
            "name must not contain path separators".to_string(),
        ));
    }

    if normalized.contains("..") {
        return Err(AppError::InvalidName(
            "name must not contain traversal sequences".to_string(),
        ));
    }

    if normalized.starts_with('.') {
        return Err(AppError::InvalidName(
            "name must not start with a dot".to_string(),
        ));
    }

    if let Some(bad) = normalized
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(AppError::InvalidName(format!(
            "disallowed character {:?}",
            bad
        )));
    }

    Ok(normalized)
}
