//! Filename handling for stored uploads.

use uuid::Uuid;

/// Reduces a client-supplied filename to a safe, flat ASCII name.
///
/// Path separators become spaces before the last component is taken, runs of
/// whitespace become a single `_`, anything outside `[A-Za-z0-9._-]` is dropped
/// and leading or trailing dots and underscores are trimmed. May return an
/// empty string.
pub fn secure_filename(filename: &str) -> String {
    let flattened = filename.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Builds a collision-resistant storage name: `<uuid-v4>_<sanitized name>`.
pub fn unique_upload_name(filename: &str) -> String {
    let id = Uuid::new_v4();
    match secure_filename(filename) {
        name if name.is_empty() => id.to_string(),
        name => format!("{id}_{name}"),
    }
}
