//! Extension to content-type table.
//!
//! Deliberately small: `js` and `json` are special-cased, every other
//! extension is served as `text/<extension>`.

/// Extension of the final path segment, without the dot. Empty if none.
pub fn extension(path: &str) -> &str {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => "",
    }
}

/// Content type for `path`, derived from its extension only.
pub fn mime_type(path: &str) -> String {
    mime_for_extension(extension(path))
}

pub fn mime_for_extension(ext: &str) -> String {
    match ext {
        "js" => "text/javascript".to_string(),
        "json" => "application/json".to_string(),
        other => format!("text/{}", other),
    }
}
