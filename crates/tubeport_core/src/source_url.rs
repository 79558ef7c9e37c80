use url::Url;

use crate::SubjectKind;

/// Canonical form used for subject identity checks: surrounding whitespace removed.
pub fn normalize_subject_url(raw: &str) -> String {
    raw.trim().to_string()
}

/// Playlist pages and watch pages carrying a `list` parameter are collections.
pub fn is_collection_url(raw: &str) -> bool {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(parsed) => {
            parsed.path().trim_end_matches('/').ends_with("/playlist")
                || parsed.query_pairs().any(|(key, value)| key == "list" && !value.is_empty())
        }
        Err(_) => trimmed.contains("playlist?") || trimmed.contains("&list="),
    }
}

pub fn subject_kind_for(raw: &str) -> SubjectKind {
    if is_collection_url(raw) {
        SubjectKind::Collection
    } else {
        SubjectKind::Single
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_url_is_single() {
        assert!(!is_collection_url("https://www.youtube.com/watch?v=abc"));
        assert_eq!(
            subject_kind_for("https://youtu.be/abc"),
            SubjectKind::Single
        );
    }

    #[test]
    fn playlist_shapes_are_collections() {
        assert!(is_collection_url("https://www.youtube.com/playlist?list=xyz"));
        assert!(is_collection_url(
            "https://www.youtube.com/watch?v=abc&list=xyz"
        ));
        assert!(is_collection_url("  www.youtube.com/playlist?list=xyz  "));
    }

    #[test]
    fn empty_list_parameter_is_not_a_collection() {
        assert!(!is_collection_url("https://www.youtube.com/watch?v=abc&list="));
    }
}
