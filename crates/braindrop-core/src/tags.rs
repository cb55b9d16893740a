//! Tag input normalization.
//!
//! Tags are free-form labels. They are stored lowercased and trimmed, so
//! membership tests are case-insensitive by construction.

/// Normalize a single tag input.
///
/// - Trims whitespace
/// - Collapses internal whitespace runs to a single space
/// - Lowercases
///
/// Returns `None` when nothing is left.
///
/// # Examples
/// ```
/// use braindrop_core::normalize_tag;
/// assert_eq!(normalize_tag("  Work  "), Some("work".to_string()));
/// assert_eq!(normalize_tag("Side   Project"), Some("side project".to_string()));
/// assert_eq!(normalize_tag("   "), None);
/// ```
pub fn normalize_tag(input: &str) -> Option<String> {
    let words: Vec<&str> = input.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    Some(words.join(" ").to_lowercase())
}

/// Normalize a tag list: each entry via [`normalize_tag`], empties dropped,
/// duplicates removed keeping the first occurrence.
pub fn normalize_tags<I, S>(inputs: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for input in inputs {
        if let Some(tag) = normalize_tag(input.as_ref()) {
            if !out.contains(&tag) {
                out.push(tag);
            }
        }
    }
    out
}

/// Case-insensitive membership test against an already-normalized tag list.
pub fn has_tag(tags: &[String], wanted: &str) -> bool {
    match normalize_tag(wanted) {
        Some(wanted) => tags.iter().any(|t| t.to_lowercase() == wanted),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_plain() {
        assert_eq!(normalize_tag("errand"), Some("errand".to_string()));
    }

    #[test]
    fn normalize_case_and_whitespace() {
        assert_eq!(normalize_tag("  WORK \t"), Some("work".to_string()));
        assert_eq!(normalize_tag("Deep\n  Work"), Some("deep work".to_string()));
    }

    #[test]
    fn normalize_empty() {
        assert_eq!(normalize_tag(""), None);
        assert_eq!(normalize_tag(" \t\n "), None);
    }

    #[test]
    fn list_dedupes_preserving_first_seen() {
        let tags = normalize_tags(["Work", "idea", " work ", "", "IDEA", "errand"]);
        assert_eq!(tags, vec!["work", "idea", "errand"]);
    }

    #[test]
    fn membership_is_case_insensitive() {
        let tags = normalize_tags(["music", "side project"]);
        assert!(has_tag(&tags, "MUSIC"));
        assert!(has_tag(&tags, " Side  Project "));
        assert!(!has_tag(&tags, "mus"));
        assert!(!has_tag(&tags, ""));
    }
}
