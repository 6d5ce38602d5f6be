//! Local-to-remote path mapping
//!
//! [`normalize`] turns a vault-relative document path into the path it is
//! stored under on the remote. It is pure, never fails, and is idempotent:
//! feeding its output back in with the same policy and directory returns the
//! same string.

use crate::config::{FORBIDDEN_CHARACTERS, PathMappingPolicy, REQUIRED_EXTENSION};

/// Map a local document path to its remote storage path.
///
/// Steps, in order:
/// 1. split on `/`, dropping empty segments (leading, trailing and repeated
///    separators) and `.` / `..`
/// 2. remove [`FORBIDDEN_CHARACTERS`] from each segment
/// 3. trim each segment and replace whitespace runs (including the
///    ideographic space) with a single `-`
/// 4. keep only the file name unless `policy.keep_file_structure`
/// 5. append [`REQUIRED_EXTENSION`] unless already present
/// 6. prefix with `explicit_directory` if given, else
///    `policy.default_directory`, unless the path already lies under it
///
/// Returns an empty string when nothing publishable remains; callers must
/// reject that before talking to the remote.
pub fn normalize(
    raw_path: &str,
    policy: &PathMappingPolicy,
    explicit_directory: Option<&str>,
) -> String {
    let mut segments = clean_segments(raw_path);

    if !policy.keep_file_structure && segments.len() > 1 {
        segments.drain(..segments.len() - 1);
    }

    let Some(file_name) = segments.last_mut() else {
        return String::new();
    };
    if !has_required_extension(file_name) {
        file_name.push_str(REQUIRED_EXTENSION);
    }

    let directory = explicit_directory.unwrap_or(policy.default_directory.as_str());
    let prefix = clean_segments(directory);
    if !prefix.is_empty() && !segments.starts_with(&prefix) {
        segments.splice(0..0, prefix);
    }

    segments.join("/")
}

/// Normalize a directory path with the segment rules only (no extension).
pub fn normalize_directory(raw: &str) -> String {
    clean_segments(raw).join("/")
}

/// Final path segment of a slash-separated path.
pub fn file_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}

fn has_required_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(REQUIRED_EXTENSION)
}

fn clean_segments(raw: &str) -> Vec<String> {
    raw.split('/')
        .map(clean_segment)
        .filter(|segment| !segment.is_empty() && segment != "." && segment != "..")
        .collect()
}

fn clean_segment(segment: &str) -> String {
    let legal: String = segment
        .chars()
        .filter(|c| !FORBIDDEN_CHARACTERS.contains(c))
        .collect();

    // char::is_whitespace covers U+3000 IDEOGRAPHIC SPACE
    legal
        .split(char::is_whitespace)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn policy(keep: bool, default_directory: &str) -> PathMappingPolicy {
        PathMappingPolicy {
            keep_file_structure: keep,
            default_directory: default_directory.to_string(),
        }
    }

    #[rstest]
    #[case("notes/a.md", false, "guide", "guide/a.md")]
    #[case("notes/a", true, "", "notes/a.md")]
    #[case("/notes//daily///a.md/", true, "", "notes/daily/a.md")]
    #[case("notes/a<b>:c.md", true, "", "notes/abc.md")]
    #[case("my  daily\tnote.md", true, "", "my-daily-note.md")]
    #[case("会议\u{3000}记录.md", true, "", "会议-记录.md")]
    #[case("notes/a.MD", true, "", "notes/a.MD")]
    #[case("notes/../a.md", true, "", "notes/a.md")]
    #[case("notes/a.md", true, "guide", "guide/notes/a.md")]
    #[case("guide/notes/a.md", true, "guide", "guide/notes/a.md")]
    #[case("notes/ draft .md", true, "", "notes/draft-.md")]
    fn normalize_cases(
        #[case] raw: &str,
        #[case] keep: bool,
        #[case] default_directory: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(normalize(raw, &policy(keep, default_directory), None), expected);
    }

    #[rstest]
    #[case("")]
    #[case("///")]
    #[case("?*|")]
    #[case("  /  ")]
    fn nothing_publishable_is_empty(#[case] raw: &str) {
        assert_eq!(normalize(raw, &policy(true, "guide"), None), "");
    }

    #[test]
    fn explicit_directory_overrides_default() {
        let result = normalize("notes/a.md", &policy(false, "guide"), Some("/blog/2024/"));
        assert_eq!(result, "blog/2024/a.md");
    }

    #[test]
    fn empty_explicit_directory_means_root() {
        let result = normalize("notes/a.md", &policy(false, "guide"), Some(""));
        assert_eq!(result, "a.md");
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(file_name("guide/a.md"), "a.md");
        assert_eq!(file_name("a.md"), "a.md");
        assert_eq!(file_name("guide/"), "guide");
    }
}
