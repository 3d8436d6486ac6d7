//! Checks for model-suggested relative paths and file names.
//!
//! The character rules are the union of what Windows and Unix reject, so a
//! plan produced on one host stays safe to apply on another.

use std::fmt;
use std::path::{Path, PathBuf};

const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathViolation {
    Empty,
    Rooted,
    ParentTraversal,
    InvalidCharacter,
    Separator,
    DotName,
}

impl fmt::Display for PathViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PathViolation::Empty => "empty",
            PathViolation::Rooted => "rooted (leading slash, drive letter or UNC share)",
            PathViolation::ParentTraversal => "contains '..'",
            PathViolation::InvalidCharacter => "contains an invalid character",
            PathViolation::Separator => "contains a path separator",
            PathViolation::DotName => "is '.' or '..'",
        };
        f.write_str(text)
    }
}

fn has_invalid_char(s: &str) -> bool {
    s.chars().any(|c| c.is_control() || RESERVED_CHARS.contains(&c))
}

/// `C:`, `c:\x`, `\\server\share`, `//server/share`, `/etc`.
pub fn is_os_rooted(raw: &str) -> bool {
    let s = raw.trim();
    if s.starts_with('/') || s.starts_with('\\') {
        return true;
    }
    let mut chars = s.chars();
    if let (Some(first), Some(':')) = (chars.next(), chars.next()) {
        if first.is_ascii_alphabetic() {
            return true;
        }
    }
    Path::new(s).has_root()
}

/// Validates a destination path relative to the destination root.
pub fn check_relative_path(raw: &str) -> Result<(), PathViolation> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PathViolation::Empty);
    }
    if is_os_rooted(trimmed) {
        return Err(PathViolation::Rooted);
    }
    let normalized = trimmed.replace('\\', "/");
    // Any `..` substring is refused, so `v1..2` is rejected along with real
    // parent segments.
    if normalized.contains("..") {
        return Err(PathViolation::ParentTraversal);
    }
    if has_invalid_char(&normalized) {
        return Err(PathViolation::InvalidCharacter);
    }
    if normalize_relative_path(&normalized).is_empty() {
        return Err(PathViolation::Empty);
    }
    Ok(())
}

pub fn is_safe_relative_path(raw: &str) -> bool {
    check_relative_path(raw).is_ok()
}

/// Forward slashes, no empty or `.` segments, no trailing slash.
///
/// Only meaningful for input that passed [`check_relative_path`].
pub fn normalize_relative_path(raw: &str) -> String {
    raw.trim()
        .replace('\\', "/")
        .split('/')
        .map(str::trim)
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Validates a bare file name (no directories).
pub fn check_file_name(raw: &str) -> Result<(), PathViolation> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(PathViolation::Empty);
    }
    if name.contains('/') || name.contains('\\') {
        return Err(PathViolation::Separator);
    }
    if has_invalid_char(name) {
        return Err(PathViolation::InvalidCharacter);
    }
    if name == "." || name == ".." {
        return Err(PathViolation::DotName);
    }
    Ok(())
}

pub fn is_safe_file_name(raw: &str) -> bool {
    check_file_name(raw).is_ok()
}

/// Comparison key for an already-resolved path.
///
/// Case is folded only where the filesystem is case-insensitive; elsewhere
/// `/x/Photos` and `/x/photos` are different directories.
#[cfg(windows)]
pub fn path_key(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_lowercase())
}

#[cfg(not(windows))]
pub fn path_key(path: &Path) -> PathBuf {
    path.to_path_buf()
}

/// Canonical form when the path exists, the path as given otherwise.
pub fn resolved_key(path: &Path) -> PathBuf {
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    path_key(&resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_relative_paths() {
        assert!(is_safe_relative_path("Photos/2025/Trip/"));
        assert!(is_safe_relative_path("Documents"));
        assert!(is_safe_relative_path("Work\\Invoices"));
        assert!(is_safe_relative_path("./Archive"));
    }

    #[test]
    fn rejects_traversal_and_rooting() {
        assert_eq!(check_relative_path("../../etc/passwd"), Err(PathViolation::ParentTraversal));
        assert_eq!(check_relative_path("a/../../b"), Err(PathViolation::ParentTraversal));
        assert_eq!(check_relative_path("..\\windows"), Err(PathViolation::ParentTraversal));
        assert_eq!(check_relative_path("/etc"), Err(PathViolation::Rooted));
        assert_eq!(check_relative_path("C:\\Windows"), Err(PathViolation::Rooted));
        assert_eq!(check_relative_path("c:relative"), Err(PathViolation::Rooted));
        assert_eq!(check_relative_path("\\\\server\\share"), Err(PathViolation::Rooted));
        assert_eq!(check_relative_path("//server/share"), Err(PathViolation::Rooted));
    }

    #[test]
    fn rejects_empty_and_invalid_characters() {
        assert_eq!(check_relative_path(""), Err(PathViolation::Empty));
        assert_eq!(check_relative_path("   "), Err(PathViolation::Empty));
        assert_eq!(check_relative_path("./"), Err(PathViolation::Empty));
        assert_eq!(check_relative_path("a\0b"), Err(PathViolation::InvalidCharacter));
        assert_eq!(check_relative_path("what?/x"), Err(PathViolation::InvalidCharacter));
        assert_eq!(check_relative_path("a|b"), Err(PathViolation::InvalidCharacter));
    }

    #[test]
    fn normalizes_separators_and_dot_segments() {
        assert_eq!(normalize_relative_path("Photos\\2025//Trip/"), "Photos/2025/Trip");
        assert_eq!(normalize_relative_path("./Docs/./Tax"), "Docs/Tax");
    }

    #[test]
    fn file_name_rules() {
        assert!(is_safe_file_name("report.pdf"));
        assert!(is_safe_file_name(".gitignore"));
        assert_eq!(check_file_name("a/b.txt"), Err(PathViolation::Separator));
        assert_eq!(check_file_name("a\\b.txt"), Err(PathViolation::Separator));
        assert_eq!(check_file_name("bad\0name"), Err(PathViolation::InvalidCharacter));
        assert_eq!(check_file_name("what?.txt"), Err(PathViolation::InvalidCharacter));
        assert_eq!(check_file_name(".."), Err(PathViolation::DotName));
        assert_eq!(check_file_name("."), Err(PathViolation::DotName));
        assert_eq!(check_file_name(" "), Err(PathViolation::Empty));
    }

    #[test]
    fn backslash_paths_are_checked_after_normalizing() {
        assert_eq!(check_relative_path("Work\\Invoices\\2024"), Ok(()));
        assert_eq!(check_relative_path("Work\\..\\x"), Err(PathViolation::ParentTraversal));
        assert_eq!(check_relative_path("v1..2"), Err(PathViolation::ParentTraversal));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn path_keys_keep_case_on_case_sensitive_hosts() {
        assert_ne!(path_key(Path::new("/x/Photos")), path_key(Path::new("/x/photos")));
    }

    #[test]
    fn resolved_key_merges_spellings_of_one_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("docs");
        std::fs::create_dir(&dir).unwrap();
        assert_eq!(resolved_key(&dir), resolved_key(&dir.join(".")));
        let missing = tmp.path().join("missing");
        assert_eq!(resolved_key(&missing), path_key(&missing));
    }
}
