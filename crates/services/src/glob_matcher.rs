//! Include/exclude glob matching over root-relative paths.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::warn;

use shared::scan::DEFAULT_INCLUDE_GLOB;

/// Splits a `;` or newline separated pattern list.
pub fn split_patterns(patterns: &str) -> Vec<String> {
    patterns
        .split([';', '\n', '\r'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case-insensitive matcher where exclusion always wins.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl GlobMatcher {
    pub fn new(include_glob: &str, exclude_glob: &str) -> Self {
        let mut includes = split_patterns(include_glob);
        if includes.is_empty() {
            includes.push(DEFAULT_INCLUDE_GLOB.to_string());
        }
        let mut include = build_set(&includes);
        if include.is_empty() {
            include = build_set(&[DEFAULT_INCLUDE_GLOB.to_string()]);
        }
        let exclude = build_set(&split_patterns(exclude_glob));
        Self { include, exclude }
    }

    /// Matches a path relative to its scan root. Backslashes are treated as separators.
    pub fn is_match(&self, relative_path: &str) -> bool {
        let normalized = normalize_glob_path(relative_path);
        self.include.is_match(&normalized) && !self.exclude.is_match(&normalized)
    }

    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.exclude.is_match(normalize_glob_path(relative_path))
    }
}

fn normalize_glob_path(relative_path: &str) -> String {
    let p = relative_path.replace('\\', "/");
    p.trim_start_matches("./").to_string()
}

fn build_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
        {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!("Ignoring invalid glob pattern '{}': {}", pattern, e),
        }
    }
    builder.build().unwrap_or_else(|e| {
        warn!("Failed to compile glob set: {}", e);
        GlobSet::empty()
    })
}
