//! User-configured organization strategy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationConfiguration {
    /// Plain-language description of the desired layout.
    pub strategy: String,
    /// 0 = fully automatic, 0.5 = confirm per group, 1 = confirm every item.
    pub handiness: f64,
    /// e.g. `MaxFolderSize: 2gb`, `PreserveDates`.
    pub constraints: Vec<String>,
    /// Rules applied without asking.
    pub standard_rules: Vec<String>,
    pub update_metadata: bool,
    pub preserve_existing_metadata: bool,
    /// Comma separated, e.g. `exe,dll,sys`.
    pub exclude_file_types: String,
    pub max_folder_depth: usize,
    pub live_update_during_scan: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for OrganizationConfiguration {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            strategy: String::new(),
            handiness: 0.5,
            constraints: vec![],
            standard_rules: vec![],
            update_metadata: true,
            preserve_existing_metadata: true,
            exclude_file_types: String::new(),
            max_folder_depth: 5,
            live_update_during_scan: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl OrganizationConfiguration {
    pub fn has_strategy(&self) -> bool {
        !self.strategy.trim().is_empty()
    }

    /// Lowercase extensions without the leading dot.
    pub fn excluded_extensions(&self) -> Vec<String> {
        self.exclude_file_types
            .split(',')
            .map(|t| t.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn excludes_extension(&self, extension: &str) -> bool {
        let ext = extension.trim_start_matches('.');
        self.excluded_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}
