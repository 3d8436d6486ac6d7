//! Turns free-form organizing instructions into an [`OrganizationConfiguration`]
//! and applies the parts of it that can be checked locally.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use shared::organizing::OrganizationConfiguration;
use shared::plan::{OrganizationPlan, PlanAction};
use shared::scan::FileCandidate;

static SIZE_LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d+\s*(?:gb|mb|tb)").expect("size pattern is valid")
});

pub const CONSTRAINT_PRESERVE_DATES: &str = "PreserveDates";
pub const CONSTRAINT_SKIP_SYSTEM_FILES: &str = "SkipSystemFiles";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInstructions {
    pub strategy: String,
    pub constraints: Vec<String>,
}

/// Rule-based extraction of a strategy and constraints from user text.
///
/// When no known layout is named, the input itself is the strategy.
pub fn parse_instructions(input: &str) -> ParsedInstructions {
    let lower = input.to_lowercase();
    let mut constraints = Vec::new();

    if lower.contains("under") || lower.contains("max") || lower.contains("less than") {
        if let Some(m) = SIZE_LIMIT.find(&lower) {
            constraints.push(format!("MaxFolderSize: {}", m.as_str()));
        }
    }
    if lower.contains("keep") && lower.contains("date") {
        constraints.push(CONSTRAINT_PRESERVE_DATES.to_string());
    }
    if lower.contains("don't touch") || lower.contains("exclude") || lower.contains("skip") {
        constraints.push(CONSTRAINT_SKIP_SYSTEM_FILES.to_string());
    }

    let named = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));
    let strategy = if named(&["by type", "by extension"]) {
        "Organize by file type/extension".to_string()
    } else if named(&["by date", "by created", "by modified"]) {
        "Organize by date (year/month)".to_string()
    } else if named(&["by name", "alphabetical"]) {
        "Organize alphabetically by name".to_string()
    } else if named(&["by project", "by folder"]) {
        "Organize by project/folder name".to_string()
    } else {
        input.trim().to_string()
    };

    ParsedInstructions {
        strategy,
        constraints,
    }
}

/// Builds a configuration from instructions, keeping the other fields of `base`.
pub fn configure_from_instructions(
    base: &OrganizationConfiguration,
    input: &str,
) -> OrganizationConfiguration {
    let parsed = parse_instructions(input);
    let mut config = base.clone();
    config.strategy = parsed.strategy;
    for c in parsed.constraints {
        if !config.constraints.contains(&c) {
            config.constraints.push(c);
        }
    }
    if config.constraints.iter().any(|c| c == CONSTRAINT_PRESERVE_DATES) {
        config.preserve_existing_metadata = true;
    }
    config.updated_at = chrono::Utc::now();
    config
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// The strategy block placed ahead of the response contract.
pub fn strategy_section(config: &OrganizationConfiguration) -> String {
    let mut lines = vec![
        "Organization strategy:".to_string(),
        config.strategy.trim().to_string(),
        String::new(),
    ];

    if !config.constraints.is_empty() {
        lines.push("Constraints to enforce:".into());
        lines.extend(config.constraints.iter().map(|c| format!("- {}", c)));
        lines.push(String::new());
    }
    if !config.standard_rules.is_empty() {
        lines.push("Standard rules (apply automatically):".into());
        lines.extend(config.standard_rules.iter().map(|r| format!("- {}", r)));
        lines.push(String::new());
    }

    lines.push(format!("Update metadata: {}", yes_no(config.update_metadata)));
    lines.push(format!(
        "Preserve existing metadata: {}",
        yes_no(config.preserve_existing_metadata)
    ));
    lines.push(format!("Max folder depth: {}", config.max_folder_depth));
    let excluded = config.excluded_extensions();
    if !excluded.is_empty() {
        lines.push(format!("Exclude file types: {}", excluded.join(", ")));
    }

    lines.join("\n")
}

/// Drops candidates whose extension the configuration excludes.
pub fn apply_exclusions(
    candidates: Vec<FileCandidate>,
    config: &OrganizationConfiguration,
) -> Vec<FileCandidate> {
    let excluded = config.excluded_extensions();
    if excluded.is_empty() {
        return candidates;
    }
    let before = candidates.len();
    let kept: Vec<_> = candidates
        .into_iter()
        .filter(|c| !excluded.iter().any(|e| e == &c.extension))
        .collect();
    debug!("Excluded {} files by type", before - kept.len());
    kept
}

/// Forces Skip on items whose target folder is deeper than allowed.
///
/// Expects targets already normalized by the plan validator.
pub fn enforce_max_depth(plan: &mut OrganizationPlan, config: &OrganizationConfiguration) {
    let max = config.max_folder_depth;
    if max == 0 {
        return;
    }
    for item in plan.items.iter_mut().filter(|i| i.action.writes()) {
        let depth = item
            .target_relative_path
            .split('/')
            .filter(|s| !s.is_empty())
            .count();
        if depth > max {
            let msg = format!(
                "targetRelativePath '{}' is {} folders deep (max {}); skipped.",
                item.target_relative_path, depth, max
            );
            warn!("{}", msg);
            item.action = PlanAction::Skip;
            plan.warnings.push(msg);
        }
    }
}
