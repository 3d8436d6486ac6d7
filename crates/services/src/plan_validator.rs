//! Normalizes a model-produced plan before anything acts on it.
//!
//! Validation never fails. Every unsafe item is downgraded to
//! [`PlanAction::Skip`] with a warning, so the caller always gets a plan it
//! can hand to an executor. The filesystem is only read (to canonicalize
//! paths), never written.

use shared::plan::{OrganizationPlan, PlanAction, PlanItem};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::path_safety::{
    check_file_name, check_relative_path, normalize_relative_path, path_key,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct PlanValidator;

/// An allowed root after canonicalization.
struct AllowedRoot {
    key: PathBuf,
    is_file: bool,
}

impl AllowedRoot {
    fn resolve(root: &Path) -> Option<Self> {
        let canonical = std::fs::canonicalize(root).ok()?;
        Some(Self {
            key: path_key(&canonical),
            is_file: canonical.is_file(),
        })
    }

    /// Component-wise, so `/x/photos-private` is not under `/x/photos`.
    fn contains(&self, source_key: &Path) -> bool {
        if self.is_file {
            source_key == self.key.as_path()
        } else {
            source_key != self.key.as_path() && source_key.starts_with(&self.key)
        }
    }
}

/// Maps NaN and infinities to 0, everything else into `[0, 1]`.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl PlanValidator {
    pub fn validate_and_normalize(
        &self,
        plan: &OrganizationPlan,
        allowed_roots: &[PathBuf],
    ) -> OrganizationPlan {
        let roots: Vec<AllowedRoot> = allowed_roots
            .iter()
            .filter_map(|r| {
                let resolved = AllowedRoot::resolve(r);
                if resolved.is_none() {
                    debug!("Ignoring unresolvable allowed root {}", r.display());
                }
                resolved
            })
            .collect();

        let mut warnings = Vec::new();
        let items = plan
            .items
            .iter()
            .map(|item| normalize_item(item.clone(), &roots, &mut warnings))
            .collect();

        warnings.extend(plan.warnings.iter().cloned());
        OrganizationPlan { items, warnings }
    }
}

fn normalize_item(
    mut item: PlanItem,
    roots: &[AllowedRoot],
    warnings: &mut Vec<String>,
) -> PlanItem {
    item.confidence = clamp_confidence(item.confidence);

    let source = item.source_path.trim().to_string();
    if source.is_empty() {
        force_skip(&mut item, warnings, "Plan item has an empty sourcePath; skipped.".into());
        return item;
    }

    let canonical = match std::fs::canonicalize(&source) {
        Ok(p) => p,
        Err(e) => {
            let msg = format!("Cannot resolve sourcePath '{}' ({}); skipped.", source, e);
            force_skip(&mut item, warnings, msg);
            return item;
        }
    };

    let key = path_key(&canonical);
    if !roots.iter().any(|r| r.contains(&key)) {
        let msg = format!(
            "sourcePath '{}' is outside the selected roots; skipped.",
            canonical.display()
        );
        force_skip(&mut item, warnings, msg);
        return item;
    }
    item.source_path = canonical.to_string_lossy().into_owned();

    if item.action.writes() {
        match check_relative_path(&item.target_relative_path) {
            Ok(()) => {
                item.target_relative_path = normalize_relative_path(&item.target_relative_path);
            }
            Err(violation) => {
                let msg = format!(
                    "Unsafe targetRelativePath '{}' for '{}' ({}); skipped.",
                    item.target_relative_path, item.source_path, violation
                );
                force_skip(&mut item, warnings, msg);
            }
        }
    }

    if let Some(raw) = item.new_file_name.take() {
        let name = raw.trim();
        if !name.is_empty() {
            match check_file_name(name) {
                Ok(()) => item.new_file_name = Some(name.to_string()),
                Err(violation) => warnings.push(format!(
                    "Unsafe newFileName {:?} for '{}' ({}); keeping the original name.",
                    raw, item.source_path, violation
                )),
            }
        }
    }

    item
}

fn force_skip(item: &mut PlanItem, warnings: &mut Vec<String>, message: String) {
    warn!("{}", message);
    item.action = PlanAction::Skip;
    warnings.push(message);
}
