//! Turns raw assistant text into an [`OrganizationPlan`].
//!
//! Models often wrap JSON in Markdown fences or add a sentence before it, so
//! parsing falls back to the outermost `{...}` span. The result is untrusted
//! and must still go through the plan validator.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

use shared::plan::{OrganizationPlan, PlanItem};

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").expect("fence pattern is valid")
});

#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("model response is empty")]
    Empty,
    #[error("model response contains no JSON object")]
    NoJsonObject,
    #[error("model response is not a valid plan: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// The outermost `{...}` span, looking inside a fenced block first.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let body = FENCED_BLOCK
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw);
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (end > start).then(|| &body[start..=end])
}

pub fn parse_plan(raw: &str) -> Result<OrganizationPlan, PlanParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PlanParseError::Empty);
    }

    if let Ok(plan) = serde_json::from_str::<OrganizationPlan>(trimmed) {
        return Ok(plan);
    }
    // A bare item array is accepted as a plan without warnings.
    if trimmed.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<PlanItem>>(trimmed) {
            return Ok(OrganizationPlan {
                items,
                warnings: vec![],
            });
        }
    }

    debug!("Plan response is not bare JSON; extracting embedded object");
    let json = extract_json_object(trimmed).ok_or(PlanParseError::NoJsonObject)?;
    Ok(serde_json::from_str::<OrganizationPlan>(json)?)
}
