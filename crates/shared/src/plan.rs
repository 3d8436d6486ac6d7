//! The organization plan exchanged with the model.
//!
//! Field names follow the camelCase JSON contract given to the model in the
//! planner prompt. Deserialization is lenient: a model that emits `null` for
//! a list or lowercases an action still produces a usable plan, and anything
//! unrecognized falls back to [`PlanAction::Skip`].

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum PlanAction {
    #[default]
    Skip,
    Move,
    Copy,
}

impl PlanAction {
    /// Case-insensitive parse; unknown values become `Skip`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "move" => PlanAction::Move,
            "copy" => PlanAction::Copy,
            _ => PlanAction::Skip,
        }
    }

    pub fn writes(&self) -> bool {
        matches!(self, PlanAction::Move | PlanAction::Copy)
    }
}

impl<'de> Deserialize<'de> for PlanAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| PlanAction::parse_lenient(&s)).unwrap_or_default())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_path: String,
    #[serde(default)]
    pub action: PlanAction,
    /// Destination relative to the destination root, e.g. `Photos/2025/Trip/`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_relative_path: String,
    /// Bare file name; `None` keeps the original name.
    #[serde(default)]
    pub new_file_name: Option<String>,
    #[serde(rename = "confidence0to1", default, deserialize_with = "null_as_default")]
    pub confidence: f64,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationPlan {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<PlanItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub warnings: Vec<String>,
}

impl OrganizationPlan {
    pub fn actionable(&self) -> impl Iterator<Item = &PlanItem> {
        self.items.iter().filter(|i| i.action.writes())
    }
}
