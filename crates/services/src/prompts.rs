//! Planner prompts sent to the model.
//!
//! Pure string assembly; no I/O. The system prompt pins the JSON-only
//! response contract that `plan_parser` and `plan_validator` consume.

use shared::context::FileContext;
use shared::organizing::OrganizationConfiguration;

use crate::organizing::strategy_section;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerPrompts {
    pub system: String,
    pub user: String,
}

const RESPONSE_SCHEMA: &str = r#"{
  "items": [
    {
      "sourcePath": "string",
      "action": "Move|Copy|Skip",
      "targetRelativePath": "string",
      "newFileName": "string|null",
      "confidence0to1": 0.0,
      "rationale": "string|null",
      "tags": ["string"]
    }
  ],
  "warnings": ["string"]
}"#;

const RULES: &[&str] = &[
    "action=Skip if unsure.",
    "sourcePath must be copied exactly from the file list.",
    "targetRelativePath must be relative (no drive letters, no leading slash, no '..').",
    "newFileName must be a filename only (no directories), or null to keep the original name.",
    "confidence0to1 must be between 0 and 1.",
];

pub fn build_system_prompt(user_default_prompt: Option<&str>) -> String {
    build_configured_system_prompt(user_default_prompt, None)
}

/// Like [`build_system_prompt`], with the configured strategy between the
/// user's preamble and the response contract. A configuration without a
/// strategy adds nothing.
pub fn build_configured_system_prompt(
    user_default_prompt: Option<&str>,
    organization: Option<&OrganizationConfiguration>,
) -> String {
    let mut preamble = user_default_prompt
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("{}\n\n", p))
        .unwrap_or_default();
    if let Some(config) = organization.filter(|c| c.has_strategy()) {
        preamble.push_str(&strategy_section(config));
        preamble.push_str("\n\n");
    }
    let rules = RULES
        .iter()
        .map(|r| format!("- {}", r))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"{preamble}You are an assistant that organizes files into folders.
Return ONLY valid JSON. No markdown. No extra keys.

JSON schema (informal):
{RESPONSE_SCHEMA}

Rules:
{rules}
"#
    )
}

pub fn build_user_prompt(destination_root_label: &str, contexts: &[FileContext]) -> String {
    let mut out = format!(
        "Destination root name: {}\n\
         Propose where each sourcePath should go under the destination root name.\n\
         Consider file extension, content previews, and metadata.\n\nFiles:\n",
        destination_root_label
    );
    for (i, ctx) in contexts.iter().enumerate() {
        out.push_str(&describe_file(i + 1, ctx));
        out.push('\n');
    }
    out
}

fn describe_file(index: usize, ctx: &FileContext) -> String {
    let mut lines = vec![
        format!("[{}] sourcePath: {}", index, ctx.source_path.display()),
        format!("    fileName: {}", ctx.file_name),
        format!("    extension: {}", ctx.extension),
    ];
    if let Some(size) = ctx.size_bytes {
        lines.push(format!("    sizeBytes: {}", size));
    }
    if let Some(ts) = ctx.last_write_time {
        lines.push(format!("    lastWriteTimeUtc: {}", ts.to_rfc3339()));
    }
    if let Some(mime) = ctx.mime_type.as_deref().filter(|m| !m.trim().is_empty()) {
        lines.push(format!("    mimeType: {}", mime));
    }
    if let Some(text) = ctx.text_preview.as_deref().filter(|t| !t.trim().is_empty()) {
        lines.push(format!("    textPreview: {}", text));
    }
    if let (Some(w), Some(h)) = (ctx.image_width, ctx.image_height) {
        lines.push(format!(
            "    image: {}x{} (thumbnail included separately if supported)",
            w, h
        ));
    }
    lines.join("\n") + "\n"
}

pub fn assemble(
    user_default_prompt: Option<&str>,
    organization: Option<&OrganizationConfiguration>,
    contexts: &[FileContext],
    destination_root_label: &str,
) -> PlannerPrompts {
    PlannerPrompts {
        system: build_configured_system_prompt(user_default_prompt, organization),
        user: build_user_prompt(destination_root_label, contexts),
    }
}
