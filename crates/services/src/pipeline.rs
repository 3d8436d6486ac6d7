//! Scan, enrich, prompt, parse and validate in one sequential flow.

use std::path::PathBuf;
use std::sync::Arc;

use shared::context::{BuildProgress, ExtractorOptions, FileContext};
use shared::llm::{ChatJsonRequest, LlmProvider, ProviderError};
use shared::organizing::OrganizationConfiguration;
use shared::plan::OrganizationPlan;
use shared::scan::{ScanOptions, ScanProgress};
use shared::settings::AppSettings;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cancel::{ensure_active, Canceled};
use crate::extraction::FileContextBuilder;
use crate::organizing::{apply_exclusions, enforce_max_depth};
use crate::plan_parser::{parse_plan, PlanParseError};
use crate::plan_validator::PlanValidator;
use crate::prompts;
use crate::scanner::FileScanner;

#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("organize run canceled")]
    Canceled,
    #[error(transparent)]
    Provider(ProviderError),
    #[error(transparent)]
    Parse(#[from] PlanParseError),
}

impl From<Canceled> for OrganizeError {
    fn from(_: Canceled) -> Self {
        OrganizeError::Canceled
    }
}

#[derive(Debug, Clone)]
pub struct OrganizeRequest {
    pub scan: ScanOptions,
    pub extraction: ExtractorOptions,
    pub model: String,
    pub default_prompt: Option<String>,
    /// Strategy, excluded file types and folder depth limit for this run.
    pub organization: Option<OrganizationConfiguration>,
    pub destination_root_label: String,
}

impl OrganizeRequest {
    pub fn from_settings(settings: &AppSettings, roots: Vec<PathBuf>, model: &str) -> Self {
        Self {
            scan: settings.scan.to_scan_options(roots),
            extraction: settings.extraction.clone(),
            model: model.to_string(),
            default_prompt: Some(settings.default_prompt.clone()),
            organization: Some(settings.organization.clone()),
            destination_root_label: settings.destination_root_label.clone(),
        }
    }
}

/// Optional progress sinks, one per stage.
#[derive(Debug, Clone, Default)]
pub struct PipelineProgress {
    pub scan: Option<UnboundedSender<ScanProgress>>,
    pub build: Option<UnboundedSender<BuildProgress>>,
}

#[derive(Debug, Clone)]
pub struct OrganizeOutcome {
    pub contexts: Vec<FileContext>,
    /// Validated plan, safe to hand to an executor.
    pub plan: OrganizationPlan,
}

pub struct OrganizePipeline {
    scanner: FileScanner,
    builder: FileContextBuilder,
    validator: PlanValidator,
    provider: Arc<dyn LlmProvider>,
}

impl OrganizePipeline {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self::with_builder(provider, FileContextBuilder::default())
    }

    pub fn with_builder(provider: Arc<dyn LlmProvider>, builder: FileContextBuilder) -> Self {
        Self {
            scanner: FileScanner::new(),
            builder,
            validator: PlanValidator,
            provider,
        }
    }

    pub async fn run(
        &self,
        request: &OrganizeRequest,
        progress: PipelineProgress,
        cancel: &CancellationToken,
    ) -> Result<OrganizeOutcome, OrganizeError> {
        let candidates = self
            .scanner
            .scan_async(request.scan.clone(), progress.scan, cancel.clone())
            .await?;
        let candidates = match &request.organization {
            Some(config) => apply_exclusions(candidates, config),
            None => candidates,
        };
        info!("Scan matched {} files", candidates.len());

        if candidates.is_empty() {
            return Ok(OrganizeOutcome {
                contexts: vec![],
                plan: OrganizationPlan {
                    items: vec![],
                    warnings: vec!["No files matched the scan options.".into()],
                },
            });
        }

        let contexts = self
            .builder
            .build_many(&candidates, &request.extraction, progress.build.as_ref(), cancel)
            .await?;
        ensure_active(cancel)?;

        let chat = self.chat_request(request, &contexts);
        let raw = self
            .provider
            .chat_json(&chat, cancel)
            .await
            .map_err(|e| {
                if e.is_canceled() || cancel.is_cancelled() {
                    OrganizeError::Canceled
                } else {
                    warn!("Planner request failed: {}", e);
                    OrganizeError::Provider(e)
                }
            })?;
        ensure_active(cancel)?;

        let parsed = parse_plan(&raw)?;
        let mut plan = self
            .validator
            .validate_and_normalize(&parsed, &request.scan.roots);
        if let Some(config) = &request.organization {
            enforce_max_depth(&mut plan, config);
        }
        info!(
            "Plan has {} items ({} actionable, {} warnings)",
            plan.items.len(),
            plan.actionable().count(),
            plan.warnings.len()
        );

        Ok(OrganizeOutcome { contexts, plan })
    }

    fn chat_request(&self, request: &OrganizeRequest, contexts: &[FileContext]) -> ChatJsonRequest {
        let prompts = prompts::assemble(
            request.default_prompt.as_deref(),
            request.organization.as_ref(),
            contexts,
            &request.destination_root_label,
        );
        let images_png_base64 = if self.provider.supports_vision() {
            contexts
                .iter()
                .filter_map(|c| c.thumbnail_png_base64.clone())
                .collect()
        } else {
            vec![]
        };
        ChatJsonRequest {
            model: request.model.clone(),
            system_prompt: prompts.system,
            user_prompt: prompts.user,
            images_png_base64,
        }
    }
}
