mod cli;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, ScanArgs};
use services::extraction::FileContextBuilder;
use services::organizing::{apply_exclusions, configure_from_instructions};
use services::plan_parser::parse_plan;
use services::plan_validator::PlanValidator;
use services::prompts;
use services::scanner::FileScanner;
use services::settings_store::JsonSettingsStore;
use shared::scan::{FileCandidate, ScanOptions};
use shared::secrets::EnvSecretStore;
use shared::settings::AppSettings;
use std::path::PathBuf;
use tokio::sync::mpsc::unbounded_channel;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let settings = load_settings(args.settings.clone());

    match args.command {
        Some(Commands::Scan(scan)) => run_scan(&settings, scan).await,
        Some(Commands::Prompt { scan, instructions }) => {
            run_prompt(&settings, scan, instructions.as_deref()).await
        }
        Some(Commands::Validate { plan, roots }) => run_validate(plan, roots),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    }
}

fn load_settings(path: Option<PathBuf>) -> AppSettings {
    let store = match path {
        Some(p) => Some(JsonSettingsStore::at_path(p)),
        None => JsonSettingsStore::new(),
    };
    let mut settings = match store {
        Some(store) => {
            info!("Using settings at {}", store.path().display());
            store.load_or_default()
        }
        None => AppSettings::default(),
    };
    settings.sync_key_flags(&EnvSecretStore::new());
    settings
}

fn scan_options(settings: &AppSettings, args: ScanArgs) -> ScanOptions {
    let mut options = settings.scan.to_scan_options(args.roots);
    if let Some(depth) = args.max_depth {
        options.max_depth = depth;
    }
    if let Some(include) = args.include {
        options.include_glob = include;
    }
    if let Some(exclude) = args.exclude {
        options.exclude_glob = exclude;
    }
    options.include_hidden |= args.hidden;
    options.min_size_bytes = args.min_size;
    options.max_size_bytes = args.max_size;
    options
}

async fn scan(options: ScanOptions, cancel: &CancellationToken) -> Result<Vec<FileCandidate>> {
    let (tx, mut rx) = unbounded_channel();
    let candidates = FileScanner::new()
        .scan_async(options, Some(tx), cancel.clone())
        .await?;

    let mut last = None;
    while let Ok(p) = rx.try_recv() {
        last = Some(p);
    }
    if let Some(p) = last {
        info!(
            "Visited {} directories and {} files; {} matched",
            p.directories_visited, p.files_visited, p.files_matched
        );
    }
    Ok(candidates)
}

async fn run_scan(settings: &AppSettings, args: ScanArgs) -> Result<()> {
    let cancel = CancellationToken::new();
    let candidates = scan(scan_options(settings, args), &cancel).await?;
    for c in &candidates {
        println!("{}\t{}", c.size_bytes, c.full_path.display());
    }
    Ok(())
}

async fn run_prompt(
    settings: &AppSettings,
    args: ScanArgs,
    instructions: Option<&str>,
) -> Result<()> {
    let organization = match instructions.map(str::trim).filter(|i| !i.is_empty()) {
        Some(text) => configure_from_instructions(&settings.organization, text),
        None => settings.organization.clone(),
    };
    info!("Organization strategy: {}", organization.strategy);

    let cancel = CancellationToken::new();
    let candidates = scan(scan_options(settings, args), &cancel).await?;
    let candidates = apply_exclusions(candidates, &organization);
    let contexts = FileContextBuilder::default()
        .build_many(&candidates, &settings.extraction, None, &cancel)
        .await?;

    let prompts = prompts::assemble(
        Some(settings.default_prompt.as_str()),
        Some(&organization),
        &contexts,
        &settings.destination_root_label,
    );
    println!("=== system ===\n{}\n=== user ===\n{}", prompts.system, prompts.user);
    Ok(())
}

fn run_validate(plan_path: PathBuf, roots: Vec<PathBuf>) -> Result<()> {
    let raw = std::fs::read_to_string(&plan_path)
        .with_context(|| format!("reading {}", plan_path.display()))?;
    let plan = parse_plan(&raw).with_context(|| format!("parsing {}", plan_path.display()))?;
    let safe = PlanValidator.validate_and_normalize(&plan, &roots);
    info!(
        "{} of {} items remain actionable",
        safe.actionable().count(),
        safe.items.len()
    );
    println!("{}", serde_json::to_string_pretty(&safe)?);
    Ok(())
}
