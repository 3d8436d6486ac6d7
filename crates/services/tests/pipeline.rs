use async_trait::async_trait;
use serde_json::json;
use services::pipeline::{OrganizeError, OrganizePipeline, OrganizeRequest, PipelineProgress};
use shared::llm::{ChatJsonRequest, LlmProvider, ProviderError};
use shared::organizing::OrganizationConfiguration;
use shared::plan::PlanAction;
use shared::settings::AppSettings;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use tokio::sync::mpsc::unbounded_channel;
use tokio_util::sync::CancellationToken;

struct ScriptedProvider {
    vision: bool,
    reply: Result<String, ProviderError>,
    seen: Mutex<Vec<ChatJsonRequest>>,
}

impl ScriptedProvider {
    fn replying(reply: Result<String, ProviderError>, vision: bool) -> Arc<Self> {
        Arc::new(Self {
            vision,
            reply,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn supports_vision(&self) -> bool {
        self.vision
    }

    async fn list_models(&self, _cancel: &CancellationToken) -> Result<Vec<String>, ProviderError> {
        Ok(vec!["test-model".into()])
    }

    async fn chat_json(
        &self,
        request: &ChatJsonRequest,
        _cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        self.seen.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}

fn request_for(root: &std::path::Path, include: &str) -> OrganizeRequest {
    let mut request =
        OrganizeRequest::from_settings(&AppSettings::default(), vec![root.to_path_buf()], "test-model");
    request.scan.include_glob = include.into();
    request
}

#[tokio::test]
async fn unsafe_target_is_neutralized_end_to_end() {
    let tmp = tempdir().unwrap();
    let docs = tmp.path().join("docs");
    fs::create_dir(&docs).unwrap();
    fs::write(docs.join("readme.txt"), "project readme").unwrap();
    fs::write(docs.join("invoice.txt"), "invoice 42").unwrap();
    fs::write(docs.join("photo.bin"), [0u8; 4]).unwrap();

    let readme = docs.join("readme.txt");
    let invoice = docs.join("invoice.txt");
    let reply = json!({
        "items": [
            {
                "sourcePath": readme.to_string_lossy(),
                "action": "Move",
                "targetRelativePath": "../../etc/passwd",
                "newFileName": null,
                "confidence0to1": 0.9,
                "rationale": "nope",
                "tags": []
            },
            {
                "sourcePath": invoice.to_string_lossy(),
                "action": "Copy",
                "targetRelativePath": "Finance/Invoices/",
                "newFileName": "invoice-42.txt",
                "confidence0to1": 1.7,
                "rationale": "invoice",
                "tags": ["finance"]
            },
            {
                "sourcePath": "/etc/hosts",
                "action": "Move",
                "targetRelativePath": "System",
                "confidence0to1": 0.5
            }
        ],
        "warnings": ["model warning"]
    });
    let provider = ScriptedProvider::replying(Ok(format!("```json\n{}\n```", reply)), false);
    let pipeline = OrganizePipeline::new(provider.clone());

    let (scan_tx, mut scan_rx) = unbounded_channel();
    let (build_tx, mut build_rx) = unbounded_channel();
    let progress = PipelineProgress {
        scan: Some(scan_tx),
        build: Some(build_tx),
    };
    let outcome = pipeline
        .run(&request_for(&docs, "**/*.txt"), progress, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.contexts.len(), 2);
    assert!(scan_rx.try_recv().is_ok());
    let mut last_build = None;
    while let Ok(p) = build_rx.try_recv() {
        last_build = Some((p.done, p.total));
    }
    assert_eq!(last_build, Some((2, 2)));

    let plan = &outcome.plan;
    assert_eq!(plan.items.len(), 3);

    let first = &plan.items[0];
    assert_eq!(first.action, PlanAction::Skip);
    assert_eq!(
        first.source_path,
        fs::canonicalize(&readme).unwrap().to_string_lossy()
    );

    let second = &plan.items[1];
    assert_eq!(second.action, PlanAction::Copy);
    assert_eq!(second.target_relative_path, "Finance/Invoices");
    assert_eq!(second.new_file_name.as_deref(), Some("invoice-42.txt"));
    assert_eq!(second.confidence, 1.0);

    assert_eq!(plan.items[2].action, PlanAction::Skip);

    assert!(plan.warnings[0].contains("Unsafe targetRelativePath"));
    assert_eq!(plan.warnings.last().map(String::as_str), Some("model warning"));
    assert_eq!(plan.actionable().count(), 1);

    let seen = provider.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].model, "test-model");
    assert!(seen[0].user_prompt.contains("readme.txt"));
    assert!(!seen[0].user_prompt.contains("photo.bin"));
    assert!(seen[0].images_png_base64.is_empty());
}

#[tokio::test]
async fn empty_scan_skips_the_provider() {
    let tmp = tempdir().unwrap();
    let provider = ScriptedProvider::replying(Ok("{}".into()), false);
    let pipeline = OrganizePipeline::new(provider.clone());

    let outcome = pipeline
        .run(
            &request_for(tmp.path(), "**/*.txt"),
            PipelineProgress::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(outcome.plan.items.is_empty());
    assert_eq!(outcome.plan.warnings.len(), 1);
    assert!(provider.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn provider_failures_surface_typed() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("a.txt"), "a").unwrap();
    let provider = ScriptedProvider::replying(
        Err(ProviderError::MissingCredentials {
            provider: "OpenAI".into(),
        }),
        false,
    );

    let err = OrganizePipeline::new(provider)
        .run(
            &request_for(tmp.path(), "**/*"),
            PipelineProgress::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match err {
        OrganizeError::Provider(e) => assert!(e.needs_credentials()),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unparseable_reply_is_a_parse_error() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("a.txt"), "a").unwrap();
    let provider = ScriptedProvider::replying(Ok("I am not sure what to do.".into()), false);

    let err = OrganizePipeline::new(provider)
        .run(
            &request_for(tmp.path(), "**/*"),
            PipelineProgress::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OrganizeError::Parse(_)));
}

#[tokio::test]
async fn cancellation_is_its_own_outcome() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("a.txt"), "a").unwrap();
    let provider = ScriptedProvider::replying(Ok("{}".into()), false);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = OrganizePipeline::new(provider.clone())
        .run(&request_for(tmp.path(), "**/*"), PipelineProgress::default(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, OrganizeError::Canceled));
    assert!(provider.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn vision_providers_receive_thumbnails() {
    let tmp = tempdir().unwrap();
    image::DynamicImage::ImageRgb8(image::RgbImage::new(40, 20))
        .save(tmp.path().join("pic.png"))
        .unwrap();
    let provider = ScriptedProvider::replying(Ok(r#"{"items":[],"warnings":[]}"#.into()), true);

    OrganizePipeline::new(provider.clone())
        .run(
            &request_for(tmp.path(), "**/*.png"),
            PipelineProgress::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let seen = provider.seen.lock().unwrap();
    assert_eq!(seen[0].images_png_base64.len(), 1);
    assert!(seen[0].user_prompt.contains("image: 40x20"));
}

#[tokio::test]
async fn configured_strategy_shapes_the_run() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("notes.txt"), "notes").unwrap();
    fs::write(tmp.path().join("setup.exe"), "MZ").unwrap();
    let notes = tmp.path().join("notes.txt");
    let reply = json!({
        "items": [{
            "sourcePath": notes.to_string_lossy(),
            "action": "Move",
            "targetRelativePath": "A/B/C/D",
            "confidence0to1": 0.9
        }],
        "warnings": []
    });
    let provider = ScriptedProvider::replying(Ok(reply.to_string()), false);

    let mut request = request_for(tmp.path(), "**/*");
    request.organization = Some(OrganizationConfiguration {
        strategy: "Organize by file type/extension".into(),
        exclude_file_types: "exe".into(),
        max_folder_depth: 3,
        ..Default::default()
    });

    let outcome = OrganizePipeline::new(provider.clone())
        .run(&request, PipelineProgress::default(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.contexts.len(), 1);
    assert_eq!(outcome.plan.items[0].action, PlanAction::Skip);
    assert!(outcome.plan.warnings[0].contains("max 3"));

    let seen = provider.seen.lock().unwrap();
    assert!(seen[0]
        .system_prompt
        .contains("Organization strategy:\nOrganize by file type/extension"));
    assert!(seen[0].system_prompt.contains("Exclude file types: exe"));
    assert!(!seen[0].user_prompt.contains("setup.exe"));
}
