pub mod context;
pub mod llm;
pub mod organizing;
pub mod plan;
pub mod scan;
pub mod secrets;

pub mod settings {
    use serde::{Deserialize, Serialize};

    use crate::context::ExtractorOptions;
    use crate::organizing::OrganizationConfiguration;
    use crate::secrets::{SecretKeys, SecretStore};
    use crate::scan::{ScanOptions, DEFAULT_EXCLUDE_GLOB, DEFAULT_INCLUDE_GLOB, DEFAULT_MAX_DEPTH};
    use std::path::PathBuf;

    /// Connection details for one model backend.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ProviderSettings {
        pub endpoint: String,
        pub model: String,
        pub enabled: bool,
        /// The key itself lives in the secret store, never in settings.json
        pub has_api_key: bool,
    }

    impl Default for ProviderSettings {
        fn default() -> Self {
            Self::new("", "")
        }
    }

    impl ProviderSettings {
        fn new(endpoint: &str, model: &str) -> Self {
            Self {
                endpoint: endpoint.into(),
                model: model.into(),
                enabled: true,
                has_api_key: false,
            }
        }
    }

    /// Persisted defaults used to seed a scan.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ScanDefaults {
        pub max_depth: usize,
        pub include_hidden: bool,
        pub include_glob: String,
        pub exclude_glob: String,
    }

    impl Default for ScanDefaults {
        fn default() -> Self {
            Self {
                max_depth: DEFAULT_MAX_DEPTH,
                include_hidden: false,
                include_glob: DEFAULT_INCLUDE_GLOB.into(),
                exclude_glob: DEFAULT_EXCLUDE_GLOB.into(),
            }
        }
    }

    impl ScanDefaults {
        pub fn to_scan_options(&self, roots: Vec<PathBuf>) -> ScanOptions {
            ScanOptions {
                roots,
                max_depth: self.max_depth,
                include_hidden: self.include_hidden,
                include_glob: self.include_glob.clone(),
                exclude_glob: self.exclude_glob.clone(),
                min_size_bytes: None,
                max_size_bytes: None,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(default)]
    pub struct AppSettings {
        /// Free-form instruction prepended to the planner system prompt.
        pub default_prompt: String,
        /// Label shown to the model for the destination folder.
        pub destination_root_label: String,
        pub provider_preference: Vec<String>, // e.g., ["ollama", "openai"]
        pub ollama: ProviderSettings,
        pub openai: ProviderSettings,
        pub anthropic: ProviderSettings,
        pub gemini: ProviderSettings,
        pub hugging_face: ProviderSettings,
        pub scan: ScanDefaults,
        pub extraction: ExtractorOptions,
        pub organization: OrganizationConfiguration,
    }

    impl Default for AppSettings {
        fn default() -> Self {
            let mut hugging_face =
                ProviderSettings::new("https://huggingface.co/api/models", "");
            hugging_face.enabled = false;
            Self {
                default_prompt: "You are an assistant that organizes files. Return ONLY valid JSON matching the requested schema.".into(),
                destination_root_label: "Organized".into(),
                provider_preference: vec!["ollama".into(), "openai".into()],
                ollama: ProviderSettings::new("http://localhost:11434", "llama3.2"),
                openai: ProviderSettings::new("https://api.openai.com/v1", "gpt-4o-mini"),
                anthropic: ProviderSettings::new("https://api.anthropic.com/v1", "claude-3-5-sonnet-20241022"),
                gemini: ProviderSettings::new(
                    "https://generativelanguage.googleapis.com/v1beta",
                    "gemini-1.5-flash",
                ),
                hugging_face,
                scan: ScanDefaults::default(),
                extraction: ExtractorOptions::default(),
                organization: OrganizationConfiguration::default(),
            }
        }
    }

    impl AppSettings {
        /// Marks which providers have a credential available in `secrets`.
        pub fn sync_key_flags(&mut self, secrets: &dyn SecretStore) {
            self.openai.has_api_key = secrets.get(SecretKeys::OPENAI_API_KEY).is_some();
            self.hugging_face.has_api_key = secrets.get(SecretKeys::HUGGING_FACE_TOKEN).is_some();
            self.gemini.has_api_key = secrets.get(SecretKeys::GOOGLE_GEMINI_API_KEY).is_some();
            self.anthropic.has_api_key = secrets.get(SecretKeys::ANTHROPIC_API_KEY).is_some();
        }
    }

}
