//! Secret lookup by key. Persistent secret storage is provided by the host.

use std::env;

pub struct SecretKeys;

impl SecretKeys {
    pub const OPENAI_API_KEY: &'static str = "openai.api_key";
    pub const HUGGING_FACE_TOKEN: &'static str = "huggingface.token";
    pub const GOOGLE_GEMINI_API_KEY: &'static str = "google.gemini.api_key";
    pub const ANTHROPIC_API_KEY: &'static str = "anthropic.api_key";
}

pub trait SecretStore: Send + Sync {
    /// Returns `None` for unknown keys and for blank values.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads secrets from the process environment.
///
/// `openai.api_key` is looked up as `OPENAI_API_KEY`.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretStore {
    prefix: Option<String>,
}

impl EnvSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `prefix_` to every variable name.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    pub fn variable_name(&self, key: &str) -> String {
        let base: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        match &self.prefix {
            Some(p) => format!("{}_{}", p.to_ascii_uppercase(), base),
            None => base,
        }
    }
}

impl SecretStore for EnvSecretStore {
    fn get(&self, key: &str) -> Option<String> {
        env::var(self.variable_name(key))
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_keys_to_variable_names() {
        let store = EnvSecretStore::new();
        assert_eq!(store.variable_name(SecretKeys::OPENAI_API_KEY), "OPENAI_API_KEY");
        assert_eq!(
            store.variable_name(SecretKeys::GOOGLE_GEMINI_API_KEY),
            "GOOGLE_GEMINI_API_KEY"
        );
        let prefixed = EnvSecretStore::with_prefix("organizer");
        assert_eq!(
            prefixed.variable_name(SecretKeys::HUGGING_FACE_TOKEN),
            "ORGANIZER_HUGGINGFACE_TOKEN"
        );
    }

    #[test]
    fn blank_values_are_absent() {
        let store = EnvSecretStore::with_prefix("organizer_secret_test");
        env::set_var("ORGANIZER_SECRET_TEST_ANTHROPIC_API_KEY", "   ");
        assert_eq!(store.get(SecretKeys::ANTHROPIC_API_KEY), None);
        env::set_var("ORGANIZER_SECRET_TEST_ANTHROPIC_API_KEY", " sk-test ");
        assert_eq!(store.get(SecretKeys::ANTHROPIC_API_KEY).as_deref(), Some("sk-test"));
        env::remove_var("ORGANIZER_SECRET_TEST_ANTHROPIC_API_KEY");
    }
}
