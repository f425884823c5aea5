//! CLI configuration

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use meihua_core::EngineConfig;
use meihua_narrative::NarrativeConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub narrative: NarrativeConfig,
    /// Owner id recorded on saved divinations
    pub owner_id: String,
}

impl AppConfig {
    /// Read `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default().with_default_owner());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config.with_default_owner())
    }

    fn with_default_owner(mut self) -> Self {
        if self.owner_id.is_empty() {
            self.owner_id = "local".to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meihua_core::PlaceholderFortune;
    use meihua_narrative::Provider;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("meihua.yaml")).unwrap();
        assert_eq!(config.engine, EngineConfig::default());
        assert!(!config.narrative.enabled);
        assert_eq!(config.owner_id, "local");
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
owner_id: alice
engine:
  max_number: 100
  placeholder_fortune:
    seeded: 7
narrative:
  enabled: true
  provider: openai
  model: gpt-4o-mini
  api_key_env: OPENAI_API_KEY
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.owner_id, "alice");
        assert_eq!(config.engine.max_number, 100);
        assert_eq!(config.engine.max_question_chars, 500);
        assert_eq!(config.engine.placeholder_fortune, PlaceholderFortune::Seeded(7));
        assert!(config.narrative.enabled);
        assert_eq!(config.narrative.provider, Provider::OpenAi);
        assert_eq!(config.narrative.max_tokens, 1000);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "engine: [not, a, map]").unwrap();
        assert!(AppConfig::load(file.path()).is_err());
    }
}
