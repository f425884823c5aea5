//! Configuration for the divination engine.

use serde::{Deserialize, Serialize};

use crate::interpretation::PlaceholderFortune;

/// Engine limits and table policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum question length, in characters
    pub max_question_chars: usize,
    /// Upper bound for each number in a number cast
    pub max_number: u32,
    /// Fortune policy for hexagrams without curated text
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub placeholder_fortune: PlaceholderFortune,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_question_chars: 500,
            max_number: 999,
            placeholder_fortune: PlaceholderFortune::ById,
        }
    }
}

impl EngineConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn with_max_number(mut self, max_number: u32) -> Self {
        self.max_number = max_number;
        self
    }

    pub fn with_placeholder_fortune(mut self, policy: PlaceholderFortune) -> Self {
        self.placeholder_fortune = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_question_chars, 500);
        assert_eq!(config.max_number, 999);
        assert_eq!(config.placeholder_fortune, PlaceholderFortune::ById);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = EngineConfig::default()
            .with_max_number(100)
            .with_placeholder_fortune(PlaceholderFortune::Seeded(42));
        let yaml = config.to_yaml().unwrap();
        let parsed = EngineConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = EngineConfig::from_yaml("max_number: 64\n").unwrap();
        assert_eq!(config.max_number, 64);
        assert_eq!(config.max_question_chars, 500);

        let config = EngineConfig::from_yaml("placeholder_fortune:\n  seeded: 9\n").unwrap();
        assert_eq!(config.placeholder_fortune, PlaceholderFortune::Seeded(9));

        let config = EngineConfig::from_yaml("placeholder_fortune: entropy\n").unwrap();
        assert_eq!(config.placeholder_fortune, PlaceholderFortune::Entropy);
    }

    #[test]
    fn test_seeded_policy_written_as_map() {
        let yaml = EngineConfig::default()
            .with_placeholder_fortune(PlaceholderFortune::Seeded(9))
            .to_yaml()
            .unwrap();
        assert!(yaml.contains("placeholder_fortune:\n  seeded: 9"));
    }
}
