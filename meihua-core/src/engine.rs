//! The divination engine: validates a request, casts, derives the three
//! hexagrams, scores them and attaches the basic interpretation.
//!
//! ## Example
//!
//! ```rust
//! use meihua_core::{DivinationEngine, DivinationParams};
//!
//! let engine = DivinationEngine::new();
//! let result = engine
//!     .perform_divination("今年的事业如何？", "number", &DivinationParams::numbers(9, 17))
//!     .unwrap();
//!
//! assert_eq!(result.primary.id, 1);
//! assert_eq!(result.transformed.name, "天火同人");
//! ```

use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, info_span};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::derivation::{
    self, Cast, Clock, DivinationParams, MethodKind, SeedMethod, SystemClock,
};
use crate::elements::{ElementAnalysis, ElementAnalyzer, RelationshipKind, Relationships};
use crate::hexagram::{Bagua, Hexagram};
use crate::interpretation::{HexagramEntry, InterpretationDatabase};
use crate::types::{DivinationError, FortuneCategory, Result};

/// Interpretation assembled from the lookup table for one cast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicInterpretation {
    pub summary: String,
    pub primary: HexagramEntry,
    pub transformed: HexagramEntry,
    pub fortune: FortuneCategory,
    pub timing: String,
    pub advice: String,
}

impl BasicInterpretation {
    fn assemble(
        primary: &HexagramEntry,
        transformed: &HexagramEntry,
        relationships: &Relationships,
        fortune: FortuneCategory,
    ) -> Self {
        Self {
            summary: format!("本卦{}，变卦{}", primary.name, transformed.name),
            primary: primary.clone(),
            transformed: transformed.clone(),
            fortune,
            timing: timing_for(fortune).to_string(),
            advice: advice_for(relationships),
        }
    }
}

fn timing_for(fortune: FortuneCategory) -> &'static str {
    match fortune {
        FortuneCategory::Excellent => "时机极佳，宜立即行动",
        FortuneCategory::Good => "时机良好，可以行动",
        FortuneCategory::Neutral => "时机平平，需谨慎考虑",
        FortuneCategory::Poor => "时机不佳，宜等待",
        FortuneCategory::Bad => "时机凶险，不宜行动",
    }
}

fn advice_for(relationships: &Relationships) -> String {
    let mut parts = Vec::new();
    if relationships.primary_to_mutual.kind == RelationshipKind::Generation {
        parts.push("当前状态有利发展，可积极推进");
    }
    if relationships.primary_to_transformed.kind == RelationshipKind::Destruction {
        parts.push("需要注意变化中的阻力，做好应对准备");
    }
    if parts.is_empty() {
        parts.push("保持现状，顺其自然");
    }
    parts.join("；")
}

/// Complete output of one divination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DivinationResult {
    pub question: String,
    pub method: MethodKind,
    /// The seed actually used, including a clock reading for time casts
    pub seed: SeedMethod,
    pub cast: Cast,
    pub primary: Hexagram,
    pub mutual: Hexagram,
    pub transformed: Hexagram,
    pub moving_line: u8,
    pub element_analysis: ElementAnalysis,
    pub fortune: FortuneCategory,
    pub basic_interpretation: BasicInterpretation,
    /// Heuristic in 0.6..=0.95
    pub confidence: f64,
}

impl DivinationResult {
    /// Hex SHA-256 of the canonical JSON form.
    ///
    /// Equal for any two results built from the same seed and question.
    pub fn fingerprint(&self) -> Result<String> {
        let json = serde_json::to_vec(self).map_err(|e| {
            DivinationError::InternalInconsistency(format!("result not serializable: {e}"))
        })?;
        Ok(hex::encode(Sha256::digest(&json)))
    }
}

/// Confidence heuristic, in hundredths to keep the steps exact.
fn confidence(primary: u8, mutual: u8, transformed: u8) -> f64 {
    let mut hundredths: i32 = 80;
    if (i32::from(primary) - i32::from(transformed)).abs() > 32 {
        hundredths -= 10;
    }
    if (i32::from(primary) - i32::from(mutual)).abs() < 16 {
        hundredths += 10;
    }
    f64::from(hundredths.clamp(60, 95)) / 100.0
}

/// Entry point for performing divinations.
///
/// Holds read-only handles on the static tables and the clock; cloning is
/// cheap and clones share the interpretation database.
#[derive(Clone)]
pub struct DivinationEngine {
    bagua: Bagua,
    interpretations: Arc<InterpretationDatabase>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl Default for DivinationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DivinationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DivinationEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DivinationEngine {
    /// Engine with default configuration and the system clock.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let bagua = Bagua::standard();
        let interpretations = Arc::new(InterpretationDatabase::new(&bagua, config.placeholder_fortune));
        Self {
            bagua,
            interpretations,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the clock read by time casts without explicit parameters.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Share an existing interpretation database.
    pub fn with_interpretations(mut self, interpretations: Arc<InterpretationDatabase>) -> Self {
        self.interpretations = interpretations;
        self
    }

    pub fn bagua(&self) -> &Bagua {
        &self.bagua
    }

    pub fn interpretations(&self) -> &Arc<InterpretationDatabase> {
        &self.interpretations
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Perform a divination from an untyped method tag and its parameters.
    pub fn perform_divination(
        &self,
        question: &str,
        method: &str,
        params: &DivinationParams,
    ) -> Result<DivinationResult> {
        let seed = SeedMethod::resolve(method, params, self.clock.as_ref())?;
        self.perform(question, seed)
    }

    /// Perform a divination from a resolved seed.
    pub fn perform(&self, question: &str, seed: SeedMethod) -> Result<DivinationResult> {
        let span = info_span!(
            "divination",
            correlation_id = %Uuid::new_v4(),
            method = seed.kind().as_str()
        );
        let _enter = span.enter();

        let question = self.validate_question(question)?;
        let cast = derivation::cast(&seed, self.config.max_number)?;
        let hexagrams = derivation::derive_hexagrams(&self.bagua, &cast)?;
        let analysis = ElementAnalyzer::analyze(&hexagrams.primary, &hexagrams.mutual, &hexagrams.transformed);

        let primary_entry = self.interpretations.lookup(hexagrams.primary.id)?;
        let transformed_entry = self.interpretations.lookup(hexagrams.transformed.id)?;
        let basic_interpretation = BasicInterpretation::assemble(
            primary_entry,
            transformed_entry,
            &analysis.relationships,
            analysis.fortune,
        );

        let confidence = confidence(
            hexagrams.primary.id,
            hexagrams.mutual.id,
            hexagrams.transformed.id,
        );
        debug!(confidence, "Confidence computed");

        info!(
            primary = hexagrams.primary.id,
            mutual = hexagrams.mutual.id,
            transformed = hexagrams.transformed.id,
            moving_line = cast.moving_line,
            fortune = %analysis.fortune,
            "Divination complete"
        );

        Ok(DivinationResult {
            question,
            method: seed.kind(),
            seed,
            cast,
            moving_line: cast.moving_line,
            fortune: analysis.fortune,
            primary: hexagrams.primary,
            mutual: hexagrams.mutual,
            transformed: hexagrams.transformed,
            element_analysis: analysis,
            basic_interpretation,
            confidence,
        })
    }

    fn validate_question(&self, question: &str) -> Result<String> {
        let trimmed = question.trim();
        if trimmed.is_empty() {
            return Err(DivinationError::InvalidInput("question must not be empty".to_string()));
        }
        let chars = trimmed.chars().count();
        if chars > self.config.max_question_chars {
            return Err(DivinationError::InvalidInput(format!(
                "question is {chars} characters, limit is {}",
                self.config.max_question_chars
            )));
        }
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::{FixedClock, TimeSeed};
    use chrono::NaiveDate;

    #[test]
    fn test_number_scenario() {
        let engine = DivinationEngine::new();
        let result = engine
            .perform_divination("问事业", "number", &DivinationParams::numbers(9, 17))
            .unwrap();

        assert_eq!(result.primary.id, 1);
        assert_eq!(result.moving_line, 2);
        assert_eq!(result.transformed.lines, [1, 0, 1, 1, 1, 1]);
        assert_eq!(result.transformed.id, 13);
        assert_eq!(result.basic_interpretation.summary, "本卦乾为天，变卦天火同人");
        assert_eq!(result.method, MethodKind::Number);
    }

    #[test]
    fn test_question_validation() {
        let engine = DivinationEngine::new();
        let params = DivinationParams::numbers(1, 2);

        let err = engine.perform_divination("   ", "number", &params).unwrap_err();
        assert!(matches!(err, DivinationError::InvalidInput(_)));

        let long = "问".repeat(501);
        assert!(engine.perform_divination(&long, "number", &params).is_err());

        let limit = "问".repeat(500);
        assert!(engine.perform_divination(&limit, "number", &params).is_ok());

        let result = engine.perform_divination("  padded  ", "number", &params).unwrap();
        assert_eq!(result.question, "padded");
    }

    #[test]
    fn test_time_cast_reads_injected_clock() {
        let moment = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let engine = DivinationEngine::new().with_clock(Arc::new(FixedClock(moment)));

        let result = engine
            .perform_divination("问时运", "time", &DivinationParams::default())
            .unwrap();
        assert_eq!(result.seed, SeedMethod::Time(TimeSeed::new(2024, 3, 15, 10)));
        assert_eq!((result.cast.upper, result.cast.lower, result.cast.moving_line), (7, 1, 3));
    }

    #[test]
    fn test_unknown_method() {
        let engine = DivinationEngine::new();
        let err = engine
            .perform_divination("问", "tarot", &DivinationParams::numbers(1, 2))
            .unwrap_err();
        assert!(matches!(err, DivinationError::InvalidInput(_)));
    }

    #[test]
    fn test_confidence_heuristic() {
        assert_eq!(confidence(1, 1, 1), 0.9);
        assert_eq!(confidence(1, 40, 50), 0.7);
        assert_eq!(confidence(10, 30, 20), 0.8);
        assert_eq!(confidence(1, 5, 64), 0.8);
    }

    #[test]
    fn test_timing_by_fortune() {
        assert_eq!(timing_for(FortuneCategory::Excellent), "时机极佳，宜立即行动");
        assert_eq!(timing_for(FortuneCategory::Good), "时机良好，可以行动");
        assert_eq!(timing_for(FortuneCategory::Neutral), "时机平平，需谨慎考虑");
        assert_eq!(timing_for(FortuneCategory::Poor), "时机不佳，宜等待");
        assert_eq!(timing_for(FortuneCategory::Bad), "时机凶险，不宜行动");
    }

    #[test]
    fn test_advice_from_relationships() {
        let relationships = ElementAnalyzer::analyze_elements(
            crate::types::Element::Metal,
            crate::types::Element::Water,
            crate::types::Element::Wood,
        )
        .relationships;
        assert_eq!(
            advice_for(&relationships),
            "当前状态有利发展，可积极推进；需要注意变化中的阻力，做好应对准备"
        );
    }

    #[test]
    fn test_advice_defaults_to_steady() {
        let relationships = ElementAnalyzer::analyze_elements(
            crate::types::Element::Fire,
            crate::types::Element::Fire,
            crate::types::Element::Fire,
        )
        .relationships;
        assert_eq!(advice_for(&relationships), "保持现状，顺其自然");
    }
}
