//! Five-element (wuxing) relationships and fortune scoring.
//!
//! Relationships are directional: `relationship(a, b)` only asks whether `a`
//! generates or destroys `b`. Neither cycle is its own inverse, so
//! `relationship(b, a)` is generally different.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hexagram::Hexagram;
use crate::types::{Element, FortuneCategory};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Score every analysis starts from.
pub const BASE_SCORE: i32 = 50;
/// Bonus when the three dominant elements are pairwise distinct.
pub const DIVERSITY_BONUS: i32 = 10;

/// (positive, negative) score deltas for each edge of the analysis.
const PRIMARY_TO_MUTUAL: (i32, i32) = (20, -15);
const PRIMARY_TO_TRANSFORMED: (i32, i32) = (25, -20);
const MUTUAL_TO_TRANSFORMED: (i32, i32) = (15, -10);

/// Traditional correspondences of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElementProperties {
    pub nature: &'static str,
    pub season: &'static str,
    pub direction: &'static str,
    pub color: &'static str,
    pub emotion: &'static str,
    pub organ: &'static str,
    pub characteristics: [&'static str; 4],
}

static METAL: ElementProperties = ElementProperties {
    nature: "收敛",
    season: "秋",
    direction: "西",
    color: "白",
    emotion: "悲",
    organ: "肺",
    characteristics: ["坚硬", "肃杀", "收敛", "清洁"],
};

static WOOD: ElementProperties = ElementProperties {
    nature: "生发",
    season: "春",
    direction: "东",
    color: "青",
    emotion: "怒",
    organ: "肝",
    characteristics: ["生长", "条达", "舒畅", "向上"],
};

static WATER: ElementProperties = ElementProperties {
    nature: "润下",
    season: "冬",
    direction: "北",
    color: "黑",
    emotion: "恐",
    organ: "肾",
    characteristics: ["寒冷", "向下", "滋润", "藏匿"],
};

static FIRE: ElementProperties = ElementProperties {
    nature: "炎上",
    season: "夏",
    direction: "南",
    color: "红",
    emotion: "喜",
    organ: "心",
    characteristics: ["炎热", "向上", "光明", "温暖"],
};

static EARTH: ElementProperties = ElementProperties {
    nature: "稼穑",
    season: "长夏",
    direction: "中",
    color: "黄",
    emotion: "思",
    organ: "脾",
    characteristics: ["承载", "生化", "包容", "稳定"],
};

impl Element {
    /// The element this one generates: metal → water → wood → fire → earth → metal.
    pub fn generates(&self) -> Element {
        match self {
            Self::Metal => Self::Water,
            Self::Water => Self::Wood,
            Self::Wood => Self::Fire,
            Self::Fire => Self::Earth,
            Self::Earth => Self::Metal,
        }
    }

    /// The element this one destroys: metal → wood → earth → water → fire → metal.
    pub fn destroys(&self) -> Element {
        match self {
            Self::Metal => Self::Wood,
            Self::Wood => Self::Earth,
            Self::Earth => Self::Water,
            Self::Water => Self::Fire,
            Self::Fire => Self::Metal,
        }
    }

    /// The element that generates this one.
    pub fn generated_by(&self) -> Element {
        Element::ALL
            .into_iter()
            .find(|e| e.generates() == *self)
            .unwrap_or(*self)
    }

    /// The element that destroys this one.
    pub fn destroyed_by(&self) -> Element {
        Element::ALL
            .into_iter()
            .find(|e| e.destroys() == *self)
            .unwrap_or(*self)
    }

    pub fn properties(&self) -> &'static ElementProperties {
        match self {
            Self::Metal => &METAL,
            Self::Wood => &WOOD,
            Self::Water => &WATER,
            Self::Fire => &FIRE,
            Self::Earth => &EARTH,
        }
    }

    /// Five-step walk along the generation cycle, starting here.
    pub fn generation_chain(&self) -> [Element; 5] {
        let mut chain = [*self; 5];
        for i in 1..5 {
            chain[i] = chain[i - 1].generates();
        }
        chain
    }

    /// Five-step walk along the destruction cycle, starting here.
    pub fn destruction_chain(&self) -> [Element; 5] {
        let mut chain = [*self; 5];
        for i in 1..5 {
            chain[i] = chain[i - 1].destroys();
        }
        chain
    }
}

/// Kind of relationship from one element to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Generation,
    Destruction,
    Same,
    Neutral,
}

/// Effect a relationship has on the fortune score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Positive,
    Negative,
    Stable,
    Neutral,
}

/// Directional relationship between two elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: Element,
    pub to: Element,
    pub kind: RelationshipKind,
    pub effect: Effect,
}

impl Relationship {
    /// Classify `from → to`. Generation is checked first, then destruction,
    /// then identity.
    pub fn between(from: Element, to: Element) -> Self {
        let (kind, effect) = if from.generates() == to {
            (RelationshipKind::Generation, Effect::Positive)
        } else if from.destroys() == to {
            (RelationshipKind::Destruction, Effect::Negative)
        } else if from == to {
            (RelationshipKind::Same, Effect::Stable)
        } else {
            (RelationshipKind::Neutral, Effect::Neutral)
        };
        Self { from, to, kind, effect }
    }

    /// Single-character verb: 生, 克, 同 or 平.
    pub fn meaning(&self) -> &'static str {
        match self.kind {
            RelationshipKind::Generation => "生",
            RelationshipKind::Destruction => "克",
            RelationshipKind::Same => "同",
            RelationshipKind::Neutral => "平",
        }
    }

    pub fn description(&self) -> String {
        match self.kind {
            RelationshipKind::Neutral => {
                format!("{}与{}无直接关系", self.from.chinese(), self.to.chinese())
            }
            _ => format!("{}{}{}", self.from.chinese(), self.meaning(), self.to.chinese()),
        }
    }

    fn delta(&self, (positive, negative): (i32, i32)) -> i32 {
        match self.effect {
            Effect::Positive => positive,
            Effect::Negative => negative,
            Effect::Stable | Effect::Neutral => 0,
        }
    }
}

/// The three relationships examined for a cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationships {
    pub primary_to_mutual: Relationship,
    pub primary_to_transformed: Relationship,
    pub mutual_to_transformed: Relationship,
}

/// Output of the five-element analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementAnalysis {
    pub primary: Element,
    pub mutual: Element,
    pub transformed: Element,
    pub relationships: Relationships,
    pub score: i32,
    pub fortune: FortuneCategory,
    /// Relative weight of each element among the three hexagrams
    pub strength: BTreeMap<Element, f32>,
    pub analysis: String,
    pub advice: String,
}

/// Whether no element dominates: max count − min count ≤ 1 among those present.
pub fn is_balanced(elements: &[Element]) -> bool {
    let mut counts: BTreeMap<Element, usize> = BTreeMap::new();
    for element in elements {
        *counts.entry(*element).or_insert(0) += 1;
    }
    match (counts.values().max(), counts.values().min()) {
        (Some(max), Some(min)) => max - min <= 1,
        _ => true,
    }
}

/// Scores the elemental relationships between three hexagrams.
pub struct ElementAnalyzer;

impl ElementAnalyzer {
    /// Analyze primary, mutual and transformed hexagrams by their dominant elements.
    pub fn analyze(primary: &Hexagram, mutual: &Hexagram, transformed: &Hexagram) -> ElementAnalysis {
        Self::analyze_elements(primary.element, mutual.element, transformed.element)
    }

    /// Same as [`ElementAnalyzer::analyze`], starting from the elements directly.
    pub fn analyze_elements(primary: Element, mutual: Element, transformed: Element) -> ElementAnalysis {
        let relationships = Relationships {
            primary_to_mutual: Relationship::between(primary, mutual),
            primary_to_transformed: Relationship::between(primary, transformed),
            mutual_to_transformed: Relationship::between(mutual, transformed),
        };

        let score = Self::score(&relationships, [primary, mutual, transformed]);
        let fortune = FortuneCategory::from_score(score);

        debug!(
            primary = %primary,
            mutual = %mutual,
            transformed = %transformed,
            score,
            fortune = %fortune,
            "Five-element analysis"
        );

        ElementAnalysis {
            primary,
            mutual,
            transformed,
            relationships,
            score,
            fortune,
            strength: Self::strength([primary, mutual, transformed]),
            analysis: Self::analysis_text(&relationships, fortune),
            advice: Self::advice_text(&relationships, fortune),
        }
    }

    /// Fortune score for a set of relationships.
    pub fn score(relationships: &Relationships, elements: [Element; 3]) -> i32 {
        let mut score = BASE_SCORE;
        score += relationships.primary_to_mutual.delta(PRIMARY_TO_MUTUAL);
        score += relationships.primary_to_transformed.delta(PRIMARY_TO_TRANSFORMED);
        score += relationships.mutual_to_transformed.delta(MUTUAL_TO_TRANSFORMED);

        let [a, b, c] = elements;
        if a != b && b != c && a != c {
            score += DIVERSITY_BONUS;
        }
        score
    }

    /// Presence of each element, nudged by the others generating (+0.5) or
    /// destroying (−0.3) it. Never negative.
    pub fn strength(elements: [Element; 3]) -> BTreeMap<Element, f32> {
        Element::ALL
            .into_iter()
            .map(|element| {
                let mut power = elements.iter().filter(|&&e| e == element).count() as f32;
                for other in &elements {
                    if other.generates() == element {
                        power += 0.5;
                    }
                    if other.destroys() == element {
                        power -= 0.3;
                    }
                }
                (element, power.max(0.0))
            })
            .collect()
    }

    fn analysis_text(relationships: &Relationships, fortune: FortuneCategory) -> String {
        let mut parts = Vec::new();

        match relationships.primary_to_mutual.effect {
            Effect::Positive => parts.push("当前状态向好的方向发展"),
            Effect::Negative => parts.push("当前状态面临一些阻力"),
            _ => {}
        }
        match relationships.primary_to_transformed.effect {
            Effect::Positive => parts.push("最终结果较为理想"),
            Effect::Negative => parts.push("需要注意最终结果的变化"),
            _ => {}
        }
        parts.push(match fortune {
            FortuneCategory::Excellent => "五行配合极佳，大吉之象",
            FortuneCategory::Good => "五行配合良好，吉利之象",
            FortuneCategory::Neutral => "五行配合平平，需要努力",
            FortuneCategory::Poor => "五行配合不佳，需要谨慎",
            FortuneCategory::Bad => "五行冲突严重，需要化解",
        });

        parts.join("；")
    }

    fn advice_text(relationships: &Relationships, fortune: FortuneCategory) -> String {
        let mut parts = Vec::new();

        if relationships.primary_to_mutual.kind == RelationshipKind::Destruction {
            parts.push("当前阶段宜以柔克刚，避免硬碰硬");
        }
        if relationships.primary_to_transformed.kind == RelationshipKind::Generation {
            parts.push("坚持当前方向，会有好的结果");
        }
        parts.push(match fortune {
            FortuneCategory::Excellent => "时机极佳，可大胆行动",
            FortuneCategory::Good => "时机良好，可积极推进",
            FortuneCategory::Neutral => "保持稳定，循序渐进",
            FortuneCategory::Poor => "宜守不宜攻，等待时机",
            FortuneCategory::Bad => "暂停行动，寻求化解之道",
        });

        parts.join("；")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Element::*;

    #[test]
    fn test_cycles_visit_every_element() {
        for element in Element::ALL {
            let mut generated = element.generation_chain().to_vec();
            generated.sort();
            generated.dedup();
            assert_eq!(generated.len(), 5);

            let mut destroyed = element.destruction_chain().to_vec();
            destroyed.sort();
            destroyed.dedup();
            assert_eq!(destroyed.len(), 5);

            assert_eq!(element.generates().generated_by(), element);
            assert_eq!(element.destroys().destroyed_by(), element);
        }
    }

    #[test]
    fn test_relationship_classification() {
        assert_eq!(Relationship::between(Metal, Water).kind, RelationshipKind::Generation);
        assert_eq!(Relationship::between(Metal, Wood).kind, RelationshipKind::Destruction);
        assert_eq!(Relationship::between(Fire, Fire).kind, RelationshipKind::Same);
        assert_eq!(Relationship::between(Metal, Fire).kind, RelationshipKind::Neutral);
    }

    #[test]
    fn test_relationship_is_directional() {
        let forward = Relationship::between(Metal, Wood);
        let backward = Relationship::between(Wood, Metal);
        assert_eq!(forward.kind, RelationshipKind::Destruction);
        assert_eq!(backward.kind, RelationshipKind::Neutral);
        assert_eq!(backward.effect, Effect::Neutral);
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(Relationship::between(Water, Wood).description(), "水生木");
        assert_eq!(Relationship::between(Water, Fire).description(), "水克火");
        assert_eq!(Relationship::between(Earth, Earth).description(), "土同土");
        assert_eq!(Relationship::between(Wood, Metal).description(), "木与金无直接关系");
    }

    #[test]
    fn test_all_same_scores_base() {
        let analysis = ElementAnalyzer::analyze_elements(Metal, Metal, Metal);
        assert_eq!(analysis.score, 50);
        assert_eq!(analysis.fortune, FortuneCategory::Neutral);
    }

    #[test]
    fn test_mixed_chain_with_diversity_bonus() {
        // metal → water (+20), metal → wood destroys (−20), water → wood (+15), distinct (+10)
        let analysis = ElementAnalyzer::analyze_elements(Metal, Water, Wood);
        assert_eq!(analysis.score, 50 + 20 - 20 + 15 + 10);
        assert_eq!(analysis.fortune, FortuneCategory::Good);
    }

    #[test]
    fn test_excellent_and_bad_extremes() {
        // wood → fire (+20), wood → fire (+25), fire → fire same
        let analysis = ElementAnalyzer::analyze_elements(Wood, Fire, Fire);
        assert_eq!(analysis.score, 95);
        assert_eq!(analysis.fortune, FortuneCategory::Excellent);

        // metal → wood (−15), metal → wood (−20), wood → wood same
        let analysis = ElementAnalyzer::analyze_elements(Metal, Wood, Wood);
        assert_eq!(analysis.score, 15);
        assert_eq!(analysis.fortune, FortuneCategory::Bad);
        assert!(analysis.advice.contains("以柔克刚"));
    }

    #[test]
    fn test_analysis_and_advice_text() {
        let analysis = ElementAnalyzer::analyze_elements(Wood, Fire, Fire);
        assert_eq!(analysis.analysis, "当前状态向好的方向发展；最终结果较为理想；五行配合极佳，大吉之象");
        assert_eq!(analysis.advice, "坚持当前方向，会有好的结果；时机极佳，可大胆行动");

        let analysis = ElementAnalyzer::analyze_elements(Metal, Wood, Wood);
        assert_eq!(analysis.analysis, "当前状态面临一些阻力；需要注意最终结果的变化；五行冲突严重，需要化解");
        assert_eq!(analysis.advice, "当前阶段宜以柔克刚，避免硬碰硬；暂停行动，寻求化解之道");

        let analysis = ElementAnalyzer::analyze_elements(Metal, Metal, Metal);
        assert_eq!(analysis.analysis, "五行配合平平，需要努力");
        assert_eq!(analysis.advice, "保持稳定，循序渐进");
    }

    #[test]
    fn test_strength() {
        let strength = ElementAnalyzer::strength([Metal, Metal, Water]);
        // metal: 2 present; water: 1 present + 0.5 × 2 generated by metal
        assert!((strength[&Metal] - 2.0).abs() < 1e-6);
        assert!((strength[&Water] - 2.0).abs() < 1e-6);
        // wood: destroyed twice by metal, generated once by water → 0.5 − 0.6 floored to 0
        assert_eq!(strength[&Wood], 0.0);
    }

    #[test]
    fn test_balance() {
        assert!(is_balanced(&[Metal, Wood, Water]));
        assert!(is_balanced(&[Metal, Metal, Wood]));
        assert!(!is_balanced(&[Metal, Metal, Metal, Wood]));
        assert!(is_balanced(&[]));
    }

    #[test]
    fn test_properties() {
        assert_eq!(Fire.properties().season, "夏");
        assert_eq!(Earth.properties().direction, "中");
    }
}
