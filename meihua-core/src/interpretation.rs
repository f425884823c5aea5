//! Textual interpretations of the sixty-four hexagrams.
//!
//! A handful of hexagrams carry curated text. The rest are synthesized from the
//! name table and flagged `complete: false`. The fortune tag of a synthesized
//! entry is chosen by an explicit [`PlaceholderFortune`] policy so the engine
//! stays reproducible unless a caller opts into entropy.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hexagram::{self, Bagua};
use crate::types::{DivinationError, FortuneCategory, QuestionCategory, Result};

/// Relevance weights used by [`InterpretationDatabase::search`].
const NAME_WEIGHT: u32 = 10;
const KEYWORD_WEIGHT: u32 = 5;
const GENERAL_WEIGHT: u32 = 3;

/// Fortunes a placeholder entry may receive.
const PLACEHOLDER_FORTUNES: [FortuneCategory; 4] = [
    FortuneCategory::Excellent,
    FortuneCategory::Good,
    FortuneCategory::Neutral,
    FortuneCategory::Poor,
];

/// How synthesized entries get their fortune tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderFortune {
    /// Fixed function of the hexagram id
    #[default]
    ById,
    /// Pseudo-random, reproducible for a given seed
    Seeded(u64),
    /// Fresh randomness on every database build
    Entropy,
}

/// Interpretation of one hexagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexagramEntry {
    pub id: u8,
    pub name: String,
    pub judgment: String,
    pub commentary: String,
    pub image: String,
    pub keywords: Vec<String>,
    pub fortune: FortuneCategory,
    pub meaning: BTreeMap<QuestionCategory, String>,
    /// False for synthesized placeholder content
    pub complete: bool,
}

impl HexagramEntry {
    /// Advice for a question domain, falling back to the general meaning.
    pub fn meaning_for(&self, category: QuestionCategory) -> &str {
        self.meaning
            .get(&category)
            .or_else(|| self.meaning.get(&QuestionCategory::General))
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn general(&self) -> &str {
        self.meaning_for(QuestionCategory::General)
    }
}

struct Curated {
    id: u8,
    judgment: &'static str,
    commentary: &'static str,
    image: &'static str,
    keywords: [&'static str; 4],
    fortune: FortuneCategory,
    /// career, relationship, health, wealth, study, general
    meaning: [&'static str; 6],
}

static CURATED: [Curated; 5] = [
    Curated {
        id: 1,
        judgment: "乾：元，亨，利，贞。",
        commentary: "大哉乾元，万物资始，乃统天。",
        image: "天行健，君子以自强不息。",
        keywords: ["刚健", "领导", "创始", "成功"],
        fortune: FortuneCategory::Excellent,
        meaning: [
            "事业蒸蒸日上，仍需持续发力",
            "感情稳步向前，切忌过于强势",
            "身体强健，精力充沛",
            "财路亨通，投资有利",
            "学业进步显著，宜立高远之志",
            "刚健中正，自强不息，大吉大利",
        ],
    },
    Curated {
        id: 2,
        judgment: "坤：元，亨，利牝马之贞。",
        commentary: "至哉坤元，万物资生，乃顺承天。",
        image: "地势坤，君子以厚德载物。",
        keywords: ["柔顺", "承载", "包容", "稳定"],
        fortune: FortuneCategory::Good,
        meaning: [
            "宜辅佐他人成事，不宜独挑大梁",
            "感情和顺，以柔克刚",
            "留意脾胃，宜静心调养",
            "财运平稳，理财宜守",
            "踏实积累，循序渐进",
            "柔顺承载，厚德载物，顺势而为",
        ],
    },
    Curated {
        id: 3,
        judgment: "屯：元亨，利贞，勿用，有攸往，利建侯。",
        commentary: "屯，刚柔始交而难生。",
        image: "云雷屯，君子以经纶。",
        keywords: ["困难", "初始", "坚持", "建立"],
        fortune: FortuneCategory::Neutral,
        meaning: [
            "创业之初阻碍重重，需耐心经营",
            "感情起步多波折，需要磨合",
            "偶有小恙，注意调养",
            "初期财运不顺，后期渐有起色",
            "入门艰难，打好基础方能突破",
            "万事开头难，坚持下去终有所成",
        ],
    },
    Curated {
        id: 4,
        judgment: "蒙：亨。匪我求童蒙，童蒙求我。",
        commentary: "蒙，山下有险，险而止，蒙。",
        image: "山下出泉，蒙；君子以果行育德。",
        keywords: ["启蒙", "学习", "指导", "成长"],
        fortune: FortuneCategory::Neutral,
        meaning: [
            "需要学习新技能，主动寻求指点",
            "感情需多沟通，增进理解",
            "关注心理状态，保持开放心态",
            "理财知识尚浅，不宜冒进",
            "虚心求教，良师可遇",
            "启蒙求学，在指导中成长",
        ],
    },
    Curated {
        id: 5,
        judgment: "需：有孚，光亨，贞吉，利涉大川。",
        commentary: "需，须也，险在前也。",
        image: "云上于天，需；君子以饮食宴乐。",
        keywords: ["等待", "耐心", "准备", "时机"],
        fortune: FortuneCategory::Neutral,
        meaning: [
            "时机未到，宜蓄力准备",
            "感情需要时间培养",
            "身体宜调养，不可过劳",
            "财运需等待，不宜急进",
            "厚积薄发，考试宜提前准备",
            "耐心等待时机，终有所获",
        ],
    },
];

impl Curated {
    fn to_entry(&self, name: &str) -> HexagramEntry {
        HexagramEntry {
            id: self.id,
            name: name.to_string(),
            judgment: self.judgment.to_string(),
            commentary: self.commentary.to_string(),
            image: self.image.to_string(),
            keywords: self.keywords.iter().map(|k| k.to_string()).collect(),
            fortune: self.fortune,
            meaning: QuestionCategory::ALL
                .into_iter()
                .zip(self.meaning.iter().map(|m| m.to_string()))
                .collect(),
            complete: true,
        }
    }
}

fn placeholder(id: u8, name: &str, fortune: FortuneCategory) -> HexagramEntry {
    let meaning = QuestionCategory::ALL
        .into_iter()
        .map(|category| {
            let text = match category {
                QuestionCategory::General => format!("{name}的总体含义"),
                other => format!("{name}在{}方面的提示", other.description()),
            };
            (category, text)
        })
        .collect();

    HexagramEntry {
        id,
        name: name.to_string(),
        judgment: format!("{name}：卦辞待补。"),
        commentary: format!("{name}的彖辞解释。"),
        image: format!("{name}的象辞说明。"),
        keywords: vec!["待完善".to_string()],
        fortune,
        meaning,
        complete: false,
    }
}

/// A keyword search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: u8,
    pub name: String,
    pub relevance: u32,
}

/// Summary counts over the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterpretationStats {
    pub total: usize,
    pub curated: usize,
    pub synthesized: usize,
    pub by_fortune: BTreeMap<FortuneCategory, usize>,
}

/// Immutable interpretation table for all 64 hexagrams.
#[derive(Debug, Clone)]
pub struct InterpretationDatabase {
    entries: Vec<HexagramEntry>,
    policy: PlaceholderFortune,
}

impl Default for InterpretationDatabase {
    fn default() -> Self {
        Self::new(&Bagua::standard(), PlaceholderFortune::default())
    }
}

impl InterpretationDatabase {
    /// Build the table, synthesizing every non-curated entry under `policy`.
    pub fn new(bagua: &Bagua, policy: PlaceholderFortune) -> Self {
        let mut rng = match policy {
            PlaceholderFortune::ById => None,
            PlaceholderFortune::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
            PlaceholderFortune::Entropy => Some(StdRng::from_entropy()),
        };

        let entries: Vec<HexagramEntry> = (1..=64u8)
            .map(|id| {
                // ids 1..=64 are always present in the name table
                let name = bagua.name(id).map(|(name, _)| name).unwrap_or_default();
                match CURATED.iter().find(|c| c.id == id) {
                    Some(curated) => curated.to_entry(name),
                    None => {
                        let fortune = match rng.as_mut() {
                            Some(rng) => PLACEHOLDER_FORTUNES[rng.gen_range(0..PLACEHOLDER_FORTUNES.len())],
                            None => PLACEHOLDER_FORTUNES[(id as usize - 1) % PLACEHOLDER_FORTUNES.len()],
                        };
                        placeholder(id, name, fortune)
                    }
                }
            })
            .collect();

        debug!(
            policy = ?policy,
            curated = CURATED.len(),
            "Interpretation database built"
        );

        Self { entries, policy }
    }

    pub fn policy(&self) -> PlaceholderFortune {
        self.policy
    }

    /// Whether `id` has an entry.
    pub fn is_valid_id(&self, id: u8) -> bool {
        hexagram::is_valid_id(id) && (id as usize) <= self.entries.len()
    }

    /// Interpretation for a hexagram id.
    pub fn lookup(&self, id: u8) -> Result<&HexagramEntry> {
        if !hexagram::is_valid_id(id) {
            return Err(DivinationError::InvalidInput(format!(
                "hexagram id must be in 1..=64, got {id}"
            )));
        }
        self.entries.get((id - 1) as usize).ok_or_else(|| {
            DivinationError::InternalInconsistency(format!("interpretation for {id} missing"))
        })
    }

    /// Entries matching `keyword`, most relevant first, ties by id.
    ///
    /// Relevance adds 10 for a name match, 5 for a keyword-tag match and 3 for
    /// a match in the general meaning.
    pub fn search(&self, keyword: &str) -> Vec<SearchHit> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let mut relevance = 0;
                if entry.name.contains(keyword) {
                    relevance += NAME_WEIGHT;
                }
                if entry.keywords.iter().any(|k| k.contains(keyword)) {
                    relevance += KEYWORD_WEIGHT;
                }
                if entry.general().contains(keyword) {
                    relevance += GENERAL_WEIGHT;
                }
                (relevance > 0).then(|| SearchHit {
                    id: entry.id,
                    name: entry.name.clone(),
                    relevance,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.relevance.cmp(&a.relevance).then(a.id.cmp(&b.id)));
        hits
    }

    /// All entries tagged with the given fortune.
    pub fn by_fortune(&self, fortune: FortuneCategory) -> Vec<&HexagramEntry> {
        self.entries.iter().filter(|e| e.fortune == fortune).collect()
    }

    /// (id, name) for every hexagram.
    pub fn names(&self) -> Vec<(u8, &str)> {
        self.entries.iter().map(|e| (e.id, e.name.as_str())).collect()
    }

    pub fn statistics(&self) -> InterpretationStats {
        let mut by_fortune: BTreeMap<FortuneCategory, usize> =
            FortuneCategory::ALL.into_iter().map(|f| (f, 0)).collect();
        for entry in &self.entries {
            *by_fortune.entry(entry.fortune).or_insert(0) += 1;
        }
        let curated = self.entries.iter().filter(|e| e.complete).count();

        InterpretationStats {
            total: self.entries.len(),
            curated,
            synthesized: self.entries.len() - curated,
            by_fortune,
        }
    }
}
