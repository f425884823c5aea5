//! The eight trigrams (bagua) in Former Heaven numbering.
//!
//! Lines are stored bottom-to-top, `1` for a solid (yang) line and `0` for a
//! broken (yin) line. Reading the bottom line as the most significant bit gives
//! a 3-bit value `v`, and the trigram index is `8 - v`: 乾 (111) is 1 and
//! 坤 (000) is 8.

use serde::Serialize;
use tracing::error;

use crate::types::{DivinationError, Element, Result};

/// Descriptive attributes attached to a trigram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrigramAttributes {
    pub strength: &'static str,
    pub character: &'static str,
    pub season: &'static str,
}

/// One of the eight trigrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trigram {
    /// Former Heaven number, 1..=8
    pub index: u8,
    pub name: &'static str,
    pub pinyin: &'static str,
    pub symbol: &'static str,
    pub element: Element,
    pub nature: &'static str,
    pub direction: &'static str,
    pub attributes: TrigramAttributes,
    /// Bottom-to-top line pattern
    pub lines: [u8; 3],
}

pub static TRIGRAMS: [Trigram; 8] = [
    Trigram {
        index: 1,
        name: "乾",
        pinyin: "Qian",
        symbol: "☰",
        element: Element::Metal,
        nature: "天",
        direction: "南",
        attributes: TrigramAttributes { strength: "刚健", character: "君父", season: "秋冬之交" },
        lines: [1, 1, 1],
    },
    Trigram {
        index: 2,
        name: "兑",
        pinyin: "Dui",
        symbol: "☱",
        element: Element::Metal,
        nature: "泽",
        direction: "东南",
        attributes: TrigramAttributes { strength: "喜悦", character: "少女", season: "秋" },
        lines: [1, 1, 0],
    },
    Trigram {
        index: 3,
        name: "离",
        pinyin: "Li",
        symbol: "☲",
        element: Element::Fire,
        nature: "火",
        direction: "东",
        attributes: TrigramAttributes { strength: "光明", character: "中女", season: "夏" },
        lines: [1, 0, 1],
    },
    Trigram {
        index: 4,
        name: "震",
        pinyin: "Zhen",
        symbol: "☳",
        element: Element::Wood,
        nature: "雷",
        direction: "东北",
        attributes: TrigramAttributes { strength: "震动", character: "长男", season: "春" },
        lines: [1, 0, 0],
    },
    Trigram {
        index: 5,
        name: "巽",
        pinyin: "Xun",
        symbol: "☴",
        element: Element::Wood,
        nature: "风",
        direction: "西南",
        attributes: TrigramAttributes { strength: "顺从", character: "长女", season: "春夏之交" },
        lines: [0, 1, 1],
    },
    Trigram {
        index: 6,
        name: "坎",
        pinyin: "Kan",
        symbol: "☵",
        element: Element::Water,
        nature: "水",
        direction: "西",
        attributes: TrigramAttributes { strength: "险陷", character: "中男", season: "冬" },
        lines: [0, 1, 0],
    },
    Trigram {
        index: 7,
        name: "艮",
        pinyin: "Gen",
        symbol: "☶",
        element: Element::Earth,
        nature: "山",
        direction: "西北",
        attributes: TrigramAttributes { strength: "静止", character: "少男", season: "冬春之交" },
        lines: [0, 0, 1],
    },
    Trigram {
        index: 8,
        name: "坤",
        pinyin: "Kun",
        symbol: "☷",
        element: Element::Earth,
        nature: "地",
        direction: "北",
        attributes: TrigramAttributes { strength: "柔顺", character: "母", season: "夏秋之交" },
        lines: [0, 0, 0],
    },
];

/// Whether `index` names a trigram.
pub fn is_valid_index(index: u8) -> bool {
    (1..=8).contains(&index)
}

/// Look up a trigram by its 1-based index.
pub fn trigram(index: u8) -> Result<&'static Trigram> {
    if !is_valid_index(index) {
        return Err(DivinationError::InvalidInput(format!(
            "trigram index must be in 1..=8, got {index}"
        )));
    }
    Ok(&TRIGRAMS[(index - 1) as usize])
}

/// Look up a trigram by Chinese name or pinyin (case-insensitive).
pub fn by_name(name: &str) -> Option<&'static Trigram> {
    TRIGRAMS
        .iter()
        .find(|t| t.name == name || t.pinyin.eq_ignore_ascii_case(name))
}

/// Line pattern for a trigram index.
pub fn encode(index: u8) -> Result<[u8; 3]> {
    trigram(index).map(|t| t.lines)
}

/// Decode a bottom-to-top line triple back into a trigram index.
///
/// Total over all eight binary patterns; anything else is a table bug.
pub fn decode(lines: [u8; 3]) -> Result<u8> {
    if let Some(bad) = lines.iter().find(|&&l| l > 1) {
        error!(?lines, "Non-binary line value {} reached trigram decode", bad);
        return Err(DivinationError::InternalInconsistency(format!(
            "line pattern {lines:?} is not binary"
        )));
    }
    let value = (lines[0] << 2) | (lines[1] << 1) | lines[2];
    Ok(8 - value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_indices_match_positions() {
        for (i, t) in TRIGRAMS.iter().enumerate() {
            assert_eq!(t.index as usize, i + 1);
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        for index in 1..=8u8 {
            assert_eq!(decode(encode(index).unwrap()).unwrap(), index);
        }
    }

    #[test]
    fn test_every_pattern_decodes_to_distinct_index() {
        let mut seen = [false; 9];
        for value in 0..8u8 {
            let lines = [(value >> 2) & 1, (value >> 1) & 1, value & 1];
            let index = decode(lines).unwrap();
            assert!(is_valid_index(index));
            assert!(!seen[index as usize], "index {index} decoded twice");
            seen[index as usize] = true;
            assert_eq!(encode(index).unwrap(), lines);
        }
    }

    #[test]
    fn test_decode_rejects_non_binary() {
        let err = decode([0, 2, 1]).unwrap_err();
        assert!(matches!(err, DivinationError::InternalInconsistency(_)));
    }

    #[test]
    fn test_out_of_range_index() {
        assert!(trigram(0).is_err());
        assert!(trigram(9).is_err());
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(by_name("坎").unwrap().index, 6);
        assert_eq!(by_name("zhen").unwrap().index, 4);
        assert!(by_name("雷").is_none());
    }

    #[test]
    fn test_elements() {
        assert_eq!(trigram(1).unwrap().element, Element::Metal);
        assert_eq!(trigram(3).unwrap().element, Element::Fire);
        assert_eq!(trigram(6).unwrap().element, Element::Water);
        assert_eq!(trigram(8).unwrap().element, Element::Earth);
    }
}
