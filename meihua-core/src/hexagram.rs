//! The sixty-four hexagrams and the catalog handle used to build them.
//!
//! Hexagram identity follows the King Wen sequence. The (upper, lower) → id
//! table below is a bijection over all 64 trigram pairs, so a hexagram id
//! always decomposes back into exactly one trigram pair.

use serde::Serialize;
use tracing::error;

use crate::trigram::{self, Trigram, TRIGRAMS};
use crate::types::{DivinationError, Element, Result};

/// King Wen number indexed by `[upper - 1][lower - 1]`.
pub static KING_WEN: [[u8; 8]; 8] = [
    // lower: 乾  兑  离  震  巽  坎  艮  坤
    [1, 10, 13, 25, 44, 6, 33, 12],   // upper 乾
    [43, 58, 49, 17, 28, 47, 31, 45], // upper 兑
    [14, 38, 30, 21, 50, 64, 56, 35], // upper 离
    [34, 54, 55, 51, 32, 40, 62, 16], // upper 震
    [9, 61, 37, 42, 57, 59, 53, 20],  // upper 巽
    [5, 60, 63, 3, 48, 29, 39, 8],    // upper 坎
    [26, 41, 22, 27, 18, 4, 52, 23],  // upper 艮
    [11, 19, 36, 24, 46, 7, 15, 2],   // upper 坤
];

/// (Chinese name, pinyin) indexed by `id - 1`.
pub static HEXAGRAM_NAMES: [(&str, &str); 64] = [
    ("乾为天", "Qian"),
    ("坤为地", "Kun"),
    ("水雷屯", "Zhun"),
    ("山水蒙", "Meng"),
    ("水天需", "Xu"),
    ("天水讼", "Song"),
    ("地水师", "Shi"),
    ("水地比", "Bi"),
    ("风天小畜", "Xiao Chu"),
    ("天泽履", "Lu"),
    ("地天泰", "Tai"),
    ("天地否", "Pi"),
    ("天火同人", "Tong Ren"),
    ("火天大有", "Da You"),
    ("地山谦", "Qian"),
    ("雷地豫", "Yu"),
    ("泽雷随", "Sui"),
    ("山风蛊", "Gu"),
    ("地泽临", "Lin"),
    ("风地观", "Guan"),
    ("火雷噬嗑", "Shi He"),
    ("山火贲", "Bi"),
    ("山地剥", "Bo"),
    ("地雷复", "Fu"),
    ("天雷无妄", "Wu Wang"),
    ("山天大畜", "Da Chu"),
    ("山雷颐", "Yi"),
    ("泽风大过", "Da Guo"),
    ("坎为水", "Kan"),
    ("离为火", "Li"),
    ("泽山咸", "Xian"),
    ("雷风恒", "Heng"),
    ("天山遁", "Dun"),
    ("雷天大壮", "Da Zhuang"),
    ("火地晋", "Jin"),
    ("地火明夷", "Ming Yi"),
    ("风火家人", "Jia Ren"),
    ("火泽睽", "Kui"),
    ("水山蹇", "Jian"),
    ("雷水解", "Xie"),
    ("山泽损", "Sun"),
    ("风雷益", "Yi"),
    ("泽天夬", "Guai"),
    ("天风姤", "Gou"),
    ("泽地萃", "Cui"),
    ("地风升", "Sheng"),
    ("泽水困", "Kun"),
    ("水风井", "Jing"),
    ("泽火革", "Ge"),
    ("火风鼎", "Ding"),
    ("震为雷", "Zhen"),
    ("艮为山", "Gen"),
    ("风山渐", "Jian"),
    ("雷泽归妹", "Gui Mei"),
    ("雷火丰", "Feng"),
    ("火山旅", "Lu"),
    ("巽为风", "Xun"),
    ("兑为泽", "Dui"),
    ("风水涣", "Huan"),
    ("水泽节", "Jie"),
    ("风泽中孚", "Zhong Fu"),
    ("雷山小过", "Xiao Guo"),
    ("水火既济", "Ji Ji"),
    ("火水未济", "Wei Ji"),
];

/// Whether `id` names a hexagram.
pub fn is_valid_id(id: u8) -> bool {
    (1..=64).contains(&id)
}

/// A hexagram composed from an upper and a lower trigram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hexagram {
    /// King Wen number, 1..=64
    pub id: u8,
    pub name: &'static str,
    pub pinyin: &'static str,
    pub upper: &'static Trigram,
    pub lower: &'static Trigram,
    /// Bottom-to-top: lower trigram lines then upper trigram lines
    pub lines: [u8; 6],
    /// Dominant element, taken from the upper trigram
    pub element: Element,
    pub nature: String,
    pub symbol: String,
}

impl Hexagram {
    pub fn lower_lines(&self) -> [u8; 3] {
        [self.lines[0], self.lines[1], self.lines[2]]
    }

    pub fn upper_lines(&self) -> [u8; 3] {
        [self.lines[3], self.lines[4], self.lines[5]]
    }

    /// Lines packed into the low six bits, bit `i` = line `i` (bottom is bit 0).
    pub fn bits(&self) -> u8 {
        self.lines
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &line)| acc | ((line & 1) << i))
    }

    /// Zero-based positions where the two hexagrams' lines differ.
    pub fn differing_lines(&self, other: &Hexagram) -> Vec<usize> {
        let diff = self.bits() ^ other.bits();
        (0..6).filter(|i| diff & (1 << i) != 0).collect()
    }
}

impl std::fmt::Display for Hexagram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {} {} ({})", self.id, self.symbol, self.name, self.pinyin)
    }
}

/// Read-only handle on the trigram and hexagram tables.
///
/// Components receive a `Bagua` instead of reaching for the statics directly,
/// which keeps them testable against an alternate catalog.
#[derive(Debug, Clone, Copy)]
pub struct Bagua {
    trigrams: &'static [Trigram; 8],
    king_wen: &'static [[u8; 8]; 8],
    names: &'static [(&'static str, &'static str); 64],
}

impl Default for Bagua {
    fn default() -> Self {
        Self::standard()
    }
}

impl Bagua {
    /// The traditional catalog.
    pub fn standard() -> Self {
        Self {
            trigrams: &TRIGRAMS,
            king_wen: &KING_WEN,
            names: &HEXAGRAM_NAMES,
        }
    }

    pub fn trigrams(&self) -> &'static [Trigram; 8] {
        self.trigrams
    }

    pub fn trigram(&self, index: u8) -> Result<&'static Trigram> {
        if !trigram::is_valid_index(index) {
            return Err(DivinationError::InvalidInput(format!(
                "trigram index must be in 1..=8, got {index}"
            )));
        }
        Ok(&self.trigrams[(index - 1) as usize])
    }

    /// Decode a line triple, checking the result against this catalog.
    pub fn decode(&self, lines: [u8; 3]) -> Result<u8> {
        let index = trigram::decode(lines)?;
        let found = self.trigram(index).map_err(|_| {
            DivinationError::InternalInconsistency(format!("decoded index {index} out of range"))
        })?;
        if found.lines != lines {
            error!(?lines, index, "Trigram table disagrees with line decode");
            return Err(DivinationError::InternalInconsistency(format!(
                "line pattern {lines:?} decoded to {} whose lines are {:?}",
                found.name, found.lines
            )));
        }
        Ok(index)
    }

    /// King Wen number for an (upper, lower) trigram pair.
    pub fn hexagram_id(&self, upper: u8, lower: u8) -> Result<u8> {
        self.trigram(upper)?;
        self.trigram(lower)?;
        let id = self.king_wen[(upper - 1) as usize][(lower - 1) as usize];
        if !is_valid_id(id) {
            error!(upper, lower, id, "King Wen table holds an invalid id");
            return Err(DivinationError::InternalInconsistency(format!(
                "no hexagram for trigram pair ({upper}, {lower})"
            )));
        }
        Ok(id)
    }

    /// Inverse of [`Bagua::hexagram_id`]: the (upper, lower) pair for an id.
    pub fn trigram_pair(&self, id: u8) -> Result<(u8, u8)> {
        if !is_valid_id(id) {
            return Err(DivinationError::InvalidInput(format!(
                "hexagram id must be in 1..=64, got {id}"
            )));
        }
        for (u, row) in self.king_wen.iter().enumerate() {
            if let Some(l) = row.iter().position(|&candidate| candidate == id) {
                return Ok((u as u8 + 1, l as u8 + 1));
            }
        }
        Err(DivinationError::InternalInconsistency(format!(
            "hexagram {id} missing from King Wen table"
        )))
    }

    /// Chinese name and pinyin for an id.
    pub fn name(&self, id: u8) -> Result<(&'static str, &'static str)> {
        if !is_valid_id(id) {
            return Err(DivinationError::InvalidInput(format!(
                "hexagram id must be in 1..=64, got {id}"
            )));
        }
        Ok(self.names[(id - 1) as usize])
    }

    /// Build the hexagram for an (upper, lower) trigram pair.
    pub fn compose(&self, upper: u8, lower: u8) -> Result<Hexagram> {
        let id = self.hexagram_id(upper, lower)?;
        let upper = self.trigram(upper)?;
        let lower = self.trigram(lower)?;
        let (name, pinyin) = self.name(id)?;

        let mut lines = [0u8; 6];
        lines[..3].copy_from_slice(&lower.lines);
        lines[3..].copy_from_slice(&upper.lines);

        Ok(Hexagram {
            id,
            name,
            pinyin,
            upper,
            lower,
            lines,
            element: upper.element,
            nature: format!("{}{}", upper.nature, lower.nature),
            symbol: format!("{}{}", upper.symbol, lower.symbol),
        })
    }

    /// Build the hexagram with the given King Wen number.
    pub fn by_id(&self, id: u8) -> Result<Hexagram> {
        let (upper, lower) = self.trigram_pair(id)?;
        self.compose(upper, lower)
    }

    /// Build the hexagram for a bottom-to-top six-line pattern.
    pub fn from_lines(&self, lines: [u8; 6]) -> Result<Hexagram> {
        let lower = self.decode([lines[0], lines[1], lines[2]])?;
        let upper = self.decode([lines[3], lines[4], lines[5]])?;
        self.compose(upper, lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_king_wen_is_bijective() {
        let mut seen = [false; 65];
        for row in KING_WEN.iter() {
            for &id in row {
                assert!(is_valid_id(id));
                assert!(!seen[id as usize], "duplicate id {id}");
                seen[id as usize] = true;
            }
        }
    }

    #[test]
    fn test_pair_roundtrip() {
        let bagua = Bagua::standard();
        for upper in 1..=8 {
            for lower in 1..=8 {
                let id = bagua.hexagram_id(upper, lower).unwrap();
                assert_eq!(bagua.trigram_pair(id).unwrap(), (upper, lower));
            }
        }
    }

    #[test]
    fn test_compose_lines_decompose() {
        let bagua = Bagua::standard();
        for upper in 1..=8 {
            for lower in 1..=8 {
                let hex = bagua.compose(upper, lower).unwrap();
                assert_eq!(hex.lower_lines(), TRIGRAMS[(lower - 1) as usize].lines);
                assert_eq!(hex.upper_lines(), TRIGRAMS[(upper - 1) as usize].lines);
                assert_eq!(bagua.from_lines(hex.lines).unwrap().id, hex.id);
            }
        }
    }

    #[test]
    fn test_known_hexagrams() {
        let bagua = Bagua::standard();

        let qian = bagua.compose(1, 1).unwrap();
        assert_eq!(qian.id, 1);
        assert_eq!(qian.name, "乾为天");
        assert_eq!(qian.lines, [1; 6]);
        assert_eq!(qian.symbol, "☰☰");

        // water over thunder
        let zhun = bagua.compose(6, 4).unwrap();
        assert_eq!(zhun.id, 3);
        assert_eq!(zhun.name, "水雷屯");
        assert_eq!(zhun.element, Element::Water);
        assert_eq!(zhun.nature, "水雷");

        // heaven over fire
        assert_eq!(bagua.compose(1, 3).unwrap().name, "天火同人");
        assert_eq!(bagua.by_id(64).unwrap().name, "火水未济");
    }

    #[test]
    fn test_names_agree_with_trigram_natures() {
        let bagua = Bagua::standard();
        for id in 1..=64u8 {
            let hex = bagua.by_id(id).unwrap();
            let chars: Vec<char> = hex.name.chars().collect();
            if chars[1] == '为' {
                assert_eq!(hex.upper.index, hex.lower.index);
                assert!(hex.lower.nature.starts_with(chars[2]));
            } else {
                assert!(hex.upper.nature.starts_with(chars[0]), "{}", hex.name);
                assert!(hex.lower.nature.starts_with(chars[1]), "{}", hex.name);
            }
        }
    }

    #[test]
    fn test_bits_and_difference() {
        let bagua = Bagua::standard();
        let qian = bagua.by_id(1).unwrap();
        let kun = bagua.by_id(2).unwrap();
        assert_eq!(qian.bits(), 0b11_1111);
        assert_eq!(kun.bits(), 0);
        assert_eq!(qian.differing_lines(&kun), vec![0, 1, 2, 3, 4, 5]);
        assert!(qian.differing_lines(&qian).is_empty());
    }

    #[test]
    fn test_invalid_ids() {
        let bagua = Bagua::standard();
        assert!(bagua.by_id(0).is_err());
        assert!(bagua.by_id(65).is_err());
        assert!(bagua.compose(9, 1).is_err());
    }
}
