//! Hexagram derivation: seed → cast → primary, mutual and transformed hexagrams.

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hexagram::{Bagua, Hexagram};
use crate::types::{DivinationError, Result};

/// The twelve earthly branches, in ordinal order starting from 子.
pub const EARTHLY_BRANCHES: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];

/// Earthly-branch ordinal (1..=12) and name for a year.
pub fn earthly_branch(year: i32) -> (u8, &'static str) {
    let offset = (i64::from(year) - 4).rem_euclid(12);
    (offset as u8 + 1, EARTHLY_BRANCHES[offset as usize])
}

/// `value mod modulus`, with a zero remainder mapped to `modulus`.
fn one_based(value: u64, modulus: u64) -> u8 {
    match value % modulus {
        0 => modulus as u8,
        r => r as u8,
    }
}

/// Calendar moment used for time seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeed {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl TimeSeed {
    pub fn new(year: i32, month: u32, day: u32, hour: u32) -> Self {
        Self { year, month, day, hour }
    }

    pub fn from_datetime<T: Datelike + Timelike>(moment: &T) -> Self {
        Self {
            year: moment.year(),
            month: moment.month(),
            day: moment.day(),
            hour: moment.hour(),
        }
    }

    fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.month) {
            return Err(DivinationError::InvalidInput(format!(
                "month must be in 1..=12, got {}",
                self.month
            )));
        }
        if !(1..=31).contains(&self.day) {
            return Err(DivinationError::InvalidInput(format!(
                "day must be in 1..=31, got {}",
                self.day
            )));
        }
        if self.hour > 23 {
            return Err(DivinationError::InvalidInput(format!(
                "hour must be in 0..=23, got {}",
                self.hour
            )));
        }
        Ok(())
    }
}

/// Two caller-supplied numbers used for number seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberSeed {
    #[serde(rename = "number1")]
    pub first: u32,
    #[serde(rename = "number2")]
    pub second: u32,
}

impl NumberSeed {
    pub fn new(first: u32, second: u32) -> Self {
        Self { first, second }
    }

    fn validate(&self, max_number: u32) -> Result<()> {
        for (label, n) in [("number1", self.first), ("number2", self.second)] {
            if n == 0 || n > max_number {
                return Err(DivinationError::InvalidInput(format!(
                    "{label} must be in 1..={max_number}, got {n}"
                )));
            }
        }
        Ok(())
    }
}

/// How a divination is seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum SeedMethod {
    Time(TimeSeed),
    Number(NumberSeed),
}

/// Bare method tag, as it arrives from callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Time,
    Number,
}

impl MethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Number => "number",
        }
    }
}

impl std::str::FromStr for MethodKind {
    type Err = DivinationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "time" => Ok(Self::Time),
            "number" => Ok(Self::Number),
            other => Err(DivinationError::InvalidInput(format!(
                "method must be \"time\" or \"number\", got {other:?}"
            ))),
        }
    }
}

/// Method-specific parameters in the shape the HTTP layer sends them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivinationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeSeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numbers: Option<NumberSeed>,
}

impl DivinationParams {
    pub fn numbers(first: u32, second: u32) -> Self {
        Self {
            numbers: Some(NumberSeed::new(first, second)),
            ..Default::default()
        }
    }

    pub fn at(time: TimeSeed) -> Self {
        Self {
            time: Some(time),
            ..Default::default()
        }
    }
}

/// Source of the current local time for time seeding.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same moment.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

impl SeedMethod {
    /// Resolve a method tag and its parameters into a concrete seed.
    ///
    /// A time-method request without an explicit moment reads `clock`.
    pub fn resolve(method: &str, params: &DivinationParams, clock: &dyn Clock) -> Result<Self> {
        match method.parse::<MethodKind>()? {
            MethodKind::Time => {
                let time = params
                    .time
                    .unwrap_or_else(|| TimeSeed::from_datetime(&clock.now()));
                Ok(Self::Time(time))
            }
            MethodKind::Number => params.numbers.map(Self::Number).ok_or_else(|| {
                DivinationError::InvalidInput(
                    "number method requires numbers.number1 and numbers.number2".to_string(),
                )
            }),
        }
    }

    pub fn kind(&self) -> MethodKind {
        match self {
            Self::Time(_) => MethodKind::Time,
            Self::Number(_) => MethodKind::Number,
        }
    }
}

/// Trigram indices and moving line produced by a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cast {
    pub upper: u8,
    pub lower: u8,
    /// 1..=6, counted from the bottom
    pub moving_line: u8,
}

/// Compute the cast for a seed.
///
/// Numbers must lie in `1..=max_number`; time components must form a
/// plausible calendar hour.
pub fn cast(seed: &SeedMethod, max_number: u32) -> Result<Cast> {
    let cast = match seed {
        SeedMethod::Time(time) => {
            time.validate()?;
            let (branch, _) = earthly_branch(time.year);
            let base = u64::from(branch) + u64::from(time.month) + u64::from(time.day);
            let with_hour = base + u64::from(time.hour);
            Cast {
                upper: one_based(base, 8),
                lower: one_based(with_hour, 8),
                moving_line: one_based(with_hour, 6),
            }
        }
        SeedMethod::Number(numbers) => {
            numbers.validate(max_number)?;
            let first = u64::from(numbers.first);
            let second = u64::from(numbers.second);
            Cast {
                upper: one_based(first, 8),
                lower: one_based(second, 8),
                moving_line: one_based(first + second, 6),
            }
        }
    };

    debug!(
        method = seed.kind().as_str(),
        upper = cast.upper,
        lower = cast.lower,
        moving_line = cast.moving_line,
        "Cast computed"
    );
    Ok(cast)
}

/// Mutual hexagram: lines 2-3-4 form the lower trigram, 3-4-5 the upper.
pub fn mutual_of(bagua: &Bagua, primary: &Hexagram) -> Result<Hexagram> {
    let l = primary.lines;
    let lower = bagua.decode([l[1], l[2], l[3]])?;
    let upper = bagua.decode([l[2], l[3], l[4]])?;
    bagua.compose(upper, lower)
}

/// Transformed hexagram: the primary with its moving line flipped.
pub fn transformed_of(bagua: &Bagua, primary: &Hexagram, moving_line: u8) -> Result<Hexagram> {
    if !(1..=6).contains(&moving_line) {
        return Err(DivinationError::InvalidInput(format!(
            "moving line must be in 1..=6, got {moving_line}"
        )));
    }
    let mut lines = primary.lines;
    let position = (moving_line - 1) as usize;
    lines[position] ^= 1;
    bagua.from_lines(lines)
}

/// The three hexagrams read from one cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HexagramSet {
    pub primary: Hexagram,
    pub mutual: Hexagram,
    pub transformed: Hexagram,
}

/// Build primary, mutual and transformed hexagrams for a cast.
pub fn derive_hexagrams(bagua: &Bagua, cast: &Cast) -> Result<HexagramSet> {
    let primary = bagua.compose(cast.upper, cast.lower)?;
    let mutual = mutual_of(bagua, &primary)?;
    let transformed = transformed_of(bagua, &primary, cast.moving_line)?;

    debug!(
        primary = primary.id,
        mutual = mutual.id,
        transformed = transformed.id,
        "Hexagrams derived"
    );

    Ok(HexagramSet {
        primary,
        mutual,
        transformed,
    })
}
