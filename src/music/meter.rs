// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Time signatures and the 16th-note step grid.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A musical meter such as 4/4 or 6/8.
///
/// Serialized as the string `"N/D"` in catalogs and API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl TimeSignature {
    pub const COMMON: TimeSignature = TimeSignature { numerator: 4, denominator: 4 };

    /// Create a time signature, rejecting denominators that are not 2, 4, 8 or 16
    pub fn new(numerator: u8, denominator: u8) -> Result<Self, String> {
        if numerator == 0 || numerator > 32 {
            return Err(format!("numerator out of range: {}", numerator));
        }
        if !matches!(denominator, 2 | 4 | 8 | 16) {
            return Err(format!("unsupported denominator: {}", denominator));
        }
        Ok(Self { numerator, denominator })
    }

    /// Number of 16th-note steps in one bar
    pub fn steps_per_bar(&self) -> u32 {
        self.numerator as u32 * 16 / self.denominator as u32
    }

    /// Ticks in one bar at the given resolution
    pub fn ticks_per_bar(&self, ppqn: u32) -> u64 {
        self.steps_per_bar() as u64 * ticks_per_step(ppqn)
    }

    /// Steps per beat, where the beat is the denominator's note value
    pub fn steps_per_beat(&self) -> u32 {
        (16 / self.denominator as u32).max(1)
    }

    /// Compound meters (6/8, 9/8, 12/8) group beats in threes
    pub fn is_compound(&self) -> bool {
        self.denominator == 8 && self.numerator % 3 == 0 && self.numerator > 3
    }
}

/// Ticks per 16th-note step
pub fn ticks_per_step(ppqn: u32) -> u64 {
    (ppqn as u64 / 4).max(1)
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::COMMON
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for TimeSignature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (num, den) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| format!("invalid time signature: {:?}", s))?;
        let num: u8 = num.trim().parse().map_err(|_| format!("invalid numerator in {:?}", s))?;
        let den: u8 = den.trim().parse().map_err(|_| format!("invalid denominator in {:?}", s))?;
        TimeSignature::new(num, den)
    }
}

impl TryFrom<String> for TimeSignature {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSignature> for String {
    fn from(ts: TimeSignature) -> Self {
        ts.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_per_bar() {
        assert_eq!(TimeSignature::COMMON.steps_per_bar(), 16);
        assert_eq!(TimeSignature::new(3, 4).unwrap().steps_per_bar(), 12);
        assert_eq!(TimeSignature::new(6, 8).unwrap().steps_per_bar(), 12);
        assert_eq!(TimeSignature::new(7, 8).unwrap().steps_per_bar(), 14);
    }

    #[test]
    fn test_ticks_per_bar() {
        assert_eq!(TimeSignature::COMMON.ticks_per_bar(480), 1920);
        assert_eq!(TimeSignature::new(6, 8).unwrap().ticks_per_bar(480), 1440);
    }

    #[test]
    fn test_parse_and_display() {
        let ts: TimeSignature = "6/8".parse().unwrap();
        assert_eq!(ts, TimeSignature { numerator: 6, denominator: 8 });
        assert!(ts.is_compound());
        assert_eq!(ts.to_string(), "6/8");
        assert!("4-4".parse::<TimeSignature>().is_err());
        assert!("4/3".parse::<TimeSignature>().is_err());
        assert!("0/4".parse::<TimeSignature>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&TimeSignature::COMMON).unwrap();
        assert_eq!(json, "\"4/4\"");
        let ts: TimeSignature = serde_json::from_str("\"12/8\"").unwrap();
        assert_eq!(ts.steps_per_bar(), 24);
        assert!(serde_json::from_str::<TimeSignature>("\"5/5\"").is_err());
    }
}
