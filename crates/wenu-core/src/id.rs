//! Comparisons against named, precalculated electron-identification scores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Electron;

/// Absolute tolerance used by [`IdComparator::Approx`].
///
/// Identification producers store categorical results (0, 1, 2, ... 7) as
/// floats, so equality is tested within this window.
pub const ID_EQUALITY_TOLERANCE: f64 = 0.1;

/// How a score is compared against the configured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IdComparator {
    /// `score > value`
    Greater,
    /// `score < value`
    Less,
    /// `|score - value| < 0.1`
    Approx,
}

impl IdComparator {
    /// Apply the comparison.
    pub fn compare(self, score: f64, value: f64) -> bool {
        match self {
            IdComparator::Greater => score > value,
            IdComparator::Less => score < value,
            IdComparator::Approx => (score - value).abs() < ID_EQUALITY_TOLERANCE,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            IdComparator::Greater => ">",
            IdComparator::Less => "<",
            IdComparator::Approx => "=",
        }
    }
}

impl FromStr for IdComparator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            ">" => Ok(IdComparator::Greater),
            "<" => Ok(IdComparator::Less),
            "=" | "==" => Ok(IdComparator::Approx),
            other => Err(Error::Config(format!(
                "unknown identification comparator '{other}' (expected '>', '<' or '=')"
            ))),
        }
    }
}

impl TryFrom<String> for IdComparator {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<IdComparator> for String {
    fn from(c: IdComparator) -> Self {
        c.symbol().to_string()
    }
}

impl fmt::Display for IdComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A named score together with the comparison it has to satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdRequirement {
    /// Name of the score in [`Electron::electron_ids`].
    pub name: String,
    /// Comparison operator.
    #[serde(default = "default_comparator")]
    pub comparator: IdComparator,
    /// Reference value.
    pub value: f64,
}

fn default_comparator() -> IdComparator {
    IdComparator::Approx
}

/// Result of checking an [`IdRequirement`] on one electron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdDecision {
    /// Score present and the comparison holds.
    Pass,
    /// Score present and the comparison fails.
    Fail,
    /// The electron carries no score with the requested name.
    Unavailable,
}

impl IdRequirement {
    /// Build a requirement, rejecting empty score names.
    pub fn new(name: impl Into<String>, comparator: IdComparator, value: f64) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::Config("identification name must not be empty".into()));
        }
        Ok(Self { name, comparator, value })
    }

    /// Evaluate the requirement without deciding what a missing score means.
    pub fn decide(&self, electron: &Electron) -> IdDecision {
        match electron.electron_ids.get(&self.name) {
            Some(&score) if self.comparator.compare(score, self.value) => IdDecision::Pass,
            Some(_) => IdDecision::Fail,
            None => IdDecision::Unavailable,
        }
    }
}

impl fmt::Display for IdRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, self.comparator, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparator_parse() {
        assert_eq!(">".parse::<IdComparator>().unwrap(), IdComparator::Greater);
        assert_eq!("<".parse::<IdComparator>().unwrap(), IdComparator::Less);
        assert_eq!("=".parse::<IdComparator>().unwrap(), IdComparator::Approx);
        assert_eq!(" == ".parse::<IdComparator>().unwrap(), IdComparator::Approx);
        assert!(">=".parse::<IdComparator>().is_err());
    }

    #[test]
    fn approx_uses_tenth_tolerance() {
        assert!(IdComparator::Approx.compare(7.05, 7.0));
        assert!(IdComparator::Approx.compare(6.95, 7.0));
        assert!(!IdComparator::Approx.compare(7.1, 7.0));
        assert!(!IdComparator::Approx.compare(5.0, 7.0));
    }

    #[test]
    fn strict_comparators() {
        assert!(IdComparator::Greater.compare(0.6, 0.5));
        assert!(!IdComparator::Greater.compare(0.5, 0.5));
        assert!(IdComparator::Less.compare(0.4, 0.5));
        assert!(!IdComparator::Less.compare(0.5, 0.5));
    }

    #[test]
    fn requirement_decisions() {
        let mut ele = Electron::default();
        ele.electron_ids.insert("simpleEleId80relIso".into(), 7.0);
        let req = IdRequirement::new("simpleEleId80relIso", IdComparator::Approx, 7.0).unwrap();
        assert_eq!(req.decide(&ele), IdDecision::Pass);

        let req = IdRequirement::new("simpleEleId80relIso", IdComparator::Less, 5.0).unwrap();
        assert_eq!(req.decide(&ele), IdDecision::Fail);

        let req = IdRequirement::new("likelihood", IdComparator::Greater, 0.5).unwrap();
        assert_eq!(req.decide(&ele), IdDecision::Unavailable);
    }

    #[test]
    fn requirement_deserializes_with_default_comparator() {
        let req: IdRequirement =
            serde_json::from_str(r#"{"name": "simpleEleId95relIso", "value": 7}"#).unwrap();
        assert_eq!(req.comparator, IdComparator::Approx);
        assert_eq!(req.to_string(), "simpleEleId95relIso=7");

        let bad: std::result::Result<IdRequirement, _> =
            serde_json::from_str(r#"{"name": "x", "comparator": "!=", "value": 1}"#);
        assert!(bad.is_err());
    }
}
