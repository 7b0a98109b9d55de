//! Name-hash outcome estimator for football, tennis and basketball.
//!
//! Probabilities come from a deterministic hash of the two entity names.
//! Anything random (value-bet edge, tennis jitter, display stats) is drawn
//! from the caller's `Rng` so tests can pin a seed.

pub mod basketball;
pub mod football;
pub mod tennis;

use rand::Rng;
use std::fmt;
use std::str::FromStr;

pub use basketball::BasketballEstimate;
pub use football::FootballEstimate;
pub use tennis::TennisEstimate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SportKind {
    Football,
    Tennis,
    Basketball,
}

impl SportKind {
    pub const ALL: [SportKind; 3] = [SportKind::Football, SportKind::Tennis, SportKind::Basketball];

    pub fn as_str(&self) -> &'static str {
        match self {
            SportKind::Football => "football",
            SportKind::Tennis => "tennis",
            SportKind::Basketball => "basketball",
        }
    }
}

impl fmt::Display for SportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SportKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "football" | "soccer" => Ok(SportKind::Football),
            "tennis" => Ok(SportKind::Tennis),
            "basketball" => Ok(SportKind::Basketball),
            other => anyhow::bail!("unknown sport: {other}"),
        }
    }
}

/// Which of the two named entities an estimate favours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

/// Probability pair for two-outcome sports, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoWay {
    pub first: f64,
    pub second: f64,
}

impl TwoWay {
    pub fn total(&self) -> f64 {
        self.first + self.second
    }

    /// Strictly greater wins; a tie goes to the second entity.
    pub fn favourite(&self) -> Side {
        if self.first > self.second {
            Side::First
        } else {
            Side::Second
        }
    }

    pub fn max(&self) -> f64 {
        self.first.max(self.second)
    }

    pub(crate) fn rounded(&self) -> TwoWay {
        TwoWay {
            first: round1(self.first),
            second: round1(self.second),
        }
    }
}

/// Character-code hash of a name: sum of the lowercased code points, mod 100.
pub fn raw_score(name: &str) -> u32 {
    let sum: u64 = name.to_lowercase().chars().map(|c| c as u64).sum();
    (sum % 100) as u32
}

/// Raw scores for both names, with 50/50 substituted when both hash to zero.
pub fn raw_pair(a: &str, b: &str) -> (u32, u32) {
    let (sa, sb) = (raw_score(a), raw_score(b));
    if sa + sb == 0 {
        (50, 50)
    } else {
        (sa, sb)
    }
}

/// Split 100% in proportion to two non-negative scores.
pub(crate) fn share(a: f64, b: f64) -> TwoWay {
    let total = a + b;
    TwoWay {
        first: a / total * 100.0,
        second: b / total * 100.0,
    }
}

/// Round to `places` decimals on the exact binary value, ties to even.
/// Scaling first (`x * 10`) can turn a value just below a tie into an exact
/// tie (`0.15 * 10 == 1.5`), so the decimal expansion is rounded instead.
pub fn round_to(x: f64, places: usize) -> f64 {
    format!("{x:.places$}").parse().unwrap_or(x)
}

pub(crate) fn round1(x: f64) -> f64 {
    round_to(x, 1)
}

pub(crate) fn round2(x: f64) -> f64 {
    round_to(x, 2)
}

#[derive(Debug, Clone)]
pub enum Estimate {
    Football(FootballEstimate),
    Tennis(TennisEstimate),
    Basketball(BasketballEstimate),
}

impl Estimate {
    pub fn sport(&self) -> SportKind {
        match self {
            Estimate::Football(_) => SportKind::Football,
            Estimate::Tennis(_) => SportKind::Tennis,
            Estimate::Basketball(_) => SportKind::Basketball,
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Estimate::Football(e) => e.confidence,
            Estimate::Tennis(e) => e.confidence,
            Estimate::Basketball(e) => e.confidence,
        }
    }

    /// `1`/`X`/`2` for football, the favoured name otherwise.
    pub fn outcome_label(&self) -> &str {
        match self {
            Estimate::Football(e) => e.prediction.label(),
            Estimate::Tennis(e) => &e.predicted_winner,
            Estimate::Basketball(e) => &e.predicted_winner,
        }
    }
}

/// Estimate the outcome of `entity_a` vs `entity_b`.
///
/// For football and basketball `entity_a` is the home side.
pub fn estimate<R: Rng + ?Sized>(
    entity_a: &str,
    entity_b: &str,
    sport: SportKind,
    rng: &mut R,
) -> Estimate {
    match sport {
        SportKind::Football => Estimate::Football(football::analyze(entity_a, entity_b, rng)),
        SportKind::Tennis => Estimate::Tennis(tennis::analyze(entity_a, entity_b, rng)),
        SportKind::Basketball => {
            Estimate::Basketball(basketball::analyze(entity_a, entity_b, rng))
        }
    }
}
