//! Three-way (1/X/2) football estimate.
//!
//! The draw adjustment takes `draw / 3` off each side without renormalizing,
//! so the three probabilities sum to `100 + draw / 3`, not 100. Stored
//! predictions and the value-bet odds are computed from these values.

use super::{raw_pair, round1, round2, share};
use rand::Rng;

/// Lower bound on the draw probability.
pub const DRAW_FLOOR: f64 = 20.0;

/// Home/away expected-goals scale factors.
const HOME_GOALS_SCALE: f64 = 3.0;
const AWAY_GOALS_SCALE: f64 = 2.0;

const EDGE_MIN: f64 = 3.0;
const EDGE_MAX: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Home,
    Draw,
    Away,
}

impl MatchResult {
    pub fn label(&self) -> &'static str {
        match self {
            MatchResult::Home => "1",
            MatchResult::Draw => "X",
            MatchResult::Away => "2",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "1" => Some(MatchResult::Home),
            "X" => Some(MatchResult::Draw),
            "2" => Some(MatchResult::Away),
            _ => None,
        }
    }
}

/// Home/draw/away probabilities in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreeWay {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl ThreeWay {
    pub fn total(&self) -> f64 {
        self.home + self.draw + self.away
    }

    pub fn get(&self, result: MatchResult) -> f64 {
        match result {
            MatchResult::Home => self.home,
            MatchResult::Draw => self.draw,
            MatchResult::Away => self.away,
        }
    }

    pub fn max(&self) -> f64 {
        self.home.max(self.draw).max(self.away)
    }

    /// Home if strictly greatest, draw if strictly greatest, otherwise away.
    pub fn pick(&self) -> MatchResult {
        if self.home > self.away && self.home > self.draw {
            MatchResult::Home
        } else if self.draw > self.home && self.draw > self.away {
            MatchResult::Draw
        } else {
            MatchResult::Away
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedGoals {
    pub home: u32,
    pub away: u32,
}

/// Decorative value bet attached to every football estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticValueBet {
    pub market: &'static str,
    pub selection: MatchResult,
    pub odds: f64,
    pub edge: f64,
}

#[derive(Debug, Clone)]
pub struct FootballEstimate {
    pub home_team: String,
    pub away_team: String,
    /// Rounded to one decimal.
    pub probabilities: ThreeWay,
    pub prediction: MatchResult,
    pub confidence: f64,
    pub goals: ExpectedGoals,
    pub value_bet: SyntheticValueBet,
}

/// Deterministic part of the estimate: post-adjustment, unrounded.
pub fn base_probabilities(home: &str, away: &str) -> ThreeWay {
    let (hs, as_) = raw_pair(home, away);
    let split = share(hs as f64, as_ as f64);
    let draw = DRAW_FLOOR.max(100.0 - split.first - split.second);
    ThreeWay {
        home: split.first - draw / 3.0,
        draw,
        away: split.second - draw / 3.0,
    }
}

pub fn expected_goals(home: &str, away: &str) -> ExpectedGoals {
    let (hs, as_) = raw_pair(home, away);
    let goals = |score: u32, scale: f64| (score as f64 / 100.0 * scale).round_ties_even().max(0.0) as u32;
    ExpectedGoals {
        home: goals(hs, HOME_GOALS_SCALE),
        away: goals(as_, AWAY_GOALS_SCALE),
    }
}

/// Decimal odds implied by a probability in percent.
pub fn implied_odds(prob_pct: f64) -> f64 {
    if prob_pct <= 0.0 {
        return 0.0;
    }
    round2(1.0 / (prob_pct / 100.0))
}

pub fn analyze<R: Rng + ?Sized>(home: &str, away: &str, rng: &mut R) -> FootballEstimate {
    let probs = base_probabilities(home, away);
    let prediction = probs.pick();
    let edge = round1(rng.gen_range(EDGE_MIN..EDGE_MAX));

    FootballEstimate {
        home_team: home.to_string(),
        away_team: away.to_string(),
        probabilities: ThreeWay {
            home: round1(probs.home),
            draw: round1(probs.draw),
            away: round1(probs.away),
        },
        prediction,
        confidence: round1(probs.max()),
        goals: expected_goals(home, away),
        value_bet: SyntheticValueBet {
            market: "Match Result",
            selection: prediction,
            odds: implied_odds(probs.get(prediction)),
            edge,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::raw_score;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_inter_milan_matches_formula() {
        let (h, a) = (raw_score("inter") as f64, raw_score("milan") as f64);
        assert_eq!((h, a), (46.0, 29.0));

        let home = h / (h + a) * 100.0 - 20.0 / 3.0;
        let away = a / (h + a) * 100.0 - 20.0 / 3.0;

        let mut rng = StdRng::seed_from_u64(42);
        let est = analyze("Inter", "Milan", &mut rng);
        assert_eq!(est.probabilities.home, round1(home));
        assert_eq!(est.probabilities.away, round1(away));
        assert_eq!(est.probabilities.draw, 20.0);
        assert_eq!(est.prediction, MatchResult::Home);
        assert_eq!(est.confidence, round1(home));
        assert_eq!(est.confidence, 54.7);
        assert_eq!(est.probabilities.away, 32.0);
    }

    #[test]
    fn test_probabilities_sum_includes_draw_residual() {
        for (home, away) in [("Inter", "Milan"), ("Bayern", "Dortmund"), ("Man City", "Liverpool")] {
            let p = base_probabilities(home, away);
            assert!((p.total() - (p.home + p.away + p.draw)).abs() < 1e-9);
            // Residual of draw/3 above 100 is inherited, not corrected.
            assert!((p.total() - (100.0 + p.draw / 3.0)).abs() < 1e-9, "total={}", p.total());
        }
    }

    #[test]
    fn test_deterministic_without_rng() {
        assert_eq!(base_probabilities("Juventus", "Napoli"), base_probabilities("Juventus", "Napoli"));

        let a = analyze("Juventus", "Napoli", &mut StdRng::seed_from_u64(1));
        let b = analyze("Juventus", "Napoli", &mut StdRng::seed_from_u64(2));
        assert_eq!(a.probabilities, b.probabilities);
        assert_eq!(a.prediction, b.prediction);
        assert_eq!(a.goals, b.goals);
        assert_eq!(a.value_bet.odds, b.value_bet.odds);
    }

    #[test]
    fn test_equal_names_pick_away_on_tie() {
        let p = base_probabilities("Roma", "Roma");
        assert_eq!(p.home, p.away);
        assert_eq!(p.pick(), MatchResult::Away);
    }

    #[test]
    fn test_expected_goals_scaled_from_raw_scores() {
        // 46 * 3 / 100 = 1.38 -> 1, 29 * 2 / 100 = 0.58 -> 1
        assert_eq!(expected_goals("Inter", "Milan"), ExpectedGoals { home: 1, away: 1 });
    }

    #[test]
    fn test_expected_goals_half_rounds_to_even() {
        // raw 25 for away -> 0.5 goals -> 0
        let away = "\u{19}"; // code point 25
        assert_eq!(raw_score(away), 25);
        assert_eq!(expected_goals("a", away).away, 0);
    }

    #[test]
    fn test_value_bet_odds_are_reciprocal_of_selection() {
        let mut rng = StdRng::seed_from_u64(9);
        let est = analyze("Inter", "Milan", &mut rng);
        let p = base_probabilities("Inter", "Milan");
        assert_eq!(est.value_bet.selection, est.prediction);
        assert_eq!(est.value_bet.odds, round2(100.0 / p.home));
        assert_eq!(est.value_bet.odds, 1.83);
        assert!(est.value_bet.edge >= 3.0 && est.value_bet.edge <= 8.0);
    }

    #[test]
    fn test_empty_names_split_evenly() {
        let p = base_probabilities("", "");
        assert!((p.home - (50.0 - 20.0 / 3.0)).abs() < 1e-9);
        assert_eq!(p.home, p.away);
    }

    #[test]
    fn test_label_round_trip() {
        for r in [MatchResult::Home, MatchResult::Draw, MatchResult::Away] {
            assert_eq!(MatchResult::from_label(r.label()), Some(r));
        }
        assert_eq!(MatchResult::from_label("x"), Some(MatchResult::Draw));
        assert_eq!(MatchResult::from_label("3"), None);
    }

    #[test]
    fn test_implied_odds_guards_non_positive() {
        assert_eq!(implied_odds(0.0), 0.0);
        assert_eq!(implied_odds(50.0), 2.0);
    }
}
