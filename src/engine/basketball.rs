//! Two-way basketball estimate. No draw, no jitter on the probabilities;
//! spread, total and key factors are display-only random draws.

use super::{raw_score, round1, share, Side, TwoWay};
use rand::seq::SliceRandom;
use rand::Rng;

/// Added to the home raw score before normalization.
pub const HOME_COURT_BONUS: u32 = 10;

const KEY_FACTOR_POOL: &[&str] = &[
    "Rebound Control",
    "3-Point Percentage",
    "Turnover Margin",
    "Pace of Play",
    "Free Throw Rate",
    "Bench Scoring",
];

#[derive(Debug, Clone)]
pub struct BasketballEstimate {
    pub home_team: String,
    pub away_team: String,
    /// `first` is home. Rounded to one decimal.
    pub probabilities: TwoWay,
    pub favourite: Side,
    pub predicted_winner: String,
    pub confidence: f64,
    /// Unsigned projected margin; see [`BasketballEstimate::spread_label`].
    pub spread: u32,
    pub total_points: u32,
    pub key_factors: Vec<&'static str>,
}

impl BasketballEstimate {
    /// `-N` when the home side is favoured, `+N` when the away side is.
    pub fn spread_label(&self) -> String {
        let sign = match self.favourite {
            Side::First => '-',
            Side::Second => '+',
        };
        format!("{}{}", sign, self.spread)
    }
}

pub fn base_probabilities(home: &str, away: &str) -> TwoWay {
    let home_score = raw_score(home) + HOME_COURT_BONUS;
    let away_score = raw_score(away);
    share(home_score as f64, away_score as f64)
}

pub fn analyze<R: Rng + ?Sized>(home: &str, away: &str, rng: &mut R) -> BasketballEstimate {
    let probs = base_probabilities(home, away);
    let favourite = probs.favourite();
    let predicted_winner = match favourite {
        Side::First => home,
        Side::Second => away,
    };

    let spread = rng.gen_range(2..=12);
    let total_points = rng.gen_range(205..=235);
    let key_factors = KEY_FACTOR_POOL.choose_multiple(rng, 3).copied().collect();

    BasketballEstimate {
        home_team: home.to_string(),
        away_team: away.to_string(),
        probabilities: probs.rounded(),
        favourite,
        predicted_winner: predicted_winner.to_string(),
        confidence: round1(probs.max()),
        spread,
        total_points,
        key_factors,
    }
}
