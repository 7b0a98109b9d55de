use crate::engine::{Estimate, SportKind};
use chrono::{DateTime, Utc};

/// Profile fields supplied by the chat platform on each interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub platform_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserProfile {
    pub fn new(platform_id: i64) -> Self {
        Self {
            platform_id,
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> String {
        self.first_name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| self.platform_id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub platform_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub is_active: bool,
    pub is_premium: bool,
    pub is_subscribed: bool,
}

/// A prediction about to be stored. `draw_prob` is set for football only,
/// `surface` for tennis only.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrediction {
    pub sport: SportKind,
    pub entity_a: String,
    pub entity_b: String,
    pub league: Option<String>,
    pub predicted_outcome: String,
    pub prob_a: f64,
    pub draw_prob: Option<f64>,
    pub prob_b: f64,
    pub confidence: f64,
    pub surface: Option<String>,
}

impl NewPrediction {
    pub fn from_estimate(estimate: &Estimate, league: Option<String>) -> Self {
        let predicted_outcome = estimate.outcome_label().to_string();
        let confidence = estimate.confidence();
        match estimate {
            Estimate::Football(e) => Self {
                sport: SportKind::Football,
                entity_a: e.home_team.clone(),
                entity_b: e.away_team.clone(),
                league,
                predicted_outcome,
                prob_a: e.probabilities.home,
                draw_prob: Some(e.probabilities.draw),
                prob_b: e.probabilities.away,
                confidence,
                surface: None,
            },
            Estimate::Tennis(e) => Self {
                sport: SportKind::Tennis,
                entity_a: e.player1.clone(),
                entity_b: e.player2.clone(),
                league,
                predicted_outcome,
                prob_a: e.probabilities.first,
                draw_prob: None,
                prob_b: e.probabilities.second,
                confidence,
                surface: Some(e.surface.to_string()),
            },
            Estimate::Basketball(e) => Self {
                sport: SportKind::Basketball,
                entity_a: e.home_team.clone(),
                entity_b: e.away_team.clone(),
                league,
                predicted_outcome,
                prob_a: e.probabilities.first,
                draw_prob: None,
                prob_b: e.probabilities.second,
                confidence,
                surface: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub id: i64,
    pub user_id: i64,
    pub sport: SportKind,
    pub entity_a: String,
    pub entity_b: String,
    pub league: Option<String>,
    pub predicted_outcome: String,
    pub prob_a: f64,
    pub draw_prob: Option<f64>,
    pub prob_b: f64,
    pub confidence: f64,
    pub surface: Option<String>,
    pub actual_outcome: Option<String>,
    pub is_correct: Option<bool>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub total: i64,
    pub correct: i64,
    /// Percentage, one decimal; zero when `total` is zero.
    pub accuracy: f64,
    /// Newest first, at most five.
    pub recent: Vec<Prediction>,
}

impl Stats {
    pub fn empty() -> Self {
        Self {
            total: 0,
            correct: 0,
            accuracy: 0.0,
            recent: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewValueBet {
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub market: String,
    pub selection: String,
    pub odds: f64,
    pub probability: f64,
    pub edge: f64,
    pub confidence: f64,
    pub stake_hint: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueBet {
    pub id: i64,
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub market: String,
    pub selection: String,
    pub odds: f64,
    pub probability: f64,
    pub edge: f64,
    pub confidence: f64,
    pub stake_hint: String,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SportTally {
    pub sport: SportKind,
    pub total: i64,
    pub correct: i64,
    /// Not yet settled.
    pub pending: i64,
}

/// Admin dashboard aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub users_total: i64,
    pub users_active: i64,
    pub users_premium: i64,
    pub sports: Vec<SportTally>,
    pub value_bets_total: i64,
    pub value_bets_active: i64,
    pub recent_users: Vec<User>,
}
