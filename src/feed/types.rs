use serde::Deserialize;
use serde_json::Value;

/// Normalized types handed to the command layer (provider-agnostic).

#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub home: String,
    pub away: String,
    pub league: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TennisMatch {
    pub player1: String,
    pub player2: String,
    pub tournament: String,
    pub surface: String,
    pub time: String,
    pub round: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasketballGame {
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub time: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Football(Fixture),
    Tennis(TennisMatch),
    Basketball(BasketballGame),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FootballStanding {
    pub position: u32,
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub draw: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i32,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasketballStanding {
    pub rank: u32,
    pub team: String,
    pub wins: u32,
    pub losses: u32,
    /// Win fraction, three decimals.
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StandingRows {
    Football(Vec<FootballStanding>),
    Basketball(Vec<BasketballStanding>),
}

impl StandingRows {
    pub fn len(&self) -> usize {
        match self {
            StandingRows::Football(rows) => rows.len(),
            StandingRows::Basketball(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingsTable {
    pub league_name: String,
    pub rows: StandingRows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tour {
    Atp,
    Wta,
}

impl Tour {
    /// Anything that is not `wta` (case-insensitive) is ATP.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("wta") {
            Tour::Wta
        } else {
            Tour::Atp
        }
    }

    pub fn api_key(&self) -> &'static str {
        match self {
            Tour::Atp => "atp",
            Tour::Wta => "wta",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tour::Atp => "ATP",
            Tour::Wta => "WTA",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntity {
    pub rank: u32,
    pub player: String,
    pub country: String,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingsTable {
    pub tour: String,
    pub rankings: Vec<RankedEntity>,
}

// ── API-Sports wire types ────────────────────────────────────────────

/// Every API-Sports response: `{ "errors": ..., "response": [...] }`.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub errors: Value,
    #[serde(default)]
    pub response: Value,
}

impl ApiEnvelope {
    /// `errors` comes back as `[]`, `{}` or an object of messages.
    pub fn has_errors(&self) -> bool {
        match &self.errors {
            Value::Null | Value::Bool(false) => false,
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn into_response(self) -> anyhow::Result<Vec<Value>> {
        if self.has_errors() {
            anyhow::bail!("api-sports returned errors: {}", self.errors);
        }
        match self.response {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => anyhow::bail!("unexpected api-sports response shape: {}", other),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiName {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiFixture {
    pub fixture: ApiFixtureInfo,
    pub league: ApiLeagueRef,
    pub teams: ApiTeams,
}

#[derive(Debug, Deserialize)]
pub struct ApiFixtureInfo {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiLeagueRef {
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiTeams {
    #[serde(default)]
    pub home: ApiName,
    #[serde(default)]
    pub away: ApiName,
}

#[derive(Debug, Deserialize)]
pub struct ApiStandingsLeague {
    pub league: ApiStandingsInner,
}

#[derive(Debug, Deserialize)]
pub struct ApiStandingsInner {
    #[serde(default)]
    pub standings: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFootballStanding {
    pub rank: u32,
    pub team: ApiName,
    pub all: ApiStandingRecord,
    pub goals_diff: i32,
    pub points: u32,
}

#[derive(Debug, Deserialize)]
pub struct ApiStandingRecord {
    pub played: u32,
    pub win: u32,
    pub draw: u32,
    pub lose: u32,
    pub goals: ApiGoals,
}

#[derive(Debug, Deserialize)]
pub struct ApiGoals {
    #[serde(rename = "for")]
    pub scored: u32,
    pub against: u32,
}

#[derive(Debug, Deserialize)]
pub struct ApiTennisMatch {
    #[serde(default)]
    pub player1: ApiName,
    #[serde(default)]
    pub player2: ApiName,
    #[serde(default)]
    pub competition: ApiName,
    #[serde(default)]
    pub surface: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub round: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRanking {
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub player: ApiRankedPlayer,
    #[serde(default)]
    pub points: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiRankedPlayer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiBasketballGame {
    #[serde(default)]
    pub teams: ApiTeams,
    #[serde(default)]
    pub league: ApiName,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiBasketballStanding {
    pub position: u32,
    pub team: ApiName,
    pub games: ApiBasketballGames,
}

#[derive(Debug, Deserialize)]
pub struct ApiBasketballGames {
    pub win: ApiTotal,
    pub lose: ApiTotal,
}

#[derive(Debug, Deserialize)]
pub struct ApiTotal {
    pub total: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> ApiEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_errors_are_not_errors() {
        assert!(!envelope(r#"{"errors": [], "response": []}"#).has_errors());
        assert!(!envelope(r#"{"errors": {}, "response": []}"#).has_errors());
        assert!(!envelope(r#"{"response": []}"#).has_errors());
    }

    #[test]
    fn test_error_object_rejects_payload() {
        let env = envelope(r#"{"errors": {"token": "Error/Missing application key"}, "response": []}"#);
        assert!(env.has_errors());
        assert!(env.into_response().is_err());
    }

    #[test]
    fn test_response_array_is_returned() {
        let items = envelope(r#"{"errors": [], "response": [{"a": 1}, {"b": 2}]}"#)
            .into_response()
            .unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_missing_response_is_empty() {
        assert!(envelope(r#"{"errors": []}"#).into_response().unwrap().is_empty());
    }

    #[test]
    fn test_tour_parse() {
        assert_eq!(Tour::parse("WTA"), Tour::Wta);
        assert_eq!(Tour::parse("atp"), Tour::Atp);
        assert_eq!(Tour::parse("anything"), Tour::Atp);
    }
}
