//! Data source adapter: API-Sports when a key is configured, simulation
//! otherwise. Upstream failures are logged and replaced with simulated data;
//! they never reach the caller.

use super::simulated;
use super::types::*;
use super::SportsApi;
use crate::config::{BasketballConfig, FootballConfig, SportsApiConfig};
use crate::engine::SportKind;
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub struct DataSource {
    api: Option<Arc<dyn SportsApi>>,
    limits: SportsApiConfig,
    football: FootballConfig,
    basketball: BasketballConfig,
    rng: Mutex<StdRng>,
}

impl DataSource {
    pub fn new(
        api: Option<Arc<dyn SportsApi>>,
        limits: SportsApiConfig,
        football: FootballConfig,
        basketball: BasketballConfig,
    ) -> Self {
        Self::with_rng(api, limits, football, basketball, StdRng::from_entropy())
    }

    pub fn with_rng(
        api: Option<Arc<dyn SportsApi>>,
        limits: SportsApiConfig,
        football: FootballConfig,
        basketball: BasketballConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            api,
            limits,
            football,
            basketball,
            rng: Mutex::new(rng),
        }
    }

    /// Simulation-only source with default league tables.
    pub fn simulated(rng: StdRng) -> Self {
        Self::with_rng(
            None,
            SportsApiConfig::default(),
            FootballConfig::default(),
            BasketballConfig::default(),
            rng,
        )
    }

    pub fn is_simulated(&self) -> bool {
        self.api.is_none()
    }

    pub fn football_leagues(&self) -> &FootballConfig {
        &self.football
    }

    pub async fn fetch_today(&self, sport: SportKind) -> Vec<Event> {
        match sport {
            SportKind::Football => self.football_fixtures().await.into_iter().map(Event::Football).collect(),
            SportKind::Tennis => self.tennis_matches().await.into_iter().map(Event::Tennis).collect(),
            SportKind::Basketball => self.basketball_games().await.into_iter().map(Event::Basketball).collect(),
        }
    }

    pub async fn football_fixtures(&self) -> Vec<Fixture> {
        let params = [("date", today())];
        let Some(items) = self.call(SportKind::Football, "fixtures", &params).await else {
            return simulated::football_fixtures();
        };

        let mut fixtures: Vec<Fixture> = decode_each::<ApiFixture>(SportKind::Football, items)
            .into_iter()
            .filter_map(|fix| self.map_fixture(fix))
            .collect();
        fixtures.truncate(self.limits.max_football_fixtures);

        if fixtures.is_empty() {
            debug!("no fixtures in configured leagues, using fallback list");
            return simulated::football_fixtures();
        }
        fixtures
    }

    fn map_fixture(&self, fix: ApiFixture) -> Option<Fixture> {
        let league = self.football.by_api_id(fix.league.id?)?;
        let (Some(home), Some(away)) = (fix.teams.home.name, fix.teams.away.name) else {
            warn!(sport = "football", "skipping fixture without team names");
            return None;
        };
        let time = match kickoff_time(&fix.fixture.date) {
            Ok(t) => t,
            Err(e) => {
                warn!(sport = "football", error = %e, "skipping fixture with bad date");
                return None;
            }
        };
        Some(Fixture {
            home,
            away,
            league: league.name.clone(),
            time,
        })
    }

    pub async fn tennis_matches(&self) -> Vec<TennisMatch> {
        let params = [("date", today())];
        let matches = match self.call(SportKind::Tennis, "games", &params).await {
            Some(items) => {
                let mut matches: Vec<TennisMatch> = decode_each::<ApiTennisMatch>(SportKind::Tennis, items)
                    .into_iter()
                    .map(|m| TennisMatch {
                        player1: m.player1.name.unwrap_or_else(|| "Player 1".to_string()),
                        player2: m.player2.name.unwrap_or_else(|| "Player 2".to_string()),
                        tournament: m.competition.name.unwrap_or_else(|| "Tournament".to_string()),
                        surface: m.surface.unwrap_or_else(|| "Hard".to_string()),
                        time: m.date.unwrap_or_else(|| "TBD".to_string()),
                        round: m.round.unwrap_or_else(|| "R32".to_string()),
                    })
                    .collect();
                matches.truncate(self.limits.max_tennis_matches);
                matches
            }
            None => Vec::new(),
        };

        if matches.is_empty() {
            return simulated::tennis_matches(&mut *self.rng());
        }
        matches
    }

    pub async fn basketball_games(&self) -> Vec<BasketballGame> {
        let params = [("date", today())];
        let games = match self.call(SportKind::Basketball, "games", &params).await {
            Some(items) => {
                let mut games: Vec<BasketballGame> =
                    decode_each::<ApiBasketballGame>(SportKind::Basketball, items)
                        .into_iter()
                        .map(|g| BasketballGame {
                            home_team: g.teams.home.name.unwrap_or_else(|| "Home".to_string()),
                            away_team: g.teams.away.name.unwrap_or_else(|| "Away".to_string()),
                            league: g.league.name.unwrap_or_else(|| "League".to_string()),
                            time: g.time.unwrap_or_else(|| "TBD".to_string()),
                            date: g.date.unwrap_or_else(|| "Today".to_string()),
                        })
                        .collect();
                games.truncate(self.limits.max_basketball_games);
                games
            }
            None => Vec::new(),
        };

        if games.is_empty() {
            return simulated::basketball_games(&mut *self.rng());
        }
        games
    }

    /// `league` is a football league code (`SA`, `PL`, ...) or a basketball
    /// league name; an empty basketball league means NBA.
    pub async fn fetch_standings(&self, sport: SportKind, league: &str) -> Result<StandingsTable> {
        match sport {
            SportKind::Football => Ok(self.football_standings(league).await),
            SportKind::Basketball => Ok(self.basketball_standings(league).await),
            SportKind::Tennis => anyhow::bail!("tennis has rankings, not standings"),
        }
    }

    async fn football_standings(&self, code: &str) -> StandingsTable {
        let Some(league) = self.football.by_code(code) else {
            return simulated::football_standings("Unknown League");
        };
        let params = [
            ("league", league.api_id.to_string()),
            ("season", Utc::now().year().to_string()),
        ];
        let Some(items) = self.call(SportKind::Football, "standings", &params).await else {
            return simulated::football_standings(&league.name);
        };

        let rows: Vec<FootballStanding> = first_table(SportKind::Football, items)
            .into_iter()
            .flat_map(|group| decode_each::<ApiFootballStanding>(SportKind::Football, group))
            .map(|r| FootballStanding {
                position: r.rank,
                team: r.team.name.unwrap_or_default(),
                played: r.all.played,
                won: r.all.win,
                draw: r.all.draw,
                lost: r.all.lose,
                goals_for: r.all.goals.scored,
                goals_against: r.all.goals.against,
                goal_diff: r.goals_diff,
                points: r.points,
            })
            .collect();

        if rows.is_empty() {
            return simulated::football_standings(&league.name);
        }
        StandingsTable {
            league_name: league.name.clone(),
            rows: StandingRows::Football(rows),
        }
    }

    async fn basketball_standings(&self, name: &str) -> StandingsTable {
        let league = if name.trim().is_empty() {
            self.basketball.nba()
        } else {
            self.basketball
                .leagues
                .iter()
                .find(|l| l.name.eq_ignore_ascii_case(name.trim()))
        };
        let Some(league) = league else {
            return simulated::basketball_standings("NBA");
        };

        let params = [
            ("league", league.api_id.to_string()),
            ("season", league.season.clone()),
        ];
        let Some(items) = self.call(SportKind::Basketball, "standings", &params).await else {
            return simulated::basketball_standings(&league.name);
        };

        let rows: Vec<BasketballStanding> = first_table(SportKind::Basketball, items)
            .into_iter()
            .flat_map(|group| decode_each::<ApiBasketballStanding>(SportKind::Basketball, group))
            .map(|r| BasketballStanding {
                rank: r.position,
                team: r.team.name.unwrap_or_default(),
                wins: r.games.win.total,
                losses: r.games.lose.total,
                pct: simulated::win_pct(r.games.win.total, r.games.lose.total),
            })
            .collect();

        if rows.is_empty() {
            return simulated::basketball_standings(&league.name);
        }
        StandingsTable {
            league_name: league.name.clone(),
            rows: StandingRows::Basketball(rows),
        }
    }

    pub async fn fetch_rankings(&self, tour: Tour) -> RankingsTable {
        let params = [("tour", tour.api_key().to_string())];
        let Some(items) = self.call(SportKind::Tennis, "rankings", &params).await else {
            return simulated::tennis_rankings(tour);
        };

        let mut rankings: Vec<RankedEntity> = decode_each::<ApiRanking>(SportKind::Tennis, items)
            .into_iter()
            .map(|r| RankedEntity {
                rank: r.rank,
                player: r.player.name.unwrap_or_else(|| "Unknown".to_string()),
                country: r.player.country.unwrap_or_else(|| "N/A".to_string()),
                points: r.points,
            })
            .collect();
        rankings.truncate(self.limits.max_rankings);

        if rankings.is_empty() {
            return simulated::tennis_rankings(tour);
        }
        RankingsTable {
            tour: tour.label().to_string(),
            rankings,
        }
    }

    /// `None` means "use simulation": no key, an upstream error, or nothing returned.
    async fn call(&self, sport: SportKind, endpoint: &str, params: &[(&str, String)]) -> Option<Vec<Value>> {
        let api = self.api.as_ref()?;
        match api.get(sport, endpoint, params).await {
            Ok(items) if items.is_empty() => {
                debug!(%sport, endpoint, "api-sports returned no data, simulating");
                None
            }
            Ok(items) => Some(items),
            Err(e) => {
                warn!(%sport, endpoint, error = %e, "api-sports request failed, simulating");
                None
            }
        }
    }

    fn rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Kickoff as `HH:MM` in the offset the API reported.
pub fn kickoff_time(date: &str) -> Result<String> {
    let parsed = DateTime::parse_from_rfc3339(date)
        .with_context(|| format!("unparseable fixture date {date:?}"))?;
    Ok(parsed.format("%H:%M").to_string())
}

/// Decode each record on its own so one malformed entry only loses itself.
fn decode_each<T: DeserializeOwned>(sport: SportKind, items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(%sport, error = %e, "skipping malformed api-sports record");
                None
            }
        })
        .collect()
}

/// Standings come back as `[{ league: { standings: [[row, ...], ...] } }]`
/// for football and `[[row, ...], ...]` for basketball. Only the first
/// group is shown.
fn first_table(sport: SportKind, items: Vec<Value>) -> Option<Vec<Value>> {
    let first = items.into_iter().next()?;
    match sport {
        SportKind::Football => serde_json::from_value::<ApiStandingsLeague>(first)
            .map_err(|e| warn!(%sport, error = %e, "malformed standings payload"))
            .ok()?
            .league
            .standings
            .into_iter()
            .next(),
        _ => match first {
            Value::Array(rows) => Some(rows),
            other => Some(vec![other]),
        },
    }
}
