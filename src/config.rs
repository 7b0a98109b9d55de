use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

const ENV_FILE: &str = ".env";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
    #[error("failed to read config file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub sports_api: SportsApiConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub football: FootballConfig,
    #[serde(default)]
    pub basketball: BasketballConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    #[serde(default = "default_telegram_api")]
    pub api_base: String,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_s: u64,
    #[serde(default = "default_invite_code")]
    pub invite_code: String,
}

fn default_telegram_api() -> String { "https://api.telegram.org".to_string() }
fn default_poll_timeout() -> u64 { 30 }
fn default_invite_code() -> String { "invite123".to_string() }

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            api_base: default_telegram_api(),
            poll_timeout_s: default_poll_timeout(),
            invite_code: default_invite_code(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SportsApiConfig {
    #[serde(default = "default_football_url")]
    pub football_url: String,
    #[serde(default = "default_tennis_url")]
    pub tennis_url: String,
    #[serde(default = "default_basketball_url")]
    pub basketball_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_max_football")]
    pub max_football_fixtures: usize,
    #[serde(default = "default_max_tennis")]
    pub max_tennis_matches: usize,
    #[serde(default = "default_max_basketball")]
    pub max_basketball_games: usize,
    #[serde(default = "default_max_rankings")]
    pub max_rankings: usize,
}

fn default_football_url() -> String { "https://v3.football.api-sports.io".to_string() }
fn default_tennis_url() -> String { "https://v1.tennis.api-sports.io".to_string() }
fn default_basketball_url() -> String { "https://v1.basketball.api-sports.io".to_string() }
fn default_request_timeout() -> u64 { 10_000 }
fn default_max_football() -> usize { 20 }
fn default_max_tennis() -> usize { 10 }
fn default_max_basketball() -> usize { 15 }
fn default_max_rankings() -> usize { 20 }

impl Default for SportsApiConfig {
    fn default() -> Self {
        Self {
            football_url: default_football_url(),
            tennis_url: default_tennis_url(),
            basketball_url: default_basketball_url(),
            request_timeout_ms: default_request_timeout(),
            max_football_fixtures: default_max_football(),
            max_tennis_matches: default_max_tennis(),
            max_basketball_games: default_max_basketball(),
            max_rankings: default_max_rankings(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_s: u64,
    /// Insert the two sample value bets at startup.
    #[serde(default = "default_seed_samples")]
    pub seed_sample_value_bets: bool,
}

fn default_max_connections() -> u32 { 5 }
fn default_idle_timeout() -> u64 { 60 }
fn default_seed_samples() -> bool { true }

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            idle_timeout_s: default_idle_timeout(),
            seed_sample_value_bets: default_seed_samples(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FootballLeague {
    /// Short code used in commands, e.g. `SA`.
    pub code: String,
    pub api_id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FootballConfig {
    #[serde(default = "default_football_leagues")]
    pub leagues: Vec<FootballLeague>,
}

impl Default for FootballConfig {
    fn default() -> Self {
        Self { leagues: default_football_leagues() }
    }
}

fn default_football_leagues() -> Vec<FootballLeague> {
    use crate::feed::simulated::{BUNDESLIGA, LA_LIGA, PREMIER_LEAGUE, SERIE_A};
    [("SA", 135, SERIE_A), ("PL", 39, PREMIER_LEAGUE), ("PD", 140, LA_LIGA), ("BL1", 78, BUNDESLIGA)]
        .into_iter()
        .map(|(code, api_id, name)| FootballLeague {
            code: code.to_string(),
            api_id,
            name: name.to_string(),
        })
        .collect()
}

impl FootballConfig {
    pub fn by_code(&self, code: &str) -> Option<&FootballLeague> {
        self.leagues.iter().find(|l| l.code.eq_ignore_ascii_case(code))
    }

    pub fn by_api_id(&self, id: i64) -> Option<&FootballLeague> {
        self.leagues.iter().find(|l| l.api_id == id)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BasketballLeague {
    pub api_id: i64,
    pub name: String,
    #[serde(default = "default_basketball_season")]
    pub season: String,
}

fn default_basketball_season() -> String { "2023-2024".to_string() }

#[derive(Debug, Deserialize, Clone)]
pub struct BasketballConfig {
    #[serde(default = "default_basketball_leagues")]
    pub leagues: Vec<BasketballLeague>,
}

impl Default for BasketballConfig {
    fn default() -> Self {
        Self { leagues: default_basketball_leagues() }
    }
}

fn default_basketball_leagues() -> Vec<BasketballLeague> {
    [(12, "NBA"), (120, "Euroleague"), (2, "Liga ACB"), (13, "NCAA")]
        .into_iter()
        .map(|(api_id, name)| BasketballLeague {
            api_id,
            name: name.to_string(),
            season: default_basketball_season(),
        })
        .collect()
}

impl BasketballConfig {
    pub fn nba(&self) -> Option<&BasketballLeague> {
        self.leagues.iter().find(|l| l.name == "NBA")
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path).with_context(|| format!("config file {}", path.display()))
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let content = match std::fs::read_to_string(ENV_FILE) {
            Ok(c) => c,
            Err(_) => return,
        };
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for line in content.lines() {
            let line = line.trim().trim_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }
}

/// Process settings that come from the environment.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub bot_token: String,
    pub database_url: String,
    /// `None` switches every data fetch to simulation.
    pub sports_api_key: Option<String>,
    pub admin_ids: Vec<i64>,
    pub invite_only: bool,
}

impl Secrets {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| -> Result<String, ConfigError> {
            lookup(var)
                .map(|v| sanitize_key(&v))
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let bot_token = required("BOT_TOKEN")?;
        let database_url = required("DATABASE_URL")?;
        if !database_url.starts_with("sqlite:") {
            return Err(ConfigError::Invalid {
                var: "DATABASE_URL",
                reason: format!("expected a sqlite: URL, got {database_url}"),
            });
        }

        let sports_api_key = lookup("SPORTS_API_KEY")
            .map(|v| sanitize_key(&v))
            .filter(|v| !v.is_empty());

        let admin_ids = lookup("ADMIN_USER_ID")
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default();

        let invite_only = lookup("INVITE_ONLY")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        Ok(Self {
            bot_token,
            database_url,
            sports_api_key,
            admin_ids,
            invite_only,
        })
    }
}

/// Comma-separated ids; entries that are not integers are dropped.
pub fn parse_admin_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

/// Strip carriage returns, BOM, and other invisible chars from a key value.
fn sanitize_key(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}
