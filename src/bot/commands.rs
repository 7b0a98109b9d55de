use super::access::AccessGate;
use super::format;
use crate::engine::{self, Estimate, SportKind};
use crate::feed::types::Tour;
use crate::feed::DataSource;
use crate::store::{NewPrediction, Store, UserProfile};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// League stored with predictions made from a chat command.
const QUICK_PREDICTION: &str = "Quick Prediction";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start { invite: Option<String> },
    Menu(SportKind),
    Help,
    /// `None` when fewer than two names were given.
    Predict { sport: SportKind, names: Option<(String, String)> },
    Matches(SportKind),
    /// Football table by league code; `None` lists the leagues.
    Standings(Option<String>),
    NbaStandings,
    Rankings(Tour),
    ValueBets,
    Stats(SportKind),
    Admin,
    DbStats,
    AddUser(Option<i64>),
    ListUsers,
    Settle { id: Option<i64>, outcome: String },
    Unknown(String),
}

impl Command {
    /// `None` for plain text. A leading `/` is required and an `@botname`
    /// suffix on the command is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let mut words = text.split_whitespace();
        let head = words.next()?.strip_prefix('/')?;
        let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        let names = || match args.as_slice() {
            [a, b, ..] => Some((a.to_string(), b.to_string())),
            _ => None,
        };

        let cmd = match name.as_str() {
            "start" => Command::Start {
                invite: args.first().map(|s| s.to_string()),
            },
            "football" => Command::Menu(SportKind::Football),
            "tennis" => Command::Menu(SportKind::Tennis),
            "basketball" => Command::Menu(SportKind::Basketball),
            "help" => Command::Help,
            "predict" => Command::Predict { sport: SportKind::Football, names: names() },
            "tennispredict" => Command::Predict { sport: SportKind::Tennis, names: names() },
            "basketpredict" => Command::Predict { sport: SportKind::Basketball, names: names() },
            "matches" => Command::Matches(SportKind::Football),
            "tennismatches" => Command::Matches(SportKind::Tennis),
            "basketmatches" => Command::Matches(SportKind::Basketball),
            "standings" => Command::Standings(args.first().map(|s| s.to_ascii_uppercase())),
            "nbastandings" => Command::NbaStandings,
            "atp" => Command::Rankings(Tour::Atp),
            "wta" => Command::Rankings(Tour::Wta),
            "rankings" => Command::Rankings(args.first().map(|s| Tour::parse(s)).unwrap_or(Tour::Atp)),
            "value" => Command::ValueBets,
            "mystats" => Command::Stats(SportKind::Football),
            "tennisstats" => Command::Stats(SportKind::Tennis),
            "basketstats" => Command::Stats(SportKind::Basketball),
            "admin" => Command::Admin,
            "dbstats" => Command::DbStats,
            "adduser" => Command::AddUser(args.first().and_then(|s| s.parse().ok())),
            "listusers" => Command::ListUsers,
            "settle" => Command::Settle {
                id: args.first().and_then(|s| s.parse().ok()),
                outcome: args.get(1..).map(|rest| rest.join(" ")).unwrap_or_default(),
            },
            _ => Command::Unknown(name),
        };
        Some(cmd)
    }

    pub fn admin_only(&self) -> bool {
        matches!(
            self,
            Command::Admin | Command::DbStats | Command::AddUser(_) | Command::ListUsers | Command::Settle { .. }
        )
    }
}

/// One inbound chat message.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub chat_id: i64,
    pub user: UserProfile,
    pub text: String,
}

pub struct Dispatcher {
    store: Store,
    source: Arc<DataSource>,
    gate: Arc<dyn AccessGate>,
    admins: HashSet<i64>,
    invite_code: String,
    rng: Mutex<StdRng>,
}

impl Dispatcher {
    pub fn new(
        store: Store,
        source: Arc<DataSource>,
        gate: Arc<dyn AccessGate>,
        admins: impl IntoIterator<Item = i64>,
        invite_code: String,
    ) -> Self {
        Self::with_rng(store, source, gate, admins, invite_code, StdRng::from_entropy())
    }

    pub fn with_rng(
        store: Store,
        source: Arc<DataSource>,
        gate: Arc<dyn AccessGate>,
        admins: impl IntoIterator<Item = i64>,
        invite_code: String,
        rng: StdRng,
    ) -> Self {
        Self {
            store,
            source,
            gate,
            admins: admins.into_iter().collect(),
            invite_code,
            rng: Mutex::new(rng),
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.contains(&user_id)
    }

    /// Reply to `msg`, or `None` when it is not a command.
    pub async fn handle(&self, msg: &Incoming) -> Option<String> {
        let cmd = Command::parse(&msg.text)?;
        let user_id = msg.user.platform_id;

        if !self.gate.is_allowed(user_id) {
            if let Command::Start { invite: Some(code) } = &cmd {
                if *code == self.invite_code {
                    self.gate.grant(user_id);
                    info!(user_id, "invite code accepted");
                    return Some(format::invitation_accepted());
                }
            }
            info!(user_id, "access denied");
            return Some(format::access_restricted(&self.invite_code));
        }

        if cmd.admin_only() && !self.is_admin(user_id) {
            warn!(user_id, ?cmd, "admin command from non-admin");
            return Some(format::ADMIN_REQUIRED.to_string());
        }

        if let Err(e) = self.store.get_or_create_user(&msg.user).await {
            error!(user_id, error = %e, "user sync failed");
        }

        Some(self.dispatch(cmd, &msg.user).await)
    }

    async fn dispatch(&self, cmd: Command, user: &UserProfile) -> String {
        match cmd {
            Command::Start { .. } => format::start(),
            Command::Menu(sport) => format::sport_menu(sport, self.source.is_simulated()),
            Command::Help => format::help(),
            Command::Predict { sport, names: None } => format::predict_usage(sport),
            Command::Predict { sport, names: Some((a, b)) } => self.predict(sport, &a, &b, user).await,
            Command::Matches(SportKind::Football) => format::football_fixtures(&self.source.football_fixtures().await),
            Command::Matches(SportKind::Tennis) => format::tennis_matches(&self.source.tennis_matches().await),
            Command::Matches(SportKind::Basketball) => {
                format::basketball_games(&self.source.basketball_games().await)
            }
            Command::Standings(None) => format::standings_menu(),
            Command::Standings(Some(code)) => self.standings(SportKind::Football, &code).await,
            Command::NbaStandings => self.standings(SportKind::Basketball, "").await,
            Command::Rankings(tour) => format::rankings(&self.source.fetch_rankings(tour).await),
            Command::ValueBets => self.value_bets().await,
            Command::Stats(sport) => self.stats(sport, user).await,
            Command::Admin => self.admin().await,
            Command::DbStats => self.db_stats().await,
            Command::AddUser(None) => "Usage: `/adduser [user_id]`".to_string(),
            Command::AddUser(Some(id)) => {
                if self.gate.grant(id) {
                    info!(user_id = id, granted_by = user.platform_id, "user added");
                    self.audit("info", &format!("user {id} granted access"), user.platform_id).await;
                    format!("✅ User `{id}` can now use the bot.")
                } else {
                    format!("ℹ️ User `{id}` already has access.")
                }
            }
            Command::ListUsers => format::allowed_users(&self.gate.allowed(), self.gate.invite_only()),
            Command::Settle { id: None, .. } => "Usage: `/settle [prediction_id] [outcome]`".to_string(),
            Command::Settle { outcome, .. } if outcome.is_empty() => {
                "Usage: `/settle [prediction_id] [outcome]`".to_string()
            }
            Command::Settle { id: Some(id), outcome } => self.settle(id, &outcome, user).await,
            Command::Unknown(name) => format!("Unknown command `/{name}`. Try /help."),
        }
    }

    async fn predict(&self, sport: SportKind, a: &str, b: &str, user: &UserProfile) -> String {
        let estimate = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            engine::estimate(a, b, sport, &mut *rng)
        };

        let record = NewPrediction::from_estimate(&estimate, Some(QUICK_PREDICTION.to_string()));
        let note = match self.store.save_prediction(user, &record).await {
            Ok(saved) => {
                info!(id = saved.id, %sport, user_id = user.platform_id, "prediction saved");
                format::SAVED_NOTE
            }
            Err(e) => {
                error!(%sport, user_id = user.platform_id, error = %e, "prediction save failed");
                format::NOT_SAVED_NOTE
            }
        };

        match &estimate {
            Estimate::Football(e) => format::football_prediction(e, note),
            Estimate::Tennis(e) => format::tennis_prediction(e, note),
            Estimate::Basketball(e) => format::basketball_prediction(e, note),
        }
    }

    async fn standings(&self, sport: SportKind, league: &str) -> String {
        match self.source.fetch_standings(sport, league).await {
            Ok(table) => format::standings(&table),
            Err(e) => {
                warn!(%sport, league, error = %e, "standings unavailable");
                "❌ Could not fetch standings.".to_string()
            }
        }
    }

    async fn value_bets(&self) -> String {
        match self.store.active_value_bets(Utc::now(), Duration::hours(24)).await {
            Ok(bets) => format::value_bets(&bets),
            Err(e) => {
                error!(error = %e, "value bets query failed");
                format::value_bets_unavailable()
            }
        }
    }

    async fn stats(&self, sport: SportKind, user: &UserProfile) -> String {
        let name = user.display_name();
        match self.store.get_stats(user.platform_id, sport).await {
            Ok(stats) => {
                info!(user_id = user.platform_id, %sport, total = stats.total, "stats shown");
                format::stats(sport, &name, user.platform_id, &stats)
            }
            Err(e) => {
                error!(user_id = user.platform_id, %sport, error = %e, "stats query failed");
                format::stats_unavailable(sport, &name, user.platform_id)
            }
        }
    }

    async fn admin(&self) -> String {
        let overview = match self.store.overview().await {
            Ok(o) => Some(o),
            Err(e) => {
                error!(error = %e, "admin overview failed");
                None
            }
        };
        format::admin_panel(overview.as_ref(), self.gate.invite_only(), &self.invite_code)
    }

    async fn db_stats(&self) -> String {
        match self.store.overview().await {
            Ok(o) => format::db_stats(&o, Utc::now()),
            Err(e) => {
                error!(error = %e, "db stats failed");
                format::db_stats_unavailable()
            }
        }
    }

    async fn settle(&self, id: i64, outcome: &str, user: &UserProfile) -> String {
        match self.store.settle_prediction(id, outcome).await {
            Ok(p) => {
                self.audit("info", &format!("prediction {id} settled as {outcome}"), user.platform_id)
                    .await;
                format::settled(&p)
            }
            Err(crate::store::StoreError::NotFound(_)) => format!("❌ Prediction #{id} not found."),
            Err(crate::store::StoreError::AlreadySettled(_)) => format!("ℹ️ Prediction #{id} is already settled."),
            Err(e) => {
                error!(id, error = %e, "settle failed");
                "⚠️ Settlement temporarily unavailable.".to_string()
            }
        }
    }

    async fn audit(&self, level: &str, message: &str, user_id: i64) {
        if let Err(e) = self.store.record_log(level, message, Some(user_id)).await {
            warn!(error = %e, "audit log write failed");
        }
    }
}
