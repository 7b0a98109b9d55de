//! Persistence gateway over SQLite.
//!
//! Every write runs in its own transaction; dropping an uncommitted
//! transaction rolls it back, so an `Err` from any method leaves the
//! database as it was.

pub mod error;
pub mod models;

pub use error::{Result, StoreError};
pub use models::*;

use crate::engine::{round_to, SportKind};
use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info, instrument};

/// Most recent predictions returned with stats.
pub const RECENT_LIMIT: i64 = 5;
/// Most value bets returned at once.
pub const VALUE_BET_LIMIT: i64 = 10;

const USER_COLUMNS: &str = "id, platform_id, username, first_name, last_name, created_at, last_seen, \
     is_active, is_premium, is_subscribed";

const PREDICTION_COLUMNS: &str = "p.id, p.user_id, p.sport, p.entity_a, p.entity_b, p.league, \
     p.predicted_outcome, p.prob_a, p.draw_prob, p.prob_b, p.confidence, p.surface, \
     p.actual_outcome, p.is_correct, p.created_at";

const VALUE_BET_COLUMNS: &str = "id, home_team, away_team, league, market, selection, odds, \
     probability, edge, confidence, stake_hint, is_active, expires_at, created_at";

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Build a lazily-connecting pool. Nothing touches the database until
    /// the first query, so a bad path surfaces on first use.
    pub fn connect(database_url: &str, max_connections: u32, idle_timeout: std::time::Duration) -> Result<Self> {
        if !database_url.starts_with("sqlite:") {
            return Err(StoreError::UnsupportedUrl(database_url.to_string()));
        }
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(idle_timeout)
            .connect_lazy_with(options);
        info!(url = database_url, "SQLite pool configured");
        Ok(Self { pool })
    }

    /// Private in-memory database with the schema applied. One connection,
    /// never recycled, or the data would vanish with it.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ==================== Users ====================

    /// Insert the user on first sight; afterwards refresh the names that
    /// were supplied and always bump `last_seen`.
    #[instrument(skip(self, profile), fields(platform_id = profile.platform_id))]
    pub async fn get_or_create_user(&self, profile: &UserProfile) -> Result<User> {
        let mut tx = self.pool.begin().await?;
        let user = upsert_user(&mut tx, profile, Utc::now()).await?;
        tx.commit().await?;
        Ok(user)
    }

    pub async fn find_user(&self, platform_id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE platform_id = ?"))
            .bind(platform_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn recent_users(&self, limit: i64) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY last_seen DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(user_from_row).collect()
    }

    // ==================== Predictions ====================

    /// Upsert the user and store the prediction in one transaction.
    #[instrument(skip(self, profile, prediction), fields(platform_id = profile.platform_id, sport = %prediction.sport))]
    pub async fn save_prediction(&self, profile: &UserProfile, prediction: &NewPrediction) -> Result<Prediction> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let user = upsert_user(&mut tx, profile, now).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO predictions (user_id, sport, entity_a, entity_b, league, predicted_outcome,
                                     prob_a, draw_prob, prob_b, confidence, surface, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user.id)
        .bind(prediction.sport.as_str())
        .bind(&prediction.entity_a)
        .bind(&prediction.entity_b)
        .bind(&prediction.league)
        .bind(&prediction.predicted_outcome)
        .bind(prediction.prob_a)
        .bind(prediction.draw_prob)
        .bind(prediction.prob_b)
        .bind(prediction.confidence)
        .bind(&prediction.surface)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        let id: i64 = row.try_get("id")?;

        tx.commit().await?;
        debug!(id, "prediction saved");

        Ok(Prediction {
            id,
            user_id: user.id,
            sport: prediction.sport,
            entity_a: prediction.entity_a.clone(),
            entity_b: prediction.entity_b.clone(),
            league: prediction.league.clone(),
            predicted_outcome: prediction.predicted_outcome.clone(),
            prob_a: prediction.prob_a,
            draw_prob: prediction.draw_prob,
            prob_b: prediction.prob_b,
            confidence: prediction.confidence,
            surface: prediction.surface.clone(),
            actual_outcome: None,
            is_correct: None,
            created_at: now,
        })
    }

    pub async fn get_prediction(&self, id: i64) -> Result<Option<Prediction>> {
        let row = sqlx::query(&format!("SELECT {PREDICTION_COLUMNS} FROM predictions p WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(prediction_from_row).transpose()
    }

    /// Record the real result. `is_correct` compares it with the stored
    /// prediction, case-insensitively. A prediction settles once.
    #[instrument(skip(self))]
    pub async fn settle_prediction(&self, id: i64, actual_outcome: &str) -> Result<Prediction> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT predicted_outcome, actual_outcome FROM predictions WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("prediction {id}")))?;
        let predicted: String = row.try_get("predicted_outcome")?;
        let settled: Option<String> = row.try_get("actual_outcome")?;
        if settled.is_some() {
            return Err(StoreError::AlreadySettled(id));
        }

        let actual = actual_outcome.trim();
        let is_correct = predicted.eq_ignore_ascii_case(actual);
        sqlx::query("UPDATE predictions SET actual_outcome = ?, is_correct = ? WHERE id = ?")
            .bind(actual)
            .bind(is_correct)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query(&format!("SELECT {PREDICTION_COLUMNS} FROM predictions p WHERE p.id = ?"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        let prediction = prediction_from_row(&row)?;
        tx.commit().await?;

        info!(id, is_correct, "prediction settled");
        Ok(prediction)
    }

    /// Read-only; a user that was never seen gets zero stats.
    #[instrument(skip(self))]
    pub async fn get_stats(&self, platform_id: i64, sport: SportKind) -> Result<Stats> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(CASE WHEN p.is_correct = 1 THEN 1 ELSE 0 END), 0) AS correct
            FROM predictions p
            JOIN users u ON u.id = p.user_id
            WHERE u.platform_id = ? AND p.sport = ?
            "#,
        )
        .bind(platform_id)
        .bind(sport.as_str())
        .fetch_one(&self.pool)
        .await?;
        let total: i64 = row.try_get("total")?;
        let correct: i64 = row.try_get("correct")?;

        if total == 0 {
            return Ok(Stats::empty());
        }

        let rows = sqlx::query(&format!(
            r#"
            SELECT {PREDICTION_COLUMNS}
            FROM predictions p
            JOIN users u ON u.id = p.user_id
            WHERE u.platform_id = ? AND p.sport = ?
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ?
            "#
        ))
        .bind(platform_id)
        .bind(sport.as_str())
        .bind(RECENT_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        let recent = rows.iter().map(prediction_from_row).collect::<Result<Vec<_>>>()?;

        Ok(Stats {
            total,
            correct,
            accuracy: accuracy(correct, total),
            recent,
        })
    }

    // ==================== Value bets ====================

    pub async fn insert_value_bet(&self, bet: &NewValueBet) -> Result<ValueBet> {
        let mut conn = self.pool.acquire().await?;
        insert_bet(&mut conn, bet, Utc::now()).await
    }

    /// Active bets expiring strictly inside `(now, now + window)`, best edge
    /// first, at most ten.
    pub async fn active_value_bets(&self, now: DateTime<Utc>, window: Duration) -> Result<Vec<ValueBet>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {VALUE_BET_COLUMNS}
            FROM value_bets
            WHERE is_active = 1 AND expires_at > ? AND expires_at < ?
            ORDER BY edge DESC
            LIMIT ?
            "#
        ))
        .bind(now)
        .bind(now + window)
        .bind(VALUE_BET_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(value_bet_from_row).collect()
    }

    /// Insert the two sample bets, expiring a day after `now`. A sample that
    /// is still active and unexpired at `now` is not inserted again; only
    /// the rows actually written are returned.
    pub async fn seed_sample_value_bets(&self, now: DateTime<Utc>) -> Result<Vec<ValueBet>> {
        let expires_at = now + Duration::days(1);
        let samples = [
            NewValueBet {
                home_team: "Inter".into(),
                away_team: "Milan".into(),
                league: "Serie A".into(),
                market: "Over/Under".into(),
                selection: "Over 2.5 Goals".into(),
                odds: 2.10,
                probability: 52.4,
                edge: 7.3,
                confidence: 0.85,
                stake_hint: "⭐⭐⭐".into(),
                expires_at,
            },
            NewValueBet {
                home_team: "Barcelona".into(),
                away_team: "Real Madrid".into(),
                league: "La Liga".into(),
                market: "BTTS".into(),
                selection: "Yes".into(),
                odds: 1.75,
                probability: 68.2,
                edge: 5.8,
                confidence: 0.78,
                stake_hint: "⭐⭐".into(),
                expires_at,
            },
        ];

        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(samples.len());
        for bet in &samples {
            let live: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM value_bets
                WHERE home_team = ? AND away_team = ? AND market = ?
                  AND is_active = 1 AND expires_at > ?
                "#,
            )
            .bind(&bet.home_team)
            .bind(&bet.away_team)
            .bind(&bet.market)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
            if live > 0 {
                debug!(home = %bet.home_team, away = %bet.away_team, market = %bet.market, "sample bet still live, skipping");
                continue;
            }
            inserted.push(insert_bet(&mut tx, bet, now).await?);
        }
        tx.commit().await?;
        info!(count = inserted.len(), "sample value bets seeded");
        Ok(inserted)
    }

    // ==================== Admin ====================

    pub async fn overview(&self) -> Result<Overview> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(is_active), 0) AS active,
                   COALESCE(SUM(is_premium), 0) AS premium
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        let users_total: i64 = row.try_get("total")?;
        let users_active: i64 = row.try_get("active")?;
        let users_premium: i64 = row.try_get("premium")?;

        let rows = sqlx::query(
            r#"
            SELECT sport,
                   COUNT(*) AS total,
                   COALESCE(SUM(CASE WHEN is_correct = 1 THEN 1 ELSE 0 END), 0) AS correct,
                   COALESCE(SUM(CASE WHEN actual_outcome IS NULL THEN 1 ELSE 0 END), 0) AS pending
            FROM predictions
            GROUP BY sport
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        let mut sports: Vec<SportTally> = SportKind::ALL
            .iter()
            .map(|&sport| SportTally {
                sport,
                total: 0,
                correct: 0,
                pending: 0,
            })
            .collect();
        for row in &rows {
            let sport = parse_sport(row.try_get("sport")?)?;
            if let Some(tally) = sports.iter_mut().find(|t| t.sport == sport) {
                tally.total = row.try_get("total")?;
                tally.correct = row.try_get("correct")?;
                tally.pending = row.try_get("pending")?;
            }
        }

        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total, COALESCE(SUM(is_active), 0) AS active
            FROM value_bets
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(Overview {
            users_total,
            users_active,
            users_premium,
            sports,
            value_bets_total: row.try_get("total")?,
            value_bets_active: row.try_get("active")?,
            recent_users: self.recent_users(5).await?,
        })
    }

    pub async fn record_log(&self, level: &str, message: &str, user_id: Option<i64>) -> Result<()> {
        sqlx::query("INSERT INTO system_logs (level, message, user_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(level)
            .bind(message)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn log_count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM system_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}

async fn insert_bet(conn: &mut SqliteConnection, bet: &NewValueBet, now: DateTime<Utc>) -> Result<ValueBet> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO value_bets (home_team, away_team, league, market, selection, odds,
                                probability, edge, confidence, stake_hint, is_active,
                                expires_at, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
        RETURNING {VALUE_BET_COLUMNS}
        "#
    ))
    .bind(&bet.home_team)
    .bind(&bet.away_team)
    .bind(&bet.league)
    .bind(&bet.market)
    .bind(&bet.selection)
    .bind(bet.odds)
    .bind(bet.probability)
    .bind(bet.edge)
    .bind(bet.confidence)
    .bind(&bet.stake_hint)
    .bind(bet.expires_at)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    value_bet_from_row(&row)
}

async fn upsert_user(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    profile: &UserProfile,
    now: DateTime<Utc>,
) -> Result<User> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO users (platform_id, username, first_name, last_name, created_at, last_seen)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (platform_id) DO UPDATE SET
            username = COALESCE(excluded.username, users.username),
            first_name = COALESCE(excluded.first_name, users.first_name),
            last_name = COALESCE(excluded.last_name, users.last_name),
            last_seen = excluded.last_seen
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(profile.platform_id)
    .bind(&profile.username)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(now)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;
    user_from_row(&row)
}

/// `correct / total` as a percentage, one decimal.
pub fn accuracy(correct: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(correct as f64 / total as f64 * 100.0, 1)
}

fn parse_sport(raw: String) -> Result<SportKind> {
    SportKind::from_str(&raw).map_err(|_| StoreError::Corrupt(format!("unknown sport {raw:?}")))
}

fn user_from_row(r: &SqliteRow) -> Result<User> {
    Ok(User {
        id: r.try_get("id")?,
        platform_id: r.try_get("platform_id")?,
        username: r.try_get("username")?,
        first_name: r.try_get("first_name")?,
        last_name: r.try_get("last_name")?,
        created_at: r.try_get("created_at")?,
        last_seen: r.try_get("last_seen")?,
        is_active: r.try_get("is_active")?,
        is_premium: r.try_get("is_premium")?,
        is_subscribed: r.try_get("is_subscribed")?,
    })
}

fn prediction_from_row(r: &SqliteRow) -> Result<Prediction> {
    Ok(Prediction {
        id: r.try_get("id")?,
        user_id: r.try_get("user_id")?,
        sport: parse_sport(r.try_get("sport")?)?,
        entity_a: r.try_get("entity_a")?,
        entity_b: r.try_get("entity_b")?,
        league: r.try_get("league")?,
        predicted_outcome: r.try_get("predicted_outcome")?,
        prob_a: r.try_get("prob_a")?,
        draw_prob: r.try_get("draw_prob")?,
        prob_b: r.try_get("prob_b")?,
        confidence: r.try_get("confidence")?,
        surface: r.try_get("surface")?,
        actual_outcome: r.try_get("actual_outcome")?,
        is_correct: r.try_get("is_correct")?,
        created_at: r.try_get("created_at")?,
    })
}

fn value_bet_from_row(r: &SqliteRow) -> Result<ValueBet> {
    Ok(ValueBet {
        id: r.try_get("id")?,
        home_team: r.try_get("home_team")?,
        away_team: r.try_get("away_team")?,
        league: r.try_get("league")?,
        market: r.try_get("market")?,
        selection: r.try_get("selection")?,
        odds: r.try_get("odds")?,
        probability: r.try_get("probability")?,
        edge: r.try_get("edge")?,
        confidence: r.try_get("confidence")?,
        stake_hint: r.try_get("stake_hint")?,
        is_active: r.try_get("is_active")?,
        expires_at: r.try_get("expires_at")?,
        created_at: r.try_get("created_at")?,
    })
}
