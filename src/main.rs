use anyhow::Result;
use sportsbot::bot::{telegram, AccessGate, Dispatcher, InviteList};
use sportsbot::config::{Config, Secrets};
use sportsbot::feed::api_sports::ApiSportsClient;
use sportsbot::feed::{DataSource, SportsApi};
use sportsbot::store::Store;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sportsbot=info")))
        .init();

    let config = Config::load_or_default(Path::new("config.toml"))?;

    // Load saved keys from .env (real env vars take precedence)
    Config::load_env_file();

    let secrets = match Secrets::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "startup configuration invalid");
            eprintln!("  {e}");
            std::process::exit(1);
        }
    };

    info!(
        invite_only = secrets.invite_only,
        admins = secrets.admin_ids.len(),
        sports_api = secrets.sports_api_key.is_some(),
        "sportsbot v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let store = Store::connect(
        &secrets.database_url,
        config.store.max_connections,
        Duration::from_secs(config.store.idle_timeout_s),
    )?;
    // Without a schema every store call fails and replies degrade, but
    // predictions and schedules still work.
    match store.migrate().await {
        Ok(()) => {
            if config.store.seed_sample_value_bets {
                if let Err(e) = store.seed_sample_value_bets(chrono::Utc::now()).await {
                    warn!(error = %e, "could not seed sample value bets");
                }
            }
        }
        Err(e) => error!(error = %e, "database migration failed, continuing without history"),
    }

    let api: Option<Arc<dyn SportsApi>> = match &secrets.sports_api_key {
        Some(key) => Some(Arc::new(ApiSportsClient::new(key.clone(), &config.sports_api)?)),
        None => {
            info!("no SPORTS_API_KEY set, using simulated data");
            None
        }
    };
    let source = Arc::new(DataSource::new(
        api,
        config.sports_api.clone(),
        config.football.clone(),
        config.basketball.clone(),
    ));

    let gate: Arc<dyn AccessGate> = Arc::new(InviteList::new(secrets.invite_only, secrets.admin_ids.iter().copied()));
    let dispatcher = Dispatcher::new(
        store,
        source,
        gate,
        secrets.admin_ids.iter().copied(),
        config.bot.invite_code.clone(),
    );

    let client = telegram::TelegramClient::new(&secrets.bot_token, &config.bot)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "no ctrl-c handler, running until killed");
                // Dropping the sender would read as a shutdown.
                std::future::pending::<()>().await;
            }
        }
    });

    telegram::run(&client, &dispatcher, shutdown_rx).await?;
    info!("sportsbot stopped");
    Ok(())
}
