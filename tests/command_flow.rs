// End-to-end command handling: access gate, dispatch, persistence and the
// degraded replies when the store is unusable

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sportsbot::bot::format;
    use sportsbot::bot::{AccessGate, Dispatcher, Incoming, InviteList};
    use sportsbot::engine::SportKind;
    use sportsbot::feed::DataSource;
    use sportsbot::store::{Store, UserProfile};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;

    const ADMIN: i64 = 1;
    const MEMBER: i64 = 2;
    const STRANGER: i64 = 3;

    fn msg(user: i64, text: &str) -> Incoming {
        Incoming {
            chat_id: user,
            user: UserProfile {
                platform_id: user,
                username: Some(format!("user{user}")),
                first_name: Some(format!("User {user}")),
                last_name: None,
            },
            text: text.to_string(),
        }
    }

    fn dispatcher(store: Store, gate: Arc<InviteList>) -> Dispatcher {
        Dispatcher::with_rng(
            store,
            Arc::new(DataSource::simulated(StdRng::seed_from_u64(11))),
            gate,
            [ADMIN],
            "invite123".to_string(),
            StdRng::seed_from_u64(12),
        )
    }

    async fn setup() -> (Dispatcher, Arc<InviteList>, Store) {
        let store = Store::open_in_memory().await.unwrap();
        let gate = Arc::new(InviteList::new(true, [ADMIN, MEMBER]));
        (dispatcher(store.clone(), gate.clone()), gate, store)
    }

    /// A store whose schema was never created: every query fails.
    async fn broken_store() -> Store {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        Store::from_pool(pool)
    }

    #[tokio::test]
    async fn test_plain_text_is_ignored() {
        let (d, _, _) = setup().await;
        assert!(d.handle(&msg(MEMBER, "good morning")).await.is_none());
    }

    #[tokio::test]
    async fn test_stranger_is_restricted_until_invite() {
        let (d, gate, _) = setup().await;

        let reply = d.handle(&msg(STRANGER, "/matches")).await.unwrap();
        assert!(reply.contains("Access Restricted"));

        let reply = d.handle(&msg(STRANGER, "/start wrongcode")).await.unwrap();
        assert!(reply.contains("Access Restricted"));
        assert!(!gate.is_allowed(STRANGER));

        let reply = d.handle(&msg(STRANGER, "/start invite123")).await.unwrap();
        assert!(reply.contains("Invitation accepted"));
        assert!(gate.is_allowed(STRANGER));

        let reply = d.handle(&msg(STRANGER, "/matches")).await.unwrap();
        assert!(reply.contains("TODAY'S FOOTBALL MATCHES"));
    }

    #[tokio::test]
    async fn test_open_mode_lets_everyone_in() {
        let store = Store::open_in_memory().await.unwrap();
        let d = dispatcher(store, Arc::new(InviteList::new(false, Vec::new())));
        let reply = d.handle(&msg(STRANGER, "/help")).await.unwrap();
        assert!(reply.contains("HELP GUIDE"));
    }

    #[tokio::test]
    async fn test_simulated_matches_show_fallback_list() {
        let (d, _, _) = setup().await;
        let reply = d.handle(&msg(MEMBER, "/matches")).await.unwrap();
        assert!(reply.contains("⏰ Inter vs Milan (20:45)"));
        assert!(reply.contains("⏰ Bayern vs Dortmund (17:30)"));
        assert!(reply.ends_with("_Total: 5 matches_"));

        let menu = d.handle(&msg(MEMBER, "/football")).await.unwrap();
        assert!(menu.contains("Using Simulation"));
    }

    #[tokio::test]
    async fn test_predict_saves_and_shows_in_stats() {
        let (d, _, store) = setup().await;

        let reply = d.handle(&msg(MEMBER, "/predict Inter Milan")).await.unwrap();
        assert!(reply.contains("QUICK PREDICTION: Inter vs Milan"));
        assert!(reply.contains("Predicted: *1* (54.7% confidence)"));
        assert!(reply.contains(format::SAVED_NOTE));

        let stats = store.get_stats(MEMBER, SportKind::Football).await.unwrap();
        assert_eq!(stats.total, 1);

        let reply = d.handle(&msg(MEMBER, "/mystats")).await.unwrap();
        assert!(reply.contains("Total Predictions: 1"));
        assert!(reply.contains("Inter vs Milan (⏳ Pending)"));
    }

    #[tokio::test]
    async fn test_predict_usage_when_names_missing() {
        let (d, _, _) = setup().await;
        let reply = d.handle(&msg(MEMBER, "/tennispredict Djokovic")).await.unwrap();
        assert!(reply.starts_with("Usage: `/tennispredict"));
    }

    #[tokio::test]
    async fn test_tennis_and_basketball_predictions() {
        let (d, _, store) = setup().await;
        let reply = d.handle(&msg(MEMBER, "/tennispredict Sinner Alcaraz")).await.unwrap();
        assert!(reply.contains("TENNIS PREDICTION: Sinner vs Alcaraz"));
        let reply = d.handle(&msg(MEMBER, "/basketpredict Lakers Lakers")).await.unwrap();
        // Home court decides identical names.
        assert!(reply.contains("Predicted Winner: *Lakers*"));
        assert!(reply.contains("Projected Spread: -"));

        assert_eq!(store.get_stats(MEMBER, SportKind::Tennis).await.unwrap().total, 1);
        assert_eq!(store.get_stats(MEMBER, SportKind::Basketball).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_store_failure_degrades_replies() {
        let gate = Arc::new(InviteList::new(true, [ADMIN, MEMBER]));
        let d = dispatcher(broken_store().await, gate);

        // The prediction is still shown.
        let reply = d.handle(&msg(MEMBER, "/predict Inter Milan")).await.unwrap();
        assert!(reply.contains("Home Win: 54.7%"));
        assert!(reply.contains(format::NOT_SAVED_NOTE));

        let reply = d.handle(&msg(MEMBER, "/mystats")).await.unwrap();
        assert!(reply.contains("temporarily unavailable"));

        let reply = d.handle(&msg(MEMBER, "/value")).await.unwrap();
        assert!(reply.contains("temporarily unavailable"));

        let reply = d.handle(&msg(ADMIN, "/admin")).await.unwrap();
        assert!(reply.contains("Total Users: N/A"));

        // Schedules do not need the store.
        let reply = d.handle(&msg(MEMBER, "/basketmatches")).await.unwrap();
        assert!(reply.contains("TODAY'S BASKETBALL GAMES"));
    }

    #[tokio::test]
    async fn test_value_bets_from_seeded_samples() {
        let (d, _, store) = setup().await;
        let reply = d.handle(&msg(MEMBER, "/value")).await.unwrap();
        assert!(reply.contains("NO VALUE BETS TODAY"));

        store.seed_sample_value_bets(chrono::Utc::now()).await.unwrap();
        let reply = d.handle(&msg(MEMBER, "/value")).await.unwrap();
        assert!(reply.contains("1. *Inter vs Milan* (Serie A)"));
        assert!(reply.contains("Edge: +7.3% | Confidence: 85%"));
    }

    #[tokio::test]
    async fn test_admin_commands_require_admin() {
        let (d, gate, _) = setup().await;
        let reply = d.handle(&msg(MEMBER, "/adduser 55")).await.unwrap();
        assert_eq!(reply, format::ADMIN_REQUIRED);
        assert!(!gate.is_allowed(55));

        let reply = d.handle(&msg(ADMIN, "/adduser 55")).await.unwrap();
        assert!(reply.contains("55"));
        assert!(gate.is_allowed(55));

        let reply = d.handle(&msg(ADMIN, "/listusers")).await.unwrap();
        assert!(reply.contains("ALLOWED USERS (3)"));

        let reply = d.handle(&msg(ADMIN, "/dbstats")).await.unwrap();
        assert!(reply.contains("DETAILED DATABASE STATISTICS"));
    }

    #[tokio::test]
    async fn test_admin_settles_prediction() {
        let (d, _, store) = setup().await;
        d.handle(&msg(MEMBER, "/predict Inter Milan")).await.unwrap();
        let id = store.get_stats(MEMBER, SportKind::Football).await.unwrap().recent[0].id;

        let reply = d.handle(&msg(ADMIN, &format!("/settle {id} 1"))).await.unwrap();
        assert!(reply.contains("Correct"));

        let reply = d.handle(&msg(ADMIN, &format!("/settle {id} 2"))).await.unwrap();
        assert!(reply.contains("already settled"));

        let stats = store.get_stats(MEMBER, SportKind::Football).await.unwrap();
        assert_eq!(stats.accuracy, 100.0);
        assert_eq!(store.log_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_standings_and_rankings() {
        let (d, _, _) = setup().await;
        let reply = d.handle(&msg(MEMBER, "/standings")).await.unwrap();
        assert!(reply.contains("/standings SA"));
        let reply = d.handle(&msg(MEMBER, "/standings SA")).await.unwrap();
        assert!(reply.contains("Serie A STANDINGS"));
        let reply = d.handle(&msg(MEMBER, "/nbastandings")).await.unwrap();
        assert!(reply.contains("Boston Celtics"));
        let reply = d.handle(&msg(MEMBER, "/wta")).await.unwrap();
        assert!(reply.contains("WTA RANKINGS"));
        assert!(reply.contains("Iga Swiatek"));
    }
}
