// Integration tests for the persistence gateway against in-memory SQLite

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use sportsbot::engine::{self, SportKind};
    use sportsbot::store::{NewPrediction, NewValueBet, Store, StoreError, UserProfile};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn profile(id: i64, first: &str) -> UserProfile {
        UserProfile {
            platform_id: id,
            username: None,
            first_name: Some(first.to_string()),
            last_name: None,
        }
    }

    fn prediction(sport: SportKind, a: &str, b: &str) -> NewPrediction {
        let est = engine::estimate(a, b, sport, &mut StdRng::seed_from_u64(3));
        NewPrediction::from_estimate(&est, Some("Quick Prediction".to_string()))
    }

    fn bet(edge: f64, expires_in: Duration) -> NewValueBet {
        NewValueBet {
            home_team: "Home".into(),
            away_team: "Away".into(),
            league: "League".into(),
            market: "BTTS".into(),
            selection: "Yes".into(),
            odds: 1.9,
            probability: 55.0,
            edge,
            confidence: 0.7,
            stake_hint: "⭐".into(),
            expires_at: Utc::now() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_get_or_create_user_twice_no_duplicate() {
        let store = Store::open_in_memory().await.unwrap();
        let a = store.get_or_create_user(&profile(77, "Ada")).await.unwrap();
        let b = store.get_or_create_user(&profile(77, "Ada L.")).await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(b.first_name.as_deref(), Some("Ada L."));
        assert!(b.is_active);
        assert!(!b.is_premium);
        assert_eq!(store.recent_users(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stats_for_unknown_user_are_zero() {
        let store = Store::open_in_memory().await.unwrap();
        let stats = store.get_stats(404, SportKind::Football).await.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.correct, 0);
        assert_eq!(stats.accuracy, 0.0);
        assert!(stats.recent.is_empty());
        // Reading stats must not create the user.
        assert!(store.find_user(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_prediction_creates_user_and_row() {
        let store = Store::open_in_memory().await.unwrap();
        let saved = store
            .save_prediction(&profile(1, "Ada"), &prediction(SportKind::Football, "Inter", "Milan"))
            .await
            .unwrap();
        assert_eq!(saved.predicted_outcome, "1");
        assert_eq!(saved.draw_prob, Some(20.0));
        assert!(saved.is_correct.is_none());

        let user = store.find_user(1).await.unwrap().unwrap();
        assert_eq!(saved.user_id, user.id);

        let loaded = store.get_prediction(saved.id).await.unwrap().unwrap();
        assert_eq!(loaded.entity_a, "Inter");
        assert_eq!(loaded.league.as_deref(), Some("Quick Prediction"));
        assert_eq!(loaded.prob_a, saved.prob_a);
    }

    #[tokio::test]
    async fn test_stats_scoped_by_sport_and_recent_capped() {
        let store = Store::open_in_memory().await.unwrap();
        let user = profile(5, "Bo");
        for i in 0..7 {
            store
                .save_prediction(&user, &prediction(SportKind::Tennis, &format!("P{i}"), "Q"))
                .await
                .unwrap();
        }
        store
            .save_prediction(&user, &prediction(SportKind::Basketball, "Lakers", "Bulls"))
            .await
            .unwrap();

        let tennis = store.get_stats(5, SportKind::Tennis).await.unwrap();
        assert_eq!(tennis.total, 7);
        assert_eq!(tennis.recent.len(), 5);
        // Newest first.
        assert_eq!(tennis.recent[0].entity_a, "P6");
        assert!(tennis.recent.iter().all(|p| p.sport == SportKind::Tennis));
        assert!(tennis.recent.iter().all(|p| p.surface.is_some()));

        let basketball = store.get_stats(5, SportKind::Basketball).await.unwrap();
        assert_eq!(basketball.total, 1);
        assert_eq!(store.get_stats(5, SportKind::Football).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_settlement_drives_accuracy() {
        let store = Store::open_in_memory().await.unwrap();
        let user = profile(9, "Cy");
        let first = store
            .save_prediction(&user, &prediction(SportKind::Football, "Inter", "Milan"))
            .await
            .unwrap();
        let second = store
            .save_prediction(&user, &prediction(SportKind::Football, "Juventus", "Napoli"))
            .await
            .unwrap();
        store
            .save_prediction(&user, &prediction(SportKind::Football, "Bayern", "Dortmund"))
            .await
            .unwrap();

        let settled = store.settle_prediction(first.id, "1").await.unwrap();
        assert_eq!(settled.is_correct, Some(true));
        assert_eq!(settled.actual_outcome.as_deref(), Some("1"));

        let wrong = if second.predicted_outcome == "X" { "1" } else { "X" };
        let settled = store.settle_prediction(second.id, wrong).await.unwrap();
        assert_eq!(settled.is_correct, Some(false));

        // 1 correct of 3 total -> 33.3%
        let stats = store.get_stats(9, SportKind::Football).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.correct, 1);
        assert_eq!(stats.accuracy, 33.3);

        assert!(matches!(
            store.settle_prediction(first.id, "2").await,
            Err(StoreError::AlreadySettled(_))
        ));
        assert!(matches!(
            store.settle_prediction(9999, "1").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_active_value_bets_window_and_order() {
        let store = Store::open_in_memory().await.unwrap();
        store.insert_value_bet(&bet(4.0, Duration::hours(2))).await.unwrap();
        store.insert_value_bet(&bet(9.0, Duration::hours(20))).await.unwrap();
        // Expired and beyond the window.
        store.insert_value_bet(&bet(12.0, Duration::hours(-1))).await.unwrap();
        store.insert_value_bet(&bet(15.0, Duration::hours(30))).await.unwrap();

        let bets = store.active_value_bets(Utc::now(), Duration::hours(24)).await.unwrap();
        let edges: Vec<f64> = bets.iter().map(|b| b.edge).collect();
        assert_eq!(edges, vec![9.0, 4.0]);
    }

    #[tokio::test]
    async fn test_active_value_bets_capped_at_ten() {
        let store = Store::open_in_memory().await.unwrap();
        for i in 0..12 {
            store.insert_value_bet(&bet(i as f64, Duration::hours(1))).await.unwrap();
        }
        let bets = store.active_value_bets(Utc::now(), Duration::hours(24)).await.unwrap();
        assert_eq!(bets.len(), 10);
        assert_eq!(bets[0].edge, 11.0);
    }

    #[tokio::test]
    async fn test_seeded_samples_are_active() {
        let store = Store::open_in_memory().await.unwrap();
        let now = Utc::now();
        let seeded = store.seed_sample_value_bets(now).await.unwrap();
        assert_eq!(seeded.len(), 2);

        // Samples expire exactly one day out, so query from just after now.
        let bets = store
            .active_value_bets(now + Duration::seconds(1), Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(bets.len(), 2);
        assert_eq!(bets[0].selection, "Over 2.5 Goals");
        assert_eq!(bets[0].edge, 7.3);
        assert_eq!(bets[1].market, "BTTS");
    }

    #[tokio::test]
    async fn test_reseeding_does_not_duplicate_live_samples() {
        let store = Store::open_in_memory().await.unwrap();
        let t0 = Utc::now();
        assert_eq!(store.seed_sample_value_bets(t0).await.unwrap().len(), 2);
        // A restart an hour later finds both samples still live.
        assert!(store
            .seed_sample_value_bets(t0 + Duration::hours(1))
            .await
            .unwrap()
            .is_empty());

        let bets = store
            .active_value_bets(t0 + Duration::hours(2), Duration::hours(24))
            .await
            .unwrap();
        let games: Vec<String> = bets.iter().map(|b| format!("{} vs {}", b.home_team, b.away_team)).collect();
        assert_eq!(games, ["Inter vs Milan", "Barcelona vs Real Madrid"]);
    }

    #[tokio::test]
    async fn test_reseeding_after_expiry_inserts_fresh_samples() {
        let store = Store::open_in_memory().await.unwrap();
        let t0 = Utc::now();
        store.seed_sample_value_bets(t0).await.unwrap();
        let later = t0 + Duration::days(2);
        assert_eq!(store.seed_sample_value_bets(later).await.unwrap().len(), 2);

        let bets = store
            .active_value_bets(later + Duration::seconds(1), Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(bets.len(), 2);
    }

    #[tokio::test]
    async fn test_overview_counts() {
        let store = Store::open_in_memory().await.unwrap();
        let p = store
            .save_prediction(&profile(1, "A"), &prediction(SportKind::Football, "Inter", "Milan"))
            .await
            .unwrap();
        store
            .save_prediction(&profile(2, "B"), &prediction(SportKind::Tennis, "Sinner", "Alcaraz"))
            .await
            .unwrap();
        store.settle_prediction(p.id, "1").await.unwrap();
        store.seed_sample_value_bets(Utc::now()).await.unwrap();
        store.record_log("info", "test entry", Some(1)).await.unwrap();

        let o = store.overview().await.unwrap();
        assert_eq!(o.users_total, 2);
        assert_eq!(o.users_active, 2);
        assert_eq!(o.value_bets_total, 2);
        assert_eq!(o.value_bets_active, 2);
        assert_eq!(o.recent_users.len(), 2);
        let football = o.sports.iter().find(|t| t.sport == SportKind::Football).unwrap();
        assert_eq!((football.total, football.correct, football.pending), (1, 1, 0));
        let tennis = o.sports.iter().find(|t| t.sport == SportKind::Tennis).unwrap();
        assert_eq!((tennis.total, tennis.pending), (1, 1));
        assert_eq!(store.log_count().await.unwrap(), 1);
    }
}
