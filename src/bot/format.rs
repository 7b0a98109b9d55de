//! Reply text, Telegram Markdown (v1).

use crate::engine::football::FootballEstimate;
use crate::engine::{BasketballEstimate, SportKind, TennisEstimate};
use crate::feed::types::{BasketballGame, Fixture, RankingsTable, StandingRows, StandingsTable, TennisMatch};
use crate::store::{Overview, Prediction, Stats, ValueBet};
use chrono::{DateTime, Utc};
use std::fmt::Write;

pub const SAVED_NOTE: &str = "✅ *Saved to your history*";
pub const NOT_SAVED_NOTE: &str = "⚠️ *History not saved*";
pub const ADMIN_REQUIRED: &str = "❌ Admin access required.";

/// Rows shown for a football table.
const STANDINGS_ROWS: usize = 10;
/// Recent predictions listed under stats.
const RECENT_SHOWN: usize = 3;

pub fn access_restricted(invite_code: &str) -> String {
    format!(
        "🔒 *Access Restricted*\n\n\
         This bot is invitation-only.\n\
         Please contact the administrator for access.\n\n\
         If you have an invite code, use:\n\
         `/start {invite_code}`"
    )
}

pub fn invitation_accepted() -> String {
    "✅ *Invitation accepted!* Welcome to Serie AI Bot.\n\nUse /start to access all features.".to_string()
}

pub fn start() -> String {
    "🏆 *MULTI-SPORT PREDICTION BOT*\n\n\
     📊 *Choose Your Sport:*\n\
     • ⚽ /football\n\
     • 🎾 /tennis\n\
     • 🏀 /basketball\n\n\
     ℹ️ /help lists every command."
        .to_string()
}

pub fn sport_menu(sport: SportKind, simulated: bool) -> String {
    let status = if simulated { "⚠️ *Using Simulation*" } else { "✅ *Real Data Enabled*" };
    let body = match sport {
        SportKind::Football => {
            "⚽ *FOOTBALL PREDICTION BOT*\n\n\
             • /matches - Today's matches\n\
             • /standings [SA|PL|PD|BL1] - League standings\n\
             • /predict Home Away - Smart prediction\n\
             • /value - Value bets\n\
             • /mystats - Prediction history"
        }
        SportKind::Tennis => {
            "🎾 *TENNIS PREDICTION BOT*\n\n\
             • /tennismatches - Today's matches\n\
             • /atp or /wta - Rankings\n\
             • /tennispredict P1 P2 - Match prediction\n\
             • /tennisstats - Prediction history"
        }
        SportKind::Basketball => {
            "🏀 *BASKETBALL PREDICTION BOT*\n\n\
             • /basketmatches - Today's games\n\
             • /nbastandings - NBA standings\n\
             • /basketpredict Home Away - Game prediction\n\
             • /basketstats - Prediction history"
        }
    };
    format!("{status}\n\n{body}")
}

pub fn help() -> String {
    "🤖 *MULTI-SPORT AI BOT - HELP GUIDE*\n\n\
     *SPORT SELECTION:*\n\
     /start - Sport selection\n\
     /football /tennis /basketball - Sport menus\n\n\
     *FOOTBALL COMMANDS:*\n\
     /predict [team1] [team2] - Football match prediction\n\
     /matches - Today's football matches\n\
     /standings [SA|PL|PD|BL1] - League standings\n\
     /value - Today's best value bets\n\
     /mystats - Your football prediction statistics\n\n\
     *TENNIS COMMANDS:*\n\
     /tennispredict [p1] [p2] - Tennis match prediction\n\
     /tennismatches - Today's tennis matches\n\
     /atp /wta /rankings [tour] - Rankings\n\
     /tennisstats - Your tennis statistics\n\n\
     *BASKETBALL COMMANDS:*\n\
     /basketpredict [h] [a] - Basketball game prediction\n\
     /basketmatches - Today's basketball games\n\
     /nbastandings - NBA standings\n\
     /basketstats - Your basketball statistics\n\n\
     /help - Show this help message"
        .to_string()
}

pub fn predict_usage(sport: SportKind) -> String {
    let (cmd, a, b, example) = match sport {
        SportKind::Football => ("predict", "Home Team", "Away Team", "Inter Milan"),
        SportKind::Tennis => ("tennispredict", "Player 1", "Player 2", "Djokovic Alcaraz"),
        SportKind::Basketball => ("basketpredict", "Home Team", "Away Team", "Lakers Warriors"),
    };
    format!("Usage: `/{cmd} [{a}] [{b}]`\nExample: `/{cmd} {example}`")
}

pub fn football_prediction(e: &FootballEstimate, save_note: &str) -> String {
    let p = &e.probabilities;
    let v = &e.value_bet;
    format!(
        "⚡ *QUICK PREDICTION: {} vs {}*\n\n\
         📊 *MATCH RESULT:*\n\
         • Home Win: {:.1}%\n\
         • Draw: {:.1}%\n\
         • Away Win: {:.1}%\n\
         • ➡️ Predicted: *{}* ({:.1}% confidence)\n\n\
         🥅 *EXPECTED SCORE:*\n\
         • {}-{} (Total: {})\n\n\
         💎 *BEST VALUE BET:*\n\
         • {}: {} @ {:.2}\n\
         • Edge: +{:.1}% | Stake: ⭐⭐\n\n\
         {}",
        e.home_team,
        e.away_team,
        p.home,
        p.draw,
        p.away,
        e.prediction.label(),
        e.confidence,
        e.goals.home,
        e.goals.away,
        e.goals.home + e.goals.away,
        v.market,
        v.selection.label(),
        v.odds,
        v.edge,
        save_note,
    )
}

pub fn tennis_prediction(e: &TennisEstimate, save_note: &str) -> String {
    let p = &e.probabilities;
    let s = &e.key_stats;
    format!(
        "🎾 *TENNIS PREDICTION: {p1} vs {p2}*\n\n\
         📊 *MATCH WINNER:*\n\
         • {p1}: {:.1}%\n\
         • {p2}: {:.1}%\n\
         • ➡️ Predicted Winner: *{}* ({:.1}% confidence)\n\n\
         🎯 *PREDICTED SCORE:*\n\
         • {}\n\n\
         🏟️ *SURFACE ANALYSIS:*\n\
         • Surface: {}\n\
         • Surface Specialist: {}\n\n\
         📈 *KEY STATS:*\n\
         • Aces Advantage: {}\n\
         • Break Points Won: {}\n\
         • First Serve %: {}\n\n\
         {}",
        p.first,
        p.second,
        e.predicted_winner,
        e.confidence,
        e.predicted_score,
        e.surface,
        e.surface_specialist,
        s.aces_advantage,
        s.break_points,
        s.first_serve,
        save_note,
        p1 = e.player1,
        p2 = e.player2,
    )
}

pub fn basketball_prediction(e: &BasketballEstimate, save_note: &str) -> String {
    let p = &e.probabilities;
    let mut out = format!(
        "🏀 *BASKETBALL PREDICTION: {home} vs {away}*\n\n\
         📊 *PROBABILITIES:*\n\
         • {home}: {:.1}%\n\
         • {away}: {:.1}%\n\
         • ➡️ Predicted Winner: *{}* ({:.1}% confidence)\n\n\
         🎯 *ANALYSIS:*\n\
         • Projected Spread: {}\n\
         • Total Points: {}\n\n\
         📈 *KEY FACTORS:*\n",
        p.first,
        p.second,
        e.predicted_winner,
        e.confidence,
        e.spread_label(),
        e.total_points,
        home = e.home_team,
        away = e.away_team,
    );
    for factor in &e.key_factors {
        let _ = writeln!(out, "• {factor}");
    }
    out.push('\n');
    out.push_str(save_note);
    out
}

/// Group `items` by `key`, keeping first-seen order of the groups.
fn grouped<'a, T>(items: &'a [T], key: impl Fn(&T) -> &str) -> Vec<(&'a str, Vec<&'a T>)>
where
    T: 'a,
{
    let mut groups: Vec<(&'a str, Vec<&'a T>)> = Vec::new();
    for item in items {
        let k = key(item);
        match groups.iter_mut().find(|(g, _)| *g == k) {
            Some((_, members)) => members.push(item),
            None => groups.push((k, vec![item])),
        }
    }
    groups
}

pub fn football_fixtures(fixtures: &[Fixture]) -> String {
    if fixtures.is_empty() {
        return "No matches scheduled for today.".to_string();
    }
    let mut out = String::from("📅 *TODAY'S FOOTBALL MATCHES*\n\n");
    for (league, group) in grouped(fixtures, |f| f.league.as_str()) {
        let _ = writeln!(out, "*{league}*");
        for f in group {
            let _ = writeln!(out, "⏰ {} vs {} ({})", f.home, f.away, f.time);
        }
        out.push('\n');
    }
    let _ = write!(out, "_Total: {} matches_", fixtures.len());
    out
}

pub fn tennis_matches(matches: &[TennisMatch]) -> String {
    if matches.is_empty() {
        return "🎾 *NO TENNIS MATCHES TODAY*\n\nNo tennis matches scheduled for today.".to_string();
    }
    let mut out = String::from("🎾 *TODAY'S TENNIS MATCHES*\n\n");
    for (tournament, group) in grouped(matches, |m| m.tournament.as_str()) {
        let _ = writeln!(out, "*{tournament}*");
        for m in group {
            let _ = writeln!(out, "🎾 {} vs {}", m.player1, m.player2);
            let _ = writeln!(out, "   Surface: {} | Round: {} | {}", m.surface, m.round, m.time);
        }
        out.push('\n');
    }
    let _ = write!(out, "_Total: {} matches_", matches.len());
    out
}

pub fn basketball_games(games: &[BasketballGame]) -> String {
    if games.is_empty() {
        return "🏀 *NO BASKETBALL GAMES TODAY*\n\nNo basketball games scheduled for today.".to_string();
    }
    let mut out = String::from("🏀 *TODAY'S BASKETBALL GAMES*\n\n");
    for (league, group) in grouped(games, |g| g.league.as_str()) {
        let _ = writeln!(out, "*{league}*");
        for g in group {
            let _ = writeln!(out, "🏀 {} vs {}", g.home_team, g.away_team);
            let _ = writeln!(out, "   Time: {} | Date: {}", g.time, g.date);
        }
        out.push('\n');
    }
    let _ = write!(out, "_Total: {} games_", games.len());
    out
}

pub fn standings_menu() -> String {
    "🏆 *Select League Standings:*\n\n\
     /standings SA - 🇮🇹 Serie A\n\
     /standings PL - 🏴󠁧󠁢󠁥󠁮󠁧󠁿 Premier League\n\
     /standings PD - 🇪🇸 La Liga\n\
     /standings BL1 - 🇩🇪 Bundesliga"
        .to_string()
}

fn clip(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

pub fn standings(table: &StandingsTable) -> String {
    match &table.rows {
        StandingRows::Football(rows) => {
            let mut out = format!("🏆 *{} STANDINGS*\n\n```\n", table.league_name);
            out.push_str(" #  Team           P   W   D   L   GF  GA  GD  Pts\n");
            out.push_str("--- ------------- --- --- --- --- --- --- --- ---\n");
            for r in rows.iter().take(STANDINGS_ROWS) {
                let _ = writeln!(
                    out,
                    "{:2}  {:13} {:3} {:3} {:3} {:3} {:3} {:3} {:3} {:4}",
                    r.position,
                    clip(&r.team, 13),
                    r.played,
                    r.won,
                    r.draw,
                    r.lost,
                    r.goals_for,
                    r.goals_against,
                    r.goal_diff,
                    r.points
                );
            }
            out.push_str("```\n");
            let _ = write!(
                out,
                "_Showing top {} of {} teams_",
                rows.len().min(STANDINGS_ROWS),
                rows.len()
            );
            out
        }
        StandingRows::Basketball(rows) => {
            let mut out = format!("🏆 *{} STANDINGS (TOP {})*\n\n```\n", table.league_name.to_uppercase(), rows.len());
            out.push_str(" #  Team                W    L    %\n");
            out.push_str("--- ------------------- ---- ---- -----\n");
            for r in rows {
                let _ = writeln!(
                    out,
                    "{:2}  {:19} {:4} {:4} {:.3}",
                    r.rank,
                    clip(&r.team, 19),
                    r.wins,
                    r.losses,
                    r.pct
                );
            }
            out.push_str("```");
            out
        }
    }
}

pub fn rankings(table: &RankingsTable) -> String {
    if table.rankings.is_empty() {
        return "❌ Could not fetch rankings.".to_string();
    }
    let mut out = format!("🏆 *{} RANKINGS*\n\n```\n", table.tour);
    out.push_str(" #  Player              Country  Points\n");
    out.push_str("--- ------------------- -------- ------\n");
    for p in table.rankings.iter().take(20) {
        let _ = writeln!(
            out,
            "{:2}  {:19} {:8} {:6}",
            p.rank,
            clip(&p.player, 19),
            clip(&p.country, 8),
            p.points
        );
    }
    out.push_str("```\n");
    let _ = write!(out, "_Showing top {} players_", table.rankings.len().min(20));
    out
}

pub fn value_bets(bets: &[ValueBet]) -> String {
    if bets.is_empty() {
        return "💎 *NO VALUE BETS TODAY*\n\nNo strong value bets identified for today.".to_string();
    }
    let mut out = String::from("💎 *TODAY'S TOP VALUE BETS*\n\n");
    for (i, bet) in bets.iter().enumerate() {
        let _ = writeln!(out, "{}. *{} vs {}* ({})", i + 1, bet.home_team, bet.away_team, bet.league);
        let _ = writeln!(out, "   • Bet: {} ({})", bet.selection, bet.market);
        let _ = writeln!(out, "   • Odds: {:.2} | Probability: {:.1}%", bet.odds, bet.probability);
        let _ = writeln!(out, "   • Edge: +{:.1}% | Confidence: {:.0}%", bet.edge, bet.confidence * 100.0);
        let _ = writeln!(out, "   • Stake: {}\n", bet.stake_hint);
    }
    out.push_str("📈 *Value Betting Strategy:*\n");
    out.push_str("• Only bet when edge > 3%\n");
    out.push_str("• Use 1/4 Kelly stake (conservative)\n");
    out.push_str("• Track all bets for analysis");
    out
}

pub fn value_bets_unavailable() -> String {
    "⚠️ *Value bets temporarily unavailable*\n\nPlease try again later.".to_string()
}

fn stats_title(sport: SportKind) -> &'static str {
    match sport {
        SportKind::Football => "YOUR STATISTICS",
        SportKind::Tennis => "YOUR TENNIS STATISTICS",
        SportKind::Basketball => "YOUR BASKETBALL STATISTICS",
    }
}

fn stats_example(sport: SportKind) -> &'static str {
    match sport {
        SportKind::Football => "/predict Inter Milan",
        SportKind::Tennis => "/tennispredict Djokovic Alcaraz",
        SportKind::Basketball => "/basketpredict Lakers Warriors",
    }
}

fn outcome_badge(p: &Prediction) -> &'static str {
    match p.is_correct {
        None => "⏳ Pending",
        Some(true) => "✅ Correct",
        Some(false) => "❌ Wrong",
    }
}

pub fn stats(sport: SportKind, name: &str, user_id: i64, stats: &Stats) -> String {
    let mut out = format!(
        "📊 *{}*\n\n👤 User: {}\n🆔 ID: `{}`\n\n📈 *Performance:*\n\
         • Total Predictions: {}\n\
         • Correct Predictions: {}\n\
         • Accuracy Rate: {:.1}%\n\n",
        stats_title(sport),
        name,
        user_id,
        stats.total,
        stats.correct,
        stats.accuracy,
    );

    if stats.total == 0 {
        let _ = write!(out, "🎯 *Get started with:*\n`{}`", stats_example(sport));
        return out;
    }

    out.push_str("🎯 *Recent Predictions:*\n");
    for (i, p) in stats.recent.iter().take(RECENT_SHOWN).enumerate() {
        let _ = writeln!(
            out,
            "{}. #{} {} vs {} ({})",
            i + 1,
            p.id,
            p.entity_a,
            p.entity_b,
            outcome_badge(p)
        );
    }
    let verdict = if stats.accuracy > 60.0 {
        "🏆 *Excellent accuracy! Keep it up!*"
    } else if stats.accuracy > 50.0 {
        "👍 *Good work! Room for improvement.*"
    } else {
        "💡 *Study the predictions more carefully.*"
    };
    out.push('\n');
    out.push_str(verdict);
    out
}

pub fn stats_unavailable(sport: SportKind, name: &str, user_id: i64) -> String {
    format!(
        "📊 *{}*\n\n👤 User: {}\n🆔 ID: `{}`\n\n\
         ⚠️ *Database Connection Issue*\n\n\
         The statistics service is temporarily unavailable.\n\n\
         🔧 *Try these instead:*\n\
         • `{}` - Make new predictions",
        stats_title(sport),
        name,
        user_id,
        stats_example(sport),
    )
}

/// `overview` is `None` when the store could not be read.
pub fn admin_panel(overview: Option<&Overview>, invite_only: bool, invite_code: &str) -> String {
    let (users, predictions, active_bets) = match overview {
        Some(o) => (
            o.users_total.to_string(),
            o.sports.iter().map(|t| t.total).sum::<i64>().to_string(),
            o.value_bets_active.to_string(),
        ),
        None => ("N/A".to_string(), "N/A".to_string(), "N/A".to_string()),
    };
    format!(
        "🔐 *ADMIN PANEL*\n\n\
         📊 *DATABASE STATISTICS:*\n\
         • Total Users: {users}\n\
         • Total Predictions: {predictions}\n\
         • Active Value Bets: {active_bets}\n\
         • Invite-Only Mode: {}\n\n\
         ⚙️ *ADMIN COMMANDS:*\n\
         /dbstats - Detailed database statistics\n\
         /adduser [id] - Add user to allowed list\n\
         /listusers - List all allowed users\n\
         /settle [id] [outcome] - Record a prediction result\n\n\
         • Invite code: `{invite_code}`",
        if invite_only { "✅ Enabled" } else { "❌ Disabled" },
    )
}

pub fn db_stats(o: &Overview, now: DateTime<Utc>) -> String {
    let total: i64 = o.sports.iter().map(|t| t.total).sum();
    let correct: i64 = o.sports.iter().map(|t| t.correct).sum();
    let pending: i64 = o.sports.iter().map(|t| t.pending).sum();
    let settled = total - pending;
    let accuracy = if settled > 0 { correct as f64 / settled as f64 * 100.0 } else { 0.0 };

    let mut out = format!(
        "📊 *DETAILED DATABASE STATISTICS*\n\n\
         👥 *USERS:*\n\
         • Total Users: {}\n\
         • Active Users: {}\n\
         • Premium Users: {}\n\n\
         🎯 *PREDICTIONS:*\n\
         • Total Predictions: {total}\n\
         • Correct Predictions: {correct}\n\
         • Pending Results: {pending}\n\
         • System Accuracy: {accuracy:.1}%\n",
        o.users_total, o.users_active, o.users_premium,
    );
    for t in &o.sports {
        let _ = writeln!(out, "  - {}: {} ({} correct, {} pending)", t.sport, t.total, t.correct, t.pending);
    }
    let _ = write!(
        out,
        "\n💎 *VALUE BETS:*\n\
         • Total Value Bets: {}\n\
         • Active Value Bets: {}\n\n\
         👤 *RECENTLY ACTIVE USERS:*\n",
        o.value_bets_total, o.value_bets_active,
    );
    for (i, u) in o.recent_users.iter().enumerate() {
        let name = u.first_name.as_deref().or(u.username.as_deref()).unwrap_or("Unknown");
        let _ = writeln!(
            out,
            "{}. {} (ID: {}) - {}",
            i + 1,
            name,
            u.platform_id,
            u.last_seen.format("%Y-%m-%d %H:%M")
        );
    }
    let _ = write!(out, "\n📅 *Last Updated:* {}", now.format("%Y-%m-%d %H:%M:%S"));
    out
}

pub fn db_stats_unavailable() -> String {
    "⚠️ *Database statistics temporarily unavailable.*".to_string()
}

pub fn allowed_users(ids: &[i64], invite_only: bool) -> String {
    if !invite_only {
        return "🔓 Invite-only mode is off; everyone has access.".to_string();
    }
    if ids.is_empty() {
        return "👥 No users on the allowed list.".to_string();
    }
    let mut out = format!("👥 *ALLOWED USERS ({})*\n\n", ids.len());
    for id in ids {
        let _ = writeln!(out, "• `{id}`");
    }
    out
}

pub fn settled(p: &Prediction) -> String {
    format!(
        "✅ Prediction #{} settled: predicted *{}*, actual *{}* ({})",
        p.id,
        p.predicted_outcome,
        p.actual_outcome.as_deref().unwrap_or("?"),
        outcome_badge(p)
    )
}
