//! Data served when no API key is configured or the API call fails.

use super::types::*;
use crate::engine::round_to;
use crate::engine::tennis::Surface;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

pub const SERIE_A: &str = "\u{1F1EE}\u{1F1F9} Serie A";
pub const PREMIER_LEAGUE: &str =
    "\u{1F3F4}\u{E0067}\u{E0062}\u{E0065}\u{E006E}\u{E0067}\u{E007F} Premier League";
pub const LA_LIGA: &str = "\u{1F1EA}\u{1F1F8} La Liga";
pub const BUNDESLIGA: &str = "\u{1F1E9}\u{1F1EA} Bundesliga";

const FALLBACK_FIXTURES: [(&str, &str, &str, &str); 5] = [
    (SERIE_A, "Inter", "Milan", "20:45"),
    (PREMIER_LEAGUE, "Man City", "Liverpool", "12:30"),
    (LA_LIGA, "Barcelona", "Real Madrid", "21:00"),
    (SERIE_A, "Juventus", "Napoli", "18:00"),
    (BUNDESLIGA, "Bayern", "Dortmund", "17:30"),
];

const TENNIS_PLAYERS: &[&str] = &[
    "Novak Djokovic", "Carlos Alcaraz", "Daniil Medvedev", "Jannik Sinner",
    "Alexander Zverev", "Andrey Rublev", "Stefanos Tsitsipas", "Holger Rune",
    "Taylor Fritz", "Casper Ruud", "Grigor Dimitrov", "Tommy Paul",
    "Iga Swiatek", "Aryna Sabalenka", "Coco Gauff", "Elena Rybakina",
    "Jessica Pegula", "Ons Jabeur", "Qinwen Zheng", "Karolina Muchova",
];

const TENNIS_TOURNAMENTS: &[&str] = &[
    "Australian Open", "Miami Open", "Indian Wells", "Madrid Open",
    "Rome Masters", "Dubai Championships", "ATP Finals",
];

const TENNIS_ROUNDS: &[&str] = &["R64", "R32", "R16", "QF", "SF", "F"];

const NBA_TEAMS: &[&str] = &[
    "LA Lakers", "GS Warriors", "Boston Celtics", "Denver Nuggets",
    "Miami Heat", "Milwaukee Bucks", "Phoenix Suns", "Dallas Mavericks",
    "NY Knicks", "Philadelphia 76ers", "LA Clippers", "Chicago Bulls",
];

const NBA_STANDINGS: &[(&str, u32, u32)] = &[
    ("Boston Celtics", 45, 12),
    ("Milwaukee Bucks", 42, 15),
    ("NY Knicks", 38, 20),
    ("Cleveland Cavaliers", 37, 21),
    ("Philadelphia 76ers", 35, 23),
    ("Indiana Pacers", 34, 25),
    ("Miami Heat", 33, 26),
    ("Orlando Magic", 32, 27),
];

const ATP_TOP_20: &[(&str, &str, u32)] = &[
    ("Novak Djokovic", "SRB", 9500),
    ("Carlos Alcaraz", "ESP", 8800),
    ("Daniil Medvedev", "RUS", 7600),
    ("Jannik Sinner", "ITA", 7200),
    ("Alexander Zverev", "GER", 6500),
    ("Andrey Rublev", "RUS", 5800),
    ("Stefanos Tsitsipas", "GRE", 5400),
    ("Holger Rune", "DEN", 4900),
    ("Taylor Fritz", "USA", 4600),
    ("Casper Ruud", "NOR", 4300),
    ("Grigor Dimitrov", "BUL", 3900),
    ("Tommy Paul", "USA", 3700),
    ("Hubert Hurkacz", "POL", 3500),
    ("Alex de Minaur", "AUS", 3300),
    ("Karen Khachanov", "RUS", 3100),
    ("Frances Tiafoe", "USA", 2900),
    ("Cameron Norrie", "GBR", 2700),
    ("Felix Auger-Aliassime", "CAN", 2500),
    ("Lorenzo Musetti", "ITA", 2300),
    ("Sebastian Baez", "ARG", 2100),
];

const WTA_TOP_20: &[(&str, &str, u32)] = &[
    ("Iga Swiatek", "POL", 9800),
    ("Aryna Sabalenka", "BLR", 8600),
    ("Coco Gauff", "USA", 7800),
    ("Elena Rybakina", "KAZ", 7100),
    ("Jessica Pegula", "USA", 6400),
    ("Ons Jabeur", "TUN", 5900),
    ("Qinwen Zheng", "CHN", 5400),
    ("Karolina Muchova", "CZE", 4900),
    ("Marketa Vondrousova", "CZE", 4500),
    ("Maria Sakkari", "GRE", 4200),
    ("Barbora Krejcikova", "CZE", 3900),
    ("Beatriz Haddad Maia", "BRA", 3600),
    ("Jelena Ostapenko", "LAT", 3400),
    ("Daria Kasatkina", "RUS", 3200),
    ("Veronika Kudermetova", "RUS", 3000),
    ("Liudmila Samsonova", "RUS", 2800),
    ("Madison Keys", "USA", 2600),
    ("Petra Kvitova", "CZE", 2400),
    ("Caroline Garcia", "FRA", 2200),
    ("Victoria Azarenka", "BLR", 2000),
];

pub fn football_fixtures() -> Vec<Fixture> {
    FALLBACK_FIXTURES
        .iter()
        .map(|&(league, home, away, time)| Fixture {
            home: home.to_string(),
            away: away.to_string(),
            league: league.to_string(),
            time: time.to_string(),
        })
        .collect()
}

/// Placeholder table; the numbers carry no meaning.
pub fn football_standings(league_name: &str) -> StandingsTable {
    let rows = ["Team A", "Team B", "Team C", "Team D", "Team E"]
        .iter()
        .enumerate()
        .map(|(i, team)| FootballStanding {
            position: i as u32 + 1,
            team: team.to_string(),
            played: 20,
            won: 10,
            draw: 5,
            lost: 5,
            goals_for: 30,
            goals_against: 20,
            goal_diff: 10,
            points: 35,
        })
        .collect();
    StandingsTable {
        league_name: league_name.to_string(),
        rows: StandingRows::Football(rows),
    }
}

/// Draw `count` pairs of distinct entries from `pool`.
///
/// Entries are not reused until fewer than two unused entries remain, at
/// which point the used set is cleared.
pub fn draw_pairs<'a, R: Rng + ?Sized>(
    pool: &[&'a str],
    count: usize,
    rng: &mut R,
) -> Vec<(&'a str, &'a str)> {
    let mut used: HashSet<&str> = HashSet::new();
    let mut pairs = Vec::with_capacity(count);
    if pool.len() < 2 {
        return pairs;
    }

    for _ in 0..count {
        let mut available: Vec<&'a str> = pool.iter().copied().filter(|p| !used.contains(p)).collect();
        if available.len() < 2 {
            used.clear();
            available = pool.to_vec();
        }
        let picked: Vec<&'a str> = available.choose_multiple(rng, 2).copied().collect();
        let (first, second) = (picked[0], picked[1]);
        used.insert(first);
        used.insert(second);
        pairs.push((first, second));
    }
    pairs
}

fn pick<'a, R: Rng + ?Sized>(items: &[&'a str], rng: &mut R) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

pub fn tennis_matches<R: Rng + ?Sized>(rng: &mut R) -> Vec<TennisMatch> {
    let count = rng.gen_range(4..=8);
    draw_pairs(TENNIS_PLAYERS, count, rng)
        .into_iter()
        .map(|(player1, player2)| {
            let surface = Surface::ALL.choose(rng).copied().unwrap_or(Surface::Hard);
            let hour = rng.gen_range(10..=20);
            let minute = pick(&["00", "30"], rng);
            TennisMatch {
                player1: player1.to_string(),
                player2: player2.to_string(),
                tournament: pick(TENNIS_TOURNAMENTS, rng).to_string(),
                surface: surface.to_string(),
                time: format!("{hour}:{minute}"),
                round: pick(TENNIS_ROUNDS, rng).to_string(),
            }
        })
        .collect()
}

pub fn basketball_games<R: Rng + ?Sized>(rng: &mut R) -> Vec<BasketballGame> {
    let count = rng.gen_range(5..=10);
    draw_pairs(NBA_TEAMS, count, rng)
        .into_iter()
        .map(|(home, away)| BasketballGame {
            home_team: home.to_string(),
            away_team: away.to_string(),
            league: "NBA".to_string(),
            time: format!("{}:30 PM", rng.gen_range(7..=10)),
            date: "Tonight".to_string(),
        })
        .collect()
}

pub fn tennis_rankings(tour: Tour) -> RankingsTable {
    let table = match tour {
        Tour::Atp => ATP_TOP_20,
        Tour::Wta => WTA_TOP_20,
    };
    RankingsTable {
        tour: tour.label().to_string(),
        rankings: table
            .iter()
            .enumerate()
            .map(|(i, &(player, country, points))| RankedEntity {
                rank: i as u32 + 1,
                player: player.to_string(),
                country: country.to_string(),
                points,
            })
            .collect(),
    }
}

pub fn win_pct(wins: u32, losses: u32) -> f64 {
    let games = wins + losses;
    if games == 0 {
        return 0.0;
    }
    round_to(wins as f64 / games as f64, 3)
}

pub fn basketball_standings(league_name: &str) -> StandingsTable {
    let rows = NBA_STANDINGS
        .iter()
        .enumerate()
        .map(|(i, &(team, wins, losses))| BasketballStanding {
            rank: i as u32 + 1,
            team: team.to_string(),
            wins,
            losses,
            pct: win_pct(wins, losses),
        })
        .collect();
    StandingsTable {
        league_name: league_name.to_string(),
        rows: StandingRows::Basketball(rows),
    }
}
