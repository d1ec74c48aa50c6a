//! Deterministic synthetic league shared by the integration tests.

#![allow(dead_code)]

use grid_engine::fact::{DraftInfo, PeriodTotals};
use grid_engine::{
    Achievements, Award, Catalog, Category, Difficulty, Engine, EngineConfig, FactStore,
    FactStoreBuilder, Predicate, PromptDefinition,
};

pub const TEAMS: [&str; 8] = ["LAL", "BOS", "MIA", "CHI", "GSW", "SAS", "NYK", "PHI"];
pub const ACTIVE_PLAYERS: usize = 240;
pub const RETIRED_PLAYERS: usize = 20;

pub fn player_key(i: usize) -> String {
    format!("{}", 10_000 + i)
}

pub fn player_name(i: usize) -> String {
    format!("Player {i:03}")
}

/// Every active player has four teams, chosen so that any two teams share
/// at least 30 players.
pub fn teams_of(i: usize) -> [&'static str; 4] {
    [TEAMS[i % 8], TEAMS[(i + 1) % 8], TEAMS[(i + 3) % 8], TEAMS[(i + 7) % 8]]
}

fn awards_of(i: usize) -> Vec<Award> {
    let mut awards = Vec::new();
    if i % 10 == 0 {
        awards.push(Award::Champion);
    }
    if i % 15 == 0 {
        awards.push(Award::Mvp);
    }
    if i % 4 == 0 {
        awards.push(Award::AllStar);
    }
    if i % 9 == 0 {
        awards.push(Award::AllNba);
    }
    if i % 20 == 7 {
        awards.push(Award::Dpoy);
    }
    awards
}

pub fn league() -> FactStore {
    let mut b = FactStoreBuilder::new();

    for i in 0..ACTIVE_PLAYERS {
        let key = player_key(i);
        b.entity(&key, &player_name(i));
        b.set_image_id(&key, &key);

        let career = 1 + (i % 12) as i32;
        let ppg = 8.0 + (i % 25) as f64;
        for (n, period) in (2025 - career..=2024).enumerate() {
            let team = teams_of(i)[n % 4];
            b.record_group_period(&key, team, None, period);
            let totals = PeriodTotals {
                games: 70,
                points: ppg * 70.0,
                assists: (i % 11) as f64 * 70.0,
                rebounds: (i % 13) as f64 * 70.0,
                three_made: 30.0 + (i % 20) as f64,
                three_attempted: 100.0,
            };
            b.record_period(&key, period, &totals);
        }
        // short careers still cover all four teams
        for team in teams_of(i) {
            b.record_group_period(&key, team, None, 2024);
        }
        b.record_peak(&key, ppg * 1.6);
        b.record_event_type(&key, "regular");
        if i % 3 == 0 {
            b.record_event_type(&key, "playoffs");
        }
        if i % 5 != 0 {
            let overall = 1 + (i % 60) as u32;
            b.set_draft(
                &key,
                DraftInfo {
                    period: Some(2024 - career),
                    round: Some(if overall <= 30 { 1 } else { 2 }),
                    overall: Some(overall),
                    group: Some(TEAMS[i % 8].to_string()),
                },
            );
        }
        let awards = awards_of(i);
        if !awards.is_empty() {
            let rings = if awards.contains(&Award::Champion) { 1 + (i % 3) as u32 } else { 0 };
            b.merge_achievements(&key, &Achievements::with(&awards, rings));
        }
    }

    for i in 0..RETIRED_PLAYERS {
        let key = format!("{}", 90_000 + i);
        b.entity(&key, &format!("Old Timer {i:02}"));
        b.record_group_period(&key, TEAMS[i % 8], None, 1990 + (i % 5) as i32);
        b.merge_achievements(&key, &Achievements::with(&[Award::Champion], 1));
    }

    b.entity("2544", "LeBron James");
    let stints = [("CLE", 2004), ("MIA", 2011), ("CLE", 2016), ("LAL", 2020), ("LAL", 2024)];
    for (team, period) in stints {
        b.record_group_period("2544", team, None, period);
    }
    let awards = [Award::Champion, Award::Mvp, Award::AllStar];
    b.merge_achievements("2544", &Achievements::with(&awards, 4));
    b.record_event_type("2544", "playoffs");

    b.link_teammates();
    b.build()
}

pub fn prompt(id: &str, category: Category, text: &str, predicate: Predicate) -> PromptDefinition {
    PromptDefinition::new(id, category, Difficulty::Easy, text, predicate)
}

pub fn group_prompt(code: &str) -> PromptDefinition {
    let predicate = Predicate { group: Some(code.to_string()), ..Predicate::default() };
    let id = format!("team_{}", code.to_lowercase());
    prompt(&id, Category::GroupMembership, &format!("Played for {code}"), predicate)
}

pub fn award_prompt(id: &str, text: &str, award: Award) -> PromptDefinition {
    let predicate = Predicate { awards: [award].into(), ..Predicate::default() };
    prompt(id, Category::Achievement, text, predicate)
}

/// Small catalog: every fixture team plus champion, MVP and a team the
/// fixture never uses.
pub fn small_catalog() -> Catalog {
    let mut prompts: Vec<PromptDefinition> = TEAMS.iter().map(|t| group_prompt(t)).collect();
    prompts.push(group_prompt("CLE"));
    prompts.push(group_prompt("TOR"));
    prompts.push(award_prompt("award_champion", "NBA Champion", Award::Champion));
    prompts.push(award_prompt("award_mvp", "League MVP", Award::Mvp));
    Catalog::new(prompts).expect("fixture catalog ids are unique")
}

pub fn default_engine() -> Engine {
    let engine = Engine::new(EngineConfig::default(), Catalog::default_catalog());
    engine.initialize(league()).expect("fresh engine initializes");
    engine
}

pub fn small_engine() -> Engine {
    let engine = Engine::new(EngineConfig::default(), small_catalog());
    engine.initialize(league()).expect("fresh engine initializes");
    engine
}
