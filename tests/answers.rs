mod common;

use grid_engine::{
    Achievements, Award, Category, Engine, EngineConfig, EngineError, EntityFact, Predicate,
    Rejection, Verdict,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn lebron_satisfies_lakers_and_champion() {
    let engine = common::small_engine();
    let prompts = ["team_lal", "award_champion"];
    let verdict = engine.validate_answer("LeBron James", &prompts, &[]).unwrap();
    match verdict {
        Verdict::Accepted(answer) => {
            assert_eq!(answer.name, "LeBron James");
            assert_eq!(answer.key, "2544");
            assert!(answer.image_ref.unwrap().ends_with("/2544.png"));
        }
        Verdict::Rejected(r) => panic!("rejected: {}", r.reason()),
    }
}

#[test]
fn lebron_fails_celtics_with_that_prompt_text() {
    let engine = common::small_engine();
    let verdict = engine.validate_answer("LeBron James", &["team_bos"], &[]).unwrap();
    let Verdict::Rejected(rejection) = verdict else { panic!("LeBron never played for BOS") };
    assert_eq!(rejection.code(), "unsatisfied");
    assert!(rejection.reason().contains("Played for BOS"), "{}", rejection.reason());
}

#[test]
fn accepted_answer_is_rejected_once_excluded() {
    let engine = common::small_engine();
    let prompts = ["team_mia", "team_lal"];
    let verdict = engine.validate_answer("lebron james", &prompts, &[]).unwrap();
    let Verdict::Accepted(answer) = verdict else { panic!("expected acceptance") };
    let again = engine.validate_answer("LeBron James", &prompts, &[answer.key.clone()]).unwrap();
    assert_eq!(again, Verdict::Rejected(Rejection::AlreadyUsed));
    assert_eq!(Rejection::AlreadyUsed.reason(), "Player already used this match.");
}

#[test]
fn validation_accepts_non_current_matches() {
    // retired champions never count toward grid feasibility but are still correct
    let engine = common::small_engine();
    let verdict = engine.validate_single("Old Timer 00", "award_champion", &[]).unwrap();
    assert!(verdict.is_accepted());
}

#[test]
fn empty_and_unknown_names_are_rejected() {
    let engine = common::small_engine();
    let blank = engine.validate_single("  ", "team_lal", &[]).unwrap();
    assert_eq!(blank, Verdict::Rejected(Rejection::EmptyInput));
    let unknown = engine.validate_single("Michael Jordan", "team_lal", &[]).unwrap();
    assert_eq!(unknown, Verdict::Rejected(Rejection::UnknownName));
    assert_eq!(Rejection::UnknownName.code(), "unknown_name");
}

#[test]
fn sample_returns_unused_members_of_the_intersection() {
    let engine = common::small_engine();
    let mut rng = StdRng::seed_from_u64(8);
    let prompts = ["team_lal", "award_mvp"];
    let all = engine.list_possible_answers(&prompts, &[], 1000).unwrap();
    assert!(all.len() > 1);
    let names: Vec<&str> = all.iter().map(|a| a.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    let mut excluded: Vec<String> = Vec::new();
    for _ in 0..all.len() {
        let pick = engine.sample_answer(&prompts, &excluded, &mut rng).unwrap().unwrap();
        assert!(all.contains(&pick));
        assert!(!excluded.contains(&pick.key));
        excluded.push(pick.key);
    }
    assert_eq!(engine.sample_answer(&prompts, &excluded, &mut rng).unwrap(), None);
    assert!(engine.list_possible_answers(&prompts, &excluded, 10).unwrap().is_empty());
}

#[test]
fn possible_answers_respect_the_limit() {
    let engine = common::small_engine();
    assert_eq!(engine.list_possible_answers(&["team_lal"], &[], 5).unwrap().len(), 5);
    assert_eq!(engine.list_possible_answers(&["team_lal"], &[], 0).unwrap().len(), 1);
}

#[test]
fn search_prefers_prefix_matches() {
    let engine = common::small_engine();
    let hits = engine.search_by_name("leb", 5).unwrap();
    assert_eq!(hits[0].name, "LeBron James");
    let hits = engine.search_by_name("player 01", 3).unwrap();
    let names: Vec<&str> = hits.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, vec!["Player 010", "Player 011", "Player 012"]);
    assert!(engine.search_by_name("", 5).unwrap().is_empty());
}

fn raw_lebron() -> EntityFact {
    let mut fact = EntityFact::new("2544", "LeBron James");
    fact.groups = ["LAL", "MIA", "CLE"].map(String::from).into();
    fact.event_types = ["Playoffs".to_string()].into();
    fact.achievements = Achievements::with(&[Award::Champion, Award::Mvp], 4);
    fact
}

#[test]
fn facts_loaded_without_the_builder_still_match() {
    let playoffs = Predicate { playoffs: true, ..Predicate::default() };
    let prompts = vec![
        common::group_prompt("LAL"),
        common::group_prompt("BOS"),
        common::award_prompt("award_champion", "NBA Champion", Award::Champion),
        common::prompt("playoffs", Category::Achievement, "Made the playoffs", playoffs),
    ];
    let config = EngineConfig { min_candidates_per_prompt: 0, ..EngineConfig::default() };
    let engine = Engine::from_facts(vec![raw_lebron()], Some(prompts), Some(config)).unwrap();

    let prompts = ["team_lal", "award_champion", "playoffs"];
    let verdict = engine.validate_answer("LeBron James", &prompts, &[]).unwrap();
    match verdict {
        Verdict::Accepted(answer) => assert_eq!(answer.name, "LeBron James"),
        Verdict::Rejected(r) => panic!("rejected: {}", r.reason()),
    }
    let verdict = engine.validate_single("LeBron James", "team_bos", &[]).unwrap();
    assert!(matches!(verdict, Verdict::Rejected(Rejection::Unsatisfied { .. })));
}

#[test]
fn every_requested_prompt_must_be_known() {
    // CLE and TOR are pruned from the small catalog
    let engine = common::small_engine();
    let result = engine.validate_answer("LeBron James", &["team_cle", "award_champion"], &[]);
    assert!(matches!(result, Err(EngineError::MalformedRequest(_))));
    let mut rng = StdRng::seed_from_u64(0);
    let sampled = engine.sample_answer(&["team_lal", "nope"], &[], &mut rng);
    assert!(matches!(sampled, Err(EngineError::MalformedRequest(_))));
}
