mod common;

use std::collections::{HashMap, HashSet};

use grid_engine::{Category, EngineError, PromptDefinition};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn category_counts(prompts: &[PromptDefinition]) -> HashMap<Category, usize> {
    let mut counts = HashMap::new();
    for p in prompts {
        *counts.entry(p.category).or_insert(0) += 1;
    }
    counts
}

#[test]
fn boards_are_balanced() {
    let engine = common::default_engine();
    let index = engine.index().unwrap();
    let position = |id: &str| index.position(id).unwrap();
    for seed in 0..6 {
        let mut rng = StdRng::seed_from_u64(seed);
        let board = engine.build_board(9, &mut rng).unwrap();
        assert_eq!(board.len(), 9);

        let counts = category_counts(&board);
        assert!(counts.values().all(|&n| n <= 3), "{counts:?}");
        assert!(counts.get(&Category::GroupMembership).copied().unwrap_or(0) <= 2);
        assert!(counts.get(&Category::Statistical).copied().unwrap_or(0) >= 2);

        for line in board.chunks(3) {
            let counts = category_counts(line);
            assert!(counts.values().all(|&n| n <= 2));
            let positions: Vec<usize> = line.iter().map(|p| position(p.id.as_str())).collect();
            assert!(!index.shared_candidates(&positions).is_empty());
        }
        for col in 0..3 {
            let column: Vec<PromptDefinition> =
                board.iter().skip(col).step_by(3).cloned().collect();
            assert!(category_counts(&column).values().all(|&n| n <= 2));
            let positions: Vec<usize> = column.iter().map(|p| position(p.id.as_str())).collect();
            assert!(!index.shared_candidates(&positions).is_empty());
        }

        let mut ids: Vec<&str> = board.iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 9);
    }
}

#[test]
fn board_ids_enter_the_recency_history() {
    let engine = common::default_engine();
    let mut rng = StdRng::seed_from_u64(2);
    let board = engine.build_board(9, &mut rng).unwrap();
    let recent = engine.recent_prompt_ids();
    assert_eq!(recent.len(), 9);
    assert!(board.iter().all(|p| recent.contains(&p.id)));
}

#[test]
fn zero_cells_is_malformed() {
    let engine = common::default_engine();
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(engine.build_board(0, &mut rng), Err(EngineError::MalformedRequest(_))));
}

#[test]
fn more_cells_than_prompts_is_infeasible() {
    let engine = common::small_engine();
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        engine.build_board(100, &mut rng),
        Err(EngineError::InfeasibleBoard { cells: 100 })
    ));
}

#[test]
fn next_board_avoids_the_previous_one_when_the_pool_allows() {
    let engine = common::default_engine();
    let mut rng = StdRng::seed_from_u64(21);
    let mut next = || -> HashSet<String> {
        engine.build_board(9, &mut rng).unwrap().into_iter().map(|p| p.id).collect()
    };
    let first = next();
    let second = next();
    assert_eq!(second.len(), 9);
    assert!(first.is_disjoint(&second), "{first:?} / {second:?}");
}
