//! Row/column grid synthesis.
//!
//! A grid is `size` row prompts and `size` column prompts such that every
//! row/column pair shares at least `min_intersection_per_cell` relevant
//! candidates, and no two non-duplicable prompts share an archetype. The
//! solver tries a cascade of strategies and reports
//! [`EngineError::InfeasibleGrid`] only when all of them run out of budget.

use std::collections::{HashMap, HashSet};
use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::catalog::{Archetype, PromptDefinition};
use crate::config::{EngineConfig, GridBudget};
use crate::error::{EngineError, Result};
use crate::index::CandidateIndex;
use crate::mask::Mask;
use crate::pick::{jittered_order, shuffled, weighted_pick};
use crate::recency::RecencyHistory;

pub const GRID_SIZES: [usize; 2] = [3, 4];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSpec {
    pub rows: Vec<PromptDefinition>,
    pub cols: Vec<PromptDefinition>,
}

impl GridSpec {
    pub fn prompt_ids(&self) -> Vec<String> {
        self.rows.iter().chain(&self.cols).map(|p| p.id.clone()).collect()
    }
}

/// Verdict on an externally proposed grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum GridCheck {
    Valid,
    Invalid { reason: String },
}

/// Row and column prompt positions in a [`CandidateIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
}

impl Layout {
    pub fn to_spec(&self, index: &CandidateIndex) -> GridSpec {
        GridSpec {
            rows: self.rows.iter().map(|&ix| index.prompt(ix).clone()).collect(),
            cols: self.cols.iter().map(|&ix| index.prompt(ix).clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Backtracking,
    WeightedRetry,
    GreedyFromTop,
    Exhaustive,
    FinalRetry,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Backtracking => "backtracking",
            Strategy::WeightedRetry => "weighted-retry",
            Strategy::GreedyFromTop => "greedy-from-top",
            Strategy::Exhaustive => "exhaustive",
            Strategy::FinalRetry => "final-retry",
        };
        f.write_str(name)
    }
}

pub struct GridSolver<'a> {
    index: &'a CandidateIndex,
    budget: &'a GridBudget,
    min: usize,
    size: usize,
}

impl<'a> GridSolver<'a> {
    pub fn new(index: &'a CandidateIndex, config: &'a EngineConfig, size: usize) -> Result<Self> {
        if !GRID_SIZES.contains(&size) {
            return Err(EngineError::UnsupportedGridSize { size });
        }
        Ok(GridSolver {
            index,
            budget: &config.grid,
            min: config.min_intersection_per_cell,
            size,
        })
    }

    /// Tries each pool from [`GridSolver::source_pools`] in turn. Recency-biased
    /// pools get the randomized strategies; the full pool gets the whole cascade.
    pub fn solve<R: Rng + ?Sized>(
        &self,
        history: &RecencyHistory,
        rng: &mut R,
    ) -> Result<(Layout, Strategy)> {
        let mut pools = self.source_pools(history);
        let full = pools.pop().unwrap_or_default();
        for biased in &pools {
            if let Some(found) = self.randomized(biased, rng) {
                return Ok(found);
            }
            tracing::debug!(
                size = self.size,
                pool = biased.len(),
                "recency-biased pool failed, widening"
            );
        }
        if let Some(found) = self.cascade(&full, rng) {
            return Ok(found);
        }

        tracing::warn!(size = self.size, pool = full.len(), "grid strategies exhausted");
        Err(EngineError::InfeasibleGrid { size: self.size })
    }

    fn randomized<R: Rng + ?Sized>(
        &self,
        source: &[usize],
        rng: &mut R,
    ) -> Option<(Layout, Strategy)> {
        if let Some(layout) = self.backtrack(source, rng) {
            return Some((layout, Strategy::Backtracking));
        }
        self.weighted_retry(source, rng).map(|layout| (layout, Strategy::WeightedRetry))
    }

    fn cascade<R: Rng + ?Sized>(
        &self,
        source: &[usize],
        rng: &mut R,
    ) -> Option<(Layout, Strategy)> {
        if let Some(found) = self.randomized(source, rng) {
            return Some(found);
        }

        let mut by_population = source.to_vec();
        by_population.sort_by_key(|&ix| std::cmp::Reverse(self.index.relevant_count(ix)));

        let greedy = self.budget.greedy_attempts;
        if let Some(layout) = self.shuffled_rows(&by_population, greedy, false, rng) {
            return Some((layout, Strategy::GreedyFromTop));
        }
        if let Some(layout) = self.exhaustive(&by_population) {
            return Some((layout, Strategy::Exhaustive));
        }
        self.shuffled_rows(&by_population, self.budget.final_attempts, true, rng)
            .map(|layout| (layout, Strategy::FinalRetry))
    }

    /// Usable prompts, preferring ones not shown recently when enough remain.
    pub fn source_pool(&self, history: &RecencyHistory) -> Vec<usize> {
        self.source_pools(history).swap_remove(0)
    }

    /// Candidate pools from most to least recency-filtered. The last entry is
    /// always the full usable pool; filtered pools smaller than a grid, or
    /// identical to a wider one, are skipped.
    pub fn source_pools(&self, history: &RecencyHistory) -> Vec<Vec<usize>> {
        let target = self.size * 2;
        let pool: Vec<usize> = (0..self.index.len())
            .filter(|&ix| self.index.relevant_count(ix) >= self.min)
            .collect();
        let recent = history.prompt_ids();
        let last_boards = history.board_ids();
        let id = |ix: usize| self.index.prompt(ix).id.as_str();

        let without_recent: Vec<usize> = pool
            .iter()
            .copied()
            .filter(|&ix| !recent.contains(id(ix)) && !last_boards.contains(id(ix)))
            .collect();
        let without_boards: Vec<usize> =
            pool.iter().copied().filter(|&ix| !last_boards.contains(id(ix))).collect();

        let mut pools = Vec::with_capacity(3);
        for filtered in [without_recent, without_boards] {
            let usable = filtered.len() >= target && filtered.len() < pool.len();
            if usable && pools.last() != Some(&filtered) {
                pools.push(filtered);
            }
        }
        pools.push(pool);
        pools
    }

    fn archetype(&self, ix: usize) -> Option<Archetype> {
        let prompt = self.index.prompt(ix);
        (!prompt.is_duplicable()).then(|| prompt.archetype())
    }

    fn line_has_unique_archetypes(&self, prompts: &[usize]) -> bool {
        let mut seen = HashSet::new();
        prompts.iter().filter_map(|&ix| self.archetype(ix)).all(|a| seen.insert(a))
    }

    pub fn meets_min_intersections(&self, rows: &[usize], cols: &[usize]) -> bool {
        !rows.is_empty()
            && !cols.is_empty()
            && rows.iter().all(|&r| cols.iter().all(|&c| self.index.overlap(r, c) >= self.min))
    }

    pub fn is_valid(&self, rows: &[usize], cols: &[usize]) -> bool {
        self.diagnose(rows, cols).is_none()
    }

    /// First reason the layout breaks the grid invariants, if any.
    pub fn diagnose(&self, rows: &[usize], cols: &[usize]) -> Option<String> {
        if rows.len() != self.size || cols.len() != self.size {
            return Some(format!("expected {0} rows and {0} columns", self.size));
        }
        let id = |ix: usize| self.index.prompt(ix).id.as_str();
        let mut seen = HashSet::new();
        let mut kinds: HashMap<Archetype, usize> = HashMap::new();
        for &ix in rows.iter().chain(cols) {
            if !seen.insert(ix) {
                return Some(format!("prompt {} is used twice", id(ix)));
            }
            if let Some(kind) = self.archetype(ix) {
                if let Some(prev) = kinds.insert(kind, ix) {
                    return Some(format!("prompts {} and {} have the same shape", id(prev), id(ix)));
                }
            }
        }
        for &r in rows {
            for &c in cols {
                let shared = self.index.overlap(r, c);
                if shared < self.min {
                    return Some(format!(
                        "{} x {} has {} current answers, needs {}",
                        id(r),
                        id(c),
                        shared,
                        self.min
                    ));
                }
            }
        }
        None
    }

    /// Greedy column fill in `order`, honouring compatibility with every row
    /// and archetype uniqueness across the whole grid.
    fn fill_cols(&self, rows: &[usize], order: &[usize]) -> Option<Vec<usize>> {
        let mut used: HashSet<Archetype> =
            rows.iter().filter_map(|&ix| self.archetype(ix)).collect();
        let mut cols = Vec::with_capacity(self.size);
        for &candidate in order {
            if rows.contains(&candidate) || cols.contains(&candidate) {
                continue;
            }
            let kind = self.archetype(candidate);
            if kind.as_ref().is_some_and(|k| used.contains(k)) {
                continue;
            }
            if !rows.iter().all(|&r| self.index.overlap(r, candidate) >= self.min) {
                continue;
            }
            cols.push(candidate);
            used.extend(kind);
            if cols.len() == self.size {
                return Some(cols);
            }
        }
        None
    }

    fn backtrack<R: Rng + ?Sized>(&self, source: &[usize], rng: &mut R) -> Option<Layout> {
        if source.len() < self.size * 2 {
            return None;
        }
        let width = self.index.len();
        let mut in_source = Mask::new(width);
        for &ix in source {
            in_source.insert(ix);
        }
        let mut compat: Vec<Mask> = vec![Mask::default(); width];
        for &a in source {
            let mut m = Mask::new(width);
            for &b in source {
                if a != b && self.index.overlap(a, b) >= self.min {
                    m.insert(b);
                }
            }
            compat[a] = m;
        }
        let pop = |ix: usize| self.index.relevant_count(ix) as f64;
        let ordered = jittered_order(source, pop, self.budget.priority_jitter, rng);

        let mut search = Backtrack {
            solver: self,
            ordered: &ordered,
            compat: &compat,
            solutions: Vec::new(),
            nodes: 0,
        };
        let mut rows = Vec::with_capacity(self.size);
        search.recurse(0, &mut rows, &in_source, rng);

        let solutions = search.solutions;
        if solutions.is_empty() {
            return None;
        }
        let chosen = rng.gen_range(0..solutions.len());
        solutions.into_iter().nth(chosen)
    }

    fn weighted_retry<R: Rng + ?Sized>(&self, source: &[usize], rng: &mut R) -> Option<Layout> {
        let target = self.size * 2;
        let weight = |ix: usize| self.index.prompt(ix).weight;
        for _ in 0..self.budget.weighted_attempts {
            let mut pool = source.to_vec();
            let mut selected = Vec::with_capacity(target);
            while selected.len() < target {
                let Some(candidate) = weighted_pick(&pool, weight, rng) else { break };
                pool.retain(|&ix| ix != candidate);
                if let Some(kind) = self.archetype(candidate) {
                    pool.retain(|&ix| self.archetype(ix).as_ref() != Some(&kind));
                }
                selected.push(candidate);
            }
            if selected.len() != target {
                continue;
            }
            let (rows, cols) = selected.split_at(self.size);
            if self.is_valid(rows, cols) {
                return Some(Layout { rows: rows.to_vec(), cols: cols.to_vec() });
            }
        }
        None
    }

    /// Random row picks from the population order. Columns are filled in
    /// population order, or in the same shuffled order when `shuffle_cols`.
    fn shuffled_rows<R: Rng + ?Sized>(
        &self,
        by_population: &[usize],
        attempts: usize,
        shuffle_cols: bool,
        rng: &mut R,
    ) -> Option<Layout> {
        if by_population.len() < self.size {
            return None;
        }
        for _ in 0..attempts {
            let order = shuffled(by_population, rng);
            let rows = &order[..self.size];
            if !self.line_has_unique_archetypes(rows) {
                continue;
            }
            let col_order = if shuffle_cols { &order } else { by_population };
            if let Some(cols) = self.fill_cols(rows, col_order) {
                if self.is_valid(rows, &cols) {
                    return Some(Layout { rows: rows.to_vec(), cols });
                }
            }
        }
        None
    }

    /// Every row combination of the most populous prompts, in index order.
    fn exhaustive(&self, by_population: &[usize]) -> Option<Layout> {
        let top = &by_population[..self.budget.exhaustive_pool(self.size).min(by_population.len())];
        if top.len() < self.size {
            return None;
        }
        let mut combo: Vec<usize> = (0..self.size).collect();
        loop {
            let rows: Vec<usize> = combo.iter().map(|&i| top[i]).collect();
            if self.line_has_unique_archetypes(&rows) {
                if let Some(cols) = self.fill_cols(&rows, by_population) {
                    if self.is_valid(&rows, &cols) {
                        return Some(Layout { rows, cols });
                    }
                }
            }
            if !next_combination(&mut combo, top.len()) {
                return None;
            }
        }
    }
}

/// Advance `combo` to the next k-combination of `0..n` in lexicographic order.
fn next_combination(combo: &mut [usize], n: usize) -> bool {
    let k = combo.len();
    for i in (0..k).rev() {
        if combo[i] < n - k + i {
            combo[i] += 1;
            for j in (i + 1)..k {
                combo[j] = combo[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

struct Backtrack<'s, 'a> {
    solver: &'s GridSolver<'a>,
    ordered: &'s [usize],
    compat: &'s [Mask],
    solutions: Vec<Layout>,
    nodes: usize,
}

impl Backtrack<'_, '_> {
    /// Returns true once enough solutions are collected or the node budget is spent.
    fn recurse<R: Rng + ?Sized>(
        &mut self,
        start: usize,
        rows: &mut Vec<usize>,
        cols: &Mask,
        rng: &mut R,
    ) -> bool {
        let solver = self.solver;
        self.nodes += 1;
        if self.nodes > solver.budget.max_backtrack_nodes {
            return true;
        }

        if rows.len() == solver.size {
            let candidates: Vec<usize> = cols.ones().filter(|ix| !rows.contains(ix)).collect();
            let pop = |ix: usize| solver.index.relevant_count(ix) as f64;
            let order = jittered_order(&candidates, pop, solver.budget.priority_jitter, rng);
            if let Some(picked) = solver.fill_cols(rows, &order) {
                if solver.is_valid(rows, &picked) {
                    self.solutions.push(Layout { rows: rows.clone(), cols: picked });
                    return self.solutions.len() >= solver.budget.max_backtrack_solutions;
                }
            }
            return false;
        }

        for i in start..self.ordered.len() {
            let candidate = self.ordered[i];
            if rows.contains(&candidate) {
                continue;
            }
            let mut next = cols.clone();
            next.and_with(&self.compat[candidate]);
            for &r in rows.iter() {
                next.remove(r);
            }
            if next.count() < solver.size {
                continue;
            }
            rows.push(candidate);
            let stop = self.recurse(i + 1, rows, &next, rng);
            rows.pop();
            if stop {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category, Difficulty};
    use crate::fact::{Award, FactStore, FactStoreBuilder};
    use crate::predicate::Predicate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TEAMS: [&str; 6] = ["LAL", "BOS", "MIA", "CHI", "GSW", "SAS"];

    fn store() -> FactStore {
        let mut b = FactStoreBuilder::new();
        for i in 0..240usize {
            let key = format!("{i}");
            b.entity(&key, &format!("Player {i}"));
            for t in [i % 6, (i + 1) % 6, (i + 3) % 6] {
                b.record_group_period(&key, TEAMS[t], None, 2020 + (i % 5) as i32);
            }
        }
        b.build()
    }

    fn team_catalog(extra: Vec<PromptDefinition>) -> Catalog {
        let mut prompts: Vec<PromptDefinition> = TEAMS
            .iter()
            .map(|t| {
                let predicate = Predicate { group: Some(t.to_string()), ..Predicate::default() };
                let id = format!("team_{t}");
                let (category, difficulty) = (Category::GroupMembership, Difficulty::Easy);
                PromptDefinition::new(&id, category, difficulty, t, predicate)
            })
            .collect();
        prompts.extend(extra);
        Catalog::new(prompts).unwrap()
    }

    fn solve_with(index: &CandidateIndex, config: &EngineConfig, seed: u64) -> (Layout, Strategy) {
        let solver = GridSolver::new(index, config, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        solver.solve(&RecencyHistory::default(), &mut rng).unwrap()
    }

    #[test]
    fn backtracking_finds_a_valid_team_grid() {
        let config = EngineConfig::default();
        let index = CandidateIndex::build(&store(), &team_catalog(vec![]), &config);
        for seed in 0..5 {
            let (layout, strategy) = solve_with(&index, &config, seed);
            assert_eq!(strategy, Strategy::Backtracking);
            let solver = GridSolver::new(&index, &config, 3).unwrap();
            assert!(solver.is_valid(&layout.rows, &layout.cols));
        }
    }

    #[test]
    fn every_fallback_strategy_produces_valid_grids() {
        let config = EngineConfig::default();
        let index = CandidateIndex::build(&store(), &team_catalog(vec![]), &config);
        let solver = GridSolver::new(&index, &config, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let source = solver.source_pool(&RecencyHistory::default());
        let mut by_population = source.clone();
        by_population.sort_by_key(|&ix| std::cmp::Reverse(index.relevant_count(ix)));

        let layouts = [
            solver.weighted_retry(&source, &mut rng),
            solver.shuffled_rows(&by_population, 300, false, &mut rng),
            solver.exhaustive(&by_population),
            solver.shuffled_rows(&by_population, 500, true, &mut rng),
        ];
        for layout in layouts {
            let layout = layout.expect("strategy should succeed on a dense pool");
            assert!(solver.is_valid(&layout.rows, &layout.cols));
        }
    }

    #[test]
    fn non_duplicable_archetypes_stay_unique() {
        let champ = |id: &str, team: &str| {
            let predicate = Predicate {
                group: Some(team.into()),
                awards: [Award::Champion].into(),
                ..Predicate::default()
            };
            PromptDefinition::new(id, Category::Compound, Difficulty::Hard, id, predicate)
        };
        // champion flags are absent, so these compounds never survive pruning
        let config = EngineConfig::default();
        let catalog = team_catalog(vec![champ("c1", "LAL"), champ("c2", "BOS")]);
        let index = CandidateIndex::build(&store(), &catalog, &config);
        assert_eq!(index.pruned().len(), 2);

        let periods = |id: &str, n: u32| {
            let predicate = Predicate { groups_at_least: Some(n), ..Predicate::default() };
            PromptDefinition::new(id, Category::Statistical, Difficulty::Easy, id, predicate)
        };
        let catalog = team_catalog(vec![periods("s1", 1), periods("s2", 2)]);
        let index = CandidateIndex::build(&store(), &catalog, &config);
        let solver = GridSolver::new(&index, &config, 3).unwrap();
        for seed in 0..20 {
            let (layout, _) = solve_with(&index, &config, seed);
            let stats = layout
                .rows
                .iter()
                .chain(&layout.cols)
                .filter(|&&ix| index.prompt(ix).category == Category::Statistical)
                .count();
            assert!(stats <= 1, "seed {seed} used both statistical prompts");
            assert!(solver.is_valid(&layout.rows, &layout.cols));
        }
    }

    #[test]
    fn sparse_pool_is_infeasible() {
        let config = EngineConfig { min_intersection_per_cell: 1000, ..EngineConfig::default() };
        let index = CandidateIndex::build(&store(), &team_catalog(vec![]), &config);
        let solver = GridSolver::new(&index, &config, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let err = solver.solve(&RecencyHistory::default(), &mut rng).unwrap_err();
        assert!(matches!(err, EngineError::InfeasibleGrid { size: 3 }));
    }

    #[test]
    fn diagnose_reports_the_first_violation() {
        let config = EngineConfig::default();
        let at_least = |id: &str, n: u32| {
            let predicate = Predicate { groups_at_least: Some(n), ..Predicate::default() };
            PromptDefinition::new(id, Category::Statistical, Difficulty::Easy, id, predicate)
        };
        let extra = vec![at_least("g1", 1), at_least("g2", 2)];
        let index = CandidateIndex::build(&store(), &team_catalog(extra), &config);
        let solver = GridSolver::new(&index, &config, 3).unwrap();
        let ix = |id: &str| index.position(id).unwrap();
        let rows = [ix("team_LAL"), ix("team_BOS"), ix("team_MIA")];

        assert_eq!(solver.diagnose(&rows, &[ix("team_CHI"), ix("team_GSW"), ix("team_SAS")]), None);
        assert_eq!(
            solver.diagnose(&rows, &[ix("team_CHI"), ix("team_GSW"), ix("team_LAL")]).as_deref(),
            Some("prompt team_LAL is used twice")
        );
        assert_eq!(
            solver.diagnose(&rows, &[ix("g1"), ix("team_GSW"), ix("g2")]).as_deref(),
            Some("prompts g1 and g2 have the same shape")
        );
        assert!(solver.diagnose(&rows[..2], &rows[..2]).is_some());
    }

    #[test]
    fn unsupported_sizes_are_rejected() {
        let config = EngineConfig::default();
        let index = CandidateIndex::default();
        assert!(matches!(
            GridSolver::new(&index, &config, 5),
            Err(EngineError::UnsupportedGridSize { size: 5 })
        ));
    }

    #[test]
    fn recent_prompts_are_avoided_when_possible() {
        let config = EngineConfig::default();
        let extra = (0..4)
            .map(|i| {
                let predicate = Predicate { groups_at_least: Some(i + 1), ..Predicate::default() };
                let id = format!("g{i}");
                PromptDefinition::new(&id, Category::Statistical, Difficulty::Easy, "g", predicate)
            })
            .collect();
        let index = CandidateIndex::build(&store(), &team_catalog(extra), &config);
        let solver = GridSolver::new(&index, &config, 3).unwrap();
        let mut history = RecencyHistory::default();
        history.record(&["team_LAL".to_string(), "g0".to_string()]);
        let pool: Vec<&str> =
            solver.source_pool(&history).iter().map(|&ix| index.prompt(ix).id.as_str()).collect();
        assert!(!pool.contains(&"team_LAL"));
        assert!(!pool.contains(&"g0"));
        // g3 needs four groups and is pruned
        assert_eq!(pool.len(), 7);
    }

    #[test]
    fn infeasible_recent_free_pool_widens_to_the_full_catalog() {
        let config = EngineConfig::default();
        // six prompts of one shape: at most one of them fits in a grid
        let extra = (0..6)
            .map(|i| {
                let predicate =
                    Predicate { groups_at_least: Some(1 + i % 3), ..Predicate::default() };
                let id = format!("s{i}");
                PromptDefinition::new(&id, Category::Statistical, Difficulty::Easy, "s", predicate)
            })
            .collect();
        let index = CandidateIndex::build(&store(), &team_catalog(extra), &config);
        let solver = GridSolver::new(&index, &config, 3).unwrap();
        let mut history = RecencyHistory::default();
        history.record(&TEAMS.iter().map(|t| format!("team_{t}")).collect::<Vec<_>>());

        let pools = solver.source_pools(&history);
        assert_eq!(pools.len(), 2);
        assert_eq!(pools[0].len(), 6);
        assert_eq!(pools[1].len(), 12);

        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (layout, _) = solver.solve(&history, &mut rng).unwrap();
            assert!(solver.is_valid(&layout.rows, &layout.cols));
            let teams = layout
                .rows
                .iter()
                .chain(&layout.cols)
                .filter(|&&ix| index.prompt(ix).id.starts_with("team_"))
                .count();
            assert!(teams >= 5);
        }
    }

    #[test]
    fn combinations_enumerate_in_order() {
        let mut c = vec![0, 1];
        let mut seen = vec![c.clone()];
        while next_combination(&mut c, 4) {
            seen.push(c.clone());
        }
        let expected: Vec<Vec<usize>> = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]]
            .iter()
            .map(|pair| pair.to_vec())
            .collect();
        assert_eq!(seen, expected);
    }
}
