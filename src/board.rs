//! Flat board solver: one pool of prompts laid out row-major on a square.
//!
//! Category balance holds across the whole board. When the cell count is a
//! perfect square the positional rules also apply: per-line category caps,
//! distinct groups along a row, and a non-empty shared candidate set for every
//! partial row and column.

use std::collections::HashMap;

use rand::Rng;

use crate::catalog::Category;
use crate::config::BoardRules;
use crate::error::{EngineError, Result};
use crate::index::CandidateIndex;
use crate::mask::Mask;
use crate::pick::weighted_pick;
use crate::recency::RecencyHistory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Prompt positions in row-major order.
    pub prompts: Vec<usize>,
    /// False when every balanced attempt failed and the most populous
    /// prompts were used instead.
    pub balanced: bool,
}

pub fn square_side(cells: usize) -> Option<usize> {
    let side = (cells as f64).sqrt().round() as usize;
    (side * side == cells).then_some(side)
}

pub struct BoardSolver<'a> {
    index: &'a CandidateIndex,
    rules: &'a BoardRules,
    cells: usize,
    side: Option<usize>,
}

impl<'a> BoardSolver<'a> {
    pub fn new(index: &'a CandidateIndex, rules: &'a BoardRules, cells: usize) -> Result<Self> {
        if cells == 0 {
            return Err(EngineError::malformed("board needs at least one cell"));
        }
        Ok(BoardSolver {
            index,
            rules,
            cells,
            side: square_side(cells),
        })
    }

    /// Tries a balanced fill on the recency-filtered pool, then on the whole
    /// pool. Only when neither works are the most populous preferred prompts used.
    pub fn solve<R: Rng + ?Sized>(&self, history: &RecencyHistory, rng: &mut R) -> Result<Board> {
        let pools = self.source_pools(history);
        let Some(preferred) = pools.first().filter(|pool| pool.len() >= self.cells) else {
            return Err(EngineError::InfeasibleBoard { cells: self.cells });
        };

        for source in &pools {
            if let Some(prompts) = self.balanced(source, rng) {
                return Ok(Board { prompts, balanced: true });
            }
        }

        let mut fallback = preferred.clone();
        fallback.sort_by_key(|&ix| std::cmp::Reverse(self.index.candidate_count(ix)));
        fallback.truncate(self.cells);
        tracing::warn!(cells = self.cells, "balanced board not found, using most populous prompts");
        Ok(Board { prompts: fallback, balanced: false })
    }

    fn balanced<R: Rng + ?Sized>(&self, source: &[usize], rng: &mut R) -> Option<Vec<usize>> {
        let weight = |ix: usize| self.index.prompt(ix).weight;
        for _ in 0..self.rules.attempts {
            let mut selected = Vec::with_capacity(self.cells);
            while selected.len() < self.cells {
                let eligible = self.eligible(source, &selected);
                let Some(pick) = weighted_pick(&eligible, weight, rng) else { break };
                selected.push(pick);
            }
            if selected.len() == self.cells && self.final_checks(&selected) {
                return Some(selected);
            }
        }
        None
    }

    /// The recency-filtered pool when it can fill a board, then the whole pool.
    fn source_pools(&self, history: &RecencyHistory) -> Vec<Vec<usize>> {
        let pool: Vec<usize> = (0..self.index.len())
            .filter(|&ix| self.index.candidate_count(ix) > 0)
            .collect();
        let recent = history.prompt_ids();
        let last_boards = history.board_ids();
        let filtered: Vec<usize> = pool
            .iter()
            .copied()
            .filter(|&ix| {
                let id = self.index.prompt(ix).id.as_str();
                !recent.contains(id) && !last_boards.contains(id)
            })
            .collect();
        if filtered.len() >= self.cells && filtered.len() < pool.len() {
            vec![filtered, pool]
        } else {
            vec![pool]
        }
    }

    /// Prompts that may go into the next free cell.
    fn eligible(&self, source: &[usize], selected: &[usize]) -> Vec<usize> {
        let slot = selected.len();
        let lines = self.side.map(|side| {
            let row: Vec<usize> = selected[(slot / side) * side..].to_vec();
            let col: Vec<usize> =
                selected.iter().copied().skip(slot % side).step_by(side).collect();
            let row_shared = (!row.is_empty()).then(|| self.index.shared_candidates(&row));
            let col_shared = (!col.is_empty()).then(|| self.index.shared_candidates(&col));
            Line { row, col, row_shared, col_shared }
        });

        source
            .iter()
            .copied()
            .filter(|ix| !selected.contains(ix))
            .filter(|&ix| self.balanced_with(ix, selected))
            .filter(|&ix| lines.as_ref().map_or(true, |line| self.fits_lines(ix, line)))
            .collect()
    }

    fn balanced_with(&self, candidate: usize, selected: &[usize]) -> bool {
        let category = self.index.prompt(candidate).category;
        let mut counts: HashMap<Category, usize> = HashMap::new();
        for &ix in selected {
            *counts.entry(self.index.prompt(ix).category).or_default() += 1;
        }
        *counts.entry(category).or_default() += 1;

        let count = |c: Category| counts.get(&c).copied().unwrap_or(0);
        if count(category) > self.rules.max_per_category {
            return false;
        }
        if count(Category::GroupMembership) > self.rules.max_group_membership {
            return false;
        }
        let remaining = self.cells - (selected.len() + 1);
        count(Category::Statistical) + remaining >= self.rules.min_statistical
    }

    fn fits_lines(&self, candidate: usize, line: &Line) -> bool {
        let prompt = self.index.prompt(candidate);
        if let Some(group) = prompt.predicate.group.as_deref() {
            if line.row.iter().any(|&ix| self.group_of(ix) == Some(group)) {
                return false;
            }
        }
        let same_category = |ixs: &[usize]| {
            ixs.iter()
                .filter(|&&ix| self.index.prompt(ix).category == prompt.category)
                .count()
        };
        if same_category(&line.row) >= self.rules.max_category_per_line
            || same_category(&line.col) >= self.rules.max_category_per_line
        {
            return false;
        }
        let candidates = self.index.candidates(candidate);
        line.row_shared.as_ref().map_or(true, |m| m.intersects(candidates))
            && line.col_shared.as_ref().map_or(true, |m| m.intersects(candidates))
    }

    fn group_of(&self, ix: usize) -> Option<&str> {
        self.index.prompt(ix).predicate.group.as_deref()
    }

    fn final_checks(&self, board: &[usize]) -> bool {
        let stats = board
            .iter()
            .filter(|&&ix| self.index.prompt(ix).category == Category::Statistical)
            .count();
        if stats < self.rules.min_statistical {
            return false;
        }
        let Some(side) = self.side else { return true };
        board.chunks(side).all(|row| {
            let mut groups: Vec<&str> = row.iter().filter_map(|&ix| self.group_of(ix)).collect();
            let total = groups.len();
            groups.sort_unstable();
            groups.dedup();
            groups.len() == total
        })
    }
}

struct Line {
    row: Vec<usize>,
    col: Vec<usize>,
    row_shared: Option<Mask>,
    col_shared: Option<Mask>,
}
