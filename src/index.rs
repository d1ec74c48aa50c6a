use std::collections::HashMap;

use crate::catalog::{Catalog, PromptDefinition};
use crate::config::EngineConfig;
use crate::fact::{EntityFact, FactStore};
use crate::mask::Mask;
use crate::predicate::matches;

/// Candidate sets for every usable prompt.
///
/// Built once from the full fact store and catalog. Prompts whose relevant
/// candidate count falls below `min_candidates_per_prompt` are dropped, so
/// every prompt position here is one the solvers may use.
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    prompts: Vec<PromptDefinition>,
    by_id: HashMap<String, usize>,
    all: Vec<Mask>,
    relevant: Vec<Mask>,
    // relevant[a] ∩ relevant[b] sizes, symmetric
    overlap: Vec<Vec<u32>>,
    pruned: Vec<String>,
    relevant_from: Option<i32>,
}

fn is_relevant(fact: &EntityFact, cutoff: Option<i32>) -> bool {
    cutoff.is_some_and(|c| fact.periods.iter().any(|&p| p >= c))
}

impl CandidateIndex {
    pub fn build(store: &FactStore, catalog: &Catalog, config: &EngineConfig) -> Self {
        let anchor = config.anchor_period.or_else(|| store.latest_period());
        let relevant_from = anchor.map(|a| a - config.recent_window_periods);
        let width = store.len();

        let mut prompts = Vec::new();
        let mut all = Vec::new();
        let mut relevant = Vec::new();
        let mut pruned = Vec::new();
        for prompt in catalog.prompts() {
            let mut matched = Mask::new(width);
            let mut recent = Mask::new(width);
            for (pos, fact) in store.iter().enumerate() {
                if matches(fact, &prompt.predicate) {
                    matched.insert(pos);
                    if is_relevant(fact, relevant_from) {
                        recent.insert(pos);
                    }
                }
            }
            if recent.count() < config.min_candidates_per_prompt {
                pruned.push(prompt.id.clone());
                continue;
            }
            prompts.push(prompt.clone());
            all.push(matched);
            relevant.push(recent);
        }

        let n = prompts.len();
        let mut overlap = vec![vec![0u32; n]; n];
        for a in 0..n {
            overlap[a][a] = relevant[a].count() as u32;
            for b in (a + 1)..n {
                let shared = relevant[a].intersection_count(&relevant[b]) as u32;
                overlap[a][b] = shared;
                overlap[b][a] = shared;
            }
        }

        let by_id = prompts.iter().enumerate().map(|(i, p)| (p.id.clone(), i)).collect();
        tracing::info!(
            entities = width,
            catalog = catalog.len(),
            usable = n,
            pruned = pruned.len(),
            relevant_from = ?relevant_from,
            "candidate index built"
        );
        CandidateIndex {
            prompts,
            by_id,
            all,
            relevant,
            overlap,
            pruned,
            relevant_from,
        }
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn prompts(&self) -> &[PromptDefinition] {
        &self.prompts
    }

    pub fn prompt(&self, ix: usize) -> &PromptDefinition {
        &self.prompts[ix]
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Ids dropped for having too few relevant candidates.
    pub fn pruned(&self) -> &[String] {
        &self.pruned
    }

    /// First period of the relevance window, if the store had any periods.
    pub fn relevant_from(&self) -> Option<i32> {
        self.relevant_from
    }

    pub fn candidates(&self, ix: usize) -> &Mask {
        &self.all[ix]
    }

    pub fn relevant(&self, ix: usize) -> &Mask {
        &self.relevant[ix]
    }

    pub fn candidate_count(&self, ix: usize) -> usize {
        self.all[ix].count()
    }

    pub fn relevant_count(&self, ix: usize) -> usize {
        self.overlap[ix][ix] as usize
    }

    /// Size of the relevant-candidate intersection of two prompts.
    pub fn overlap(&self, a: usize, b: usize) -> usize {
        self.overlap[a][b] as usize
    }

    /// For every prompt, the other prompts whose relevant overlap with it is
    /// at least `min`, ascending.
    pub fn compatibility(&self, min: usize) -> Vec<Vec<usize>> {
        let n = self.len();
        (0..n)
            .map(|a| (0..n).filter(|&b| b != a && self.overlap(a, b) >= min).collect())
            .collect()
    }

    /// Full (not relevance-restricted) candidates shared by every prompt in `ixs`.
    pub fn shared_candidates(&self, ixs: &[usize]) -> Mask {
        let Some((&first, rest)) = ixs.split_first() else {
            return Mask::default();
        };
        let mut shared = self.all[first].clone();
        for &ix in rest {
            shared.and_with(&self.all[ix]);
            if shared.is_empty() {
                break;
            }
        }
        shared
    }
}
