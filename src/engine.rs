use std::collections::HashSet;
use std::sync::{Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::BoardSolver;
use crate::catalog::{Catalog, PromptDefinition};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::fact::{EntityFact, FactStore};
use crate::grid::{GridCheck, GridSolver, GridSpec};
use crate::index::CandidateIndex;
use crate::recency::RecencyHistory;
use crate::snapshot::FactSnapshot;
use crate::validate::{Answer, Answers, SearchHit, Verdict};

struct Indexed {
    store: FactStore,
    index: CandidateIndex,
}

/// The engine: built explicitly with [`Engine::initialize`], then shared
/// read-only by every request. Only the recency history changes afterwards.
pub struct Engine {
    config: EngineConfig,
    catalog: Catalog,
    state: OnceLock<Indexed>,
    history: Mutex<RecencyHistory>,
    ready: Mutex<bool>,
    ready_signal: Condvar,
}

impl Engine {
    pub fn new(config: EngineConfig, catalog: Catalog) -> Self {
        let history =
            RecencyHistory::new(config.recent_boards_capacity, config.recent_prompts_capacity);
        Engine {
            config,
            catalog,
            state: OnceLock::new(),
            history: Mutex::new(history),
            ready: Mutex::new(false),
            ready_signal: Condvar::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Engine::new(EngineConfig::default(), Catalog::default_catalog())
    }

    /// Builds and initializes an engine in one step, using the built-in
    /// catalog and default config where none is given.
    pub fn from_facts(
        facts: Vec<EntityFact>,
        catalog: Option<Vec<PromptDefinition>>,
        config: Option<EngineConfig>,
    ) -> Result<Self> {
        let catalog = match catalog {
            Some(prompts) => Catalog::new(prompts)?,
            None => Catalog::default_catalog(),
        };
        let engine = Engine::new(config.unwrap_or_default(), catalog);
        engine.initialize(FactStore::from_facts(facts))?;
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds the candidate index over `store` and marks the engine ready.
    pub fn initialize(&self, store: FactStore) -> Result<()> {
        if self.state.get().is_some() {
            return Err(EngineError::AlreadyInitialized);
        }
        let index = CandidateIndex::build(&store, &self.catalog, &self.config);
        self.state
            .set(Indexed { store, index })
            .map_err(|_| EngineError::AlreadyInitialized)?;

        *lock(&self.ready) = true;
        self.ready_signal.notify_all();
        Ok(())
    }

    /// Initializes from `snapshot` when it matches `fingerprint`. Returns
    /// false, leaving the engine untouched, for a stale snapshot.
    pub fn initialize_from_snapshot(
        &self,
        snapshot: FactSnapshot,
        fingerprint: &str,
    ) -> Result<bool> {
        if !snapshot.is_fresh(fingerprint) {
            tracing::info!(
                version = snapshot.version,
                stored = %snapshot.fingerprint,
                current = %fingerprint,
                "snapshot is stale, waiting for a full rebuild"
            );
            return Ok(false);
        }
        tracing::info!(facts = snapshot.facts.len(), "restoring fact store from snapshot");
        self.initialize(FactStore::from_facts(snapshot.facts))?;
        Ok(true)
    }

    pub fn is_ready(&self) -> bool {
        self.state.get().is_some()
    }

    /// Blocks until initialization completes or `timeout` elapses.
    pub fn wait_ready(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut ready = lock(&self.ready);
        while !*ready {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            ready = self
                .ready_signal
                .wait_timeout(ready, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    fn state(&self) -> Result<&Indexed> {
        self.state.get().ok_or(EngineError::NotReady)
    }

    pub fn store(&self) -> Result<&FactStore> {
        Ok(&self.state()?.store)
    }

    pub fn index(&self) -> Result<&CandidateIndex> {
        Ok(&self.state()?.index)
    }

    /// Usable prompts, after pruning.
    pub fn prompts(&self) -> Result<&[PromptDefinition]> {
        Ok(self.state()?.index.prompts())
    }

    pub fn prompt(&self, id: &str) -> Result<Option<&PromptDefinition>> {
        let index = &self.state()?.index;
        Ok(index.position(id).map(|ix| index.prompt(ix)))
    }

    pub fn build_grid<R: Rng + ?Sized>(&self, size: usize, rng: &mut R) -> Result<GridSpec> {
        let state = self.state()?;
        let solver = GridSolver::new(&state.index, &self.config, size)?;
        let history = self.history_snapshot();
        let (mut layout, strategy) = solver.solve(&history, rng)?;
        tracing::debug!(size, %strategy, "grid solved");

        layout.rows.shuffle(rng);
        layout.cols.shuffle(rng);
        let spec = layout.to_spec(&state.index);
        lock(&self.history).record(&spec.prompt_ids());
        Ok(spec)
    }

    pub fn build_board<R: Rng + ?Sized>(
        &self,
        cells: usize,
        rng: &mut R,
    ) -> Result<Vec<PromptDefinition>> {
        let state = self.state()?;
        let solver = BoardSolver::new(&state.index, &self.config.board, cells)?;
        let history = self.history_snapshot();
        let board = solver.solve(&history, rng)?;

        let prompts: Vec<PromptDefinition> =
            board.prompts.iter().map(|&ix| state.index.prompt(ix).clone()).collect();
        let ids: Vec<String> = prompts.iter().map(|p| p.id.clone()).collect();
        lock(&self.history).record(&ids);
        Ok(prompts)
    }

    /// Solvers read a copy so concurrent sessions only contend while recording.
    fn history_snapshot(&self) -> RecencyHistory {
        lock(&self.history).clone()
    }

    /// Positions of `ids` among the usable prompts. Every active prompt has
    /// to be checked, so an empty list or any unknown or pruned id is malformed.
    fn resolve<S: AsRef<str>>(&self, index: &CandidateIndex, ids: &[S]) -> Result<Vec<usize>> {
        if ids.is_empty() {
            return Err(EngineError::malformed("no prompt ids given"));
        }
        ids.iter()
            .map(|id| {
                let id = id.as_ref();
                index
                    .position(id)
                    .ok_or_else(|| EngineError::malformed(format!("unknown prompt id {id}")))
            })
            .collect()
    }

    fn answers<'a>(&'a self, state: &'a Indexed) -> Answers<'a> {
        Answers {
            store: &state.store,
            index: &state.index,
            image_url_template: &self.config.image_url_template,
        }
    }

    pub fn validate_answer<S: AsRef<str>>(
        &self,
        name: &str,
        prompt_ids: &[S],
        excluded: &[String],
    ) -> Result<Verdict> {
        let state = self.state()?;
        let prompts = self.resolve(&state.index, prompt_ids)?;
        let excluded: HashSet<String> = excluded.iter().cloned().collect();
        Ok(self.answers(state).validate(name, &prompts, &excluded))
    }

    pub fn validate_single(
        &self,
        name: &str,
        prompt_id: &str,
        excluded: &[String],
    ) -> Result<Verdict> {
        self.validate_answer(name, &[prompt_id], excluded)
    }

    pub fn sample_answer<S: AsRef<str>, R: Rng + ?Sized>(
        &self,
        prompt_ids: &[S],
        excluded: &[String],
        rng: &mut R,
    ) -> Result<Option<Answer>> {
        let state = self.state()?;
        let prompts = self.resolve(&state.index, prompt_ids)?;
        let excluded: HashSet<String> = excluded.iter().cloned().collect();
        Ok(self.answers(state).sample(&prompts, &excluded, rng))
    }

    pub fn sample_single<R: Rng + ?Sized>(
        &self,
        prompt_id: &str,
        excluded: &[String],
        rng: &mut R,
    ) -> Result<Option<Answer>> {
        self.sample_answer(&[prompt_id], excluded, rng)
    }

    pub fn list_possible_answers<S: AsRef<str>>(
        &self,
        prompt_ids: &[S],
        excluded: &[String],
        limit: usize,
    ) -> Result<Vec<Answer>> {
        let state = self.state()?;
        let prompts = self.resolve(&state.index, prompt_ids)?;
        let excluded: HashSet<String> = excluded.iter().cloned().collect();
        Ok(self.answers(state).possible(&prompts, &excluded, limit))
    }

    pub fn search_by_name(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let state = self.state()?;
        Ok(self.answers(state).search(query, limit))
    }

    /// Checks an externally proposed grid against the same invariants
    /// generated grids satisfy.
    pub fn check_grid<S: AsRef<str>>(&self, row_ids: &[S], col_ids: &[S]) -> Result<GridCheck> {
        let index = &self.state()?.index;
        let invalid = |reason: String| Ok(GridCheck::Invalid { reason });
        if row_ids.len() != col_ids.len() {
            return invalid(format!("{} rows but {} columns", row_ids.len(), col_ids.len()));
        }
        let solver = match GridSolver::new(index, &self.config, row_ids.len()) {
            Ok(solver) => solver,
            Err(e) => return invalid(e.to_string()),
        };
        let positions = |ids: &[S]| -> std::result::Result<Vec<usize>, String> {
            ids.iter()
                .map(|id| {
                    let id = id.as_ref();
                    index.position(id).ok_or_else(|| format!("unknown prompt id {id}"))
                })
                .collect()
        };
        let rows = match positions(row_ids) {
            Ok(rows) => rows,
            Err(reason) => return invalid(reason),
        };
        let cols = match positions(col_ids) {
            Ok(cols) => cols,
            Err(reason) => return invalid(reason),
        };
        match solver.diagnose(&rows, &cols) {
            Some(reason) => invalid(reason),
            None => Ok(GridCheck::Valid),
        }
    }

    pub fn recent_prompt_ids(&self) -> Vec<String> {
        lock(&self.history).recent_prompts().map(str::to_string).collect()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
