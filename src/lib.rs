//! Prompt-grid trivia engine.
//!
//! Facts about entities are indexed against a catalog of prompts once, then
//! the engine builds grids and boards whose every cell has enough current
//! answers, and checks typed answers against the active prompts.

pub mod board;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod fact;
pub mod grid;
pub mod index;
pub mod mask;
pub mod normalize;
pub mod pick;
pub mod predicate;
pub mod recency;
pub mod snapshot;
pub mod validate;

pub use catalog::{Archetype, Catalog, Category, Difficulty, PromptDefinition};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use fact::{Achievements, Award, EntityFact, FactStore, FactStoreBuilder, Stat};
pub use grid::{GridCheck, GridSpec};
pub use predicate::{matches, Predicate};
pub use snapshot::{source_fingerprint, FactSnapshot, SnapshotStore};
pub use validate::{Answer, Rejection, SearchHit, Verdict};
