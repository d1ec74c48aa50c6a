use grid_engine::{Engine, EngineConfig, EntityFact, PromptDefinition};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Deserialize)]
struct Input {
    facts: Vec<EntityFact>,
    #[serde(default)]
    catalog: Option<Vec<PromptDefinition>>,
    #[serde(default)]
    config: Option<EngineConfig>,
}

#[derive(Serialize)]
struct PromptReport {
    id: String,
    candidates: usize,
    relevant: usize,
}

#[derive(Serialize)]
struct Output {
    entities: usize,
    relevant_from: Option<i32>,
    prompts: Vec<PromptReport>,
    pruned: Vec<String>,
    // compatible[i] lists prompts whose relevant overlap with prompt i
    // meets the per-cell minimum
    compatible: Vec<Vec<usize>>,
}

fn main() -> grid_engine::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    let inp: Input = serde_json::from_str(&buf)?;

    let engine = Engine::from_facts(inp.facts, inp.catalog, inp.config)?;
    let index = engine.index()?;
    let prompts = (0..index.len())
        .map(|ix| PromptReport {
            id: index.prompt(ix).id.clone(),
            candidates: index.candidate_count(ix),
            relevant: index.relevant_count(ix),
        })
        .collect();

    let out = Output {
        entities: engine.store()?.len(),
        relevant_from: index.relevant_from(),
        prompts,
        pruned: index.pruned().to_vec(),
        compatible: index.compatibility(engine.config().min_intersection_per_cell),
    };
    let mut stdout = std::io::stdout();
    let s = serde_json::to_string(&out)?;
    stdout.write_all(s.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}
