use grid_engine::{
    Answer, Engine, EngineConfig, EngineError, EntityFact, PromptDefinition, SearchHit, Verdict,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};

fn default_possible_limit() -> usize {
    200
}

fn default_search_limit() -> usize {
    8
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Msg {
    Init {
        facts: Vec<EntityFact>,
        #[serde(default)]
        catalog: Option<Vec<PromptDefinition>>,
        #[serde(default)]
        config: Option<EngineConfig>,
        #[serde(default)]
        seed: Option<u64>,
    },
    BuildGrid {
        size: usize,
    },
    BuildBoard {
        cells: usize,
    },
    Validate {
        name: String,
        prompt_ids: Vec<String>,
        #[serde(default)]
        excluded: Vec<String>,
    },
    Sample {
        prompt_ids: Vec<String>,
        #[serde(default)]
        excluded: Vec<String>,
    },
    Possible {
        prompt_ids: Vec<String>,
        #[serde(default)]
        excluded: Vec<String>,
        #[serde(default = "default_possible_limit")]
        limit: usize,
    },
    Search {
        query: String,
        #[serde(default = "default_search_limit")]
        limit: usize,
    },
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum Out {
    Ready {
        prompts: usize,
        pruned: usize,
    },
    Grid {
        rows: Vec<PromptDefinition>,
        cols: Vec<PromptDefinition>,
    },
    Board {
        prompts: Vec<PromptDefinition>,
    },
    Verdict {
        ok: bool,
        #[serde(flatten, skip_serializing_if = "Option::is_none")]
        answer: Option<Answer>,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<&'static str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Sample {
        answer: Option<Answer>,
    },
    Possible {
        answers: Vec<Answer>,
    },
    Search {
        results: Vec<SearchHit>,
    },
    Error {
        code: &'static str,
        message: String,
    },
}

impl From<Verdict> for Out {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accepted(answer) => {
                Out::Verdict { ok: true, answer: Some(answer), code: None, reason: None }
            }
            Verdict::Rejected(r) => Out::Verdict {
                ok: false,
                answer: None,
                code: Some(r.code()),
                reason: Some(r.reason()),
            },
        }
    }
}

impl From<EngineError> for Out {
    fn from(e: EngineError) -> Self {
        Out::Error { code: e.code(), message: e.to_string() }
    }
}

struct State {
    engine: Engine,
    rng: StdRng,
}

fn emit<W: Write>(out: &mut W, msg: &Out) {
    match serde_json::to_string(msg) {
        Ok(s) => {
            let _ = writeln!(out, "{s}");
            let _ = out.flush();
        }
        Err(e) => tracing::error!(error = %e, "failed to encode reply"),
    }
}

fn handle(state: &mut State, msg: Msg) -> Result<Out, EngineError> {
    let engine = &state.engine;
    let rng = &mut state.rng;
    let out = match msg {
        Msg::Init { .. } => return Err(EngineError::AlreadyInitialized),
        Msg::BuildGrid { size } => {
            let grid = engine.build_grid(size, rng)?;
            Out::Grid { rows: grid.rows, cols: grid.cols }
        }
        Msg::BuildBoard { cells } => Out::Board { prompts: engine.build_board(cells, rng)? },
        Msg::Validate { name, prompt_ids, excluded } => {
            engine.validate_answer(&name, &prompt_ids, &excluded)?.into()
        }
        Msg::Sample { prompt_ids, excluded } => {
            Out::Sample { answer: engine.sample_answer(&prompt_ids, &excluded, rng)? }
        }
        Msg::Possible { prompt_ids, excluded, limit } => Out::Possible {
            answers: engine.list_possible_answers(&prompt_ids, &excluded, limit)?,
        },
        Msg::Search { query, limit } => {
            Out::Search { results: engine.search_by_name(&query, limit)? }
        }
    };
    Ok(out)
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let stdin = std::io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut line = String::new();
    let mut stdout = std::io::stdout();
    let mut state_opt: Option<State> = None;

    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "stdin closed");
                break;
            }
        }
        if line.trim().is_empty() {
            continue;
        }
        let msg: Msg = match serde_json::from_str(&line) {
            Ok(m) => m,
            Err(e) => {
                emit(&mut stdout, &EngineError::malformed(format!("bad json: {e}")).into());
                continue;
            }
        };

        if let Msg::Init { facts, catalog, config, seed } = msg {
            // a fresh Init replaces the previous engine
            match Engine::from_facts(facts, catalog, config) {
                Ok(engine) => {
                    let (prompts, pruned) =
                        engine.index().map_or((0, 0), |ix| (ix.len(), ix.pruned().len()));
                    let rng = match seed {
                        Some(seed) => StdRng::seed_from_u64(seed),
                        None => StdRng::from_entropy(),
                    };
                    state_opt = Some(State { engine, rng });
                    emit(&mut stdout, &Out::Ready { prompts, pruned });
                }
                Err(e) => emit(&mut stdout, &e.into()),
            }
            continue;
        }

        let reply = match state_opt.as_mut() {
            Some(state) => handle(state, msg).unwrap_or_else(Out::from),
            None => EngineError::NotReady.into(),
        };
        emit(&mut stdout, &reply);
    }
}
