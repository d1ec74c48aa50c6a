use grid_engine::{Engine, EngineConfig, EngineError, EntityFact, GridCheck, PromptDefinition};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Msg {
    Init {
        facts: Vec<EntityFact>,
        #[serde(default)]
        catalog: Option<Vec<PromptDefinition>>,
        #[serde(default)]
        config: Option<EngineConfig>,
    },
    Check {
        rows: Vec<String>,
        cols: Vec<String>,
    },
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum Out {
    Ready,
    Valid,
    Invalid { reason: String },
    Error { code: &'static str, message: String },
}

impl From<EngineError> for Out {
    fn from(e: EngineError) -> Self {
        Out::Error { code: e.code(), message: e.to_string() }
    }
}

impl From<GridCheck> for Out {
    fn from(check: GridCheck) -> Self {
        match check {
            GridCheck::Valid => Out::Valid,
            GridCheck::Invalid { reason } => Out::Invalid { reason },
        }
    }
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
    let mut engine: Option<Engine> = None;
    let mut stdout = std::io::stdout();

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
        match msg {
            Msg::Init { facts, catalog, config } => {
                match Engine::from_facts(facts, catalog, config) {
                    Ok(e) => {
                        engine = Some(e);
                        emit(&mut stdout, &Out::Ready);
                    }
                    Err(e) => emit(&mut stdout, &e.into()),
                }
            }
            Msg::Check { rows, cols } => {
                let reply = match engine.as_ref() {
                    Some(engine) => match engine.check_grid(&rows, &cols) {
                        Ok(check) => check.into(),
                        Err(e) => e.into(),
                    },
                    None => EngineError::NotReady.into(),
                };
                emit(&mut stdout, &reply);
            }
        }
    }
}
