use grid_engine::{EngineError, FactSnapshot, SnapshotStore};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Msg {
    Init { db_path: String },
    Store { snapshot: FactSnapshot },
    Load { fingerprint: String },
    Prune { keep: usize },
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum Out {
    Ready,
    Ack,
    Snapshot { snapshot: Option<FactSnapshot> },
    Error { code: &'static str, message: String },
}

impl From<EngineError> for Out {
    fn from(e: EngineError) -> Self {
        Out::Error { code: e.code(), message: e.to_string() }
    }
}

fn no_db() -> Out {
    Out::Error { code: "not_ready", message: "no snapshot database open, send Init first".into() }
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
    let mut stdout = std::io::stdout();
    let mut db_opt: Option<SnapshotStore> = None;

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
        let reply = match msg {
            Msg::Init { db_path } => match SnapshotStore::open(&db_path) {
                Ok(db) => {
                    db_opt = Some(db);
                    Out::Ready
                }
                Err(e) => e.into(),
            },
            Msg::Store { snapshot } => match db_opt.as_mut() {
                Some(db) => match db.save(&snapshot) {
                    Ok(()) => Out::Ack,
                    Err(e) => {
                        tracing::error!(error = %e, "store failed after retries");
                        e.into()
                    }
                },
                None => no_db(),
            },
            Msg::Load { fingerprint } => match db_opt.as_ref() {
                Some(db) => match db.load(&fingerprint) {
                    Ok(snapshot) => Out::Snapshot { snapshot },
                    Err(e) => e.into(),
                },
                None => no_db(),
            },
            Msg::Prune { keep } => match db_opt.as_mut() {
                Some(db) => match db.prune(keep) {
                    Ok(removed) => {
                        tracing::info!(removed, keep, "pruned snapshots");
                        Out::Ack
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "prune failed after retries");
                        e.into()
                    }
                },
                None => no_db(),
            },
        };
        emit(&mut stdout, &reply);
    }
}
