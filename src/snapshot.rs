//! Serialized fact-store snapshots and their SQLite persistence.
//!
//! A snapshot is only reused when its version and source fingerprint both
//! match; anything else means the store must be rebuilt from sources.

use std::path::Path;
use std::thread;
use std::time::{Duration, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::fact::{EntityFact, FactStore};

pub const SNAPSHOT_VERSION: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactSnapshot {
    pub version: u32,
    pub fingerprint: String,
    pub facts: Vec<EntityFact>,
}

impl FactSnapshot {
    pub fn capture(store: &FactStore, fingerprint: &str) -> Self {
        FactSnapshot {
            version: SNAPSHOT_VERSION,
            fingerprint: fingerprint.to_string(),
            facts: store.facts().to_vec(),
        }
    }

    pub fn is_fresh(&self, fingerprint: &str) -> bool {
        self.version == SNAPSHOT_VERSION && self.fingerprint == fingerprint
    }
}

/// SHA-256 over `path|size|mtime` for each source file, in the given order.
/// Missing files hash as `path|missing`, so their appearance changes the token.
pub fn source_fingerprint<P: AsRef<Path>>(paths: &[P]) -> String {
    let descriptors: Vec<String> = paths
        .iter()
        .map(|p| {
            let path = p.as_ref();
            match std::fs::metadata(path) {
                Ok(meta) => {
                    let mtime = meta
                        .modified()
                        .ok()
                        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                        .map_or(0, |d| d.as_millis());
                    format!("{}|{}|{}", path.display(), meta.len(), mtime)
                }
                Err(_) => format!("{}|missing", path.display()),
            }
        })
        .collect();
    let mut hasher = Sha256::new();
    hasher.update(descriptors.join("||").as_bytes());
    hex::encode(hasher.finalize())
}

pub fn retry_with_backoff<F, T, E>(mut f: F, max_attempts: usize) -> std::result::Result<T, E>
where
    F: FnMut() -> std::result::Result<T, E>,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match f() {
            Ok(result) => return Ok(result),
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) => {
                tracing::debug!(attempt, error = %e, "retrying snapshot write");
                // 50ms, 100ms, 200ms, ...
                thread::sleep(Duration::from_millis(50 * (1 << (attempt - 1))));
                attempt += 1;
            }
        }
    }
}

const WRITE_ATTEMPTS: usize = 5;

pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.busy_timeout(Duration::from_millis(60_000))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS fact_snapshots(
                fingerprint TEXT PRIMARY KEY,
                version INTEGER NOT NULL,
                payload TEXT NOT NULL,
                created_at INTEGER NOT NULL DEFAULT (strftime('%s','now'))
            );",
        )?;
        Ok(SnapshotStore { conn })
    }

    pub fn save(&mut self, snapshot: &FactSnapshot) -> Result<()> {
        let payload = serde_json::to_string(snapshot)?;
        retry_with_backoff(
            || {
                let tx = self.conn.transaction()?;
                tx.execute(
                    "INSERT OR REPLACE INTO fact_snapshots(fingerprint, version, payload)
                     VALUES (?1, ?2, ?3)",
                    params![snapshot.fingerprint, snapshot.version, payload],
                )?;
                tx.commit()
            },
            WRITE_ATTEMPTS,
        )?;
        tracing::info!(
            fingerprint = %snapshot.fingerprint,
            facts = snapshot.facts.len(),
            "snapshot stored"
        );
        Ok(())
    }

    /// The stored snapshot for `fingerprint`, if one exists with the current version.
    pub fn load(&self, fingerprint: &str) -> Result<Option<FactSnapshot>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM fact_snapshots WHERE fingerprint = ?1 AND version = ?2",
                params![fingerprint, SNAPSHOT_VERSION],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Keep the `keep` newest snapshots; returns how many were removed.
    pub fn prune(&mut self, keep: usize) -> Result<usize> {
        let removed = retry_with_backoff(
            || {
                let tx = self.conn.transaction()?;
                let n = tx.execute(
                    "DELETE FROM fact_snapshots WHERE fingerprint NOT IN (
                        SELECT fingerprint FROM fact_snapshots
                        ORDER BY created_at DESC, rowid DESC LIMIT ?1
                    )",
                    params![keep as i64],
                )?;
                tx.commit()?;
                Ok::<usize, rusqlite::Error>(n)
            },
            WRITE_ATTEMPTS,
        )?;
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 =
            self.conn.query_row("SELECT COUNT(*) FROM fact_snapshots", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}
