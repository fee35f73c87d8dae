//! Native capability provider.
//!
//! Exercises real subsystems on the host: scratch-directory storage, an
//! in-memory SQLite database, worker threads, an LRU cache, an fsynced
//! queue file, gzip compression and a fingerprint-keyed semantic cache.
//! Each probe works inside its own temporary directory and leaves nothing
//! behind.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::num::NonZeroUsize;

use super::provider::{CapabilityProvider, ProbeOutcome};

type ProbeResult = Result<String, Box<dyn std::error::Error>>;

/// Provider backed by the host filesystem and process facilities.
#[derive(Debug, Default)]
pub struct NativeProvider;

impl NativeProvider {
    pub fn new() -> Self {
        Self
    }
}

fn run(probe: impl FnOnce() -> ProbeResult) -> ProbeOutcome {
    match probe() {
        Ok(detail) => ProbeOutcome::pass(detail),
        Err(e) => ProbeOutcome::fail(e.to_string()),
    }
}

impl CapabilityProvider for NativeProvider {
    fn persistent_store(&self) -> ProbeOutcome {
        run(|| {
            let dir = tempfile::tempdir()?;
            let path = dir.path().join("state.json");
            let state = serde_json::json!({
                "vessel": "mv-test",
                "pending_reports": 3,
                "last_sync": "2026-08-01T00:00:00Z",
            });
            std::fs::write(&path, serde_json::to_vec(&state)?)?;
            let raw = std::fs::read(&path)?;
            let restored: serde_json::Value = serde_json::from_slice(&raw)?;
            if restored != state {
                return Err("re-read state does not match what was written".into());
            }
            Ok(format!("wrote and re-read {} bytes of state", raw.len()))
        })
    }

    fn structured_database(&self) -> ProbeOutcome {
        run(|| {
            let conn = rusqlite::Connection::open_in_memory()?;
            conn.execute(
                "CREATE TABLE work_orders (id INTEGER PRIMARY KEY, vessel TEXT, status TEXT)",
                [],
            )?;
            for (vessel, status) in [("alpha", "open"), ("alpha", "done"), ("bravo", "open")] {
                conn.execute(
                    "INSERT INTO work_orders (vessel, status) VALUES (?1, ?2)",
                    [vessel, status],
                )?;
            }
            let open: i64 = conn.query_row(
                "SELECT COUNT(*) FROM work_orders WHERE status = 'open'",
                [],
                |row| row.get(0),
            )?;
            if open != 2 {
                return Err(format!("expected 2 open work orders, query returned {open}").into());
            }
            Ok("created, populated and queried an in-memory database".to_string())
        })
    }

    fn background_worker(&self) -> ProbeOutcome {
        run(|| {
            let handle = std::thread::spawn(|| (1..=100u64).sum::<u64>());
            let result = handle
                .join()
                .map_err(|_| "worker thread panicked before returning")?;
            if result != 5050 {
                return Err(format!("worker returned {result}, expected 5050").into());
            }
            Ok("spawned a worker thread and received its result".to_string())
        })
    }

    fn response_cache(&self) -> ProbeOutcome {
        run(|| {
            let capacity =
                NonZeroUsize::new(4).ok_or("cache capacity must be nonzero")?;
            let mut cache: LruCache<String, String> = LruCache::new(capacity);
            for i in 0..6 {
                cache.put(format!("request-{i}"), format!("response-{i}"));
            }
            if cache.get("request-5").is_none() {
                return Err("recent entry missing from cache".into());
            }
            if cache.get("request-0").is_some() {
                return Err("oldest entry survived past capacity".into());
            }
            Ok("cached 6 responses with LRU eviction at capacity 4".to_string())
        })
    }

    fn durable_queue(&self) -> ProbeOutcome {
        run(|| {
            let dir = tempfile::tempdir()?;
            let path = dir.path().join("queue.log");
            {
                let mut file = std::fs::File::create(&path)?;
                for i in 0..5 {
                    writeln!(file, "{{\"op\":\"update\",\"seq\":{i}}}")?;
                }
                file.sync_all()?;
            }
            let replayed = std::fs::read_to_string(&path)?;
            let entries = replayed.lines().count();
            if entries != 5 {
                return Err(format!("replayed {entries} queue entries, expected 5").into());
            }
            Ok("queued 5 writes with fsync and replayed them".to_string())
        })
    }

    fn payload_compression(&self) -> ProbeOutcome {
        run(|| {
            let payload = "noon report;position;weather;consumption;".repeat(64);
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(payload.as_bytes())?;
            let compressed = encoder.finish()?;

            let mut decoder = GzDecoder::new(compressed.as_slice());
            let mut restored = String::new();
            decoder.read_to_string(&mut restored)?;
            if restored != payload {
                return Err("payload did not survive the compression round trip".into());
            }
            Ok(format!(
                "compressed {} bytes to {} and restored them",
                payload.len(),
                compressed.len()
            ))
        })
    }

    fn sync_readiness(&self) -> ProbeOutcome {
        run(|| {
            let (tx, rx) = std::sync::mpsc::channel();
            for i in 0..5 {
                tx.send(format!("pending-write-{i}"))?;
            }
            drop(tx);
            let drained = rx.iter().count();
            if drained != 5 {
                return Err(format!("drained {drained} queued writes, expected 5").into());
            }
            Ok("drained 5 queued writes through the sync channel".to_string())
        })
    }

    fn semantic_cache(&self) -> ProbeOutcome {
        run(|| {
            let fingerprint = |query: &str| -> String {
                let normalized = query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
                let digest = Sha256::digest(normalized.as_bytes());
                format!("{digest:x}")
            };

            let capacity =
                NonZeroUsize::new(16).ok_or("cache capacity must be nonzero")?;
            let mut cache: LruCache<String, String> = LruCache::new(capacity);
            cache.put(
                fingerprint("What is the drill schedule?"),
                "cached answer".to_string(),
            );

            // Same question with different casing and spacing must hit.
            let hit = cache.get(&fingerprint("  what is THE drill   schedule? "));
            if hit.is_none() {
                return Err("normalized repeat query missed the semantic cache".into());
            }
            Ok("repeat query matched by normalized fingerprint".to_string())
        })
    }
}
