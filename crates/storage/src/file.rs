//! Append-only JSON-lines state log.
//!
//! Each line is either a full record or a tombstone:
//!
//! ```text
//! {"key":"com.example|1.0|7","record":{...}}
//! {"key":"com.example|1.0|7","record":null}
//! ```
//!
//! The log is replayed on open (later lines win) and then compacted to the
//! live set, so it only grows by one line per write between restarts.
//!
//! A write that fails partway is cut back to the last whole line. When even
//! that fails, the next write starts with a newline so the fragment stays on
//! a line of its own, and replay skips it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storewatch_core::ObservedState;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::table::RecordTable;
use crate::{StateStore, StorageError, StoredRecord};

#[derive(Debug, Serialize, Deserialize)]
struct LogLine {
    key: String,
    record: Option<StoredRecord>,
}

struct Inner {
    table: RecordTable,
    file: File,
    /// Length of the log up to its last whole line; `None` when unknown.
    committed: Option<u64>,
    /// The log may end in a fragment of a failed write.
    torn: bool,
}

/// File-backed store that survives restarts.
pub struct FileStateStore {
    path: PathBuf,
    inner: Mutex<Inner>,
    healthy: AtomicBool,
}

impl std::fmt::Debug for FileStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStateStore")
            .field("path", &self.path)
            .field("healthy", &self.healthy.load(Ordering::Relaxed))
            .finish()
    }
}

impl FileStateStore {
    /// Open (or create) the log at `path`, replay it, and compact it.
    ///
    /// Malformed lines are left over from failed writes; they are logged and
    /// dropped, and compaction removes them from the file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let table = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => replay(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RecordTable::default(),
            Err(e) => return Err(e.into()),
        };

        let committed = compact(&path, &table).await?;
        let file = OpenOptions::new().append(true).open(&path).await?;

        tracing::info!(path = %path.display(), entries = table.len(), "state log opened");

        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                table,
                file,
                committed: Some(committed),
                torn: false,
            }),
            healthy: AtomicBool::new(true),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, inner: &mut Inner, line: &LogLine) -> Result<(), StorageError> {
        let separated = inner.torn;
        let mut bytes = Vec::new();
        if separated {
            bytes.push(b'\n');
        }
        serde_json::to_writer(&mut bytes, line)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        bytes.push(b'\n');

        let result = async {
            inner.file.write_all(&bytes).await?;
            inner.file.flush().await
        }
        .await;
        match result {
            Ok(()) => {
                inner.torn = false;
                inner.committed = match inner.committed {
                    Some(len) if !separated => Some(len + bytes.len() as u64),
                    _ => inner.file.metadata().await.ok().map(|m| m.len()),
                };
                self.healthy.store(true, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.healthy.store(false, Ordering::Relaxed);
                tracing::error!(path = %self.path.display(), error = %e, "state log write failed");
                inner.torn = match inner.committed {
                    Some(len) => match inner.file.set_len(len).await {
                        Ok(()) => false,
                        Err(trunc) => {
                            tracing::warn!(
                                path = %self.path.display(),
                                error = %trunc,
                                "cannot cut back failed write, next write starts a new line"
                            );
                            true
                        }
                    },
                    None => true,
                };
                Err(e.into())
            }
        }
    }
}

fn replay(contents: &str) -> RecordTable {
    let mut table = RecordTable::default();
    for (idx, raw) in contents.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogLine>(raw) {
            Ok(LogLine {
                record: Some(record),
                ..
            }) => table.insert(record),
            Ok(LogLine { key, record: None }) => table.remove_raw(&key),
            Err(e) => {
                tracing::warn!(line = idx + 1, error = %e, "dropping malformed line in state log");
            }
        }
    }
    table
}

/// Rewrite the log as the live set. Returns the new length.
async fn compact(path: &Path, table: &RecordTable) -> Result<u64, StorageError> {
    let mut out = Vec::new();
    for record in table.records() {
        let line = LogLine {
            key: record.key.clone(),
            record: Some(record.clone()),
        };
        serde_json::to_writer(&mut out, &line).map_err(|e| StorageError::Backend(e.to_string()))?;
        out.push(b'\n');
    }
    let tmp = path.with_extension("compact");
    tokio::fs::write(&tmp, &out).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(out.len() as u64)
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredRecord>, StorageError> {
        Ok(self.inner.lock().await.table.get(namespace, key).cloned())
    }

    async fn set(
        &self,
        namespace: &str,
        key: &str,
        state: ObservedState,
    ) -> Result<(), StorageError> {
        let record = RecordTable::make_record(namespace, key, state);
        let mut inner = self.inner.lock().await;
        let line = LogLine {
            key: key.to_string(),
            record: Some(record.clone()),
        };
        self.append(&mut inner, &line).await?;
        inner.table.insert(record);
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        if inner.table.get(namespace, key).is_none() {
            return Ok(());
        }
        let line = LogLine {
            key: key.to_string(),
            record: None,
        };
        self.append(&mut inner, &line).await?;
        inner.table.remove(namespace, key);
        Ok(())
    }

    async fn keys(&self, namespace: Option<&str>) -> Result<Vec<String>, StorageError> {
        Ok(self.inner.lock().await.table.keys(namespace))
    }

    fn is_ready(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::run_conformance_suite;

    fn state(status: &str) -> ObservedState {
        ObservedState {
            status: status.to_string(),
            version_label: "1.0".to_string(),
            version_code: Some(7),
            last_checked_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn file_store_passes_conformance() {
        let dir = tempfile::tempdir().unwrap();
        let counter = std::sync::atomic::AtomicUsize::new(0);
        let report = run_conformance_suite(|| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let path = dir.path().join(format!("state-{n}.jsonl"));
            async move { FileStateStore::open(path).await.unwrap() }
        })
        .await;
        assert_eq!(report.failed, 0, "{report}");
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.jsonl");
        {
            let store = FileStateStore::open(&path).await.unwrap();
            store.set("app-store", "a||app", state("READY")).await.unwrap();
            store.set("play-store", "p||beta", state("completed")).await.unwrap();
            store.set("app-store", "a||app", state("IN_REVIEW")).await.unwrap();
            store.delete("play-store", "p||beta").await.unwrap();
        }
        let store = FileStateStore::open(&path).await.unwrap();
        let rec = store.get("app-store", "a||app").await.unwrap().unwrap();
        assert_eq!(rec.state.status, "IN_REVIEW");
        assert!(!store.has("play-store", "p||beta").await.unwrap());
        assert_eq!(store.keys(None).await.unwrap(), vec!["a||app".to_string()]);
    }

    #[tokio::test]
    async fn reopen_compacts_log_to_live_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.jsonl");
        {
            let store = FileStateStore::open(&path).await.unwrap();
            for status in ["A", "B", "C"] {
                store.set("app-store", "k", state(status)).await.unwrap();
            }
        }
        let _store = FileStateStore::open(&path).await.unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[tokio::test]
    async fn torn_trailing_line_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.jsonl");
        let good = serde_json::to_string(&LogLine {
            key: "k".into(),
            record: Some(RecordTable::make_record("app-store", "k", state("READY"))),
        })
        .unwrap();
        std::fs::write(&path, format!("{good}\n{{\"key\":\"x\",\"rec")).unwrap();

        let store = FileStateStore::open(&path).await.unwrap();
        assert!(store.has("app-store", "k").await.unwrap());
        assert_eq!(store.keys(None).await.unwrap().len(), 1);
    }

    fn log_line(key: &str, status: &str) -> String {
        serde_json::to_string(&LogLine {
            key: key.into(),
            record: Some(RecordTable::make_record("app-store", key, state(status))),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn malformed_interior_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.jsonl");
        let a = log_line("a", "READY");
        let b = log_line("b", "READY");
        std::fs::write(&path, format!("{a}\nnot json\n{b}\n")).unwrap();

        let store = FileStateStore::open(&path).await.unwrap();
        assert!(store.has("app-store", "a").await.unwrap());
        assert!(store.has("app-store", "b").await.unwrap());
        drop(store);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn write_after_uncut_fragment_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.jsonl");
        let store = FileStateStore::open(&path).await.unwrap();
        store.set("app-store", "a", state("READY")).await.unwrap();

        // A failed write that could not be cut back.
        {
            use std::io::Write;
            let mut raw = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
            raw.write_all(b"{\"key\":\"x\",\"rec").unwrap();
        }
        store.inner.lock().await.torn = true;

        store.set("app-store", "b", state("IN_REVIEW")).await.unwrap();
        store.set("app-store", "c", state("VALID")).await.unwrap();
        drop(store);

        let store = FileStateStore::open(&path).await.unwrap();
        assert_eq!(
            store.keys(None).await.unwrap(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert_eq!(
            store.get("app-store", "b").await.unwrap().unwrap().state.status,
            "IN_REVIEW"
        );
    }

    #[tokio::test]
    async fn committed_length_tracks_whole_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.jsonl");
        let store = FileStateStore::open(&path).await.unwrap();
        store.set("app-store", "a", state("READY")).await.unwrap();
        store.delete("app-store", "a").await.unwrap();

        let committed = store.inner.lock().await.committed;
        let on_disk = std::fs::metadata(&path).unwrap().len();
        assert_eq!(committed, Some(on_disk));
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/state.jsonl");
        let store = FileStateStore::open(&path).await.unwrap();
        assert!(store.is_ready());
        assert!(path.exists());
    }
}
