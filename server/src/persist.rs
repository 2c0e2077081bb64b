//! Backing file for the file-backed variant.
//!
//! # Design
//! Handlers never touch the disk. After each response the router middleware
//! publishes a full snapshot of the store into a `watch` channel; a single
//! worker task drains it and writes the newest snapshot it sees. Snapshots
//! published while a write is in flight collapse into one, so writes are
//! ordered and never overlap. Each write goes to `<file>.tmp` first and is
//! renamed over the backing file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::error::PersistError;
use crate::store::Todo;

#[derive(Debug, Clone)]
pub struct BackingFile {
    path: PathBuf,
}

impl BackingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Vec<Todo>, PersistError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| PersistError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Loads the file, falling back to an empty list on any failure. The
    /// cause is logged; startup carries on regardless.
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load_or_empty(&self) -> Vec<Todo> {
        match self.load().await {
            Ok(todos) => {
                tracing::info!(count = todos.len(), "loaded todos from backing file");
                todos
            }
            Err(err) if err.is_not_found() => {
                tracing::info!("backing file does not exist yet, starting empty");
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not load backing file, starting empty");
                Vec::new()
            }
        }
    }

    pub async fn save(&self, todos: &[Todo]) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(todos)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| PersistError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| PersistError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

/// Cloneable handle used by the router to hand snapshots to the save worker.
#[derive(Debug, Clone)]
pub struct SnapshotSink {
    tx: Arc<watch::Sender<Vec<Todo>>>,
}

impl SnapshotSink {
    /// Replaces any snapshot the worker has not picked up yet.
    pub fn publish(&self, todos: Vec<Todo>) {
        self.tx.send_replace(todos);
    }
}

/// Owner of the save task. Call [`SaveWorker::finish`] on shutdown so the
/// last snapshot reaches the disk.
#[derive(Debug)]
pub struct SaveWorker {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl SaveWorker {
    /// Starts the worker. `initial` is what the store held at startup and is
    /// not written until something is published or the worker finishes.
    pub fn spawn(file: BackingFile, initial: Vec<Todo>) -> (SnapshotSink, SaveWorker) {
        let (tx, rx) = watch::channel(initial);
        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_worker(file, rx, shutdown_rx));
        (
            SnapshotSink { tx: Arc::new(tx) },
            SaveWorker { shutdown, handle },
        )
    }

    /// Writes the newest snapshot and waits for the worker to exit.
    pub async fn finish(self) {
        let _ = self.shutdown.send(());
        if let Err(err) = self.handle.await {
            tracing::error!(error = %err, "save worker panicked");
        }
    }
}

async fn run_worker(
    file: BackingFile,
    mut snapshots: watch::Receiver<Vec<Todo>>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let todos = snapshots.borrow_and_update().clone();
                write_logged(&file, &todos).await;
            }
            _ = &mut shutdown => {
                let todos = snapshots.borrow_and_update().clone();
                write_logged(&file, &todos).await;
                break;
            }
        }
    }
    tracing::debug!("save worker stopped");
}

async fn write_logged(file: &BackingFile, todos: &[Todo]) {
    match file.save(todos).await {
        Ok(()) => tracing::debug!(count = todos.len(), "saved todos"),
        Err(err) => tracing::error!(error = %err, "failed to save todos"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: u64, title: &str) -> Todo {
        Todo {
            id,
            title: Some(title.to_string()),
            description: Some(format!("about {title}")),
            completed: Some(id % 2 == 0),
        }
    }

    #[tokio::test]
    async fn save_then_load_reproduces_todos() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = BackingFile::new(tmp.path().join("todos.json"));
        let todos = vec![
            todo(1, "A"),
            todo(2, "B"),
            Todo {
                id: 4,
                title: None,
                description: None,
                completed: None,
            },
        ];

        file.save(&todos).await.unwrap();
        assert_eq!(file.load().await.unwrap(), todos);
        assert!(!tmp.path().join("todos.json.tmp").exists());
    }

    #[tokio::test]
    async fn save_writes_pretty_json_array() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = BackingFile::new(tmp.path().join("todos.json"));
        file.save(&[todo(1, "A")]).await.unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        assert!(text.starts_with("[\n  {\n    \"id\": 1,"));
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = BackingFile::new(tmp.path().join("absent.json"));
        assert!(file.load().await.unwrap_err().is_not_found());
        assert!(file.load_or_empty().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_loads_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("todos.json");
        std::fs::write(&path, "{ not json").unwrap();
        let file = BackingFile::new(path.clone());

        assert!(matches!(file.load().await, Err(PersistError::Json(_))));
        assert!(file.load_or_empty().await.is_empty());
    }

    #[tokio::test]
    async fn worker_writes_latest_snapshot() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = BackingFile::new(tmp.path().join("todos.json"));
        let (sink, worker) = SaveWorker::spawn(file.clone(), Vec::new());

        sink.publish(vec![todo(1, "A")]);
        sink.publish(vec![todo(1, "A"), todo(2, "B")]);
        sink.publish(vec![todo(2, "B")]);
        worker.finish().await;

        assert_eq!(file.load().await.unwrap(), vec![todo(2, "B")]);
    }

    #[tokio::test]
    async fn finish_without_publish_writes_initial_state() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = BackingFile::new(tmp.path().join("todos.json"));
        let (_sink, worker) = SaveWorker::spawn(file.clone(), vec![todo(5, "E")]);

        worker.finish().await;

        assert_eq!(file.load().await.unwrap(), vec![todo(5, "E")]);
    }

    #[tokio::test]
    async fn save_failure_does_not_stop_worker() {
        let tmp = tempfile::TempDir::new().unwrap();
        let bad = BackingFile::new(tmp.path().join("missing-dir").join("todos.json"));
        assert!(bad.save(&[todo(1, "A")]).await.is_err());

        let (sink, worker) = SaveWorker::spawn(bad, Vec::new());
        sink.publish(vec![todo(1, "A")]);
        worker.finish().await;
    }
}
