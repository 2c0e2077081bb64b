use crate::config::Config;
use crate::persist::{BackingFile, SaveWorker, SnapshotSink};
use crate::store::{IdPolicy, SharedStore, TodoStore};

/// State shared by every handler.
///
/// `snapshots` is only set for the file-backed variant.
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: SharedStore,
    pub snapshots: Option<SnapshotSink>,
}

impl AppState {
    pub fn in_memory(policy: IdPolicy) -> Self {
        Self {
            store: TodoStore::new(policy).into_shared(),
            snapshots: None,
        }
    }

    /// Loads `file` (empty on failure) and starts its save worker.
    pub async fn file_backed(file: BackingFile, policy: IdPolicy) -> (Self, SaveWorker) {
        let todos = file.load_or_empty().await;
        let store = TodoStore::from_todos(todos.clone(), policy).into_shared();
        let (sink, worker) = SaveWorker::spawn(file, todos);
        (
            Self {
                store,
                snapshots: Some(sink),
            },
            worker,
        )
    }

    /// Picks the variant from `config.data_file`.
    pub async fn from_config(config: &Config) -> (Self, Option<SaveWorker>) {
        match &config.data_file {
            Some(path) => {
                let (state, worker) =
                    Self::file_backed(BackingFile::new(path.clone()), config.id_policy).await;
                (state, Some(worker))
            }
            None => (Self::in_memory(config.id_policy), None),
        }
    }

    /// Hands the current store contents to the save worker, if there is one.
    /// The read guard is held until the snapshot is in the channel.
    pub async fn publish_snapshot(&self) {
        if let Some(sink) = &self.snapshots {
            let store = self.store.read().await;
            sink.publish(store.list().to_vec());
        }
    }
}
