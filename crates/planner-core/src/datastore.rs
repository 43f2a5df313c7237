#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::Write;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

use serde_json::Value;
#[cfg(feature = "cli")]
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::task::{Task, TaskDraft, TaskId, TaskPatch};

pub const SNAPSHOT_KEY: &str = "month-planner-tasks-v1";

const REQUIRED_FIELDS: [&str; 4] = ["id", "name", "start", "end"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("failed to write snapshot: {0}")]
    Write(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A single keyed blob holding the serialized task collection.
pub trait SnapshotStorage {
    fn read(&self) -> StorageResult<Option<String>>;

    fn write(&mut self, blob: &str) -> StorageResult<()>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStorage {
    blob: Option<String>,
    reject_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
            reject_writes: false,
        }
    }

    /// Every write fails while the previous blob stays in place.
    pub fn rejecting_writes(mut self) -> Self {
        self.reject_writes = true;
        self
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self) -> StorageResult<Option<String>> {
        Ok(self.blob.clone())
    }

    fn write(&mut self, blob: &str) -> StorageResult<()> {
        if self.reject_writes {
            return Err(StorageError::Write("memory storage is read-only".to_string()));
        }
        self.blob = Some(blob.to_string());
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct FileStorage {
    pub path: PathBuf,
}

#[cfg(feature = "cli")]
impl FileStorage {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(format!("{SNAPSHOT_KEY}.json"));
        info!(snapshot = %path.display(), "opened snapshot file");
        Ok(Self { path })
    }
}

#[cfg(feature = "cli")]
impl SnapshotStorage for FileStorage {
    #[tracing::instrument(skip(self))]
    fn read(&self) -> StorageResult<Option<String>> {
        if !self.path.exists() {
            debug!(file = %self.path.display(), "no snapshot yet");
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    #[tracing::instrument(skip(self, blob))]
    fn write(&mut self, blob: &str) -> StorageResult<()> {
        debug!(file = %self.path.display(), bytes = blob.len(), "saving snapshot atomically");

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(blob.as_bytes())?;
        temp.flush()?;

        temp.persist(&self.path)
            .map_err(|err| StorageError::Write(format!("{}: {}", self.path.display(), err)))?;
        Ok(())
    }
}

/// Reads a snapshot leniently: anything unreadable yields no tasks, and
/// individual corrupt records are skipped.
#[tracing::instrument(skip(raw))]
pub fn decode_snapshot(raw: &str) -> Vec<Task> {
    let records = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(records)) => records,
        Ok(other) => {
            warn!(kind = %json_kind(&other), "snapshot is not an array; starting empty");
            return Vec::new();
        }
        Err(err) => {
            warn!(error = %err, "snapshot is not valid json; starting empty");
            return Vec::new();
        }
    };

    let total = records.len();
    let tasks: Vec<Task> = records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, record)| decode_record(idx, record))
        .collect();

    debug!(total, kept = tasks.len(), "decoded snapshot");
    tasks
}

fn decode_record(idx: usize, record: Value) -> Option<Task> {
    let Some(fields) = record.as_object() else {
        warn!(index = idx, "dropping snapshot record that is not an object");
        return None;
    };

    if let Some(missing) = REQUIRED_FIELDS
        .iter()
        .find(|field| fields.get(**field).is_none_or(Value::is_null))
    {
        warn!(index = idx, field = %missing, "dropping snapshot record with missing field");
        return None;
    }

    match serde_json::from_value::<Task>(record) {
        Ok(task) => Some(task),
        Err(err) => {
            warn!(index = idx, error = %err, "dropping undecodable snapshot record");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn encode_snapshot(tasks: &[Task]) -> StorageResult<String> {
    Ok(serde_json::to_string(tasks)?)
}

#[derive(Debug)]
pub struct TaskStore<S> {
    tasks: Vec<Task>,
    storage: S,
    persist_error: Option<StorageError>,
}

impl<S: SnapshotStorage> TaskStore<S> {
    /// Loads the persisted snapshot; never fails.
    #[tracing::instrument(skip(storage))]
    pub fn open(storage: S) -> Self {
        let tasks = match storage.read() {
            Ok(Some(raw)) => decode_snapshot(&raw),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "failed reading snapshot; starting empty");
                Vec::new()
            }
        };

        info!(count = tasks.len(), "opened task store");
        Self {
            tasks,
            storage,
            persist_error: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Finds the single task whose id starts with `prefix`.
    pub fn resolve(&self, prefix: &str) -> Option<&Task> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return None;
        }
        if let Some(exact) = self.tasks.iter().find(|task| task.id.as_str() == prefix) {
            return Some(exact);
        }

        let mut matches = self
            .tasks
            .iter()
            .filter(|task| task.id.as_str().starts_with(prefix));
        let first = matches.next()?;
        matches.next().is_none().then_some(first)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    pub fn add(&mut self, draft: TaskDraft) -> TaskId {
        let id = TaskId::generate();
        self.tasks.push(Task::from_draft(id.clone(), draft));
        debug!(id = %id, "added task");
        self.persist();
        id
    }

    #[tracing::instrument(skip(self, patch), fields(id = %id))]
    pub fn update(&mut self, id: &TaskId, patch: TaskPatch) -> bool {
        let found = match self.tasks.iter_mut().find(|task| &task.id == id) {
            Some(task) => {
                task.apply(patch);
                true
            }
            None => {
                debug!("update ignored; no such task");
                false
            }
        };
        if found {
            self.persist();
        }
        found
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn remove(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| &task.id != id);
        let removed = self.tasks.len() != before;
        debug!(removed, "remove task");
        if removed {
            self.persist();
        }
        removed
    }

    /// The most recent failed write, if it has not been taken yet.
    pub fn take_persist_error(&mut self) -> Option<StorageError> {
        self.persist_error.take()
    }

    fn persist(&mut self) {
        if let Err(err) = self.write_snapshot() {
            warn!(error = %err, "failed to persist tasks; keeping in-memory state");
            self.persist_error = Some(err);
        }
    }

    fn write_snapshot(&mut self) -> StorageResult<()> {
        let blob = encode_snapshot(&self.tasks)?;
        self.storage.write(&blob)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::task::Category;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn draft(name: &str) -> TaskDraft {
        TaskDraft {
            name: name.to_string(),
            category: Category::Todo,
            start: date(2024, 1, 10),
            end: date(2024, 1, 12),
            video_url: None,
        }
    }

    #[test]
    fn load_drops_records_missing_required_fields() {
        let raw = r#"[
            {"id":"1","name":"","start":"2024-01-01","end":"2024-01-02"},
            {"id":"2","start":"2024-01-01","end":"2024-01-02"},
            {"name":"no id","start":"2024-01-01","end":"2024-01-02"},
            {"id":"4","name":"bad date","start":"soon","end":"2024-01-02"},
            {"id":"5","name":"bad category","category":"blocked","start":"2024-01-01","end":"2024-01-02"},
            {"id":"6","name":"ok","category":"review","start":"2024-01-01","end":"2024-01-02","videoUrl":"https://vimeo.com/1"},
            42
        ]"#;

        let store = TaskStore::open(MemoryStorage::with_blob(raw));
        let ids: Vec<&str> = store.tasks().iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "6"]);
        assert_eq!(store.tasks()[0].name, "");
        assert_eq!(store.tasks()[0].category, Category::Todo);
        assert_eq!(store.tasks()[1].video_url.as_deref(), Some("https://vimeo.com/1"));
    }

    #[test]
    fn malformed_or_missing_snapshot_is_empty() {
        assert!(TaskStore::open(MemoryStorage::new()).is_empty());
        assert!(TaskStore::open(MemoryStorage::with_blob("{not json")).is_empty());
        assert!(TaskStore::open(MemoryStorage::with_blob(r#"{"id":"1"}"#)).is_empty());
    }

    #[test]
    fn every_mutation_writes_the_snapshot() {
        let mut store = TaskStore::open(MemoryStorage::new());
        let id = store.add(draft("Plan"));

        let reloaded = TaskStore::open(store.storage().clone());
        assert_eq!(reloaded.tasks(), store.tasks());

        assert!(store.update(
            &id,
            TaskPatch {
                name: Some("Plan sprint".to_string()),
                ..TaskPatch::default()
            }
        ));
        let reloaded = TaskStore::open(store.storage().clone());
        assert_eq!(reloaded.tasks()[0].name, "Plan sprint");

        assert!(store.remove(&id));
        let reloaded = TaskStore::open(store.storage().clone());
        assert!(reloaded.is_empty());
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut store = TaskStore::open(MemoryStorage::new());
        store.add(draft("Keep"));
        let missing = TaskId::from("missing");

        assert!(!store.update(&missing, TaskPatch::default()));
        assert!(!store.remove(&missing));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_ids_leave_storage_untouched() {
        let mut store = TaskStore::open(MemoryStorage::new().rejecting_writes());
        let missing = TaskId::from("nope");

        assert!(!store.update(&missing, TaskPatch::default()));
        assert!(!store.remove(&missing));
        assert!(store.take_persist_error().is_none());

        let mut store = TaskStore::open(MemoryStorage::new());
        assert!(!store.remove(&missing));
        assert_eq!(store.storage().blob(), None);
    }

    #[test]
    fn write_failures_keep_memory_authoritative() {
        let mut store = TaskStore::open(MemoryStorage::new().rejecting_writes());
        let id = store.add(draft("Offline"));

        assert_eq!(store.get(&id).map(|task| task.name.as_str()), Some("Offline"));
        assert!(matches!(store.take_persist_error(), Some(StorageError::Write(_))));
        assert!(store.take_persist_error().is_none());
        assert_eq!(store.storage().blob(), None);
    }

    #[test]
    fn ids_resolve_by_unique_prefix() {
        let raw = r#"[
            {"id":"abc1","name":"a","start":"2024-01-01","end":"2024-01-01"},
            {"id":"abc2","name":"b","start":"2024-01-01","end":"2024-01-01"},
            {"id":"xyz","name":"c","start":"2024-01-01","end":"2024-01-01"}
        ]"#;
        let store = TaskStore::open(MemoryStorage::with_blob(raw));

        assert_eq!(store.resolve("x").map(|task| task.name.as_str()), Some("c"));
        assert_eq!(store.resolve("abc2").map(|task| task.name.as_str()), Some("b"));
        assert!(store.resolve("abc").is_none());
        assert!(store.resolve("").is_none());
    }
}
