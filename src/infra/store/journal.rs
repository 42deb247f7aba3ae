//! File-backed store: an append-only JSON-lines journal of [`StoreChange`]s.
//!
//! The journal is replayed into memory on open. Every write is appended and
//! synced on the blocking pool before it becomes visible. There is no
//! transaction isolation: `begin` hands out a pass-through handle, so the
//! schedule service guards check-then-commit with scope locks instead.

use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::entry::{EntryFields, EntryFilter, EntryId, TimetableEntry, UserId};
use crate::core::store::{Isolation, ScopeReader, StoreError, StoreTransaction, TimetableStore};
use crate::infra::store::{StoreChange, StoreState};
use crate::util::clock::now;

struct Journal {
    path: PathBuf,
    state: Mutex<StoreState>,
    /// Held from planning a change until it is applied, so ids and file
    /// order follow one writer at a time.
    writer: tokio::sync::Mutex<()>,
}

fn append_line(path: &Path, line: &str) -> Result<(), StoreError> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    file.sync_data()?;
    Ok(())
}

impl Journal {
    /// Replay `path`. An unterminated last line is a write that never
    /// returned, so it is cut off instead of failing the open.
    fn load(path: &Path) -> Result<StoreState, StoreError> {
        let mut state = StoreState::default();
        if !path.exists() {
            return Ok(state);
        }
        let mut reader = BufReader::new(File::open(path)?);
        let mut line = String::new();
        let mut intact: u64 = 0;
        loop {
            line.clear();
            let read = reader.read_line(&mut line)?;
            if read == 0 {
                break;
            }
            if !line.ends_with('\n') {
                tracing::warn!(
                    path = %path.display(),
                    offset = intact,
                    dropped = read,
                    "truncating torn journal tail"
                );
                OpenOptions::new().write(true).open(path)?.set_len(intact)?;
                break;
            }
            if !line.trim().is_empty() {
                let change: StoreChange = serde_json::from_str(&line)?;
                state.apply(change);
            }
            intact += read as u64;
        }
        Ok(state)
    }

    async fn append(&self, change: &StoreChange) -> Result<(), StoreError> {
        let path = self.path.clone();
        let line = serde_json::to_string(change)?;
        tokio::task::spawn_blocking(move || append_line(&path, &line))
            .await
            .map_err(|err| StoreError::Backend(format!("journal writer: {err}")))?
    }

    /// Persist `change`, then apply it to the in-memory table.
    async fn write(&self, change: StoreChange) -> Result<u64, StoreError> {
        self.append(&change).await?;
        Ok(self.state.lock().apply(change))
    }
}

/// Journal-backed timetable store.
#[derive(Clone)]
pub struct JournalStore {
    journal: Arc<Journal>,
}

impl JournalStore {
    /// Open (or create) the journal `<name>.jsonl` inside `dir`.
    pub fn open(dir: impl AsRef<Path>, name: &str) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        create_dir_all(dir)?;
        let path = dir.join(format!("{name}.jsonl"));
        let state = Journal::load(&path)?;
        tracing::info!(path = %path.display(), entries = state.len(), "journal store opened");
        Ok(Self {
            journal: Arc::new(Journal {
                path,
                state: Mutex::new(state),
                writer: tokio::sync::Mutex::new(()),
            }),
        })
    }

    /// Location of the journal file.
    pub fn path(&self) -> &Path {
        &self.journal.path
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.journal.state.lock().len()
    }

    /// True when the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pass-through handle; writes are durable as soon as they return.
pub struct JournalTransaction {
    journal: Arc<Journal>,
}

#[async_trait]
impl ScopeReader for JournalTransaction {
    async fn fetch_by_class(
        &mut self,
        class_id: &str,
        exclude: Option<EntryId>,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        Ok(self.journal.state.lock().by_class(class_id, exclude))
    }

    async fn fetch_by_room(
        &mut self,
        room: &str,
        exclude: Option<EntryId>,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        Ok(self.journal.state.lock().by_room(room, exclude))
    }
}

#[async_trait]
impl StoreTransaction for JournalTransaction {
    async fn get(&mut self, id: EntryId) -> Result<Option<TimetableEntry>, StoreError> {
        Ok(self.journal.state.lock().get(id))
    }

    async fn insert(&mut self, owner_id: UserId, fields: EntryFields) -> Result<EntryId, StoreError> {
        let _writer = self.journal.writer.lock().await;
        let entry = self.journal.state.lock().plan_insert(owner_id, fields, now());
        let id = entry.id;
        self.journal.write(StoreChange::Insert { entry }).await?;
        Ok(id)
    }

    async fn update(&mut self, id: EntryId, fields: EntryFields) -> Result<u64, StoreError> {
        let _writer = self.journal.writer.lock().await;
        let planned = self.journal.state.lock().plan_update(id, fields, now());
        match planned {
            Some(entry) => self.journal.write(StoreChange::Update { entry }).await,
            None => Ok(0),
        }
    }

    async fn delete(&mut self, id: EntryId) -> Result<u64, StoreError> {
        let _writer = self.journal.writer.lock().await;
        let exists = self.journal.state.lock().get(id).is_some();
        if !exists {
            return Ok(0);
        }
        self.journal.write(StoreChange::Delete { id }).await
    }

    async fn commit(self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl TimetableStore for JournalStore {
    type Tx = JournalTransaction;

    fn isolation(&self) -> Isolation {
        Isolation::None
    }

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        Ok(JournalTransaction {
            journal: Arc::clone(&self.journal),
        })
    }

    async fn list(&self, filter: &EntryFilter) -> Result<Vec<TimetableEntry>, StoreError> {
        Ok(self.journal.state.lock().list(filter))
    }
}
