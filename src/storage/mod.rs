use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use parking_lot::RwLock;
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use thiserror::Error;

use crate::config::{ConfigPaths, StorageOptions};
use crate::note::{Calendar, IdGenerator, Note, NoteColor, NoteId};

mod schema;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate note id '{0}' in collection")]
    DuplicateId(NoteId),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("opening database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Owner of the notes collection. Readers get a snapshot; writers hand back
/// a complete replacement.
pub trait NoteStore: Send + Sync {
    fn get(&self) -> StoreResult<Vec<Note>>;

    /// Swaps the whole collection. Collections with repeated ids are rejected.
    fn replace(&self, notes: Vec<Note>) -> StoreResult<()>;

    fn find(&self, id: &NoteId) -> StoreResult<Option<Note>> {
        Ok(self.get()?.into_iter().find(|note| &note.id == id))
    }

    fn remove(&self, id: &NoteId) -> StoreResult<bool> {
        let notes = self.get()?;
        let before = notes.len();
        let kept: Vec<Note> = notes.into_iter().filter(|note| &note.id != id).collect();
        if kept.len() == before {
            return Ok(false);
        }
        self.replace(kept)?;
        Ok(true)
    }
}

pub fn ensure_unique(notes: &[Note]) -> StoreResult<()> {
    let mut seen = HashSet::with_capacity(notes.len());
    for note in notes {
        if !seen.insert(&note.id) {
            return Err(StoreError::DuplicateId(note.id.clone()));
        }
    }
    Ok(())
}

/// Drops later notes that repeat an earlier id, keeping collection order.
pub fn dedupe(notes: Vec<Note>) -> Vec<Note> {
    let mut by_id: IndexMap<NoteId, Note> = IndexMap::with_capacity(notes.len());
    for note in notes {
        if by_id.contains_key(&note.id) {
            tracing::warn!(note_id = %note.id, "dropping note with duplicate id");
            continue;
        }
        by_id.insert(note.id.clone(), note);
    }
    by_id.into_values().collect()
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: RwLock<Vec<Note>>,
}

impl MemoryStore {
    pub fn new(notes: Vec<Note>) -> Self {
        Self {
            notes: RwLock::new(dedupe(notes)),
        }
    }
}

impl NoteStore for MemoryStore {
    fn get(&self) -> StoreResult<Vec<Note>> {
        Ok(self.notes.read().clone())
    }

    fn replace(&self, notes: Vec<Note>) -> StoreResult<()> {
        ensure_unique(&notes)?;
        *self.notes.write() = notes;
        Ok(())
    }
}

#[derive(Clone)]
pub struct StorageHandle {
    db_path: Arc<PathBuf>,
    options: Arc<StorageOptions>,
}

impl StorageHandle {
    pub fn connect(&self) -> StoreResult<Connection> {
        let conn = Connection::open(&*self.db_path).map_err(|source| StoreError::Open {
            path: self.db_path.to_path_buf(),
            source,
        })?;
        prepare_connection(&conn, &self.options)?;
        Ok(conn)
    }

    pub fn with_connection<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self.connect()?;
        f(&conn)
    }

    pub fn count(&self) -> StoreResult<usize> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }
}

impl NoteStore for StorageHandle {
    fn get(&self) -> StoreResult<Vec<Note>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, date, color, last_modified
                 FROM notes
                 ORDER BY position ASC",
            )?;
            let notes = stmt
                .query_map([], |row| {
                    let color: String = row.get(4)?;
                    let color = color.parse::<NoteColor>().map_err(|err| {
                        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(err))
                    })?;
                    Ok(Note {
                        id: NoteId::new(row.get::<_, String>(0)?),
                        title: row.get(1)?,
                        desc: row.get(2)?,
                        date: row.get(3)?,
                        color,
                        last_modified: row.get(5)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(dedupe(notes))
        })
    }

    fn replace(&self, notes: Vec<Note>) -> StoreResult<()> {
        ensure_unique(&notes)?;
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM notes", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO notes (id, position, title, description, date, color, last_modified)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, note) in notes.iter().enumerate() {
                insert.execute(params![
                    note.id.as_str(),
                    position as i64,
                    note.title,
                    note.desc,
                    note.date,
                    note.color.hex(),
                    note.last_modified,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(notes = notes.len(), "replaced notes collection");
        Ok(())
    }
}

pub fn init(
    paths: &ConfigPaths,
    storage: &StorageOptions,
    ids: &dyn IdGenerator,
    calendar: &dyn Calendar,
) -> Result<StorageHandle> {
    let db_path = if storage.database_path.as_os_str().is_empty() {
        &paths.database_path
    } else {
        &storage.database_path
    };
    let existed = db_path.exists();
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    let conn = Connection::open(db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    prepare_connection(&conn, storage)?;
    schema::apply(&conn)?;
    let handle = StorageHandle {
        db_path: Arc::new(db_path.clone()),
        options: Arc::new(storage.clone()),
    };
    if !existed {
        seed_initial_notes(&handle, ids, calendar)?;
    }
    Ok(handle)
}

fn prepare_connection(conn: &Connection, storage: &StorageOptions) -> StoreResult<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(
        None,
        "wal_autocheckpoint",
        storage.wal_autocheckpoint.to_string(),
    )?;
    Ok(())
}

fn seed_initial_notes(
    handle: &StorageHandle,
    ids: &dyn IdGenerator,
    calendar: &dyn Calendar,
) -> Result<()> {
    if handle.count().context("checking for existing notes")? > 0 {
        return Ok(());
    }

    tracing::info!("seeding first-run notes");
    let today = calendar.today();
    let notes = vec![Note {
        id: ids.next_id(),
        title: "Welcome to Color Notes".into(),
        desc: "Press `e` to edit this note and `Ctrl-S` to save it.\n\
               Pick an accent with the arrow keys while editing.\n"
            .into(),
        date: today,
        color: NoteColor::default(),
        last_modified: None,
    }];
    handle.replace(notes).context("inserting seed note")?;
    Ok(())
}
