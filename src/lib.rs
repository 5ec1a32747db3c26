pub mod app;
pub mod cli;
pub mod config;
pub mod editor;
pub mod note;
pub mod router;
pub mod search;
pub mod storage;
pub mod ui;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
pub use editor::{EditSession, IdentityPolicy, NoteScreen};
pub use note::{Note, NoteColor, NoteId};
pub use storage::{MemoryStore, NoteStore};
