mod commit;
mod screen;
mod session;

pub use commit::{commit, CommitBranch, CommitOutcome, IdentityPolicy};
pub use screen::{ColorChoice, EditableField, EditorContext, FieldKind, HeaderAction, NoteScreen};
pub use session::{resolve, DraftPhase, EditSession};
