use crate::note::{Note, NoteColor, NoteId};

/// Lifecycle of the note being edited on one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftPhase {
    /// Nothing matched the address and nothing has been committed yet.
    New,
    /// A draft was committed from this screen but the address was not
    /// updated; the id tracks the committed copy.
    ExistingUnsaved(NoteId),
    /// The address resolved to a committed note.
    Existing(NoteId),
}

/// All notes whose id equals `id`, in collection order.
pub fn resolve<'a>(notes: &'a [Note], id: &NoteId) -> Vec<&'a Note> {
    notes.iter().filter(|note| &note.id == id).collect()
}

/// Uncommitted field state for a single note plus the screen mode.
#[derive(Debug, Clone)]
pub struct EditSession {
    title: String,
    desc: String,
    selected_color: NoteColor,
    is_editing: bool,
    phase: DraftPhase,
}

impl EditSession {
    /// Builds the session for `id`. The first match wins when the collection
    /// holds duplicates; a miss starts a new draft with default fields.
    pub fn open(notes: &[Note], id: Option<&NoteId>, is_editing: bool) -> Self {
        let matched = id.and_then(|id| resolve(notes, id).into_iter().next());
        match matched {
            Some(note) => Self {
                title: note.title.clone(),
                desc: note.desc.clone(),
                selected_color: note.color,
                is_editing,
                phase: DraftPhase::Existing(note.id.clone()),
            },
            None => Self {
                title: String::new(),
                desc: String::new(),
                selected_color: NoteColor::default(),
                is_editing,
                phase: DraftPhase::New,
            },
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn selected_color(&self) -> NoteColor {
        self.selected_color
    }

    pub fn set_title<S: Into<String>>(&mut self, text: S) {
        self.title = text.into();
    }

    pub fn set_desc<S: Into<String>>(&mut self, text: S) {
        self.desc = text.into();
    }

    pub fn set_selected_color(&mut self, color: NoteColor) {
        self.selected_color = color;
    }

    pub fn title_mut(&mut self) -> &mut String {
        &mut self.title
    }

    pub fn desc_mut(&mut self) -> &mut String {
        &mut self.desc
    }

    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    pub(crate) fn set_editing(&mut self, editing: bool) {
        self.is_editing = editing;
    }

    pub fn phase(&self) -> &DraftPhase {
        &self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: DraftPhase) {
        self.phase = phase;
    }

    /// True until the first commit of a brand-new note.
    pub fn is_creating(&self) -> bool {
        matches!(self.phase, DraftPhase::New)
    }

    /// Id of the committed note this session is bound to, if any.
    pub fn bound_id(&self) -> Option<&NoteId> {
        match &self.phase {
            DraftPhase::New => None,
            DraftPhase::ExistingUnsaved(id) | DraftPhase::Existing(id) => Some(id),
        }
    }
}
