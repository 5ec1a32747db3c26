use std::sync::Arc;

use crate::editor::commit::{commit, CommitOutcome, IdentityPolicy};
use crate::editor::session::{DraftPhase, EditSession};
use crate::note::{Calendar, IdGenerator, NoteColor};
use crate::router::{Route, Router};
use crate::storage::{NoteStore, StoreResult};

/// Collaborators a note screen is wired to.
#[derive(Clone)]
pub struct EditorContext {
    pub store: Arc<dyn NoteStore>,
    pub ids: Arc<dyn IdGenerator>,
    pub calendar: Arc<dyn Calendar>,
    pub identity: IdentityPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Input,
    Textarea,
}

/// What the editable-field presenter is given: it switches between a
/// read-only rendering and an editor based on `is_editing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditableField<'a> {
    pub text: &'a str,
    pub kind: FieldKind,
    pub placeholder: &'a str,
    pub is_editing: bool,
}

impl<'a> EditableField<'a> {
    pub fn shows_placeholder(&self) -> bool {
        self.is_editing && self.text.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    Edit,
    Save,
}

impl HeaderAction {
    pub fn label(self) -> &'static str {
        match self {
            HeaderAction::Edit => "Edit",
            HeaderAction::Save => "Save",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorChoice {
    pub color: NoteColor,
    pub selected: bool,
}

pub struct NoteScreen {
    ctx: EditorContext,
    session: EditSession,
}

impl NoteScreen {
    pub fn open(ctx: EditorContext, route: &Route, is_editing: bool) -> StoreResult<Self> {
        let notes = ctx.store.get()?;
        let session = EditSession::open(&notes, route.note_id(), is_editing);
        tracing::debug!(%route, phase = ?session.phase(), "opened note screen");
        Ok(Self { ctx, session })
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditSession {
        &mut self.session
    }

    pub fn set_title<S: Into<String>>(&mut self, text: S) {
        self.session.set_title(text);
    }

    pub fn set_desc<S: Into<String>>(&mut self, text: S) {
        self.session.set_desc(text);
    }

    pub fn set_selected_color(&mut self, color: NoteColor) {
        self.session.set_selected_color(color);
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_editing()
    }

    /// Flips edit mode. Entering never touches the store; leaving always
    /// commits the current fields, exactly once.
    pub fn toggle_editing(&mut self, router: &mut dyn Router) -> StoreResult<Option<CommitOutcome>> {
        if !self.session.is_editing() {
            self.session.set_editing(true);
            return Ok(None);
        }

        let notes = self.ctx.store.get()?;
        let mut next = self.session.clone();
        let outcome = commit(
            &notes,
            &mut next,
            self.ctx.ids.as_ref(),
            self.ctx.calendar.as_ref(),
            self.ctx.identity,
        );
        self.ctx.store.replace(outcome.notes.clone())?;
        next.set_editing(false);
        self.session = next;
        if let Some(route) = &outcome.navigate_to {
            router.navigate(route.clone());
        }
        Ok(Some(outcome))
    }

    pub fn header_action(&self) -> HeaderAction {
        if self.session.is_editing() {
            HeaderAction::Save
        } else {
            HeaderAction::Edit
        }
    }

    pub fn title_field(&self) -> EditableField<'_> {
        EditableField {
            text: self.session.title(),
            kind: FieldKind::Input,
            placeholder: "Title",
            is_editing: self.session.is_editing(),
        }
    }

    pub fn desc_field(&self) -> EditableField<'_> {
        EditableField {
            text: self.session.desc(),
            kind: FieldKind::Textarea,
            placeholder: "Type something...",
            is_editing: self.session.is_editing(),
        }
    }

    /// Creation date of the committed note; `None` before the first save.
    pub fn date_label(&self) -> StoreResult<Option<String>> {
        let Some(id) = self.session.bound_id() else {
            return Ok(None);
        };
        Ok(self.ctx.store.find(id)?.map(|note| match note.last_modified {
            Some(modified) if modified != note.date => format!("{} · edited {modified}", note.date),
            _ => note.date,
        }))
    }

    /// Palette row; only offered while editing.
    pub fn color_choices(&self) -> Vec<ColorChoice> {
        if !self.session.is_editing() {
            return Vec::new();
        }
        let selected = self.session.selected_color();
        NoteColor::palette()
            .map(|color| ColorChoice {
                color,
                selected: color == selected,
            })
            .collect()
    }

    pub fn is_new(&self) -> bool {
        matches!(self.session.phase(), DraftPhase::New)
    }
}
