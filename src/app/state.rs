use anyhow::Result;
use unicode_segmentation::UnicodeSegmentation;

use crate::editor::{EditorContext, NoteScreen};
use crate::note::{Note, NoteId};
use crate::router::{History, Route, Router};
use crate::search::SearchQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteFocus {
    Title,
    Desc,
    Color,
}

impl NoteFocus {
    fn next(self) -> Self {
        match self {
            NoteFocus::Title => NoteFocus::Desc,
            NoteFocus::Desc => NoteFocus::Color,
            NoteFocus::Color => NoteFocus::Title,
        }
    }
}

pub struct NoteView {
    pub screen: NoteScreen,
    pub focus: NoteFocus,
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub active: bool,
    pub input: String,
    pub query: SearchQuery,
}

pub struct AppState {
    ctx: EditorContext,
    pub history: History,
    pub notes: Vec<Note>,
    pub selected: usize,
    pub preview_lines: usize,
    pub list_limit: usize,
    pub search: SearchState,
    /// Edit mode lives with the shell and is handed to each note screen.
    pub is_editing: bool,
    pub note: Option<NoteView>,
    pub pending_delete: Option<NoteId>,
    pub status_message: Option<String>,
}

impl AppState {
    pub fn load(ctx: EditorContext, preview_lines: usize, list_limit: usize) -> Result<Self> {
        let notes = ctx.store.get()?;
        Ok(Self {
            ctx,
            history: History::default(),
            notes,
            selected: 0,
            preview_lines,
            list_limit,
            search: SearchState::default(),
            is_editing: false,
            note: None,
            pending_delete: None,
            status_message: None,
        })
    }

    pub fn refresh(&mut self) -> Result<()> {
        self.notes = self.ctx.store.get()?;
        let visible = self.visible_notes().len();
        if visible == 0 {
            self.selected = 0;
        } else if self.selected >= visible {
            self.selected = visible - 1;
        }
        Ok(())
    }

    pub fn visible_notes(&self) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|note| self.search.query.matches(note))
            .take(self.list_limit)
            .collect()
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.visible_notes().get(self.selected).copied()
    }

    pub fn is_note_open(&self) -> bool {
        self.note.is_some()
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.visible_notes().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + delta).clamp(0, len as isize - 1);
        self.selected = next as usize;
    }

    pub fn open_selected(&mut self) -> Result<()> {
        let Some(id) = self.selected_note().map(|note| note.id.clone()) else {
            return Ok(());
        };
        self.open_route(Route::Note(id))
    }

    /// Opens an empty screen at `/new`; nothing is stored until the first save.
    pub fn new_note(&mut self) -> Result<()> {
        self.is_editing = true;
        self.open_route(Route::note("new"))
    }

    fn open_route(&mut self, route: Route) -> Result<()> {
        self.history.navigate(route);
        let screen = NoteScreen::open(self.ctx.clone(), self.history.current(), self.is_editing)?;
        self.note = Some(NoteView {
            screen,
            focus: NoteFocus::Title,
        });
        Ok(())
    }

    /// Leaves the note screen. Uncommitted field values are dropped.
    pub fn go_home(&mut self) -> Result<()> {
        while self.history.back().is_some() {}
        self.note = None;
        self.is_editing = false;
        self.refresh()
    }

    pub fn toggle_editing(&mut self) -> Result<()> {
        let Some(view) = self.note.as_mut() else {
            return Ok(());
        };
        let outcome = view.screen.toggle_editing(&mut self.history)?;
        self.is_editing = view.screen.is_editing();
        if let Some(outcome) = outcome {
            self.status_message = Some(format!("Saved note {}", outcome.committed));
            self.refresh()?;
        }
        Ok(())
    }

    pub fn cycle_focus(&mut self) {
        if let Some(view) = self.note.as_mut() {
            view.focus = view.focus.next();
        }
    }

    pub fn type_char(&mut self, ch: char) {
        let Some(view) = self.editing_view() else {
            return;
        };
        let session = view.screen.session_mut();
        match view.focus {
            NoteFocus::Title if ch != '\n' => session.title_mut().push(ch),
            NoteFocus::Desc => session.desc_mut().push(ch),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        let Some(view) = self.editing_view() else {
            return;
        };
        let session = view.screen.session_mut();
        let buffer = match view.focus {
            NoteFocus::Title => session.title_mut(),
            NoteFocus::Desc => session.desc_mut(),
            NoteFocus::Color => return,
        };
        pop_grapheme(buffer);
    }

    pub fn step_color(&mut self, delta: isize) {
        let Some(view) = self.editing_view() else {
            return;
        };
        let next = view.screen.session().selected_color().step(delta);
        view.screen.set_selected_color(next);
    }

    fn editing_view(&mut self) -> Option<&mut NoteView> {
        self.note
            .as_mut()
            .filter(|view| view.screen.is_editing())
    }

    pub fn begin_search(&mut self) {
        self.search.active = true;
    }

    pub fn push_search_char(&mut self, ch: char) -> Result<()> {
        self.search.input.push(ch);
        self.apply_search()
    }

    pub fn pop_search_char(&mut self) -> Result<()> {
        pop_grapheme(&mut self.search.input);
        self.apply_search()
    }

    pub fn finish_search(&mut self) {
        self.search.active = false;
    }

    pub fn cancel_search(&mut self) -> Result<()> {
        self.search = SearchState::default();
        self.refresh()
    }

    fn apply_search(&mut self) -> Result<()> {
        self.search.query = SearchQuery::parse(&self.search.input);
        self.selected = 0;
        self.refresh()
    }

    pub fn request_delete(&mut self) {
        self.pending_delete = self.selected_note().map(|note| note.id.clone());
    }

    pub fn confirm_delete(&mut self) -> Result<()> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(());
        };
        if self.ctx.store.remove(&id)? {
            tracing::info!(note_id = %id, "deleted note");
            self.status_message = Some("Note deleted".into());
        }
        self.refresh()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn set_status_message<S: Into<String>>(&mut self, message: Option<S>) {
        self.status_message = message.map(Into::into);
    }
}

fn pop_grapheme(buffer: &mut String) {
    if let Some((idx, _)) = buffer.grapheme_indices(true).next_back() {
        buffer.truncate(idx);
    }
}
