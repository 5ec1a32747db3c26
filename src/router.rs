use std::fmt;

use crate::note::NoteId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Note(NoteId),
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim().trim_matches('/');
        if trimmed.is_empty() {
            Route::Home
        } else {
            Route::Note(NoteId::new(trimmed))
        }
    }

    pub fn note<I: Into<NoteId>>(id: I) -> Route {
        Route::Note(id.into())
    }

    pub fn note_id(&self) -> Option<&NoteId> {
        match self {
            Route::Home => None,
            Route::Note(id) => Some(id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::Note(id) => write!(f, "/{id}"),
        }
    }
}

/// Navigable address the note screen reads its id from and pushes to.
pub trait Router {
    fn current(&self) -> &Route;
    fn navigate(&mut self, route: Route);
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Route>,
}

impl History {
    pub fn new(start: Route) -> Self {
        Self {
            entries: vec![start],
        }
    }

    /// Pops one entry. The root entry is never popped.
    pub fn back(&mut self) -> Option<Route> {
        if self.entries.len() > 1 {
            self.entries.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

impl Router for History {
    fn current(&self) -> &Route {
        // `entries` always holds the root.
        &self.entries[self.entries.len() - 1]
    }

    fn navigate(&mut self, route: Route) {
        tracing::debug!(%route, "navigating");
        self.entries.push(route);
    }
}
