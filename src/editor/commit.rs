use serde::{Deserialize, Serialize};

use crate::editor::session::{DraftPhase, EditSession};
use crate::note::{Calendar, IdGenerator, Note, NoteId};
use crate::router::Route;

/// How a commit treats the identity of a note that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityPolicy {
    /// Ids survive edits; the note is updated where it sits.
    #[default]
    Stable,
    /// Every save removes the old copy and prepends a freshly minted one.
    Reissue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitBranch {
    /// A committed note was removed and re-inserted at the front under a new id.
    Replaced,
    /// A committed note was updated in place.
    Updated,
    /// First save of a new note.
    Created,
    /// A draft committed earlier from the same screen was re-minted.
    Recreated,
}

#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub notes: Vec<Note>,
    pub committed: NoteId,
    pub branch: CommitBranch,
    pub navigate_to: Option<Route>,
}

/// Merges the session into `notes` and returns the replacement collection.
///
/// The new note is fully built before the collection is copied, and `notes`
/// itself is never touched. On return the session phase points at the
/// committed note.
pub fn commit(
    notes: &[Note],
    session: &mut EditSession,
    ids: &dyn IdGenerator,
    calendar: &dyn Calendar,
    policy: IdentityPolicy,
) -> CommitOutcome {
    let today = calendar.today();
    let outcome = match (session.phase().clone(), policy) {
        (DraftPhase::Existing(id), IdentityPolicy::Reissue) => {
            let fresh = mint(session, ids.next_id(), today);
            let new_id = fresh.id.clone();
            let notes = prepend(fresh, notes.iter().filter(|note| note.id != id));
            session.set_phase(DraftPhase::Existing(new_id.clone()));
            CommitOutcome {
                notes,
                navigate_to: Some(Route::Note(new_id.clone())),
                committed: new_id,
                branch: CommitBranch::Replaced,
            }
        }
        (DraftPhase::ExistingUnsaved(previous), IdentityPolicy::Reissue) => {
            let fresh = mint(session, ids.next_id(), today);
            let new_id = fresh.id.clone();
            let notes = prepend(fresh, notes.iter().filter(|note| note.id != previous));
            session.set_phase(DraftPhase::ExistingUnsaved(new_id.clone()));
            CommitOutcome {
                notes,
                navigate_to: None,
                committed: new_id,
                branch: CommitBranch::Recreated,
            }
        }
        (DraftPhase::New, IdentityPolicy::Reissue) => {
            let fresh = mint(session, ids.next_id(), today);
            let new_id = fresh.id.clone();
            let notes = prepend(fresh, notes.iter());
            session.set_phase(DraftPhase::ExistingUnsaved(new_id.clone()));
            CommitOutcome {
                notes,
                navigate_to: None,
                committed: new_id,
                branch: CommitBranch::Created,
            }
        }
        (DraftPhase::New, IdentityPolicy::Stable) => {
            let fresh = mint(session, ids.next_id(), today);
            let new_id = fresh.id.clone();
            let notes = prepend(fresh, notes.iter());
            session.set_phase(DraftPhase::Existing(new_id.clone()));
            CommitOutcome {
                notes,
                navigate_to: Some(Route::Note(new_id.clone())),
                committed: new_id,
                branch: CommitBranch::Created,
            }
        }
        (DraftPhase::Existing(id) | DraftPhase::ExistingUnsaved(id), IdentityPolicy::Stable) => {
            let notes = update_in_place(notes, session, &id, today);
            session.set_phase(DraftPhase::Existing(id.clone()));
            CommitOutcome {
                notes,
                navigate_to: None,
                committed: id,
                branch: CommitBranch::Updated,
            }
        }
    };
    tracing::info!(
        note_id = %outcome.committed,
        branch = ?outcome.branch,
        notes = outcome.notes.len(),
        "committed note"
    );
    outcome
}

fn mint(session: &EditSession, id: NoteId, date: String) -> Note {
    Note {
        id,
        title: session.title().to_string(),
        desc: session.desc().to_string(),
        date,
        color: session.selected_color(),
        last_modified: None,
    }
}

fn prepend<'a>(first: Note, rest: impl Iterator<Item = &'a Note>) -> Vec<Note> {
    let mut notes = vec![first];
    notes.extend(rest.cloned());
    notes
}

fn update_in_place(notes: &[Note], session: &EditSession, id: &NoteId, today: String) -> Vec<Note> {
    let Some(position) = notes.iter().position(|note| &note.id == id) else {
        // The note vanished underneath the screen; bring it back under the same id.
        tracing::warn!(note_id = %id, "committed note missing from collection, re-inserting");
        return prepend(mint(session, id.clone(), today), notes.iter());
    };
    let mut updated = notes.to_vec();
    let note = &mut updated[position];
    note.title = session.title().to_string();
    note.desc = session.desc().to_string();
    note.color = session.selected_color();
    note.last_modified = Some(today);
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{FixedCalendar, NoteColor, SequentialIds};
    use assert_matches::assert_matches;

    fn note(id: &str, title: &str) -> Note {
        Note {
            id: NoteId::new(id),
            title: title.into(),
            desc: String::new(),
            date: "Jan 01, 2026".into(),
            color: NoteColor::Lime,
            last_modified: None,
        }
    }

    fn fixtures() -> (SequentialIds, FixedCalendar) {
        (SequentialIds::new("id-"), FixedCalendar("Oct 19, 2026".into()))
    }

    #[test]
    fn reissue_existing_replaces_with_new_id_and_navigates() {
        let (ids, calendar) = fixtures();
        let notes = vec![note("a", "Alpha"), note("b", "Beta"), note("c", "Gamma")];
        let mut session = EditSession::open(&notes, Some(&NoteId::new("b")), true);
        session.set_title("Beta v2");
        session.set_selected_color(NoteColor::Pink);

        let outcome = commit(&notes, &mut session, &ids, &calendar, IdentityPolicy::Reissue);

        assert_eq!(outcome.branch, CommitBranch::Replaced);
        assert_eq!(outcome.notes.len(), notes.len());
        let first = &outcome.notes[0];
        assert_ne!(first.id, NoteId::new("b"));
        assert_eq!(first.title, "Beta v2");
        assert_eq!(first.color, NoteColor::Pink);
        assert_eq!(first.date, "Oct 19, 2026");
        assert!(outcome.notes.iter().all(|n| n.id != NoteId::new("b")));
        assert_eq!(outcome.navigate_to, Some(Route::Note(first.id.clone())));
        // untouched notes keep their relative order
        assert_eq!(outcome.notes[1].id, NoteId::new("a"));
        assert_eq!(outcome.notes[2].id, NoteId::new("c"));
    }

    #[test]
    fn reissue_unchanged_saves_still_change_id() {
        let (ids, calendar) = fixtures();
        let notes = vec![note("a", "Alpha")];
        let mut session = EditSession::open(&notes, Some(&NoteId::new("a")), true);
        let first = commit(&notes, &mut session, &ids, &calendar, IdentityPolicy::Reissue);
        let second = commit(&first.notes, &mut session, &ids, &calendar, IdentityPolicy::Reissue);

        assert_eq!(second.branch, CommitBranch::Replaced);
        assert_ne!(first.committed, NoteId::new("a"));
        assert_ne!(second.committed, first.committed);
        assert_eq!(second.notes.len(), 1);
        assert_eq!(second.notes[0].title, "Alpha");
    }

    #[test]
    fn reissue_first_save_prepends_without_navigation() {
        let (ids, calendar) = fixtures();
        let notes = vec![note("a", "Alpha")];
        let mut session = EditSession::open(&notes, Some(&NoteId::new("new")), true);
        assert!(session.is_creating());

        let outcome = commit(&notes, &mut session, &ids, &calendar, IdentityPolicy::Reissue);

        assert_eq!(outcome.branch, CommitBranch::Created);
        assert_eq!(outcome.notes.len(), 2);
        assert_eq!(outcome.notes[0].id, outcome.committed);
        assert_eq!(outcome.navigate_to, None);
        assert!(!session.is_creating());
        assert_matches!(session.phase(), DraftPhase::ExistingUnsaved(id) if *id == outcome.committed);
    }

    #[test]
    fn reissue_second_save_replaces_draft_and_changes_id_each_time() {
        let (ids, calendar) = fixtures();
        let mut session = EditSession::open(&[], None, true);
        let first = commit(&[], &mut session, &ids, &calendar, IdentityPolicy::Reissue);
        let second = commit(&first.notes, &mut session, &ids, &calendar, IdentityPolicy::Reissue);
        let third = commit(&second.notes, &mut session, &ids, &calendar, IdentityPolicy::Reissue);

        assert_eq!(second.branch, CommitBranch::Recreated);
        assert_eq!(second.notes.len(), 1);
        assert_eq!(third.notes.len(), 1);
        assert_ne!(first.committed, second.committed);
        assert_ne!(second.committed, third.committed);
        assert_eq!(third.navigate_to, None);
    }

    #[test]
    fn reissue_redraft_targets_tracked_note_not_position() {
        let (ids, calendar) = fixtures();
        let mut session = EditSession::open(&[], None, true);
        let first = commit(&[], &mut session, &ids, &calendar, IdentityPolicy::Reissue);
        // another writer put a note in front of the draft
        let mut notes = vec![note("other", "Other")];
        notes.extend(first.notes.clone());

        let second = commit(&notes, &mut session, &ids, &calendar, IdentityPolicy::Reissue);
        assert_eq!(second.notes.len(), 2);
        assert!(second.notes.iter().any(|n| n.id == NoteId::new("other")));
        assert!(second.notes.iter().all(|n| n.id != first.committed));
    }

    #[test]
    fn stable_existing_updates_in_place() {
        let (ids, calendar) = fixtures();
        let notes = vec![note("a", "Alpha"), note("b", "Beta")];
        let mut session = EditSession::open(&notes, Some(&NoteId::new("b")), true);
        session.set_desc("more");

        let outcome = commit(&notes, &mut session, &ids, &calendar, IdentityPolicy::Stable);

        assert_eq!(outcome.branch, CommitBranch::Updated);
        assert_eq!(outcome.navigate_to, None);
        assert_eq!(outcome.notes[1].id, NoteId::new("b"));
        assert_eq!(outcome.notes[1].desc, "more");
        assert_eq!(outcome.notes[1].date, "Jan 01, 2026");
        assert_eq!(outcome.notes[1].last_modified.as_deref(), Some("Oct 19, 2026"));
        // input collection untouched
        assert_eq!(notes[1].desc, "");
    }

    #[test]
    fn stable_new_note_navigates_and_later_saves_keep_id() {
        let (ids, calendar) = fixtures();
        let mut session = EditSession::open(&[], Some(&NoteId::new("new")), true);
        session.set_title("Groceries");
        let first = commit(&[], &mut session, &ids, &calendar, IdentityPolicy::Stable);
        assert_eq!(first.branch, CommitBranch::Created);
        assert_eq!(first.navigate_to, Some(Route::Note(first.committed.clone())));

        session.set_desc("Milk");
        let second = commit(&first.notes, &mut session, &ids, &calendar, IdentityPolicy::Stable);
        assert_eq!(second.committed, first.committed);
        assert_eq!(second.notes.len(), 1);
        assert_eq!(second.notes[0].desc, "Milk");
    }

    #[test]
    fn stable_after_unsaved_draft_updates_tracked_note() {
        let (ids, calendar) = fixtures();
        let mut session = EditSession::open(&[], None, true);
        let first = commit(&[], &mut session, &ids, &calendar, IdentityPolicy::Reissue);
        assert_matches!(session.phase(), DraftPhase::ExistingUnsaved(_));

        session.set_title("Kept");
        let second = commit(&first.notes, &mut session, &ids, &calendar, IdentityPolicy::Stable);

        assert_eq!(second.branch, CommitBranch::Updated);
        assert_eq!(second.committed, first.committed);
        assert_eq!(second.notes.len(), 1);
        assert_eq!(second.notes[0].id, first.committed);
        assert_eq!(second.notes[0].title, "Kept");
        assert_matches!(session.phase(), DraftPhase::Existing(id) if *id == first.committed);
    }

    #[test]
    fn stable_reinserts_vanished_note_under_same_id() {
        let (ids, calendar) = fixtures();
        let notes = vec![note("a", "Alpha")];
        let mut session = EditSession::open(&notes, Some(&NoteId::new("a")), true);
        session.set_desc("still here");

        let outcome = commit(&[note("b", "Beta")], &mut session, &ids, &calendar, IdentityPolicy::Stable);

        assert_eq!(outcome.branch, CommitBranch::Updated);
        assert_eq!(outcome.committed, NoteId::new("a"));
        assert_eq!(outcome.notes.len(), 2);
        assert_eq!(outcome.notes[0].id, NoteId::new("a"));
        assert_eq!(outcome.notes[0].desc, "still here");
        assert_eq!(outcome.notes[1].id, NoteId::new("b"));
    }
}
