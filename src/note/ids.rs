use std::sync::atomic::{AtomicU64, Ordering};

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use uuid::Uuid;

use super::NoteId;

/// `Oct 19, 2026`
const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short] [day], [year]");

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> NoteId;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> NoteId {
        NoteId::new(Uuid::new_v4().simple().to_string())
    }
}

/// Deterministic `<prefix>1`, `<prefix>2`, ... identifiers.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> NoteId {
        let next = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        NoteId::new(format!("{}{next}", self.prefix))
    }
}

pub trait Calendar: Send + Sync {
    /// Today's date in the fixed note format.
    fn today(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCalendar;

impl Calendar for SystemCalendar {
    fn today(&self) -> String {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        format_note_date(now)
    }
}

#[derive(Debug, Clone)]
pub struct FixedCalendar(pub String);

impl Calendar for FixedCalendar {
    fn today(&self) -> String {
        self.0.clone()
    }
}

pub fn format_note_date(at: OffsetDateTime) -> String {
    at.format(DATE_FORMAT)
        .unwrap_or_else(|_| at.date().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn formats_short_month_padded_day() {
        assert_eq!(format_note_date(datetime!(2026-03-07 10:00 UTC)), "Mar 07, 2026");
        assert_eq!(format_note_date(datetime!(2026-10-19 23:59 UTC)), "Oct 19, 2026");
    }

    #[test]
    fn uuid_ids_are_unique() {
        let ids = UuidGenerator;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::new("n");
        assert_eq!(ids.next_id().as_str(), "n1");
        assert_eq!(ids.next_id().as_str(), "n2");
    }
}
