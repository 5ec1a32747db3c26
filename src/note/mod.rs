use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};
use thiserror::Error;

pub mod ids;

pub use ids::{Calendar, FixedCalendar, IdGenerator, SequentialIds, SystemCalendar, UuidGenerator};

/// Opaque note identifier. Immutable once minted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for NoteId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// The fixed accent palette. Declaration order is display order; the first
/// entry is the default for new notes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(into = "String", try_from = "String")]
#[strum(serialize_all = "kebab-case")]
pub enum NoteColor {
    #[default]
    Salmon,
    Apricot,
    Lime,
    Sky,
    Lilac,
    Pink,
}

impl NoteColor {
    pub fn palette() -> impl Iterator<Item = NoteColor> {
        NoteColor::iter()
    }

    pub fn hex(self) -> &'static str {
        match self {
            NoteColor::Salmon => "#ffab91",
            NoteColor::Apricot => "#ffcc80",
            NoteColor::Lime => "#e8ed9b",
            NoteColor::Sky => "#82deeb",
            NoteColor::Lilac => "#d094da",
            NoteColor::Pink => "#f48fb1",
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        let hex = &self.hex()[1..];
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).unwrap_or_default()
        };
        (channel(0..2), channel(2..4), channel(4..6))
    }

    /// Cyclic step through the palette, used by the color row.
    pub fn step(self, delta: isize) -> NoteColor {
        let all: Vec<NoteColor> = NoteColor::iter().collect();
        let len = all.len() as isize;
        let idx = all.iter().position(|c| *c == self).unwrap_or(0) as isize;
        all[(idx + delta).rem_euclid(len) as usize]
    }
}

impl fmt::Display for NoteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown note color '{0}' (expected a palette name or hex value)")]
pub struct ParseColorError(pub String);

impl FromStr for NoteColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        NoteColor::iter()
            .find(|color| color.hex() == needle || color.name() == needle)
            .ok_or_else(|| ParseColorError(s.to_string()))
    }
}

impl From<NoteColor> for String {
    fn from(color: NoteColor) -> Self {
        color.hex().to_string()
    }
}

impl TryFrom<String> for NoteColor {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub desc: String,
    /// Formatted creation date, assigned at commit time.
    pub date: String,
    pub color: NoteColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl Note {
    pub fn preview(&self, lines: usize) -> String {
        self.desc
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(lines)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }
}
