use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

use crate::note::{Note, NoteColor};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub terms: Vec<String>,
    pub color: Option<NoteColor>,
}

impl SearchQuery {
    /// Whitespace separated terms; `color:<name|hex>` narrows by accent.
    /// An unknown color filter is kept as a plain term.
    pub fn parse(input: &str) -> SearchQuery {
        let mut query = SearchQuery::default();
        for raw in input.split_whitespace() {
            if let Some(value) = raw.strip_prefix("color:") {
                if let Ok(color) = value.parse::<NoteColor>() {
                    query.color = Some(color);
                    continue;
                }
            }
            query.terms.push(raw.to_lowercase());
        }
        query
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.color.is_none()
    }

    pub fn matches(&self, note: &Note) -> bool {
        if let Some(color) = self.color {
            if note.color != color {
                return false;
            }
        }
        if self.terms.is_empty() {
            return true;
        }
        let title = note.title.to_lowercase();
        let desc = note.desc.to_lowercase();
        self.terms
            .iter()
            .all(|term| title.contains(term) || desc.contains(term))
    }
}

/// Notes matching `query`, in collection order.
pub fn filter_notes<'a>(notes: &'a [Note], query: &SearchQuery) -> Vec<&'a Note> {
    notes.iter().filter(|note| query.matches(note)).collect()
}

/// Case-insensitive alternation of the tokens, longest first so that the
/// widest match wins.
pub fn build_highlight_regex(tokens: &[String]) -> Option<Regex> {
    let mut unique = Vec::new();
    let mut seen = HashSet::new();
    for token in tokens {
        if token.is_empty() {
            continue;
        }
        if seen.insert(token.to_lowercase()) {
            unique.push(token.clone());
        }
    }
    if unique.is_empty() {
        return None;
    }
    unique.sort_by(|a, b| b.len().cmp(&a.len()));
    let pattern = unique
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::NoteId;

    fn note(id: &str, title: &str, desc: &str, color: NoteColor) -> Note {
        Note {
            id: NoteId::new(id),
            title: title.into(),
            desc: desc.into(),
            date: "Oct 19, 2026".into(),
            color,
            last_modified: None,
        }
    }

    #[test]
    fn parse_extracts_color_filter() {
        let query = SearchQuery::parse("Milk color:sky  eggs");
        assert_eq!(query.terms, vec!["milk", "eggs"]);
        assert_eq!(query.color, Some(NoteColor::Sky));

        let query = SearchQuery::parse("color:mauve");
        assert_eq!(query.terms, vec!["color:mauve"]);
        assert_eq!(query.color, None);
    }

    #[test]
    fn filter_requires_every_term_and_keeps_order() {
        let notes = vec![
            note("1", "Groceries", "milk and eggs", NoteColor::Sky),
            note("2", "Recipes", "eggs benedict", NoteColor::Lime),
            note("3", "Milk run", "eggs too", NoteColor::Lime),
        ];
        let hits = filter_notes(&notes, &SearchQuery::parse("EGGS milk"));
        let ids: Vec<_> = hits.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let hits = filter_notes(&notes, &SearchQuery::parse("eggs color:#e8ed9b"));
        let ids: Vec<_> = hits.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn highlight_prefers_longer_tokens() {
        let regex = build_highlight_regex(&["not".into(), "note".into(), "NOTE".into()])
            .expect("regex");
        let matches: Vec<_> = regex.find_iter("notebook").map(|m| m.as_str()).collect();
        assert_eq!(matches, vec!["note"]);
        assert!(build_highlight_regex(&[]).is_none());
    }
}
