use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::app::state::{AppState, NoteFocus, NoteView};
use crate::editor::{ColorChoice, EditableField};
use crate::note::NoteColor;
use crate::search::build_highlight_regex;

pub fn draw_app(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(frame.size());

    match state.note.as_ref() {
        Some(view) => draw_note(frame, view, vertical[0]),
        None => draw_list(frame, state, list_state, vertical[0]),
    }

    let status = Paragraph::new(build_status_line(state))
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, vertical[1]);
}

fn accent(color: NoteColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

fn draw_list(frame: &mut Frame, state: &AppState, list_state: &mut ListState, area: Rect) {
    let highlight_regex = build_highlight_regex(&state.search.query.terms);
    let highlight_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let notes = state.visible_notes();
    let mut items = Vec::with_capacity(notes.len());
    for note in &notes {
        let mut title_spans = vec![Span::styled("● ", Style::default().fg(accent(note.color)))];
        title_spans.extend(highlight_line(
            note.display_title(),
            highlight_regex.as_ref(),
            highlight_style,
            Style::default().add_modifier(Modifier::BOLD),
        ));
        title_spans.push(Span::styled(
            format!("  {}", note.date),
            Style::default().fg(Color::Gray),
        ));
        let mut lines = vec![Line::from(title_spans)];
        for line in note.preview(state.preview_lines).lines() {
            let mut spans = vec![Span::raw("  ")];
            spans.extend(highlight_line(
                line,
                highlight_regex.as_ref(),
                highlight_style,
                Style::default().fg(Color::DarkGray),
            ));
            lines.push(Line::from(spans));
        }
        items.push(ListItem::new(lines));
    }

    let title = if state.search.query.is_empty() {
        format!("Notes ({})", notes.len())
    } else {
        format!("Notes ({} of {})", notes.len(), state.notes.len())
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("› ");
    frame.render_stateful_widget(list, area, list_state);
}

fn draw_note(frame: &mut Frame, view: &NoteView, area: Rect) {
    let screen = &view.screen;
    let session = screen.session();
    let colors = screen.color_choices();
    let mut constraints = vec![Constraint::Length(3), Constraint::Min(3)];
    if !colors.is_empty() {
        constraints.push(Constraint::Length(3));
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(12)])
        .split(rows[0]);
    frame.render_widget(
        Paragraph::new("‹ Back").block(Block::default().borders(Borders::ALL)),
        header[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            screen.header_action().label(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL)),
        header[1],
    );

    let title_field = screen.title_field();
    let desc_field = screen.desc_field();
    let date = screen.date_label().ok().flatten().unwrap_or_default();
    let shown_title = if title_field.shows_placeholder() {
        title_field.placeholder
    } else {
        title_field.text
    };
    // title, date, then one blank line above the description
    let desc_offset = wrapped_rows(shown_title, rows[1]) + wrapped_rows(&date, rows[1]) + 1;
    let mut lines = Vec::new();
    lines.push(Line::from(field_spans(
        &title_field,
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(date, Style::default().fg(Color::Gray))));
    lines.push(Line::from(""));
    let desc_spans = field_spans(&desc_field, Style::default());
    if desc_field.shows_placeholder() {
        lines.push(Line::from(desc_spans));
    } else {
        lines.extend(desc_field.text.split('\n').map(|line| Line::from(line.to_string())));
    }

    let body_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent(session.selected_color())));
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .block(body_block)
            .wrap(Wrap { trim: false }),
        rows[1],
    );

    if screen.is_editing() {
        let cursor = match view.focus {
            NoteFocus::Title => field_cursor(title_field.text, 0, rows[1]),
            NoteFocus::Desc => field_cursor(desc_field.text, desc_offset, rows[1]),
            NoteFocus::Color => None,
        };
        if let Some((x, y)) = cursor {
            frame.set_cursor(x, y);
        }
    }

    if let Some(area) = rows.get(2) {
        let focused = view.focus == NoteFocus::Color;
        frame.render_widget(
            Paragraph::new(Line::from(color_row(&colors)))
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Color ←/→")
                        .border_style(if focused {
                            Style::default().fg(Color::Cyan)
                        } else {
                            Style::default()
                        }),
                ),
            *area,
        );
    }
}

fn field_spans(field: &EditableField<'_>, base: Style) -> Vec<Span<'static>> {
    if field.shows_placeholder() {
        return vec![Span::styled(
            field.placeholder.to_string(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )];
    }
    vec![Span::styled(field.text.to_string(), base)]
}

fn color_row(choices: &[ColorChoice]) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(choices.len() * 2);
    for choice in choices {
        let label = if choice.selected { " ✓ " } else { "   " };
        spans.push(Span::styled(
            label,
            Style::default()
                .bg(accent(choice.color))
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));
    }
    spans
}

/// Screen position just past the end of `text`, which starts `row_offset`
/// rows into the bordered `area`.
fn field_cursor(text: &str, row_offset: u16, area: Rect) -> Option<(u16, u16)> {
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    if inner_width == 0 || inner_height == 0 {
        return None;
    }

    let (end_row, col) = text_end(text, inner_width as usize);
    let row = row_offset.saturating_add(end_row).min(inner_height - 1);
    let col = col.min(inner_width as usize - 1) as u16;
    Some((area.x + 1 + col, area.y + 1 + row))
}

/// Rows `text` occupies once wrapped inside the bordered `area`.
fn wrapped_rows(text: &str, area: Rect) -> u16 {
    let inner_width = area.width.saturating_sub(2).max(1);
    text_end(text, inner_width as usize).0 + 1
}

/// Row and column just past the last grapheme of `text` wrapped at `width`.
fn text_end(text: &str, width: usize) -> (u16, usize) {
    let mut row = 0u16;
    let mut col = 0usize;
    for grapheme in text.graphemes(true) {
        if grapheme == "\n" {
            row = row.saturating_add(1);
            col = 0;
            continue;
        }
        let glyph_width = UnicodeWidthStr::width(grapheme);
        if glyph_width > 0 && col + glyph_width > width {
            row = row.saturating_add(1);
            col = 0;
        }
        col += glyph_width;
    }
    (row, col)
}

fn build_status_line(state: &AppState) -> Text<'static> {
    let mut spans = Vec::new();
    if state.search.active || !state.search.input.is_empty() {
        let label = if state.search.active { "Search: " } else { "Filter: " };
        spans.push(Span::styled(label, Style::default().fg(Color::Yellow)));
        spans.push(Span::styled(
            state.search.input.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" | "));
    }
    if let Some(message) = &state.status_message {
        spans.push(Span::styled(
            message.clone(),
            Style::default().fg(Color::Green),
        ));
        spans.push(Span::raw(" | "));
    }
    let hints = match state.note.as_ref() {
        Some(view) if view.screen.is_editing() => "Tab field • ←/→ color • Ctrl-s/Esc save",
        Some(_) => "e edit • Esc back • q quit",
        None => "j/k move • Enter open • n new • d delete • / search • q quit",
    };
    spans.push(Span::styled(hints, Style::default().fg(Color::Gray)));
    Text::from(Line::from(spans))
}

fn highlight_line(
    text: &str,
    regex: Option<&Regex>,
    highlight_style: Style,
    base_style: Style,
) -> Vec<Span<'static>> {
    let Some(re) = regex else {
        return vec![Span::styled(text.to_string(), base_style)];
    };
    let mut spans = Vec::new();
    let mut last = 0;
    for mat in re.find_iter(text) {
        if mat.start() > last {
            spans.push(Span::styled(text[last..mat.start()].to_string(), base_style));
        }
        spans.push(Span::styled(mat.as_str().to_string(), highlight_style));
        last = mat.end();
    }
    if last < text.len() {
        spans.push(Span::styled(text[last..].to_string(), base_style));
    }
    if spans.is_empty() {
        spans.push(Span::styled(text.to_string(), base_style));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::FieldKind;

    fn span_texts(spans: &[Span<'static>]) -> Vec<String> {
        spans
            .iter()
            .map(|span| span.content.clone().into_owned())
            .collect()
    }

    #[test]
    fn highlight_splits_around_matches() {
        let regex = build_highlight_regex(&["milk".into()]).expect("regex");
        let spans = highlight_line("Buy MILK now", Some(&regex), Style::default(), Style::default());
        assert_eq!(span_texts(&spans), vec!["Buy ", "MILK", " now"]);
    }

    #[test]
    fn empty_editing_field_shows_placeholder() {
        let field = EditableField {
            text: "",
            kind: FieldKind::Input,
            placeholder: "Title",
            is_editing: true,
        };
        assert_eq!(span_texts(&field_spans(&field, Style::default())), vec!["Title"]);

        let viewing = EditableField {
            is_editing: false,
            ..field
        };
        assert_eq!(span_texts(&field_spans(&viewing, Style::default())), vec![""]);
    }

    #[test]
    fn cursor_wraps_at_inner_width() {
        let area = Rect::new(0, 0, 7, 10); // 5 columns inside the border
        assert_eq!(field_cursor("abc", 0, area), Some((4, 1)));
        assert_eq!(field_cursor("abcdef", 0, area), Some((2, 2)));
        assert_eq!(field_cursor("ab\nc", 3, area), Some((2, 5)));
    }

    #[test]
    fn long_title_pushes_description_cursor_down() {
        let area = Rect::new(0, 0, 7, 12); // 5 columns inside the border
        assert_eq!(wrapped_rows("Title", area), 1);
        assert_eq!(wrapped_rows("Groceries list", area), 3);
        assert_eq!(wrapped_rows("", area), 1);

        let offset = wrapped_rows("Groceries list", area) + wrapped_rows("Oct", area) + 1;
        assert_eq!(field_cursor("ab", offset, area), Some((3, 6)));
    }

    #[test]
    fn color_row_marks_selection() {
        let choices: Vec<_> = NoteColor::palette()
            .map(|color| ColorChoice {
                color,
                selected: color == NoteColor::Sky,
            })
            .collect();
        let texts = span_texts(&color_row(&choices));
        assert_eq!(texts.len(), 12);
        assert_eq!(texts[6], " ✓ ");
    }
}
