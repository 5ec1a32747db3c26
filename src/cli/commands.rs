use std::fmt::Write as _;
use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use clap::Args;

use crate::app::App;
use crate::config::AppConfig;
use crate::editor::{EditorContext, NoteScreen};
use crate::note::{Note, NoteColor, NoteId};
use crate::router::{History, Route, Router};
use crate::search::{filter_notes, SearchQuery};

#[derive(Args, Debug, Clone)]
pub struct NewArgs {
    /// Title for the note (prompted if omitted on a terminal)
    #[arg()]
    pub title: Option<String>,
    /// Description text. If omitted, reads from stdin when piped.
    #[arg(long)]
    pub desc: Option<String>,
    /// Accent color: salmon, apricot, lime, sky, lilac, pink or its hex value
    #[arg(long)]
    pub color: Option<NoteColor>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Filter terms (supports color:<name|hex>)
    #[arg()]
    pub query: Vec<String>,
    /// Limit the number of notes printed
    #[arg(long)]
    pub limit: Option<usize>,
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Note identifier
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Note identifier
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New description
    #[arg(long)]
    pub desc: Option<String>,
    /// New accent color
    #[arg(long)]
    pub color: Option<NoteColor>,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// Note identifier
    pub id: String,
}

pub fn run_tui(app: &mut App) -> Result<()> {
    app.run()
}

pub fn print(output: Result<String>) -> Result<()> {
    print!("{}", output?);
    Ok(())
}

pub fn new_note(ctx: &EditorContext, args: NewArgs) -> Result<String> {
    let title = match args.title {
        Some(title) => title,
        None if atty::is(atty::Stream::Stdin) => prompt("Title")?,
        None => String::new(),
    };
    let desc = match args.desc {
        Some(desc) => desc,
        None => read_stdin()?.unwrap_or_default(),
    };

    let mut router = History::new(Route::note("new"));
    let mut screen = NoteScreen::open(ctx.clone(), router.current(), true)
        .context("opening new note")?;
    screen.set_title(title);
    screen.set_desc(desc);
    if let Some(color) = args.color {
        screen.set_selected_color(color);
    }
    let Some(outcome) = screen.toggle_editing(&mut router).context("saving note")? else {
        bail!("note was not saved");
    };
    Ok(format!("Created note {}\n", outcome.committed))
}

pub fn edit_note(ctx: &EditorContext, args: EditArgs) -> Result<String> {
    if args.title.is_none() && args.desc.is_none() && args.color.is_none() {
        bail!("nothing to change: pass --title, --desc or --color");
    }
    let mut router = History::new(Route::note(args.id.as_str()));
    let mut screen = NoteScreen::open(ctx.clone(), router.current(), true)
        .context("opening note")?;
    if screen.is_new() {
        bail!("note {} not found", args.id);
    }
    if let Some(title) = args.title {
        screen.set_title(title);
    }
    if let Some(desc) = args.desc {
        screen.set_desc(desc);
    }
    if let Some(color) = args.color {
        screen.set_selected_color(color);
    }
    let Some(outcome) = screen.toggle_editing(&mut router).context("saving note")? else {
        bail!("note was not saved");
    };

    let mut out = format!("Saved note {}\n", outcome.committed);
    if outcome.committed.as_str() != args.id {
        let _ = writeln!(out, "    moved from {} to {}", args.id, router.current());
    }
    Ok(out)
}

pub fn list_notes(ctx: &EditorContext, config: &AppConfig, args: &ListArgs) -> Result<String> {
    let notes = ctx.store.get().context("loading notes")?;
    let query = SearchQuery::parse(&args.query.join(" "));
    let limit = args.limit.unwrap_or(config.list_limit);
    let hits: Vec<&Note> = filter_notes(&notes, &query).into_iter().take(limit).collect();

    if args.json {
        let mut out = serde_json::to_string_pretty(&hits).context("serializing notes")?;
        out.push('\n');
        return Ok(out);
    }
    if hits.is_empty() {
        return Ok("No notes found.\n".to_string());
    }
    let mut out = String::new();
    for note in hits {
        let _ = writeln!(
            out,
            "{}  {}  [{}]  {}",
            note.id,
            note.display_title(),
            note.color.name(),
            note.date
        );
        let preview = note.preview(config.preview_lines as usize);
        for line in preview.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    Ok(out)
}

pub fn show_note(ctx: &EditorContext, args: &ShowArgs) -> Result<String> {
    let id = NoteId::new(args.id.as_str());
    let Some(note) = ctx.store.find(&id).context("loading note")? else {
        bail!("note {} not found", args.id);
    };
    let mut out = String::new();
    let _ = writeln!(out, "{}", note.display_title());
    let _ = writeln!(out, "{}  {} ({})", note.date, note.color.name(), note.color);
    if let Some(modified) = &note.last_modified {
        let _ = writeln!(out, "edited {modified}");
    }
    let _ = writeln!(out, "address {}", Route::Note(note.id.clone()));
    if !note.desc.is_empty() {
        out.push('\n');
        out.push_str(&note.desc);
        if !note.desc.ends_with('\n') {
            out.push('\n');
        }
    }
    Ok(out)
}

pub fn delete_note(ctx: &EditorContext, args: &DeleteArgs) -> Result<String> {
    let id = NoteId::new(args.id.as_str());
    if !ctx.store.remove(&id).context("deleting note")? {
        bail!("note {} not found", args.id);
    }
    tracing::info!(note_id = %id, "deleted note");
    Ok(format!("Deleted note {id}\n"))
}

fn prompt(label: &str) -> Result<String> {
    use std::io::Write;
    let mut stdout = io::stdout();
    write!(stdout, "{}: ", label)?;
    stdout.flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end().to_owned())
}

fn read_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(Some(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigPaths, StorageOptions};
    use crate::editor::IdentityPolicy;
    use crate::note::{FixedCalendar, SequentialIds};
    use crate::storage::{self, MemoryStore, NoteStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    type TestResult<T = ()> = Result<T>;

    fn memory_context(identity: IdentityPolicy) -> EditorContext {
        EditorContext {
            store: Arc::new(MemoryStore::default()),
            ids: Arc::new(SequentialIds::new("n")),
            calendar: Arc::new(FixedCalendar("Oct 19, 2026".into())),
            identity,
        }
    }

    fn new_args(title: &str, desc: &str, color: Option<NoteColor>) -> NewArgs {
        NewArgs {
            title: Some(title.into()),
            desc: Some(desc.into()),
            color,
        }
    }

    #[test]
    fn cli_new_then_list_prints_newest_first() -> TestResult {
        let ctx = memory_context(IdentityPolicy::Stable);
        new_note(&ctx, new_args("Groceries", "Milk\nEggs", Some(NoteColor::Sky)))?;
        let created = new_note(&ctx, new_args("Ideas", "", None))?;
        assert_eq!(created, "Created note n2\n");

        let args = ListArgs {
            query: Vec::new(),
            limit: None,
            json: false,
        };
        let output = list_notes(&ctx, &AppConfig::default(), &args)?;
        assert_eq!(
            output,
            "n2  Ideas  [salmon]  Oct 19, 2026\n\
             n1  Groceries  [sky]  Oct 19, 2026\n    Milk\n    Eggs\n"
        );
        Ok(())
    }

    #[test]
    fn cli_list_filters_by_color_and_emits_json() -> TestResult {
        let ctx = memory_context(IdentityPolicy::Stable);
        new_note(&ctx, new_args("Groceries", "", Some(NoteColor::Sky)))?;
        new_note(&ctx, new_args("Ideas", "", None))?;
        let args = ListArgs {
            query: vec!["color:sky".into()],
            limit: None,
            json: true,
        };
        let output = list_notes(&ctx, &AppConfig::default(), &args)?;
        let parsed: Vec<Note> = serde_json::from_str(&output)?;
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].title, "Groceries");
        Ok(())
    }

    #[test]
    fn cli_edit_under_reissue_reports_new_address() -> TestResult {
        let ctx = memory_context(IdentityPolicy::Reissue);
        new_note(&ctx, new_args("Draft", "", None))?;
        let output = edit_note(
            &ctx,
            EditArgs {
                id: "n1".into(),
                title: Some("Final".into()),
                desc: None,
                color: None,
            },
        )?;
        assert_eq!(output, "Saved note n2\n    moved from n1 to /n2\n");
        let notes = ctx.store.get()?;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Final");
        Ok(())
    }

    #[test]
    fn cli_edit_rejects_unknown_note() -> TestResult {
        let ctx = memory_context(IdentityPolicy::Stable);
        let err = edit_note(
            &ctx,
            EditArgs {
                id: "ghost".into(),
                title: Some("x".into()),
                desc: None,
                color: None,
            },
        )
        .expect_err("unknown note");
        assert!(err.to_string().contains("ghost"));
        assert!(ctx.store.get()?.is_empty());
        Ok(())
    }

    #[test]
    fn cli_show_and_delete_against_sqlite() -> TestResult {
        let (_temp, ctx) = sqlite_context()?;
        new_note(&ctx, new_args("Persisted", "body text", Some(NoteColor::Lilac)))?;
        let notes = ctx.store.get()?;
        assert_eq!(notes.len(), 2, "seed note plus the new one");
        let id = notes[0].id.to_string();

        let shown = show_note(&ctx, &ShowArgs { id: id.clone() })?;
        assert!(shown.starts_with("Persisted\nOct 19, 2026  lilac (#d094da)\n"));
        assert!(shown.contains("body text"));

        delete_note(&ctx, &DeleteArgs { id: id.clone() })?;
        assert!(show_note(&ctx, &ShowArgs { id }).is_err());
        assert_eq!(ctx.store.get()?.len(), 1);
        Ok(())
    }

    fn sqlite_context() -> TestResult<(TempDir, EditorContext)> {
        let temp = TempDir::new().context("creating temp dir")?;
        let paths = ConfigPaths::rooted_at(temp.path());
        paths.ensure_directories()?;
        let mut options = StorageOptions::default();
        options.database_path = paths.database_path.clone();
        let ids = Arc::new(SequentialIds::new("n"));
        let calendar = Arc::new(FixedCalendar("Oct 19, 2026".into()));
        let handle = storage::init(&paths, &options, ids.as_ref(), calendar.as_ref())?;
        let ctx = EditorContext {
            store: Arc::new(handle),
            ids,
            calendar,
            identity: IdentityPolicy::Stable,
        };
        Ok((temp, ctx))
    }
}
