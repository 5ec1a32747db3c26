use std::io::Stdout;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::ListState;
use ratatui::Terminal;

use crate::config::AppConfig;
use crate::editor::EditorContext;
use crate::ui;

pub mod state;

pub use state::{AppState, NoteFocus, NoteView, SearchState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    SelectNext,
    SelectPrevious,
    Refresh,
    OpenNote,
    NewNote,
    DeleteNote,
    ConfirmDelete,
    CancelDelete,
    StartSearch,
    SearchChar(char),
    SearchBackspace,
    SearchFinish,
    SearchCancel,
    ToggleEditing,
    Back,
    CycleFocus,
    Input(char),
    Backspace,
    ColorPrevious,
    ColorNext,
}

pub struct App {
    state: AppState,
    list_state: ListState,
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn new(config: &AppConfig, ctx: EditorContext) -> Result<Self> {
        let state = AppState::load(
            ctx,
            config.preview_lines as usize,
            config.list_limit,
        )
        .context("loading notes for initial state")?;
        let mut list_state = ListState::default();
        if !state.visible_notes().is_empty() {
            list_state.select(Some(state.selected));
        }
        Ok(Self {
            state,
            list_state,
            should_quit: false,
            tick_rate: Duration::from_millis(250),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal
                .draw(|frame| {
                    if self.state.visible_notes().is_empty() {
                        self.list_state.select(None);
                    } else {
                        self.list_state.select(Some(self.state.selected));
                    }
                    ui::draw_app(frame, &self.state, &mut self.list_state);
                })
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            if event::poll(self.tick_rate).context("polling for terminal events")? {
                match event::read().context("reading terminal event")? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(_, _) => {
                        // next draw picks up the new size
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if let Some(action) = map_key(&self.state, key) {
            self.handle_action(action);
        }
    }

    /// Leaving while editing saves first, the same as leaving edit mode.
    /// A failed save keeps the app open with the error in the status line.
    fn quit(&mut self) -> Result<()> {
        if self.state.is_editing {
            self.state.toggle_editing().context("saving note before quitting")?;
        }
        self.should_quit = true;
        Ok(())
    }

    fn handle_action(&mut self, action: Action) {
        let result = match action {
            Action::Quit => self.quit(),
            Action::SelectNext => {
                self.state.move_selection(1);
                Ok(())
            }
            Action::SelectPrevious => {
                self.state.move_selection(-1);
                Ok(())
            }
            Action::Refresh => self.state.refresh().context("refreshing notes"),
            Action::OpenNote => self.state.open_selected().context("opening note"),
            Action::NewNote => {
                let opened = self.state.new_note().context("opening new note");
                self.state
                    .set_status_message(Some("New note: type a title, Tab to move, Ctrl-s to save"));
                opened
            }
            Action::DeleteNote => {
                self.state.request_delete();
                if self.state.pending_delete.is_some() {
                    self.state
                        .set_status_message(Some("Delete this note? (y to confirm)"));
                }
                Ok(())
            }
            Action::ConfirmDelete => self.state.confirm_delete().context("deleting note"),
            Action::CancelDelete => {
                self.state.cancel_delete();
                self.state.set_status_message(Some("Delete canceled"));
                Ok(())
            }
            Action::StartSearch => {
                self.state.begin_search();
                Ok(())
            }
            Action::SearchChar(ch) => self.state.push_search_char(ch).context("extending search"),
            Action::SearchBackspace => self.state.pop_search_char().context("trimming search"),
            Action::SearchFinish => {
                self.state.finish_search();
                Ok(())
            }
            Action::SearchCancel => self.state.cancel_search().context("canceling search"),
            Action::ToggleEditing => self.state.toggle_editing().context("saving note"),
            Action::Back => self.state.go_home().context("returning to note list"),
            Action::CycleFocus => {
                self.state.cycle_focus();
                Ok(())
            }
            Action::Input(ch) => {
                self.state.type_char(ch);
                Ok(())
            }
            Action::Backspace => {
                self.state.backspace();
                Ok(())
            }
            Action::ColorPrevious => {
                self.state.step_color(-1);
                Ok(())
            }
            Action::ColorNext => {
                self.state.step_color(1);
                Ok(())
            }
        };
        if let Err(err) = result {
            tracing::error!(?err, ?action, "action failed");
            self.state.set_status_message(Some(format!("{err:#}")));
        }
    }
}

fn plain(key: &KeyEvent) -> bool {
    !key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
}

fn map_key(state: &AppState, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    if state.pending_delete.is_some() {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::ConfirmDelete),
            _ => Some(Action::CancelDelete),
        };
    }

    if let Some(view) = state.note.as_ref() {
        if view.screen.is_editing() {
            return match key.code {
                KeyCode::Char('s') if ctrl => Some(Action::ToggleEditing),
                KeyCode::Esc => Some(Action::ToggleEditing),
                KeyCode::Tab => Some(Action::CycleFocus),
                KeyCode::Enter => Some(Action::Input('\n')),
                KeyCode::Backspace => Some(Action::Backspace),
                KeyCode::Left => Some(Action::ColorPrevious),
                KeyCode::Right => Some(Action::ColorNext),
                KeyCode::Char(ch) if plain(&key) => Some(Action::Input(ch)),
                _ => None,
            };
        }
        return match key.code {
            KeyCode::Char('e') if plain(&key) => Some(Action::ToggleEditing),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') => Some(Action::Back),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        };
    }

    if state.search.active {
        return match key.code {
            KeyCode::Esc => Some(Action::SearchCancel),
            KeyCode::Enter => Some(Action::SearchFinish),
            KeyCode::Backspace => Some(Action::SearchBackspace),
            KeyCode::Char(ch) if plain(&key) => Some(Action::SearchChar(ch)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::SelectNext),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::SelectPrevious),
        KeyCode::Char('r') if ctrl => Some(Action::Refresh),
        KeyCode::Enter | KeyCode::Char('l') => Some(Action::OpenNote),
        KeyCode::Char('n') if plain(&key) => Some(Action::NewNote),
        KeyCode::Char('d') if plain(&key) => Some(Action::DeleteNote),
        KeyCode::Char('/') if plain(&key) => Some(Action::StartSearch),
        KeyCode::Esc if !state.search.query.is_empty() => Some(Action::SearchCancel),
        _ => None,
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("restoring screen state")?;
    Ok(())
}
