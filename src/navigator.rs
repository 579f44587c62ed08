//! # Interactive Navigator Module
//!
//! Il browser da terminale con cui l'utente sceglie l'immagine da processare.
//!
//! ## Architettura:
//! La macchina a stati (`Navigator`) è pura e UI-agnostic: consuma eventi
//! astratti (`NavigatorEvent`) e termina con `Selected(path)` o `Cancelled`.
//! Il frontend (`run_navigator`) è un event loop single-threaded che blocca
//! su ogni keypress: raw mode + alternate screen via `crossterm`, un evento
//! consumato per iterazione, nessun loop annidato.
//!
//! ## Transizioni:
//! - giù/`s`: selezione + 1 (clamp all'ultima entry)
//! - su/`w`: selezione - 1 (clamp a 0)
//! - Invio su `..`: sale alla directory padre (no-op alla root del filesystem)
//! - Invio su directory: entra e ri-lista, selezione a 0
//! - Invio su immagine: termina con il path selezionato
//! - `q`/Esc: termina senza selezione
//! - Qualsiasi altro tasto: nessun effetto
//!
//! Il rendering è una proiezione pura dello stato sulla regione visibile;
//! un offset di scroll tiene sempre la selezione dentro la finestra.

use std::io::{stdout, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::style::Print;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{cursor, execute, queue};
use tracing::debug;

use crate::scanner::{BrowserEntry, DirectoryScanner};

/// Abstract input event consumed by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorEvent {
    MoveUp,
    MoveDown,
    Confirm,
    Quit,
    Other,
}

/// Terminal state of a navigation session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorOutcome {
    Selected(PathBuf),
    Cancelled,
}

/// Interactive state machine over the scanner's directory listings.
pub struct Navigator {
    scanner: DirectoryScanner,
    current_dir: PathBuf,
    entries: Vec<BrowserEntry>,
    selected: usize,
    scroll: usize,
}

impl Navigator {
    pub fn new(scanner: DirectoryScanner, start_dir: PathBuf) -> Self {
        let entries = scanner.list_visible(&start_dir);
        Self {
            scanner,
            current_dir: start_dir,
            entries,
            selected: 0,
            scroll: 0,
        }
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn entries(&self) -> &[BrowserEntry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Apply one event. Returns `Some` when the session terminates.
    pub fn apply(&mut self, event: NavigatorEvent) -> Option<NavigatorOutcome> {
        match event {
            NavigatorEvent::MoveDown => {
                if self.selected + 1 < self.entries.len() {
                    self.selected += 1;
                }
            }
            NavigatorEvent::MoveUp => {
                self.selected = self.selected.saturating_sub(1);
            }
            NavigatorEvent::Quit => return Some(NavigatorOutcome::Cancelled),
            NavigatorEvent::Confirm => return self.confirm(),
            NavigatorEvent::Other => {}
        }
        None
    }

    fn confirm(&mut self) -> Option<NavigatorOutcome> {
        let entry = self.entries.get(self.selected)?.clone();
        match entry {
            BrowserEntry::Parent => {
                // Parent-of-root stays put instead of erroring.
                let parent = self.current_dir.parent().map(Path::to_path_buf);
                if let Some(parent) = parent {
                    self.enter(parent);
                }
                None
            }
            BrowserEntry::Directory(name) => {
                let next = self.current_dir.join(name);
                self.enter(next);
                None
            }
            BrowserEntry::Image(name) => {
                Some(NavigatorOutcome::Selected(self.current_dir.join(name)))
            }
        }
    }

    fn enter(&mut self, directory: PathBuf) {
        debug!("Entering directory {}", directory.display());
        self.entries = self.scanner.list_visible(&directory);
        self.current_dir = directory;
        self.selected = 0;
        self.scroll = 0;
    }

    /// Clamp the scroll offset so the selection stays inside a window of
    /// `rows` visible lines.
    pub fn ensure_selection_visible(&mut self, rows: usize) {
        if rows == 0 {
            return;
        }
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + rows {
            self.scroll = self.selected + 1 - rows;
        }
    }

    /// The slice of entries currently inside the visible window, paired with
    /// their absolute indices.
    pub fn visible_entries(&self, rows: usize) -> impl Iterator<Item = (usize, &BrowserEntry)> {
        self.entries
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(rows)
    }
}

/// Restores the terminal even when the event loop errors out.
struct ScreenGuard;

impl ScreenGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), cursor::Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Run the blocking navigation session in the current terminal.
///
/// Returns the selected image path, or `None` when the user quits.
pub fn run_navigator(scanner: DirectoryScanner, start_dir: PathBuf) -> Result<Option<PathBuf>> {
    let mut navigator = Navigator::new(scanner, start_dir);
    let _guard = ScreenGuard::enter()?;

    loop {
        draw(&mut navigator)?;

        let event = map_input(event::read()?);
        match navigator.apply(event) {
            Some(NavigatorOutcome::Selected(path)) => return Ok(Some(path)),
            Some(NavigatorOutcome::Cancelled) => return Ok(None),
            None => {}
        }
    }
}

/// Map a terminal event onto the state machine's vocabulary.
fn map_input(event: Event) -> NavigatorEvent {
    let Event::Key(KeyEvent { code, kind, .. }) = event else {
        return NavigatorEvent::Other;
    };
    if kind != KeyEventKind::Press {
        return NavigatorEvent::Other;
    }

    match code {
        KeyCode::Char('s') | KeyCode::Down => NavigatorEvent::MoveDown,
        KeyCode::Char('w') | KeyCode::Up => NavigatorEvent::MoveUp,
        KeyCode::Char('q') | KeyCode::Esc => NavigatorEvent::Quit,
        KeyCode::Enter => NavigatorEvent::Confirm,
        _ => NavigatorEvent::Other,
    }
}

/// Project the navigator state onto the screen: a path header plus one line
/// per visible entry with a selection marker and a type glyph.
fn draw(navigator: &mut Navigator) -> Result<()> {
    let (width, height) = terminal::size()?;
    let rows = height.saturating_sub(1) as usize;
    navigator.ensure_selection_visible(rows);

    let mut out = stdout();
    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;

    let header = format!(
        "🖼️ {} (w/s or arrows: move, Enter: open/select, q: quit)",
        navigator.current_dir().display()
    );
    queue!(out, Print(truncate(&header, width as usize)))?;

    let selected = navigator.selected();
    for (row, (index, entry)) in navigator.visible_entries(rows).enumerate() {
        let prefix = if index == selected { "👉 " } else { "   " };
        let glyph = if entry.is_directory_like() { "📂" } else { "🖼️" };
        let line = format!("{}{} {}", prefix, glyph, entry.label());

        queue!(
            out,
            cursor::MoveTo(0, (row + 1) as u16),
            Print(truncate(&line, width as usize))
        )?;
    }

    out.flush()?;
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}
