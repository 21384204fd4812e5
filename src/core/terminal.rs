//! Terminal rendering and event loop for quickfiler.
//!
//! Handles setup/teardown of raw mode, alternate screen, redraws,
//! and events (keypress, resize) to the picker session.

use crate::app::{KeypressResult, Keymap, Session};
use crate::ui;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use std::{io, time::Duration};

/// Initializes the terminal in raw mode and alternate screen and runs the main event loop.
///
/// Blocks until the session closes.
///
/// Returns an std::io::Error if terminal setup or teardown fails.
pub fn run_terminal(session: &mut Session, keymap: &Keymap) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = event_loop(&mut terminal, session, keymap);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    result
}

/// Main event loop: draws the UI, polls for events and dispatches them to the session.
/// Returns once the session is closed.
fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    session: &mut Session,
    keymap: &Keymap,
) -> io::Result<()>
where
    io::Error: From<<B as Backend>::Error>,
{
    terminal.draw(|f| ui::render(f, session))?;

    while !session.is_closed() {
        if session.tick() {
            terminal.draw(|f| ui::render(f, session))?;
        }

        if !event::poll(Duration::from_millis(16))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let page = ui::page_size(terminal.size()?.height);
                match session.handle_keypress(key, keymap, page) {
                    KeypressResult::Quit => break,
                    KeypressResult::OpenedEditor => {
                        // full clear/reset
                        terminal.clear()?;
                    }
                    _ => {}
                }
                if session.is_closed() {
                    break;
                }
                terminal.draw(|f| ui::render(f, session))?;
            }
            Event::Paste(text) => {
                let mut query = session.query().text().to_string();
                query.push_str(text.trim_end_matches(['\r', '\n']));
                session.set_query(&query);
                terminal.draw(|f| ui::render(f, session))?;
            }
            Event::Resize(_, _) => {
                terminal.draw(|f| ui::render(f, session))?;
            }
            _ => {}
        }
    }
    Ok(())
}
