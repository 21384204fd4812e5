//! UI renderer implementation.
//!
//! Contains the top-level `render` entry point used by the terminal loop and the layout that
//! splits the screen into header, query line, rows and status line.
//!
//! This module should stay "pure rendering": it reads the session and produces widgets.

use crate::app::Session;
use crate::ui::widgets::{self, Palette};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

const HEADER_HEIGHT: u16 = 1;
const QUERY_HEIGHT: u16 = 2;
const STATUS_HEIGHT: u16 = 1;

/// Renders the whole picker for one frame.
pub fn render(frame: &mut Frame, session: &Session) {
    let palette = Palette::default();
    let [header, query, rows, status] = layout_chunks(frame.area());

    widgets::draw_header(frame, header, session, &palette);
    widgets::draw_query_line(frame, query, session, &palette);
    widgets::draw_rows(frame, rows, session, &palette);
    widgets::draw_status_line(frame, status, session, &palette);

    if let Some(prompt) = session.prompt() {
        widgets::draw_prompt(frame, query, prompt, &palette);
    }
}

/// Number of rows a page key moves by for a screen of `height` lines.
pub fn page_size(height: u16) -> usize {
    height
        .saturating_sub(HEADER_HEIGHT + QUERY_HEIGHT + STATUS_HEIGHT)
        .max(1) as usize
}

fn layout_chunks(area: Rect) -> [Rect; 4] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(QUERY_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3]]
}
