//! Widgets for the picker screen.
//!
//! Each draw function renders one horizontal band of the screen from the [Session] state:
//! the header, the query or prompt line, the rows and the status line.

use crate::app::Session;
use crate::app::prompt::Prompt;
use crate::core::item::{ItemKind, ListItem};
use crate::utils::shorten_home_path;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem as Row, ListState, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const QUERY_SYMBOL: &str = "> ";

/// Colors shared by the widgets.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Palette {
    pub accent: Style,
    pub dim: Style,
    pub selection: Style,
    pub separator: Style,
    pub directory: Style,
    pub error: Style,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            accent: Style::default().fg(Color::Cyan),
            dim: Style::default().fg(Color::DarkGray),
            selection: Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            separator: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            directory: Style::default().fg(Color::Blue),
            error: Style::default().fg(Color::Red),
        }
    }
}

/// Title of the current action, or the workspace and root being searched.
pub(crate) fn draw_header(frame: &mut Frame, area: Rect, session: &Session, palette: &Palette) {
    let text = match session.title() {
        Some(title) => title.to_string(),
        None => match session.nav().root() {
            Some(root) => shorten_home_path(root),
            None => session
                .workspace()
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| "quickfiler".to_string()),
        },
    };

    let mut spans = vec![Span::styled(text, palette.accent.add_modifier(Modifier::BOLD))];
    if session.is_searching() {
        spans.push(Span::styled("  searching…", palette.dim));
    }
    if session.is_busy() {
        spans.push(Span::styled("  working…", palette.dim));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Query line with its placeholder. Places the terminal cursor.
pub(crate) fn draw_query_line(frame: &mut Frame, area: Rect, session: &Session, palette: &Palette) {
    let query = session.query();
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(palette.dim);
    let inner = block.inner(area);

    let line = if query.is_empty() {
        Line::from(vec![
            Span::styled(QUERY_SYMBOL, palette.accent),
            Span::styled(session.placeholder().to_string(), palette.dim),
        ])
    } else {
        Line::from(vec![
            Span::styled(QUERY_SYMBOL, palette.accent),
            Span::raw(query.text().to_string()),
        ])
    };
    frame.render_widget(Paragraph::new(line).block(block), area);

    if session.prompt().is_none() {
        let offset = QUERY_SYMBOL.width() + query.text()[..query.cursor()].width();
        set_cursor(frame, inner, offset);
    }
}

/// Prompt line over the query line, with the label, input and inline error.
pub(crate) fn draw_prompt(frame: &mut Frame, area: Rect, prompt: &Prompt, palette: &Palette) {
    let border_style = if prompt.is_confirmation() {
        palette.error
    } else {
        palette.accent
    };
    let mut block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(border_style);
    if let Some(error) = prompt.error() {
        block = block
            .title_bottom(Line::styled(format!(" {} ", error), palette.error))
            .title_alignment(Alignment::Right);
    }
    let inner = block.inner(area);

    let label = format!("{}: ", prompt.label());
    let line = Line::from(vec![
        Span::styled(label.clone(), border_style),
        Span::raw(prompt.input().to_string()),
    ]);
    frame.render_widget(ratatui::widgets::Clear, area);
    frame.render_widget(Paragraph::new(line).block(block), area);

    let offset = label.width() + prompt.input()[..prompt.cursor()].width();
    set_cursor(frame, inner, offset);
}

/// Visible rows with their descriptions. The list scrolls to keep the selection in view.
pub(crate) fn draw_rows(frame: &mut Frame, area: Rect, session: &Session, palette: &Palette) {
    let width = area.width as usize;
    let rows: Vec<Row> = session
        .visible_items()
        .map(|item| Row::new(row_line(item, &session.describe(item), width, palette)))
        .collect();

    let mut state = ListState::default();
    if !rows.is_empty() {
        state.select(Some(session.selected()));
    }
    let list = List::new(rows)
        .highlight_style(palette.selection)
        .highlight_symbol("");
    frame.render_stateful_widget(list, area, &mut state);
}

/// Notification on the left, selection position on the right.
pub(crate) fn draw_status_line(frame: &mut Frame, area: Rect, session: &Session, palette: &Palette) {
    if let Some(msg) = session.notification() {
        frame.render_widget(Paragraph::new(Span::styled(msg.to_string(), palette.accent)), area);
    }

    let total = session
        .visible_items()
        .filter(|item| !item.is_separator())
        .count();
    let position = session
        .visible_items()
        .take(session.selected() + 1)
        .filter(|item| !item.is_separator())
        .count();
    let count = if total == 0 {
        "0/0".to_string()
    } else {
        format!("{}/{}", position, total)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(count, palette.dim)).alignment(Alignment::Right),
        area,
    );
}

fn row_line(item: &ListItem, description: &str, width: usize, palette: &Palette) -> Line<'static> {
    let label = item.label();
    match item.kind() {
        ItemKind::Separator => {
            let rule_len = width.saturating_sub(label.width() + 2);
            Line::from(vec![
                Span::styled(label, palette.separator),
                Span::styled(format!(" {}", "─".repeat(rule_len)), palette.dim),
            ])
        }
        ItemKind::Empty => Line::styled(label, palette.dim),
        kind => {
            let label_style = match kind {
                ItemKind::Directory | ItemKind::Root => palette.directory,
                ItemKind::File => Style::default(),
                _ => palette.accent,
            };
            let room = width.saturating_sub(label.width() + 2);
            let mut spans = vec![Span::styled(label, label_style)];
            if !description.is_empty() && room > 0 {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(truncate_left(description, room), palette.dim));
            }
            Line::from(spans)
        }
    }
}

/// Keeps the end of `text` within `max` columns, marking the cut with `…`.
fn truncate_left(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut kept = Vec::new();
    let mut used = 1;
    for ch in text.chars().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > max {
            break;
        }
        used += w;
        kept.push(ch);
    }
    std::iter::once('…').chain(kept.into_iter().rev()).collect()
}

fn set_cursor(frame: &mut Frame, area: Rect, offset: usize) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let x = area.x + (offset as u16).min(area.width.saturating_sub(1));
    frame.set_cursor_position((x, area.y));
}
