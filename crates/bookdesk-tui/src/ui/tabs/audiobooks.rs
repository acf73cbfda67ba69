use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Wrap},
    Frame,
};

use bookdesk_core::models::Audiobook;
use bookdesk_core::utils::{format_optional, truncate_string};

use crate::app::App;
use crate::ui::styles;
use crate::ui::tabs::list::{self, Columns};

/// Render the Audiobooks tab - table with the selected book's description below
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(6)])
        .split(area);

    let columns = Columns {
        headers: &["Title", "Author", "Category"],
        widths: &[
            Constraint::Percentage(45),
            Constraint::Percentage(30),
            Constraint::Fill(1),
        ],
    };
    list::render_list(frame, app, &app.audiobooks, chunks[0], true, columns, |book| {
        vec![
            Cell::from(truncate_string(&format_optional(book.title.as_deref(), "Untitled"), 60)),
            Cell::from(format_optional(book.author_name.as_deref(), "-")),
            Cell::from(format_optional(book.category.as_deref(), "-")),
        ]
    });

    render_description(frame, app.audiobooks.selected(), chunks[1]);
}

fn render_description(frame: &mut Frame, selected: Option<&Audiobook>, area: Rect) {
    let text = match selected {
        Some(book) => Line::from(Span::raw(format_optional(
            book.description.as_deref(),
            "No description.",
        ))),
        None => Line::from(Span::styled("", styles::muted_style())),
    };

    let block = Block::default()
        .title(" Description ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
