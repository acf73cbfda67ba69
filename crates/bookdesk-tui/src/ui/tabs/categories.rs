use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph},
    Frame,
};

use bookdesk_core::forms::CategoryField;
use bookdesk_core::utils::truncate_string;

use crate::app::{App, AppState};
use crate::ui::styles;
use crate::ui::tabs::list::{self, Columns};

/// Render the Categories tab - the add form (when open) above the table
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let adding = app.state == AppState::AddingCategory;
    let list_area = if adding {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(6)])
            .split(area);
        render_add_form(frame, app, chunks[0]);
        chunks[1]
    } else {
        area
    };

    let columns = Columns {
        headers: &["Name", "Keywords"],
        widths: &[Constraint::Percentage(35), Constraint::Fill(1)],
    };
    list::render_list(frame, app, &app.categories, list_area, !adding, columns, |category| {
        vec![
            Cell::from(category.name.as_str()),
            Cell::from(truncate_string(&category.keywords_display(), 80)),
        ]
    });
}

fn render_add_form(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.category_form;

    let field = |label: &'static str, value: &str, focused: bool| {
        let style = styles::row_style(false, focused);
        let cursor = if focused { "▌" } else { "" };
        Line::from(vec![
            Span::styled(label, styles::muted_style()),
            Span::styled(format!("{}{}", value, cursor), style),
        ])
    };

    let lines = vec![
        field(" Name:     ", &form.name, form.focus == CategoryField::Name),
        field(" Keywords: ", &form.keywords, form.focus == CategoryField::Keywords),
        Line::from(vec![
            Span::styled(" Enter", styles::help_key_style()),
            Span::styled(" add  ", styles::muted_style()),
            Span::styled("Tab", styles::help_key_style()),
            Span::styled(" switch field  ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Add Category ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
