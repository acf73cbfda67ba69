//! Shared rendering for the paginated list screens: search line, table
//! (or its loading/error/empty placeholder) and the page footer.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use bookdesk_core::forms::{NameEditForm, NameField};
use bookdesk_core::listing::ListController;
use bookdesk_core::models::Entity;
use bookdesk_core::utils::format_count;

use crate::app::{App, AppState};
use crate::ui::styles;

/// Column headers and widths of a list table.
pub struct Columns<'a> {
    pub headers: &'a [&'a str],
    pub widths: &'a [Constraint],
}

/// Render a list screen. `cells` turns one row into its table cells.
pub fn render_list<'a, T, F>(
    frame: &mut Frame,
    app: &App,
    list: &'a ListController<T>,
    area: Rect,
    focused: bool,
    columns: Columns<'_>,
    cells: F,
) where
    T: Entity,
    F: Fn(&'a T) -> Vec<Cell<'a>>,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Search
            Constraint::Min(3),    // Table
            Constraint::Length(1), // Pagination
        ])
        .split(area);

    render_search_line(frame, app, list, chunks[0]);

    let title = format!(" {} ({}) ", list.kind().title(), format_count(list.total()));
    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if let Some(message) = placeholder(list) {
        let paragraph = Paragraph::new(message).block(block);
        frame.render_widget(paragraph, chunks[1]);
    } else {
        let header = Row::new(columns.headers.iter().map(|h| Cell::from(*h)))
            .style(styles::title_style())
            .height(1);

        let rows: Vec<Row> = list
            .rows()
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let style = styles::row_style(
                    list.editing_id() == Some(item.id()),
                    i == list.selected_index() && focused,
                );
                Row::new(cells(item)).style(style)
            })
            .collect();

        let table = Table::new(rows, columns.widths.to_vec())
            .header(header)
            .block(block)
            .row_highlight_style(styles::selected_style());

        let mut state = TableState::default();
        if focused {
            state.select(Some(list.selected_index()));
        }
        frame.render_stateful_widget(table, chunks[1], &mut state);
    }

    render_pagination(frame, list, chunks[2]);
}

/// Text shown instead of the table, if any
fn placeholder<T>(list: &ListController<T>) -> Option<Line<'static>> {
    if let Some(error) = list.error() {
        return Some(Line::from(Span::styled(
            format!(" Error: {}", error),
            styles::error_style(),
        )));
    }
    if list.is_loading() && list.rows().is_empty() {
        return Some(Line::from(Span::styled(" Loading...", styles::muted_style())));
    }
    if list.show_no_results() {
        let message = if list.search_term().is_empty() {
            format!(" No {} yet.", list.kind().title().to_lowercase())
        } else {
            format!(" No {} match \"{}\".", list.kind().title().to_lowercase(), list.search_term())
        };
        return Some(Line::from(Span::styled(message, styles::muted_style())));
    }
    None
}

fn render_search_line<T>(frame: &mut Frame, app: &App, list: &ListController<T>, area: Rect) {
    let searching = app.state == AppState::Searching;
    let mut spans = vec![Span::styled(" Search: ", styles::muted_style())];

    if searching || !list.search_input().is_empty() {
        let cursor = if searching { "▌" } else { "" };
        spans.push(Span::styled(
            format!("{}{}", list.search_input(), cursor),
            styles::search_style(list.is_search_pending()),
        ));
        if list.is_search_pending() {
            spans.push(Span::styled("  …", styles::muted_style()));
        }
    } else {
        spans.push(Span::styled("[/] to search", styles::muted_style()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_pagination<T>(frame: &mut Frame, list: &ListController<T>, area: Rect) {
    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(list.page_label(), styles::highlight_style()),
        Span::raw("   "),
        Span::styled("[", styles::help_key_style()),
        Span::styled(" / ", styles::muted_style()),
        Span::styled("]", styles::help_key_style()),
        Span::styled(" prev/next page", styles::muted_style()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// First/last name cells, showing the edit buffer with a cursor when the
/// row is being edited.
pub fn name_cells<'a>(
    form: Option<&NameEditForm>,
    id: &str,
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
) -> [Cell<'a>; 2] {
    match form.filter(|f| f.id == id) {
        Some(form) => {
            let cursor = |field: NameField| if form.focus == field { "▌" } else { "" };
            [
                Cell::from(format!("{}{}", form.first_name, cursor(NameField::First))),
                Cell::from(format!("{}{}", form.last_name, cursor(NameField::Last))),
            ]
        }
        None => [
            Cell::from(first_name.unwrap_or("-")),
            Cell::from(last_name.unwrap_or("-")),
        ],
    }
}
