use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use bookdesk_core::listing::FetchState;
use bookdesk_core::utils::format_optional;

use crate::app::{App, Focus};
use crate::ui::styles;
use crate::ui::tabs::list::{self, Columns};

/// Render the Authors tab. With the books panel open, the author's
/// audiobooks are listed beside the table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let (list_area, books_area) = if app.focus == Focus::Detail {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    let columns = Columns {
        headers: &["First name", "Last name", "Email"],
        widths: &[
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Fill(1),
        ],
    };
    let focused = app.focus == Focus::List;
    list::render_list(frame, app, &app.authors, list_area, focused, columns, |author| {
        let [first, last] = list::name_cells(
            app.edit_form.as_ref(),
            &author.id,
            author.first_name.as_deref(),
            author.last_name.as_deref(),
        );
        vec![first, last, Cell::from(author.email.as_deref().unwrap_or("-"))]
    });

    if let Some(books_area) = books_area {
        render_books_panel(frame, app, books_area);
    }
}

fn render_books_panel(frame: &mut Frame, app: &App, area: Rect) {
    let author_name = app
        .authors
        .selected()
        .map(|a| a.full_name())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "author".to_string());

    let block = Block::default()
        .title(format!(" Audiobooks by {} ", author_name))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let message = match &app.author_books.state {
        FetchState::Idle | FetchState::Loading => {
            Some(Span::styled(" Loading...", styles::muted_style()))
        }
        FetchState::Failed(error) => {
            Some(Span::styled(format!(" Error: {}", error), styles::error_style()))
        }
        FetchState::Loaded(page) if page.is_empty() => Some(Span::styled(
            " This author has no audiobooks.",
            styles::muted_style(),
        )),
        FetchState::Loaded(_) => None,
    };

    if let Some(message) = message {
        frame.render_widget(Paragraph::new(Line::from(message)).block(block), area);
        return;
    }

    let header = Row::new(vec![Cell::from("Title"), Cell::from("Category")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .author_books
        .rows()
        .iter()
        .enumerate()
        .map(|(i, book)| {
            let style = styles::row_style(false, i == app.author_books.selection);
            Row::new(vec![
                Cell::from(format_optional(book.title.as_deref(), "Untitled")),
                Cell::from(format_optional(book.category.as_deref(), "-")),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Fill(2), Constraint::Fill(1)])
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.author_books.selection));
    frame.render_stateful_widget(table, area, &mut state);
}
