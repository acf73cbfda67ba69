use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use bookdesk_core::utils::format_count;

use crate::app::App;
use crate::ui::styles;

/// Render the Home tab - greeting and one card per catalog count
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Greeting
            Constraint::Length(5), // Count cards
            Constraint::Min(0),
        ])
        .split(area);

    let name = app.admin_name().unwrap_or_else(|| "admin".to_string());
    let greeting = vec![
        Line::from(Span::styled(format!(" Welcome back, {}", name), styles::title_style())),
        Line::from(Span::styled(
            " Manage users, authors, audiobooks and categories from the tabs above.",
            styles::muted_style(),
        )),
    ];
    frame.render_widget(Paragraph::new(greeting), chunks[0]);

    if let Some(ref error) = app.counts_error {
        let paragraph = Paragraph::new(Span::styled(format!(" Error: {}", error), styles::error_style()));
        frame.render_widget(paragraph, chunks[1]);
        return;
    }

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(chunks[1]);

    let series = app.counts.map(|c| c.series());
    for (i, card) in cards.iter().enumerate() {
        let (label, value) = match series {
            Some(series) => (series[i].0, format_count(series[i].1)),
            None => (["Users", "Authors", "Audiobooks"][i], "…".to_string()),
        };
        let block = Block::default()
            .title(format!(" {} ", label))
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::series_style(i));
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(value, styles::series_style(i))),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(paragraph, *card);
    }
}
