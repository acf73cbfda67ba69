//! Statistics tab: the three catalog counts as a bar, area or share chart.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, Gauge, GraphType,
        Paragraph,
    },
    Frame,
};

use bookdesk_core::stats::{CatalogCounts, ChartKind};
use bookdesk_core::utils::format_count;

use crate::app::App;
use crate::ui::styles;

/// Samples between two neighbouring series on the area chart
const AREA_STEPS: usize = 50;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(8)])
        .split(area);

    render_chart_picker(frame, app.chart_kind, chunks[0]);

    let block = Block::default()
        .title(format!(" {} chart ", app.chart_kind.title()))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let Some(counts) = app.counts else {
        let text = match app.counts_error {
            Some(ref error) => Span::styled(format!(" Error: {}", error), styles::error_style()),
            None => Span::styled(" Loading...", styles::muted_style()),
        };
        frame.render_widget(Paragraph::new(text).block(block), chunks[1]);
        return;
    };

    match app.chart_kind {
        ChartKind::Bar => render_bar_chart(frame, &counts, block, chunks[1]),
        ChartKind::Area => render_area_chart(frame, &counts, block, chunks[1]),
        ChartKind::Pie => render_share_chart(frame, &counts, block, chunks[1]),
    }
}

fn render_chart_picker(frame: &mut Frame, current: ChartKind, area: Rect) {
    let mut spans = vec![Span::styled(" [c] ", styles::help_key_style())];
    for (i, kind) in ChartKind::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(kind.title(), styles::tab_style(*kind == current)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_bar_chart(frame: &mut Frame, counts: &CatalogCounts, block: Block, area: Rect) {
    let bars: Vec<Bar> = counts
        .series()
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            Bar::default()
                .value(*value)
                .label(Line::from(*label))
                .text_value(format_count(*value))
                .style(styles::series_style(i))
                .value_style(styles::selected_style())
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(12)
        .bar_gap(4)
        .max(counts.max().max(1));

    frame.render_widget(chart, area);
}

fn render_area_chart(frame: &mut Frame, counts: &CatalogCounts, block: Block, area: Rect) {
    let points = area_points(counts, AREA_STEPS);
    let peaks: Vec<(f64, f64)> = counts
        .series()
        .iter()
        .enumerate()
        .map(|(i, (_, value))| (i as f64, *value as f64))
        .collect();

    let datasets = vec![
        Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Bar)
            .style(styles::series_style(0))
            .data(&points),
        Dataset::default()
            .name("count")
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(styles::highlight_style())
            .data(&peaks),
    ];

    let top = (counts.max().max(1) as f64 * 1.1).ceil();
    let labels = counts.series().map(|(label, _)| label);

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(styles::muted_style())
                .bounds([0.0, 2.0])
                .labels(labels),
        )
        .y_axis(
            Axis::default()
                .style(styles::muted_style())
                .bounds([0.0, top])
                .labels([
                    "0".to_string(),
                    format_count((top / 2.0) as u64),
                    format_count(top as u64),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Each series' share of the total as a horizontal gauge
fn render_share_chart(frame: &mut Frame, counts: &CatalogCounts, block: Block, area: Rect) {
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    for (i, (label, pct)) in counts.shares().iter().enumerate() {
        let gauge = Gauge::default()
            .block(Block::default().title(format!(" {} ", label)))
            .gauge_style(styles::series_style(i))
            .ratio((pct / 100.0).clamp(0.0, 1.0))
            .label(format!("{:.1}%", pct));
        frame.render_widget(gauge, rows[i]);
    }

    let total = Paragraph::new(Span::styled(
        format!(" Total: {}", format_count(counts.total())),
        styles::muted_style(),
    ));
    frame.render_widget(total, rows[3]);
}

/// Piecewise-linear outline through the three counts at x = 0, 1, 2,
/// sampled densely so bar-type datasets fill the area beneath it.
fn area_points(counts: &CatalogCounts, steps: usize) -> Vec<(f64, f64)> {
    let values = counts.series().map(|(_, v)| v as f64);
    let steps = steps.max(1);
    let mut points = Vec::with_capacity(2 * steps + 1);
    for segment in 0..2 {
        let (from, to) = (values[segment], values[segment + 1]);
        for step in 0..steps {
            let t = step as f64 / steps as f64;
            points.push((segment as f64 + t, from + (to - from) * t));
        }
    }
    points.push((2.0, values[2]));
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_points_pass_through_counts() {
        let counts = CatalogCounts {
            users: 10,
            authors: 20,
            audiobooks: 0,
        };
        let points = area_points(&counts, 4);
        assert_eq!(points.len(), 9);
        assert_eq!(points[0], (0.0, 10.0));
        assert_eq!(points[2], (0.5, 15.0));
        assert_eq!(points[4], (1.0, 20.0));
        assert_eq!(points[8], (2.0, 0.0));
    }

    #[test]
    fn test_area_points_zero_steps() {
        let points = area_points(&CatalogCounts::default(), 0);
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|(_, y)| *y == 0.0));
    }
}
