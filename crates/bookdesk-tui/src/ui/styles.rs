use ratatui::style::{Color, Modifier, Style};

use bookdesk_core::notify::Severity;

// Catalog palette: cloth bindings on a dark shelf
pub const SPINE: Color = Color::Rgb(46, 139, 135);
pub const GILT: Color = Color::Rgb(214, 170, 76);
pub const PLUM: Color = Color::Rgb(150, 104, 170);
pub const LEAF: Color = Color::Rgb(110, 170, 90);
pub const SEAL: Color = Color::Rgb(200, 72, 60);
pub const PAPER: Color = Color::Rgb(228, 222, 208);
pub const DUST: Color = Color::Rgb(130, 124, 116);
pub const SHELF: Color = Color::Rgb(44, 38, 36);
const FOOTER: Color = Color::Rgb(30, 26, 26);

/// One color per chart series: users, authors, audiobooks
pub const SERIES: [Color; 3] = [SPINE, GILT, PLUM];

pub fn title_style() -> Style {
    Style::default().fg(SPINE).add_modifier(Modifier::BOLD)
}

pub fn text_style() -> Style {
    Style::default().fg(PAPER)
}

pub fn muted_style() -> Style {
    Style::default().fg(DUST)
}

pub fn highlight_style() -> Style {
    Style::default().fg(GILT)
}

pub fn error_style() -> Style {
    Style::default().fg(SEAL)
}

pub fn selected_style() -> Style {
    Style::default()
        .fg(PAPER)
        .bg(SHELF)
        .add_modifier(Modifier::BOLD)
}

/// Table row, marking the one being renamed in place
pub fn row_style(editing: bool, selected: bool) -> Style {
    if editing {
        Style::default()
            .fg(GILT)
            .bg(SHELF)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC)
    } else if selected {
        selected_style()
    } else {
        text_style()
    }
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(GILT)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(PAPER)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(SPINE)
    } else {
        Style::default().fg(DUST)
    }
}

/// Search text; dimmed until the debounce settles and the query goes out
pub fn search_style(pending: bool) -> Style {
    if pending {
        Style::default().fg(GILT).add_modifier(Modifier::DIM)
    } else {
        Style::default().fg(GILT).add_modifier(Modifier::BOLD)
    }
}

pub fn toast_style(severity: Severity) -> Style {
    match severity {
        Severity::Success => Style::default().fg(LEAF),
        Severity::Error => Style::default().fg(SEAL).add_modifier(Modifier::BOLD),
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(FOOTER).fg(PAPER)
}

pub fn help_key_style() -> Style {
    Style::default().fg(GILT).add_modifier(Modifier::BOLD)
}

pub fn series_style(index: usize) -> Style {
    Style::default().fg(SERIES[index % SERIES.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_row_wins_over_selection() {
        assert_eq!(row_style(true, true), row_style(true, false));
        assert_eq!(row_style(false, true), selected_style());
        assert_eq!(row_style(false, false), text_style());
    }

    #[test]
    fn test_series_colors_wrap() {
        assert_eq!(series_style(3), series_style(0));
    }
}
