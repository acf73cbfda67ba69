use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use bookdesk_core::forms::LoginField;
use bookdesk_core::models::{Audiobook, Author, Category, User};
use bookdesk_core::notify::Severity;
use bookdesk_core::routing::Route;
use bookdesk_core::utils::{mask, truncate_string};

use crate::app::{App, AppState, Focus};

use super::styles;
use super::tabs::{audiobooks, authors, categories, home, statistics, users};

const LOGO: [&str; 3] = [
    "  ╔╗ ╔═╗╔═╗╦╔═╔╦╗╔═╗╔═╗╦╔═",
    "  ╠╩╗║ ║║ ║╠╩╗ ║║║╣ ╚═╗╠╩╗",
    "  ╚═╝╚═╝╚═╝╩ ╩═╩╝╚═╝╚═╝╩ ╩",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Notification
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_notification(frame, app, chunks[3]);
    render_status_bar(frame, app, chunks[4]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Bookdesk Admin";
    let right = match app.admin_name() {
        Some(name) => format!("{}  [L] Logout  [?] Help", truncate_string(&name, 24)),
        None => "[?] Help".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + right.chars().count() + 2),
        )),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, route) in Route::TABS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, route.title());
        if app.route == *route {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.route {
        Route::Home | Route::Login => home::render(frame, app, area),
        Route::Users => users::render(frame, app, area),
        Route::Authors => authors::render(frame, app, area),
        Route::Audiobooks => audiobooks::render(frame, app, area),
        Route::Categories => categories::render(frame, app, area),
        Route::Statistics => statistics::render(frame, app, area),
    }
}

fn render_notification(frame: &mut Frame, app: &App, area: Rect) {
    let Some(toast) = app.notifications.latest() else {
        return;
    };
    let marker = match toast.severity {
        Severity::Success => "✓",
        Severity::Error => "✗",
    };
    let line = Line::from(Span::styled(
        format!(" {} {}", marker, toast.message),
        styles::toast_style(toast.severity),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        match data_age(app) {
            Some(age) => format!(" Updated {} ", age),
            None => String::new(),
        }
    };

    let shortcuts = match (app.state, app.route) {
        (AppState::Searching, _) => "Enter/Esc done | x clear",
        (AppState::Editing, _) => "Enter save | Tab field | Esc cancel",
        (_, Route::Authors) if app.focus == Focus::Detail => "d delete book | Tab close | q quit",
        (_, Route::Users) | (_, Route::Authors) => "/ search | e edit | d delete | r refresh | q quit",
        (_, Route::Audiobooks) => "/ search | d delete | r refresh | q quit",
        (_, Route::Categories) => "/ search | a add | d delete | r refresh | q quit",
        (_, Route::Statistics) => "c chart | r refresh | q quit",
        _ => "r refresh | q quit",
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn data_age(app: &App) -> Option<String> {
    match app.route {
        Route::Users => app.data_age::<User>(),
        Route::Authors => app.data_age::<Author>(),
        Route::Audiobooks => app.data_age::<Audiobook>(),
        Route::Categories => app.data_age::<Category>(),
        _ => None,
    }
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::text_style()),
    ])
}

fn logo_lines() -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|row| Line::from(Span::styled(*row, styles::title_style())))
        .collect()
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 30, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text = logo_lines();
    help_text.extend([
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-6", "Switch tabs"),
        help_line("←/→", "Prev/next tab"),
        help_line("↑/↓", "Navigate list"),
        help_line("[ / ]", "Prev/next page"),
        help_line("Enter/Tab", "Author's audiobooks"),
        help_line("Esc", "Go back"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("/", "Search"),
        help_line("x", "Clear search"),
        help_line("e", "Edit names (users, authors)"),
        help_line("a", "Add category"),
        help_line("d", "Delete selected"),
        help_line("c", "Cycle chart type"),
        help_line("r", "Refresh"),
        help_line("L", "Log out"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let form = &app.login_form;
    let height = if form.error.is_some() || app.login_pending { 15 } else { 13 };
    let area = centered_rect_fixed(50, height, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));

    let field_style = |focused: bool| styles::row_style(false, focused);

    let email_focused = form.focus == LoginField::Email;
    let email_display = format!("{:<24}", truncate_string(&form.email, 24));
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled("Email:    [", styles::muted_style()),
        Span::styled(
            format!("{}{}", email_display, if email_focused { "▌" } else { "" }),
            field_style(email_focused),
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = form.focus == LoginField::Password;
    let password_display = format!("{:<24}", truncate_string(&mask(&form.password), 24));
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(
            format!("{}{}", password_display, if password_focused { "▌" } else { "" }),
            field_style(password_focused),
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    let remember_focused = form.focus == LoginField::RememberMe;
    let checkbox = if form.remember_me { "[x]" } else { "[ ]" };
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled(format!("{} Remember me", checkbox), field_style(remember_focused)),
    ]));

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("   Enter", styles::help_key_style()),
        Span::styled(" sign in  ", styles::muted_style()),
        Span::styled("Tab", styles::help_key_style()),
        Span::styled(" next field  ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" quit", styles::muted_style()),
    ]));

    if app.login_pending {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("   Signing in...", styles::muted_style())));
    } else if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("   {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let Some(ref pending) = app.pending_delete else {
        return;
    };
    let area = centered_rect_fixed(50, 8, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            format!(" Delete {}?", pending.request.kind().noun()),
            styles::error_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", truncate_string(&pending.label, 44)),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 9, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
