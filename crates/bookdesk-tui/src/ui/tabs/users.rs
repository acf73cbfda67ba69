use ratatui::{
    layout::{Constraint, Rect},
    widgets::Cell,
    Frame,
};

use crate::app::App;
use crate::ui::tabs::list::{self, Columns};

/// Render the Users tab - paginated table with inline name editing
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Columns {
        headers: &["First name", "Last name", "Email"],
        widths: &[
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Fill(1),
        ],
    };

    list::render_list(frame, app, &app.users, area, true, columns, |user| {
        let [first, last] = list::name_cells(
            app.edit_form.as_ref(),
            &user.id,
            user.first_name.as_deref(),
            user.last_name.as_deref(),
        );
        vec![first, last, Cell::from(user.email.as_deref().unwrap_or("-"))]
    });
}
