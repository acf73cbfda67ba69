//! Screens and the guard that decides which one is shown.

use crate::auth::AuthState;
use crate::models::EntityKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Login,
    Home,
    Users,
    Authors,
    Audiobooks,
    Categories,
    Statistics,
}

impl Route {
    /// Screens reachable from the tab bar, in order.
    pub const TABS: [Route; 6] = [
        Route::Home,
        Route::Users,
        Route::Authors,
        Route::Audiobooks,
        Route::Categories,
        Route::Statistics,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Home => "Home",
            Route::Users => "Users",
            Route::Authors => "Authors",
            Route::Audiobooks => "Audiobooks",
            Route::Categories => "Categories",
            Route::Statistics => "Statistics",
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }

    /// The list screen of an entity kind.
    pub fn list_of(kind: EntityKind) -> Self {
        match kind {
            EntityKind::User => Route::Users,
            EntityKind::Author => Route::Authors,
            EntityKind::Audiobook => Route::Audiobooks,
            EntityKind::Category => Route::Categories,
        }
    }

    pub fn entity_kind(&self) -> Option<EntityKind> {
        match self {
            Route::Users => Some(EntityKind::User),
            Route::Authors => Some(EntityKind::Author),
            Route::Audiobooks => Some(EntityKind::Audiobook),
            Route::Categories => Some(EntityKind::Category),
            _ => None,
        }
    }

    fn tab_index(&self) -> Option<usize> {
        Self::TABS.iter().position(|r| r == self)
    }

    pub fn next(&self) -> Self {
        match self.tab_index() {
            Some(i) => Self::TABS[(i + 1) % Self::TABS.len()],
            None => *self,
        }
    }

    pub fn prev(&self) -> Self {
        match self.tab_index() {
            Some(i) => Self::TABS[(i + Self::TABS.len() - 1) % Self::TABS.len()],
            None => *self,
        }
    }
}

/// Outcome of asking for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Show this route; protected routes inside the shared chrome.
    Render(Route),
    Redirect(Route),
}

impl Resolution {
    /// The route that ends up on screen.
    pub fn route(&self) -> Route {
        match self {
            Resolution::Render(r) | Resolution::Redirect(r) => *r,
        }
    }
}

pub fn resolve(route: Route, auth: &AuthState) -> Resolution {
    match (route.is_protected(), auth.is_logged_in()) {
        (true, false) => Resolution::Redirect(Route::Login),
        (false, true) => Resolution::Redirect(Route::Home),
        _ => Resolution::Render(route),
    }
}
