//! Application state management for bookdesk.
//!
//! This module contains the core `App` struct: auth, the API client, the
//! query cache, one list controller per entity screen, form and overlay
//! state, and background task coordination. Network calls run on spawned
//! tokio tasks that report back over an mpsc channel; the UI loop drains it
//! with `check_background_tasks` and advances debounces and queries with
//! `tick`.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use bookdesk_core::api::{ApiClient, ApiError, ApiResult, Endpoint, MutationRequest};
use bookdesk_core::auth::{AuthAction, Session, SessionData, SharedAuth};
use bookdesk_core::cache::{QueryCache, QueryKey, Tag};
use bookdesk_core::config::Config;
use bookdesk_core::forms::{
    can_add_search_char, CategoryForm, LoginField, LoginForm, NameEditForm, LOGIN_FAILED_MESSAGE,
};
use bookdesk_core::listing::{FetchState, ListController};
use bookdesk_core::models::{
    Audiobook, Author, Category, Entity, EntityKind, ListQuery, LoginResponse, Page, User,
};
use bookdesk_core::notify::Notifications;
use bookdesk_core::routing::{resolve, Resolution, Route};
use bookdesk_core::stats::{CatalogCounts, ChartKind};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Environment variables prefilling the login form
const EMAIL_ENV: &str = "BOOKDESK_EMAIL";
const PASSWORD_ENV: &str = "BOOKDESK_PASSWORD";

// ============================================================================
// UI State Enums
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    Editing,
    AddingCategory,
    ConfirmingDelete,
    ShowingHelp,
    LoggingIn,
    ConfirmingQuit,
    Quitting,
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

// ============================================================================
// Query Data
// ============================================================================

/// Values stored in the query cache.
#[derive(Debug, Clone)]
pub enum QueryData {
    Users(Page<User>),
    Authors(Page<Author>),
    Audiobooks(Page<Audiobook>),
    Categories(Page<Category>),
    AuthorBooks(Vec<Audiobook>),
    Count(u64),
}

/// Entities with their own list screen.
pub trait Listed: Entity + DeserializeOwned + Clone + Send + 'static {
    fn list(app: &App) -> &ListController<Self>;
    fn list_mut(app: &mut App) -> &mut ListController<Self>;
    fn wrap(page: Page<Self>) -> QueryData;
    fn unwrap(data: &QueryData) -> Option<&Page<Self>>;
}

impl Listed for User {
    fn list(app: &App) -> &ListController<Self> {
        &app.users
    }
    fn list_mut(app: &mut App) -> &mut ListController<Self> {
        &mut app.users
    }
    fn wrap(page: Page<Self>) -> QueryData {
        QueryData::Users(page)
    }
    fn unwrap(data: &QueryData) -> Option<&Page<Self>> {
        match data {
            QueryData::Users(page) => Some(page),
            _ => None,
        }
    }
}

impl Listed for Author {
    fn list(app: &App) -> &ListController<Self> {
        &app.authors
    }
    fn list_mut(app: &mut App) -> &mut ListController<Self> {
        &mut app.authors
    }
    fn wrap(page: Page<Self>) -> QueryData {
        QueryData::Authors(page)
    }
    fn unwrap(data: &QueryData) -> Option<&Page<Self>> {
        match data {
            QueryData::Authors(page) => Some(page),
            _ => None,
        }
    }
}

impl Listed for Audiobook {
    fn list(app: &App) -> &ListController<Self> {
        &app.audiobooks
    }
    fn list_mut(app: &mut App) -> &mut ListController<Self> {
        &mut app.audiobooks
    }
    fn wrap(page: Page<Self>) -> QueryData {
        QueryData::Audiobooks(page)
    }
    fn unwrap(data: &QueryData) -> Option<&Page<Self>> {
        match data {
            QueryData::Audiobooks(page) => Some(page),
            _ => None,
        }
    }
}

impl Listed for Category {
    fn list(app: &App) -> &ListController<Self> {
        &app.categories
    }
    fn list_mut(app: &mut App) -> &mut ListController<Self> {
        &mut app.categories
    }
    fn wrap(page: Page<Self>) -> QueryData {
        QueryData::Categories(page)
    }
    fn unwrap(data: &QueryData) -> Option<&Page<Self>> {
        match data {
            QueryData::Categories(page) => Some(page),
            _ => None,
        }
    }
}

/// Kind-independent list operations driven by the keyboard.
pub trait ListNav {
    fn next_page(&mut self);
    fn prev_page(&mut self);
    fn select_next(&mut self);
    fn select_prev(&mut self);
    fn push_search_char(&mut self, c: char, now: Instant);
    fn pop_search_char(&mut self, now: Instant);
    fn clear_search(&mut self);
    fn search_input(&self) -> &str;
}

impl<T> ListNav for ListController<T> {
    fn next_page(&mut self) {
        ListController::next_page(self)
    }
    fn prev_page(&mut self) {
        ListController::prev_page(self)
    }
    fn select_next(&mut self) {
        ListController::select_next(self)
    }
    fn select_prev(&mut self) {
        ListController::select_prev(self)
    }
    fn push_search_char(&mut self, c: char, now: Instant) {
        ListController::push_search_char(self, c, now)
    }
    fn pop_search_char(&mut self, now: Instant) {
        ListController::pop_search_char(self, now)
    }
    fn clear_search(&mut self) {
        ListController::clear_search(self)
    }
    fn search_input(&self) -> &str {
        ListController::search_input(self)
    }
}

/// Audiobooks of the author selected on the Authors screen.
#[derive(Debug, Clone)]
pub struct AuthorBooks {
    pub author_id: Option<String>,
    pub state: FetchState<Audiobook>,
    pub selection: usize,
    dirty: bool,
}

impl Default for AuthorBooks {
    fn default() -> Self {
        Self {
            author_id: None,
            state: FetchState::Idle,
            selection: 0,
            dirty: false,
        }
    }
}

impl AuthorBooks {
    fn for_author(author_id: String) -> Self {
        Self {
            author_id: Some(author_id),
            dirty: true,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[Audiobook] {
        match &self.state {
            FetchState::Loaded(page) => &page.rows,
            _ => &[],
        }
    }

    pub fn selected(&self) -> Option<&Audiobook> {
        self.rows().get(self.selection)
    }
}

/// A delete waiting for the admin to confirm.
#[derive(Debug, Clone)]
pub struct PendingDelete {
    pub request: MutationRequest,
    /// Human-readable name of the row
    pub label: String,
    /// Deleted from the list screen itself (as opposed to the author books panel)
    pub from_list: bool,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned network tasks back to the UI loop.
enum FetchResult {
    Page {
        key: QueryKey,
        request: u64,
        query: ListQuery,
        result: ApiResult<QueryData>,
    },
    AuthorBooks {
        key: QueryKey,
        request: u64,
        author_id: String,
        result: ApiResult<Vec<Audiobook>>,
    },
    Counts {
        request: u64,
        result: ApiResult<CatalogCounts>,
    },
    Login {
        email: String,
        remember_me: bool,
        result: ApiResult<LoginResponse>,
    },
    Mutation {
        request: MutationRequest,
        from_list: bool,
        result: ApiResult<()>,
    },
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub auth: SharedAuth,
    pub api: ApiClient,
    pub cache: QueryCache<QueryData>,

    // UI State
    pub state: AppState,
    pub route: Route,
    pub focus: Focus,
    pub chart_kind: ChartKind,

    // List screens
    pub users: ListController<User>,
    pub authors: ListController<Author>,
    pub audiobooks: ListController<Audiobook>,
    pub categories: ListController<Category>,
    pub author_books: AuthorBooks,

    // Counts for the home and statistics screens
    pub counts: Option<CatalogCounts>,
    pub counts_error: Option<String>,
    counts_dirty: bool,

    // Forms and overlays
    pub login_form: LoginForm,
    pub login_pending: bool,
    pub edit_form: Option<NameEditForm>,
    pub category_form: CategoryForm,
    pub pending_delete: Option<PendingDelete>,

    // Feedback
    pub notifications: Notifications,
    pub status_message: Option<String>,

    // Query bookkeeping: the key each visible endpoint is subscribed to,
    // and the id of the request on the wire for each key
    watched: HashMap<Endpoint, QueryKey>,
    in_flight: HashMap<QueryKey, u64>,
    next_request: u64,

    // Bumped on logout so results of earlier sessions are dropped
    epoch: u64,
    fetch_rx: mpsc::Receiver<(u64, FetchResult)>,
    fetch_tx: mpsc::Sender<(u64, FetchResult)>,
}

impl App {
    /// Create a new application instance from the stored config and session
    pub fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        let auth = SharedAuth::with_store(Session::new(cache_dir));
        let api = ApiClient::new(&config.base_url(), auth.clone())?;
        info!(base_url = api.base_url(), "API client ready");

        Ok(Self::with_parts(config, auth, api))
    }

    pub fn with_parts(config: Config, auth: SharedAuth, api: ApiClient) -> Self {
        let page_size = config.page_size();
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Credentials from env vars or config
        let email = std::env::var(EMAIL_ENV)
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        let mut login_form = LoginForm::with_email(email);
        login_form.password = std::env::var(PASSWORD_ENV).unwrap_or_default();

        let route = resolve(Route::Home, &auth.snapshot()).route();
        let state = if route == Route::Login {
            AppState::LoggingIn
        } else {
            AppState::Normal
        };

        Self {
            config,
            auth,
            api,
            cache: QueryCache::new(),

            state,
            route,
            focus: Focus::List,
            chart_kind: ChartKind::default(),

            users: ListController::new(EntityKind::User, page_size),
            authors: ListController::new(EntityKind::Author, page_size),
            audiobooks: ListController::new(EntityKind::Audiobook, page_size),
            categories: ListController::new(EntityKind::Category, page_size),
            author_books: AuthorBooks::default(),

            counts: None,
            counts_error: None,
            counts_dirty: true,

            login_form,
            login_pending: false,
            edit_form: None,
            category_form: CategoryForm::default(),
            pending_delete: None,

            notifications: Notifications::new(),
            status_message: None,

            watched: HashMap::new(),
            in_flight: HashMap::new(),
            next_request: 0,

            epoch: 0,
            fetch_rx: rx,
            fetch_tx: tx,
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_logged_in()
    }

    /// Name shown in the title bar
    pub fn admin_name(&self) -> Option<String> {
        self.auth
            .snapshot()
            .session()
            .map(SessionData::display_name)
    }

    /// Show the login screen
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.route = Route::Login;
        self.login_form.error = None;
        self.login_form.focus = if self.login_form.email.is_empty() {
            LoginField::Email
        } else {
            LoginField::Password
        };
    }

    /// Validate the login form and send it
    pub fn submit_login(&mut self) {
        if self.login_pending {
            return;
        }
        let credentials = match self.login_form.validate() {
            Ok(c) => c,
            Err(e) => {
                self.login_form.error = Some(e.to_string());
                return;
            }
        };
        self.login_form.error = None;
        self.login_pending = true;

        let remember_me = self.login_form.remember_me;
        let api = self.api.clone();
        self.spawn_task(async move {
            let result = api.login(&credentials).await;
            FetchResult::Login {
                email: credentials.email,
                remember_me,
                result,
            }
        });
    }

    fn finish_login(&mut self, email: String, remember_me: bool, result: ApiResult<LoginResponse>) {
        self.login_pending = false;
        match result {
            Ok(response) => {
                info!(email = %email, remember_me, "Login successful");
                let session = SessionData::from_login(&email, response, remember_me);
                self.auth.dispatch(AuthAction::LoggedIn(session));

                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_form.password.clear();
                self.login_form.error = None;
                self.state = AppState::Normal;
                self.navigate(Route::Home);
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.login_form.error = Some(login_error_message(&e));
                self.login_form.reset_password();
            }
        }
    }

    /// Sign out and return to the login screen
    pub fn logout(&mut self) {
        info!("Logging out");
        self.auth.dispatch(AuthAction::LoggedOut);
        self.reset_session_state();
        self.start_login();
    }

    /// Forget everything fetched under the previous credential
    fn reset_session_state(&mut self) {
        self.epoch += 1;
        self.cache.clear();
        self.watched.clear();
        self.in_flight.clear();

        let page_size = self.config.page_size();
        self.users = ListController::new(EntityKind::User, page_size);
        self.authors = ListController::new(EntityKind::Author, page_size);
        self.audiobooks = ListController::new(EntityKind::Audiobook, page_size);
        self.categories = ListController::new(EntityKind::Category, page_size);
        self.author_books = AuthorBooks::default();

        self.counts = None;
        self.counts_error = None;
        self.counts_dirty = true;

        self.edit_form = None;
        self.category_form.clear();
        self.pending_delete = None;
        self.status_message = None;
        self.focus = Focus::List;
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Go to `route`, subject to the auth guard
    pub fn navigate(&mut self, route: Route) {
        let resolution = resolve(route, &self.auth.snapshot());
        if let Resolution::Redirect(to) = resolution {
            debug!(from = ?route, to = ?to, "Route redirected");
        }
        let target = resolution.route();

        if target == Route::Login {
            if self.state != AppState::LoggingIn {
                self.reset_session_state();
                self.start_login();
            }
            return;
        }
        if target == self.route {
            return;
        }

        self.unwatch_all(Instant::now());
        self.route = target;
        self.focus = Focus::List;
        match target {
            Route::Users => self.users.refresh(),
            Route::Authors => {
                self.authors.refresh();
                self.author_books.dirty = true;
            }
            Route::Audiobooks => self.audiobooks.refresh(),
            Route::Categories => self.categories.refresh(),
            Route::Home | Route::Statistics => self.counts_dirty = true,
            Route::Login => {}
        }
    }

    pub fn next_tab(&mut self) {
        self.navigate(self.route.next());
    }

    pub fn prev_tab(&mut self) {
        self.navigate(self.route.prev());
    }

    /// List controller of the current screen, if it has one
    pub fn current_list(&mut self) -> Option<&mut dyn ListNav> {
        match self.route {
            Route::Users => Some(&mut self.users),
            Route::Authors => Some(&mut self.authors),
            Route::Audiobooks => Some(&mut self.audiobooks),
            Route::Categories => Some(&mut self.categories),
            _ => None,
        }
    }

    /// Open or close the author books panel
    pub fn toggle_author_books(&mut self) {
        if self.route != Route::Authors {
            return;
        }
        self.focus = match self.focus {
            Focus::List if self.authors.selected().is_some() => {
                self.author_books.dirty = true;
                Focus::Detail
            }
            _ => Focus::List,
        };
    }

    pub fn select_next_book(&mut self) {
        let len = self.author_books.rows().len();
        if self.author_books.selection + 1 < len {
            self.author_books.selection += 1;
        }
    }

    pub fn select_prev_book(&mut self) {
        self.author_books.selection = self.author_books.selection.saturating_sub(1);
    }

    // =========================================================================
    // Search
    // =========================================================================

    pub fn search_push(&mut self, c: char) {
        let now = Instant::now();
        if let Some(list) = self.current_list() {
            if can_add_search_char(list.search_input().chars().count(), c) {
                list.push_search_char(c, now);
            }
        }
    }

    pub fn search_pop(&mut self) {
        let now = Instant::now();
        if let Some(list) = self.current_list() {
            list.pop_search_char(now);
        }
    }

    pub fn clear_search(&mut self) {
        if let Some(list) = self.current_list() {
            list.clear_search();
        }
    }

    // =========================================================================
    // Query Polling
    // =========================================================================

    /// Advance debounces, enforce the auth guard, and start whatever loads
    /// the visible screen needs. Called once per UI loop iteration.
    pub fn tick(&mut self, now: Instant) {
        self.notifications.prune(now);
        let evicted = self.cache.collect_garbage(now);
        if evicted > 0 {
            debug!(evicted, "Evicted unused cache entries");
        }

        if self.state == AppState::LoggingIn {
            return;
        }

        // A 401 anywhere clears the credential; the guard does the rest
        if let Resolution::Redirect(Route::Login) = resolve(self.route, &self.auth.snapshot()) {
            warn!("Credential cleared, returning to login");
            self.reset_session_state();
            self.start_login();
            self.notifications
                .error("Your session has ended. Please log in again.", now);
            return;
        }

        match self.route {
            Route::Users => self.poll_list::<User>(now),
            Route::Authors => {
                self.poll_list::<Author>(now);
                if self.focus == Focus::Detail {
                    self.poll_author_books(now);
                }
            }
            Route::Audiobooks => self.poll_list::<Audiobook>(now),
            Route::Categories => self.poll_list::<Category>(now),
            Route::Home | Route::Statistics => self.poll_counts(now),
            Route::Login => {}
        }
    }

    fn poll_list<T: Listed>(&mut self, now: Instant) {
        let Some(query) = T::list_mut(self).poll(now) else {
            return;
        };
        let key = QueryKey::new(Endpoint::list_of(T::KIND), &query);
        self.watch(key.clone(), now);

        let cached = self
            .cache
            .get(&key)
            .and_then(|c| T::unwrap(&c.data))
            .cloned();
        if let Some(page) = cached {
            debug!(kind = ?T::KIND, page = query.page, "Serving list from cache");
            T::list_mut(self).on_loaded(&query, page);
            return;
        }

        let Some(request) = self.begin_request(&key) else {
            return;
        };
        let api = self.api.clone();
        self.spawn_task(async move {
            let result = api.fetch_page::<T>(&query).await.map(T::wrap);
            FetchResult::Page {
                key,
                request,
                query,
                result,
            }
        });
    }

    fn poll_author_books(&mut self, now: Instant) {
        let Some(author_id) = self.authors.selected().map(|a| a.id.clone()) else {
            return;
        };
        if self.author_books.author_id.as_deref() != Some(author_id.as_str()) {
            self.author_books = AuthorBooks::for_author(author_id.clone());
        }
        if !self.author_books.dirty {
            return;
        }
        self.author_books.dirty = false;

        let key = author_books_key(&author_id);
        self.watch(key.clone(), now);

        if let Some(QueryData::AuthorBooks(books)) = self.cache.get(&key).map(|c| &c.data) {
            let books = books.clone();
            self.set_author_books(books);
            return;
        }

        self.author_books.state = FetchState::Loading;
        let Some(request) = self.begin_request(&key) else {
            return;
        };
        let api = self.api.clone();
        self.spawn_task(async move {
            let result = api.fetch_author_audiobooks(&author_id).await;
            FetchResult::AuthorBooks {
                key,
                request,
                author_id,
                result,
            }
        });
    }

    fn set_author_books(&mut self, books: Vec<Audiobook>) {
        let total = books.len() as u64;
        self.author_books.selection = self
            .author_books
            .selection
            .min(books.len().saturating_sub(1));
        self.author_books.state = FetchState::Loaded(Page::new(books, total));
    }

    fn poll_counts(&mut self, now: Instant) {
        if !self.counts_dirty {
            return;
        }
        self.counts_dirty = false;

        let keys = count_keys();
        for key in &keys {
            self.watch(key.clone(), now);
        }

        let cached: Option<Vec<u64>> = keys
            .iter()
            .map(|k| match self.cache.get(k).map(|c| &c.data) {
                Some(QueryData::Count(n)) => Some(*n),
                _ => None,
            })
            .collect();
        if let Some(values) = cached {
            self.counts = Some(CatalogCounts {
                users: values[0],
                authors: values[1],
                audiobooks: values[2],
            });
            return;
        }

        let Some(request) = self.begin_request(&keys[0]) else {
            return;
        };
        self.counts_error = None;
        let api = self.api.clone();
        self.spawn_task(async move {
            let result = api.fetch_counts().await;
            FetchResult::Counts { request, result }
        });
    }

    /// Record a request for `key`, unless one is already on the wire
    fn begin_request(&mut self, key: &QueryKey) -> Option<u64> {
        if self.in_flight.contains_key(key) {
            return None;
        }
        self.next_request += 1;
        self.in_flight.insert(key.clone(), self.next_request);
        Some(self.next_request)
    }

    /// Whether a response is the one still awaited for `key`
    fn finish_request(&mut self, key: &QueryKey, request: u64) -> bool {
        if self.in_flight.get(key) != Some(&request) {
            debug!(endpoint = ?key.endpoint, request, "Dropping superseded response");
            return false;
        }
        self.in_flight.remove(key);
        true
    }

    fn watch(&mut self, key: QueryKey, now: Instant) {
        if self.watched.get(&key.endpoint) == Some(&key) {
            return;
        }
        if let Some(old) = self.watched.insert(key.endpoint, key.clone()) {
            self.cache.unsubscribe(&old, now);
        }
        self.cache.subscribe(&key, now);
    }

    fn unwatch_all(&mut self, now: Instant) {
        for (_, key) in self.watched.drain() {
            self.cache.unsubscribe(&key, now);
        }
    }

    /// Refetch whatever the current screen shows
    pub fn refresh_current(&mut self) {
        let tag = match self.route {
            Route::Home | Route::Statistics => Tag::Admin,
            Route::Login => return,
            route => match route.entity_kind() {
                Some(kind) => Tag::of(kind),
                None => return,
            },
        };
        info!(?tag, "Manual refresh");
        self.invalidate(tag);
        if self.route == Route::Authors && self.focus == Focus::Detail {
            self.invalidate(Tag::Audiobook);
        }
    }

    /// Invalidate a tag and schedule refetches of the queries still on screen
    fn invalidate(&mut self, tag: Tag) {
        // Requests sent before the change must not land as fresh data
        self.in_flight.retain(|key, _| key.tag() != tag);
        for key in self.cache.invalidate(tag) {
            match key.endpoint {
                Endpoint::UsersList => self.users.refresh(),
                Endpoint::AuthorsList => self.authors.refresh(),
                Endpoint::AudiobooksList => self.audiobooks.refresh(),
                Endpoint::CategoriesList => self.categories.refresh(),
                Endpoint::AudiobooksOfAuthor => self.author_books.dirty = true,
                Endpoint::UsersCount | Endpoint::AuthorsCount | Endpoint::AudiobooksCount => {
                    self.counts_dirty = true
                }
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Ask to delete the selected row (or the selected book in the author panel)
    pub fn request_delete(&mut self) {
        let pending = if self.route == Route::Authors && self.focus == Focus::Detail {
            self.author_books.selected().map(|book| PendingDelete {
                request: MutationRequest::delete(EntityKind::Audiobook, book.id.clone()),
                label: book_label(book),
                from_list: false,
            })
        } else {
            self.route.entity_kind().and_then(|kind| {
                self.selected_row(kind).map(|(id, label)| PendingDelete {
                    request: MutationRequest::delete(kind, id),
                    label,
                    from_list: true,
                })
            })
        };

        if let Some(pending) = pending {
            self.pending_delete = Some(pending);
            self.state = AppState::ConfirmingDelete;
        }
    }

    fn selected_row(&self, kind: EntityKind) -> Option<(String, String)> {
        match kind {
            EntityKind::User => self
                .users
                .selected()
                .map(|u| (u.id.clone(), person_label(u.full_name(), u.email.as_deref()))),
            EntityKind::Author => self
                .authors
                .selected()
                .map(|a| (a.id.clone(), person_label(a.full_name(), a.email.as_deref()))),
            EntityKind::Audiobook => self
                .audiobooks
                .selected()
                .map(|b| (b.id.clone(), book_label(b))),
            EntityKind::Category => self
                .categories
                .selected()
                .map(|c| (c.id.clone(), c.name.clone())),
        }
    }

    pub fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        if let Some(pending) = self.pending_delete.take() {
            self.perform(pending.request, pending.from_list);
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.state = AppState::Normal;
    }

    /// Open the inline name editor on the selected user or author
    pub fn start_edit(&mut self) {
        let form = match (self.route, self.focus) {
            (Route::Users, _) => self.users.selected().map(|u| {
                NameEditForm::new(u.id.clone(), u.first_name.as_deref(), u.last_name.as_deref())
            }),
            (Route::Authors, Focus::List) => self.authors.selected().map(|a| {
                NameEditForm::new(a.id.clone(), a.first_name.as_deref(), a.last_name.as_deref())
            }),
            _ => None,
        };
        let Some(form) = form else {
            return;
        };
        match self.route {
            Route::Users => self.users.begin_edit(form.id.clone()),
            _ => self.authors.begin_edit(form.id.clone()),
        }
        self.edit_form = Some(form);
        self.state = AppState::Editing;
    }

    pub fn cancel_edit(&mut self) {
        self.edit_form = None;
        self.users.cancel_edit();
        self.authors.cancel_edit();
        self.state = AppState::Normal;
    }

    pub fn submit_edit(&mut self) {
        let Some(form) = self.edit_form.as_ref() else {
            return;
        };
        match form.validate() {
            Ok(update) => {
                let request = match self.route {
                    Route::Users => MutationRequest::UpdateUser(update),
                    Route::Authors => MutationRequest::UpdateAuthor(update),
                    _ => return,
                };
                self.perform(request, true);
            }
            Err(e) => self.notifications.error(e.to_string(), Instant::now()),
        }
    }

    pub fn start_add_category(&mut self) {
        if self.route == Route::Categories {
            self.state = AppState::AddingCategory;
        }
    }

    pub fn cancel_add_category(&mut self) {
        self.state = AppState::Normal;
    }

    /// Validate and send the new category. A blank name never leaves the client.
    pub fn submit_category(&mut self) {
        match self.category_form.validate() {
            Ok(category) => self.perform(MutationRequest::AddCategory(category), true),
            Err(e) => self.notifications.error(e.to_string(), Instant::now()),
        }
    }

    fn perform(&mut self, request: MutationRequest, from_list: bool) {
        info!(mutation = ?request.mutation(), "Sending mutation");
        self.status_message = Some(match &request {
            MutationRequest::Delete { kind, .. } => format!("Deleting {}...", kind.noun()),
            MutationRequest::AddCategory(_) => "Adding category...".to_string(),
            _ => "Saving...".to_string(),
        });

        let api = self.api.clone();
        self.spawn_task(async move {
            let result = api.perform(&request).await;
            FetchResult::Mutation {
                request,
                from_list,
                result,
            }
        });
    }

    fn finish_mutation(
        &mut self,
        request: MutationRequest,
        from_list: bool,
        result: ApiResult<()>,
        now: Instant,
    ) {
        self.status_message = None;
        match result {
            Ok(()) => {
                self.notifications.success(request.success_message(), now);
                match &request {
                    MutationRequest::Delete { kind, .. } if from_list => self.on_row_deleted(*kind),
                    MutationRequest::UpdateUser(update) | MutationRequest::UpdateAuthor(update) => {
                        if self.edit_form.as_ref().map(|f| f.id.as_str()) == Some(update.id.as_str()) {
                            self.cancel_edit();
                        }
                    }
                    MutationRequest::AddCategory(_) => {
                        self.category_form.clear();
                        if self.state == AppState::AddingCategory {
                            self.state = AppState::Normal;
                        }
                    }
                    _ => {}
                }
                if let Some(tag) = request.mutation().invalidates() {
                    self.invalidate(tag);
                }
            }
            Err(e) => {
                warn!(error = %e, mutation = ?request.mutation(), "Mutation failed");
                self.notifications.error(
                    format!("{} {}", request.failure_message(), e.user_message()),
                    now,
                );
            }
        }
    }

    fn on_row_deleted(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::User => self.users.on_row_deleted(),
            EntityKind::Author => {
                self.authors.on_row_deleted();
                self.focus = Focus::List;
            }
            EntityKind::Audiobook => self.audiobooks.on_row_deleted(),
            EntityKind::Category => self.categories.on_row_deleted(),
        }
    }

    pub fn cycle_chart(&mut self) {
        self.chart_kind = self.chart_kind.next();
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    fn spawn_task<F>(&self, task: F)
    where
        F: Future<Output = FetchResult> + Send + 'static,
    {
        let tx = self.fetch_tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = task.await;
            if tx.send((epoch, result)).await.is_err() {
                debug!("Result channel closed, dropping result");
            }
        });
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(message) = self.fetch_rx.try_recv() {
            results.push(message);
        }

        let now = Instant::now();
        for (epoch, result) in results {
            self.process_fetch_result(epoch, result, now);
        }
    }

    fn process_fetch_result(&mut self, epoch: u64, result: FetchResult, now: Instant) {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "Dropping result from an earlier session");
            if let FetchResult::Login { .. } = result {
                self.login_pending = false;
            }
            return;
        }

        match result {
            FetchResult::Page {
                key,
                request,
                query,
                result,
            } => {
                if !self.finish_request(&key, request) {
                    return;
                }
                match result {
                    Ok(data) => {
                        self.cache.insert(key, data.clone(), now);
                        self.apply_page(&query, data);
                    }
                    Err(e) => {
                        warn!(error = %e, endpoint = ?key.endpoint, "List fetch failed");
                        self.fail_page(key.endpoint, &query, e.user_message());
                    }
                }
            }
            FetchResult::AuthorBooks {
                key,
                request,
                author_id,
                result,
            } => {
                if !self.finish_request(&key, request) {
                    return;
                }
                let current = self.author_books.author_id.as_deref() == Some(author_id.as_str());
                match result {
                    Ok(books) => {
                        self.cache.insert(key, QueryData::AuthorBooks(books.clone()), now);
                        if current {
                            self.set_author_books(books);
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, author_id = %author_id, "Author books fetch failed");
                        if current {
                            self.author_books.state = FetchState::Failed(e.user_message());
                        }
                    }
                }
            }
            FetchResult::Counts { request, result } => {
                let keys = count_keys();
                if !self.finish_request(&keys[0], request) {
                    return;
                }
                match result {
                    Ok(counts) => {
                        let values = [counts.users, counts.authors, counts.audiobooks];
                        for (key, value) in keys.into_iter().zip(values) {
                            self.cache.insert(key, QueryData::Count(value), now);
                        }
                        self.counts = Some(counts);
                        self.counts_error = None;
                    }
                    Err(e) => {
                        warn!(error = %e, "Count fetch failed");
                        self.counts_error = Some(e.user_message());
                    }
                }
            }
            FetchResult::Login {
                email,
                remember_me,
                result,
            } => self.finish_login(email, remember_me, result),
            FetchResult::Mutation {
                request,
                from_list,
                result,
            } => self.finish_mutation(request, from_list, result, now),
        }
    }

    fn apply_page(&mut self, query: &ListQuery, data: QueryData) {
        let accepted = match data {
            QueryData::Users(page) => self.users.on_loaded(query, page),
            QueryData::Authors(page) => self.authors.on_loaded(query, page),
            QueryData::Audiobooks(page) => self.audiobooks.on_loaded(query, page),
            QueryData::Categories(page) => self.categories.on_loaded(query, page),
            QueryData::AuthorBooks(_) | QueryData::Count(_) => false,
        };
        if !accepted {
            debug!(page = query.page, "List result no longer current");
        }
    }

    fn fail_page(&mut self, endpoint: Endpoint, query: &ListQuery, message: String) {
        match endpoint {
            Endpoint::UsersList => self.users.on_failed(query, message),
            Endpoint::AuthorsList => self.authors.on_failed(query, message),
            Endpoint::AudiobooksList => self.audiobooks.on_failed(query, message),
            Endpoint::CategoriesList => self.categories.on_failed(query, message),
            _ => false,
        };
    }

    /// Age of the data on the current list screen, for the status bar
    pub fn data_age<T: Listed>(&self) -> Option<String> {
        let query = T::list(self).current_query();
        let key = QueryKey::new(Endpoint::list_of(T::KIND), &query);
        self.cache.get(&key).map(|c| c.age_display())
    }
}

fn count_keys() -> [QueryKey; 3] {
    [
        QueryKey::bare(Endpoint::UsersCount),
        QueryKey::bare(Endpoint::AuthorsCount),
        QueryKey::bare(Endpoint::AudiobooksCount),
    ]
}

fn author_books_key(author_id: &str) -> QueryKey {
    QueryKey::new(
        Endpoint::AudiobooksOfAuthor,
        &serde_json::json!({ "authorId": author_id }),
    )
}

fn person_label(full_name: String, email: Option<&str>) -> String {
    if full_name.is_empty() {
        email.unwrap_or("this record").to_string()
    } else {
        full_name
    }
}

fn book_label(book: &Audiobook) -> String {
    book.title.clone().unwrap_or_else(|| "this audiobook".to_string())
}

/// Text shown under the login form when the server turns it down
pub fn login_error_message(e: &ApiError) -> String {
    match e {
        ApiError::NetworkError(_) => e.user_message(),
        _ => LOGIN_FAILED_MESSAGE.to_string(),
    }
}
