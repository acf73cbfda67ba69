use std::time::Instant;

use tracing::debug;

use super::debounce::Debouncer;
use crate::models::{page_count, EntityKind, ListQuery, Page};

/// Rows per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// Where the current query stands.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Loaded(Page<T>),
    Failed(String),
}

/// Headless state of one paginated, searchable list screen.
///
/// The controller never performs I/O. The owner calls [`ListController::poll`]
/// on every tick; when it returns a query, the owner loads it (from cache or
/// the network) and reports back with [`ListController::on_loaded`] or
/// [`ListController::on_failed`]. Results for any query other than the
/// current one are ignored.
#[derive(Debug, Clone)]
pub struct ListController<T> {
    kind: EntityKind,
    page: u32,
    page_size: u32,
    /// What the admin has typed so far
    search_input: String,
    /// The search term queries are issued with, once the debounce settles
    search_term: String,
    debounce: Debouncer,
    state: FetchState<T>,
    /// Last total reported by the server, kept while a new page loads
    known_total: u64,
    /// The query last handed out by `poll`
    issued: Option<ListQuery>,
    dirty: bool,
    selected: usize,
    editing: Option<String>,
}

impl<T> ListController<T> {
    pub fn new(kind: EntityKind, page_size: u32) -> Self {
        Self {
            kind,
            page: 1,
            page_size: page_size.max(1),
            search_input: String::new(),
            search_term: String::new(),
            debounce: Debouncer::default(),
            state: FetchState::Idle,
            known_total: 0,
            issued: None,
            dirty: true,
            selected: 0,
            editing: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn current_query(&self) -> ListQuery {
        ListQuery::new(self.page, self.page_size, self.search_term.clone())
    }

    // ===== Search =====

    /// Replace the search text. Jumps back to page 1 and (re)starts the debounce.
    pub fn set_search(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        if text == self.search_input {
            return;
        }
        self.search_input = text;
        self.page = 1;
        self.debounce.schedule(now);
    }

    pub fn push_search_char(&mut self, c: char, now: Instant) {
        let mut text = self.search_input.clone();
        text.push(c);
        self.set_search(text, now);
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        let mut text = self.search_input.clone();
        if text.pop().is_some() {
            self.set_search(text, now);
        }
    }

    /// Drop the search immediately, without waiting for the debounce.
    pub fn clear_search(&mut self) {
        self.debounce.cancel();
        self.search_input.clear();
        self.page = 1;
        if !self.search_term.is_empty() {
            self.search_term.clear();
        }
        self.dirty = true;
    }

    pub fn is_search_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    // ===== Query lifecycle =====

    /// Advance the debounce and report the query to load, if the current one
    /// has not been requested yet.
    pub fn poll(&mut self, now: Instant) -> Option<ListQuery> {
        if self.debounce.fire(now) && self.search_term != self.search_input {
            self.search_term = self.search_input.clone();
            self.page = 1;
        }
        // Search edits move the page without a new query until the debounce settles
        if !self.debounce.is_pending() && self.issued.as_ref() != Some(&self.current_query()) {
            self.dirty = true;
        }
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        self.state = FetchState::Loading;
        let query = self.current_query();
        self.issued = Some(query.clone());
        debug!(kind = ?self.kind, page = query.page, search = %query.search_term, "List query issued");
        Some(query)
    }

    /// Ask for the current query to be loaded again on the next poll.
    pub fn refresh(&mut self) {
        self.dirty = true;
    }

    /// Accept a finished load. Returns false (and changes nothing) when the
    /// result belongs to a query that is no longer current.
    pub fn on_loaded(&mut self, query: &ListQuery, page: Page<T>) -> bool {
        if *query != self.current_query() {
            debug!(kind = ?self.kind, page = query.page, "Discarding stale list result");
            return false;
        }
        self.known_total = page.total;
        self.selected = self.selected.min(page.rows.len().saturating_sub(1));
        self.state = FetchState::Loaded(page);
        true
    }

    pub fn on_failed(&mut self, query: &ListQuery, message: impl Into<String>) -> bool {
        if *query != self.current_query() {
            return false;
        }
        self.state = FetchState::Failed(message.into());
        true
    }

    /// A row on the displayed page was deleted. When it was the last row
    /// on a page past the first, step back one page.
    pub fn on_row_deleted(&mut self) {
        if self.rows().len() == 1 && self.page > 1 {
            self.page -= 1;
            self.selected = 0;
        }
        self.dirty = true;
    }

    // ===== Pagination =====

    pub fn page_count(&self) -> u32 {
        page_count(self.known_total, self.page_size)
    }

    pub fn total(&self) -> u64 {
        self.known_total
    }

    /// Move to `page`, clamped to the pages that exist.
    pub fn go_to_page(&mut self, page: u32) {
        let last = self.page_count().max(1);
        let page = page.clamp(1, last);
        if page != self.page {
            self.page = page;
            self.selected = 0;
            self.dirty = true;
        }
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.page.saturating_sub(1));
    }

    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page, self.page_count().max(1))
    }

    // ===== Rows =====

    pub fn rows(&self) -> &[T] {
        match &self.state {
            FetchState::Loaded(page) => &page.rows,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FetchState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// "No results" only after a completed fetch that came back empty.
    pub fn show_no_results(&self) -> bool {
        matches!(&self.state, FetchState::Loaded(page) if page.is_empty())
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&T> {
        self.rows().get(self.selected)
    }

    pub fn select_next(&mut self) {
        let len = self.rows().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    // ===== Inline edit =====

    pub fn begin_edit(&mut self, id: impl Into<String>) {
        self.editing = Some(id.into());
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::SEARCH_DEBOUNCE;
    use std::time::Duration;

    fn loaded(ctrl: &mut ListController<u32>, rows: Vec<u32>, total: u64) {
        let query = ctrl.current_query();
        assert!(ctrl.on_loaded(&query, Page::new(rows, total)));
    }

    fn controller() -> ListController<u32> {
        ListController::new(EntityKind::User, DEFAULT_PAGE_SIZE)
    }

    #[test]
    fn test_first_poll_issues_query_once() {
        let now = Instant::now();
        let mut ctrl = controller();
        let query = ctrl.poll(now).unwrap();
        assert_eq!(query, ListQuery::new(1, 5, ""));
        assert!(ctrl.is_loading());
        assert!(ctrl.poll(now).is_none());
    }

    #[test]
    fn test_search_debounced_and_resets_page() {
        let start = Instant::now();
        let mut ctrl = controller();
        ctrl.poll(start);
        loaded(&mut ctrl, vec![1, 2, 3, 4, 5], 23);
        ctrl.go_to_page(3);
        ctrl.poll(start);

        ctrl.push_search_char('a', start);
        assert_eq!(ctrl.page(), 1);
        assert!(ctrl.poll(start + Duration::from_millis(100)).is_none());

        ctrl.push_search_char('b', start + Duration::from_millis(200));
        assert!(ctrl.poll(start + Duration::from_millis(400)).is_none());

        let query = ctrl.poll(start + Duration::from_millis(200) + SEARCH_DEBOUNCE).unwrap();
        assert_eq!(query, ListQuery::new(1, 5, "ab"));
    }

    #[test]
    fn test_search_edit_undone_still_requeries_page_one() {
        let start = Instant::now();
        let mut ctrl = controller();
        ctrl.poll(start);
        loaded(&mut ctrl, vec![1, 2, 3, 4, 5], 23);
        ctrl.go_to_page(3);
        ctrl.poll(start);
        loaded(&mut ctrl, vec![11, 12, 13, 14, 15], 23);

        ctrl.push_search_char('a', start);
        ctrl.pop_search_char(start);
        assert_eq!(ctrl.page(), 1);
        assert!(ctrl.poll(start + Duration::from_millis(100)).is_none());

        let query = ctrl.poll(start + SEARCH_DEBOUNCE);
        assert_eq!(query, Some(ListQuery::new(1, 5, "")));
        assert!(ctrl.is_loading());
        assert!(ctrl.rows().is_empty());
        assert!(ctrl.poll(start + SEARCH_DEBOUNCE).is_none());
    }

    #[test]
    fn test_stale_result_discarded() {
        let now = Instant::now();
        let mut ctrl = controller();
        let first = ctrl.poll(now).unwrap();
        loaded(&mut ctrl, vec![1, 2, 3, 4, 5], 12);

        ctrl.next_page();
        let second = ctrl.poll(now).unwrap();
        assert!(!ctrl.on_loaded(&first, Page::new(vec![9], 12)));
        assert!(ctrl.is_loading());
        assert!(ctrl.on_loaded(&second, Page::new(vec![6, 7, 8, 9, 10], 12)));
        assert_eq!(ctrl.rows(), &[6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_page_label_and_clamping() {
        let now = Instant::now();
        let mut ctrl = controller();
        ctrl.poll(now);
        loaded(&mut ctrl, vec![1, 2, 3, 4, 5], 23);
        assert_eq!(ctrl.page_count(), 5);

        ctrl.next_page();
        ctrl.poll(now);
        loaded(&mut ctrl, vec![6, 7, 8, 9, 10], 23);
        assert_eq!(ctrl.page_label(), "Page 2 of 5");

        ctrl.go_to_page(99);
        assert_eq!(ctrl.page(), 5);
        ctrl.go_to_page(0);
        assert_eq!(ctrl.page(), 1);
        ctrl.prev_page();
        assert_eq!(ctrl.page(), 1);
    }

    #[test]
    fn test_empty_total_label() {
        let mut ctrl = controller();
        ctrl.poll(Instant::now());
        loaded(&mut ctrl, vec![], 0);
        assert_eq!(ctrl.page_label(), "Page 1 of 1");
        assert!(ctrl.show_no_results());
    }

    #[test]
    fn test_no_results_only_after_successful_fetch() {
        let now = Instant::now();
        let mut ctrl = controller();
        assert!(!ctrl.show_no_results());
        let query = ctrl.poll(now).unwrap();
        assert!(!ctrl.show_no_results());
        ctrl.on_failed(&query, "boom");
        assert!(!ctrl.show_no_results());
        assert_eq!(ctrl.error(), Some("boom"));
    }

    #[test]
    fn test_deleting_last_row_steps_back() {
        let now = Instant::now();
        let mut ctrl = controller();
        ctrl.poll(now);
        loaded(&mut ctrl, vec![1, 2, 3, 4, 5], 6);
        ctrl.next_page();
        ctrl.poll(now);
        loaded(&mut ctrl, vec![6], 6);

        ctrl.on_row_deleted();
        assert_eq!(ctrl.page(), 1);
        assert_eq!(ctrl.poll(now), Some(ListQuery::new(1, 5, "")));
    }

    #[test]
    fn test_deleting_on_first_page_stays() {
        let now = Instant::now();
        let mut ctrl = controller();
        ctrl.poll(now);
        loaded(&mut ctrl, vec![1], 1);
        ctrl.on_row_deleted();
        assert_eq!(ctrl.page(), 1);
        assert!(ctrl.poll(now).is_some());
    }

    #[test]
    fn test_clear_search_is_immediate() {
        let start = Instant::now();
        let mut ctrl = controller();
        ctrl.poll(start);
        ctrl.set_search("tolkien", start);
        ctrl.poll(start + SEARCH_DEBOUNCE);

        ctrl.clear_search();
        assert!(!ctrl.is_search_pending());
        assert_eq!(ctrl.poll(start + SEARCH_DEBOUNCE), Some(ListQuery::new(1, 5, "")));
    }

    #[test]
    fn test_selection_clamped_to_rows() {
        let now = Instant::now();
        let mut ctrl = controller();
        ctrl.poll(now);
        loaded(&mut ctrl, vec![1, 2, 3], 3);
        ctrl.select_next();
        ctrl.select_next();
        ctrl.select_next();
        assert_eq!(ctrl.selected(), Some(&3));

        ctrl.refresh();
        ctrl.poll(now);
        loaded(&mut ctrl, vec![1], 1);
        assert_eq!(ctrl.selected(), Some(&1));
    }

    #[test]
    fn test_edit_tracking() {
        let mut ctrl = controller();
        ctrl.begin_edit("u1");
        assert_eq!(ctrl.editing_id(), Some("u1"));
        ctrl.cancel_edit();
        assert!(!ctrl.is_editing());
    }
}
