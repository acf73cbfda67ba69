//! Paginated, searchable list state shared by every entity screen.

mod controller;
mod debounce;

pub use controller::{FetchState, ListController, DEFAULT_PAGE_SIZE};
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
