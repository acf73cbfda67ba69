//! Core library for bookdesk.
//!
//! Everything an audiobook catalog admin front end needs apart from drawing:
//!
//! - `api`: HTTP client, endpoint table, typed errors
//! - `auth`: signed-in state and remembered sessions
//! - `cache`: query cache invalidated by tags
//! - `listing`: paginated, debounced list state
//! - `routing`: screens and the auth guard
//! - `forms`, `notify`, `stats`, `config`, `utils`

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod forms;
pub mod listing;
pub mod models;
pub mod notify;
pub mod routing;
pub mod stats;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiResult};
pub use auth::{AuthAction, AuthState, Session, SessionData, SharedAuth};
pub use cache::{CachedData, QueryCache, QueryKey, Tag};
pub use config::Config;
pub use listing::{FetchState, ListController};
pub use models::{Audiobook, Author, Category, EntityKind, ListQuery, Page, User};
pub use routing::{resolve, Resolution, Route};
pub use stats::{CatalogCounts, ChartKind};
