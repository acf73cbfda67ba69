//! Data models for catalog entities.
//!
//! This module contains the records the admin API hands back and the
//! request bodies it accepts:
//!
//! - `User`, `Author`, `Audiobook`, `Category`: catalog entities
//! - `Page`, `ListQuery`: one page of a server-side paginated listing
//! - Request bodies: `Credentials`, `NameUpdate`, `NewCategory`

pub mod catalog;
pub mod page;
pub mod request;

pub use catalog::{Audiobook, Author, Category, Entity, EntityKind, User};
pub use page::{page_count, ListQuery, Page};
pub use request::{Credentials, LoginResponse, NameUpdate, NewCategory};
