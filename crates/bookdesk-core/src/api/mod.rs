//! REST API client module for the audiobook catalog admin backend.
//!
//! This module provides the `ApiClient` for talking to the admin API, the
//! declarative endpoint table that ties reads and writes to cache tags, and
//! the typed `ApiError` taxonomy.
//!
//! The API uses bearer token authentication obtained from
//! `POST /api/admin/login`.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod mutation;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use endpoints::{Endpoint, Mutation};
pub use error::{ApiError, ApiResult};
pub use mutation::MutationRequest;
