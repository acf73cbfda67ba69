//! Authentication state and session persistence.
//!
//! This module provides:
//! - `AuthState` / `AuthAction`: the signed-in state and its typed transitions
//! - `SharedAuth`: the state container injected into the API client and UI
//! - `Session`: durable storage for sessions that chose "remember me"

pub mod session;
pub mod state;

pub use session::{Session, SessionData};
pub use state::{AuthAction, AuthState, SharedAuth};
