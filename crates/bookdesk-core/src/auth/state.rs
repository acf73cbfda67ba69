use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use super::session::{Session, SessionData};

/// Typed transitions of the auth state.
#[derive(Debug, Clone)]
pub enum AuthAction {
    LoggedIn(SessionData),
    LoggedOut,
}

/// Who is signed in, if anyone. Logged-in is derived from the presence of
/// a bearer token.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    session: Option<SessionData>,
}

impl AuthState {
    pub fn new(session: Option<SessionData>) -> Self {
        Self { session }
    }

    pub fn reduce(&mut self, action: AuthAction) {
        match action {
            AuthAction::LoggedIn(data) => self.session = Some(data),
            AuthAction::LoggedOut => self.session = None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.session
            .as_ref()
            .map(|s| s.token.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    pub fn session(&self) -> Option<&SessionData> {
        self.session.as_ref()
    }
}

/// Auth state shared between the request layer and the UI.
///
/// Every change goes through [`SharedAuth::dispatch`], which also keeps the
/// durable session file in step when a [`Session`] store is attached.
/// Clone is cheap.
#[derive(Debug, Clone, Default)]
pub struct SharedAuth {
    state: Arc<RwLock<AuthState>>,
    store: Option<Session>,
}

impl SharedAuth {
    pub fn new(state: AuthState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            store: None,
        }
    }

    /// Restore any remembered session from `store` and persist future changes to it.
    pub fn with_store(store: Session) -> Self {
        let restored = match store.load() {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to load remembered session, starting signed out");
                None
            }
        };
        if restored.is_some() {
            info!("Restored remembered session");
        }
        Self {
            state: Arc::new(RwLock::new(AuthState::new(restored))),
            store: Some(store),
        }
    }

    pub fn dispatch(&self, action: AuthAction) {
        if let Some(ref store) = self.store {
            let result = match &action {
                AuthAction::LoggedIn(data) => store.store(data),
                AuthAction::LoggedOut => store.clear(),
            };
            if let Err(e) = result {
                warn!(error = %e, "Failed to persist session change");
            }
        }
        self.write().reduce(action);
    }

    pub fn token(&self) -> Option<String> {
        self.read().token().map(str::to_string)
    }

    pub fn is_logged_in(&self) -> bool {
        self.read().is_logged_in()
    }

    pub fn snapshot(&self) -> AuthState {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, AuthState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn data(token: &str, remember_me: bool) -> SessionData {
        SessionData {
            token: token.to_string(),
            email: "admin@example.com".to_string(),
            admin_user: None,
            profile: None,
            is_author_login: false,
            remember_me,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_logged_in_derived_from_token() {
        let mut state = AuthState::default();
        assert!(!state.is_logged_in());

        state.reduce(AuthAction::LoggedIn(data("abc", false)));
        assert!(state.is_logged_in());
        assert_eq!(state.token(), Some("abc"));

        state.reduce(AuthAction::LoggedOut);
        assert!(!state.is_logged_in());
        assert!(state.session().is_none());
    }

    #[test]
    fn test_empty_token_is_not_logged_in() {
        let state = AuthState::new(Some(data("", true)));
        assert!(!state.is_logged_in());
    }

    #[test]
    fn test_shared_auth_clones_see_same_state() {
        let auth = SharedAuth::default();
        let other = auth.clone();
        auth.dispatch(AuthAction::LoggedIn(data("t1", false)));
        assert_eq!(other.token().as_deref(), Some("t1"));
        other.dispatch(AuthAction::LoggedOut);
        assert!(!auth.is_logged_in());
    }

    #[test]
    fn test_dispatch_persists_remembered_session() {
        let dir = tempfile::tempdir().unwrap();
        let auth = SharedAuth::with_store(Session::new(dir.path().to_path_buf()));
        assert!(!auth.is_logged_in());

        auth.dispatch(AuthAction::LoggedIn(data("durable", true)));

        // A fresh process restores it
        let restored = SharedAuth::with_store(Session::new(dir.path().to_path_buf()));
        assert_eq!(restored.token().as_deref(), Some("durable"));

        restored.dispatch(AuthAction::LoggedOut);
        let after_logout = SharedAuth::with_store(Session::new(dir.path().to_path_buf()));
        assert!(!after_logout.is_logged_in());
    }

    #[test]
    fn test_session_scoped_login_not_restored() {
        let dir = tempfile::tempdir().unwrap();
        let auth = SharedAuth::with_store(Session::new(dir.path().to_path_buf()));
        auth.dispatch(AuthAction::LoggedIn(data("ephemeral", false)));
        assert!(auth.is_logged_in());

        let restored = SharedAuth::with_store(Session::new(dir.path().to_path_buf()));
        assert!(!restored.is_logged_in());
    }
}
