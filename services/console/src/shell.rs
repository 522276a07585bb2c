//! Application shell
//!
//! Holds the authentication state for one mount of the console. The session
//! check runs once when the shell mounts and its result is cached; with the
//! default [`RefreshPolicy::OnMount`] a token that expires afterwards is only
//! noticed on the next mount. [`RefreshPolicy::EveryProtectedNavigation`]
//! re-checks before every gated view instead.

use common::{ROLE_KEY, SessionStore, TOKEN_KEY};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dashboard::{Dashboard, build_dashboard};
use crate::guard::{AuthState, View, ViewDecision, resolve_view};
use crate::validator::{Clock, SystemClock, TokenValidator};

/// When the cached session check is refreshed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Check once per mount
    #[default]
    OnMount,
    /// Check again before resolving the auth form or the dashboard
    #[serde(alias = "every_navigation")]
    EveryProtectedNavigation,
}

/// Result of a navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screen {
    /// Path that was requested
    pub path: String,
    pub decision: ViewDecision,
    /// Present exactly when the dashboard renders
    pub dashboard: Option<Dashboard>,
}

/// One mounted instance of the console
pub struct ConsoleShell<S, C = SystemClock> {
    validator: TokenValidator<S, C>,
    refresh: RefreshPolicy,
    auth: AuthState,
}

impl<S: SessionStore, C: Clock> ConsoleShell<S, C> {
    /// Create an unmounted shell
    pub fn new(validator: TokenValidator<S, C>, refresh: RefreshPolicy) -> Self {
        Self {
            validator,
            refresh,
            auth: AuthState::Pending,
        }
    }

    /// Current cached authentication state
    pub fn auth_state(&self) -> AuthState {
        self.auth
    }

    /// Run the session check and cache the result
    pub fn mount(&mut self) -> AuthState {
        self.auth = AuthState::from(self.validator.is_session_valid());
        info!("Console mounted: {:?}", self.auth);
        self.auth
    }

    /// Re-run the session check, as after a reload
    pub fn remount(&mut self) -> AuthState {
        self.auth = AuthState::Pending;
        self.mount()
    }

    /// Resolve `path` against the cached state
    pub fn navigate(&mut self, path: &str) -> Screen {
        let gated = matches!(
            View::from_path(path),
            Some(View::AuthForm | View::Dashboard)
        );
        if gated
            && self.auth != AuthState::Pending
            && self.refresh == RefreshPolicy::EveryProtectedNavigation
        {
            let previous = self.auth;
            self.auth = AuthState::from(self.validator.is_session_valid());
            if previous != self.auth {
                debug!("Session state changed to {:?} before {}", self.auth, path);
            }
        }

        let decision = resolve_view(path, self.auth);
        let dashboard = match decision {
            ViewDecision::Render(View::Dashboard) => Some(self.dashboard()),
            _ => None,
        };

        Screen {
            path: path.to_string(),
            decision,
            dashboard,
        }
    }

    /// Resolve `path` and follow any redirect to the screen finally shown
    pub fn open(&mut self, path: &str) -> Screen {
        let mut screen = self.navigate(path);
        // Gated views redirect to each other at most once per state
        for _ in 0..2 {
            match screen.decision {
                ViewDecision::Redirect(target) => screen = self.navigate(target.path()),
                _ => break,
            }
        }
        screen
    }

    fn dashboard(&self) -> Dashboard {
        let store = self.validator.store();
        let role = read_or_none(store, ROLE_KEY);
        let token = read_or_none(store, TOKEN_KEY);
        build_dashboard(role.as_deref(), token.as_deref())
    }
}

fn read_or_none<S: SessionStore>(store: &S, key: &str) -> Option<String> {
    store.get(key).unwrap_or_else(|e| {
        warn!("Failed to read {} from session store: {}", key, e);
        None
    })
}
