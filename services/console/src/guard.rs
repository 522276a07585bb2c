//! Route gating
//!
//! Maps a requested path and the current authentication state to the screen
//! that should be shown. Only the auth form and the dashboard are gated; the
//! landing page is always reachable.

use std::fmt;

use serde::Serialize;

/// Screens the console can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum View {
    Landing,
    AuthForm,
    Dashboard,
}

impl View {
    /// Path the view is served under
    pub fn path(self) -> &'static str {
        match self {
            View::Landing => "/",
            View::AuthForm => "/log_reg",
            View::Dashboard => "/dashboard",
        }
    }

    /// Look up the view for `path`, ignoring a trailing slash
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(View::Landing),
            "/log_reg" => Some(View::AuthForm),
            "/dashboard" => Some(View::Dashboard),
            _ => None,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Authentication state as last observed by the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AuthState {
    /// The validity check has not completed yet
    #[default]
    Pending,
    Unauthenticated,
    Authenticated,
}

impl From<bool> for AuthState {
    fn from(authenticated: bool) -> Self {
        if authenticated {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }
}

/// What to do with a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewDecision {
    /// Show this view
    Render(View),
    /// Navigate to this view instead
    Redirect(View),
    /// Show a neutral placeholder until the validity check resolves
    Loading,
    /// No view is served under the requested path
    NotFound,
}

/// Decide what to show for `path`
///
/// While the state is [`AuthState::Pending`] gated views resolve to
/// [`ViewDecision::Loading`] so that neither the auth form nor the dashboard
/// is shown before the session has been checked.
pub fn resolve_view(path: &str, auth: AuthState) -> ViewDecision {
    let Some(view) = View::from_path(path) else {
        return ViewDecision::NotFound;
    };

    match (view, auth) {
        (View::Landing, _) => ViewDecision::Render(View::Landing),
        (_, AuthState::Pending) => ViewDecision::Loading,
        (View::AuthForm, AuthState::Unauthenticated) => ViewDecision::Render(View::AuthForm),
        (View::AuthForm, AuthState::Authenticated) => ViewDecision::Redirect(View::Dashboard),
        (View::Dashboard, AuthState::Authenticated) => ViewDecision::Render(View::Dashboard),
        (View::Dashboard, AuthState::Unauthenticated) => ViewDecision::Redirect(View::AuthForm),
    }
}
