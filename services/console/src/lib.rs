//! Session gating for the key-management console
//!
//! The console decides from a persisted session token which screen a user
//! may reach: the landing page, the sign-in/registration form, or one of two
//! dashboards chosen by the stored role. Token checks here are structural
//! only (shape and expiry); signatures are never verified client-side and
//! the backend stays the sole authority on authenticity.

pub mod backend;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod guard;
pub mod session;
pub mod shell;
pub mod token;
pub mod validator;

pub use dashboard::{Dashboard, DashboardVariant, Role, select_dashboard_variant};
pub use error::{ConsoleError, ConsoleResult};
pub use guard::{AuthState, View, ViewDecision, resolve_view};
pub use shell::{ConsoleShell, RefreshPolicy, Screen};
pub use token::{Claims, TokenError, decode_claims};
pub use validator::{TokenValidator, Verdict};
