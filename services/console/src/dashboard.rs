//! Dashboard variant selection

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::token::{GUEST_EMAIL, decode_claims};

/// Account kind a session was opened with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Client,
}

impl Role {
    /// Value persisted in the store and used as the backend path segment
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Client => "Client",
        }
    }

    /// Exact, case-sensitive match on the persisted value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "User" => Some(Role::User),
            "Client" => Some(Role::Client),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two mutually exclusive dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DashboardVariant {
    User,
    Client,
}

impl DashboardVariant {
    /// Backend resources the dashboard loads when it opens
    pub fn data_paths(self) -> &'static [&'static str] {
        match self {
            DashboardVariant::User => &["/Client"],
            DashboardVariant::Client => &["/Api", "/ApiKey"],
        }
    }
}

/// Pick the dashboard for a stored role value
///
/// Only `"Client"` selects the client dashboard. Anything else, including a
/// missing role, falls back to the less privileged user dashboard.
pub fn select_dashboard_variant(stored_role: Option<&str>) -> DashboardVariant {
    match stored_role.and_then(Role::parse) {
        Some(Role::Client) => DashboardVariant::Client,
        Some(Role::User) => DashboardVariant::User,
        None => {
            if let Some(role) = stored_role {
                debug!("Unrecognized role {:?}, showing user dashboard", role);
            }
            DashboardVariant::User
        }
    }
}

/// Identity shown on the client dashboard and used to scope its data loads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContext {
    pub client_id: Option<String>,
    pub email: String,
}

/// Identity shown on the user dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserContext {
    pub email: String,
}

impl UserContext {
    fn guest() -> Self {
        UserContext {
            email: GUEST_EMAIL.to_string(),
        }
    }
}

/// A selected dashboard together with what it displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Dashboard {
    User(UserContext),
    /// `None` when the token could not be decoded; the dashboard then shows
    /// no identity and loads no data
    Client(Option<ClientContext>),
}

impl Dashboard {
    pub fn variant(&self) -> DashboardVariant {
        match self {
            Dashboard::User(_) => DashboardVariant::User,
            Dashboard::Client(_) => DashboardVariant::Client,
        }
    }
}

/// Select the dashboard and decode the identity it needs from `token`
pub fn build_dashboard(stored_role: Option<&str>, token: Option<&str>) -> Dashboard {
    let claims = token.and_then(|token| match decode_claims(token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            warn!("Invalid token: {}", e);
            None
        }
    });

    match select_dashboard_variant(stored_role) {
        DashboardVariant::Client => Dashboard::Client(claims.map(|claims| ClientContext {
            client_id: claims.client_id,
            email: claims.email,
        })),
        DashboardVariant::User => Dashboard::User(
            claims
                .map(|claims| UserContext {
                    email: claims.email,
                })
                .unwrap_or_else(UserContext::guest),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::encode_unsigned;
    use serde_json::json;

    #[test]
    fn test_only_client_selects_client_variant() {
        assert_eq!(
            select_dashboard_variant(Some("Client")),
            DashboardVariant::Client
        );
        assert_eq!(
            select_dashboard_variant(Some("User")),
            DashboardVariant::User
        );
        assert_eq!(select_dashboard_variant(None), DashboardVariant::User);
        assert_eq!(
            select_dashboard_variant(Some("anything-else")),
            DashboardVariant::User
        );
        assert_eq!(
            select_dashboard_variant(Some("client")),
            DashboardVariant::User
        );
    }

    #[test]
    fn test_data_paths() {
        assert_eq!(DashboardVariant::User.data_paths(), ["/Client"]);
        assert_eq!(DashboardVariant::Client.data_paths(), ["/Api", "/ApiKey"]);
    }

    #[test]
    fn test_role_round_trips_through_store_value() {
        for role in [Role::User, Role::Client] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_client_dashboard_reads_claims() {
        let token = encode_unsigned(&json!({ "exp": 1, "clientId": "C1", "email": "a@b.com" }));
        let dashboard = build_dashboard(Some("Client"), Some(&token));

        assert_eq!(
            dashboard,
            Dashboard::Client(Some(ClientContext {
                client_id: Some("C1".to_string()),
                email: "a@b.com".to_string(),
            }))
        );
    }

    #[test]
    fn test_client_dashboard_degrades_on_bad_token() {
        let dashboard = build_dashboard(Some("Client"), Some("not-a-token"));
        assert_eq!(dashboard, Dashboard::Client(None));
        assert_eq!(dashboard.variant(), DashboardVariant::Client);
    }

    #[test]
    fn test_user_dashboard_defaults_to_guest() {
        let dashboard = build_dashboard(None, None);
        assert_eq!(
            dashboard,
            Dashboard::User(UserContext {
                email: "Guest".to_string()
            })
        );
    }
}
