//! Session lifecycle: sign-in, registration and sign-out

use common::{ROLE_KEY, SessionStore, TOKEN_KEY};
use serde_json::Value;
use tracing::{info, warn};

use crate::backend::BackendClient;
use crate::dashboard::{DashboardVariant, Role};
use crate::error::ConsoleResult;
use crate::forms::{LoginForm, RegisterForm};

/// Writes and clears the persisted session
#[derive(Clone)]
pub struct SessionManager<S> {
    store: S,
    backend: BackendClient,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S, backend: BackendClient) -> Self {
        Self { store, backend }
    }

    /// Sign in and persist the issued token and role
    pub async fn login(&self, role: Role, form: &LoginForm) -> ConsoleResult<()> {
        form.validate()?;
        let token = self.backend.login(role, form).await?;
        self.persist(role, &token)?;
        info!("Login successful for {} account {}", role, form.email);
        Ok(())
    }

    /// Register an account and persist the issued token and role
    pub async fn register(&self, role: Role, form: &RegisterForm) -> ConsoleResult<()> {
        form.validate(role)?;
        let token = self.backend.register(role, form).await?;
        self.persist(role, &token)?;
        info!("Registration successful for {} account {}", role, form.email);
        Ok(())
    }

    /// Remove both the token and the role
    pub fn logout(&self) -> ConsoleResult<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(ROLE_KEY)?;
        info!("Logged out");
        Ok(())
    }

    /// Token of the current session, if any
    pub fn token(&self) -> ConsoleResult<Option<String>> {
        Ok(self.store.get(TOKEN_KEY)?)
    }

    /// Fetch the resources shown on `variant`
    ///
    /// Resources that fail to load are logged and left out. Without a stored
    /// token nothing is requested.
    pub async fn load_dashboard_data(
        &self,
        variant: DashboardVariant,
    ) -> ConsoleResult<Vec<(&'static str, Value)>> {
        let Some(token) = self.token()? else {
            return Ok(Vec::new());
        };

        let mut loaded = Vec::new();
        for path in variant.data_paths() {
            match self.backend.get_authorized(path, &token).await {
                Ok(data) => loaded.push((*path, data)),
                Err(e) => warn!("Failed to load {}: {}", path, e),
            }
        }
        Ok(loaded)
    }

    fn persist(&self, role: Role, token: &str) -> ConsoleResult<()> {
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(ROLE_KEY, role.as_str())?;
        Ok(())
    }
}
