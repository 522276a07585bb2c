use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use common::{ROLE_KEY, SessionStore, TOKEN_KEY};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use console::{
    ConsoleShell, Dashboard, Role, Screen, TokenValidator, Verdict,
    backend::BackendClient,
    config::ConsoleConfig,
    decode_claims,
    forms::{LoginForm, RegisterForm},
    session::SessionManager,
};

#[derive(Parser)]
#[command(name = "console")]
#[command(about = "Key-management console session gate", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the stored session is usable
    Status,
    /// Resolve a console path and print the screen that would be shown
    Open {
        #[arg(default_value = "/")]
        path: String,
        /// Fetch the dashboard's data from the backend when it renders
        #[arg(long)]
        load: bool,
    },
    /// Sign in and store the session
    Login {
        #[arg(long, value_enum, default_value_t = RoleArg::User)]
        role: RoleArg,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and store the session
    Register {
        #[arg(long, value_enum, default_value_t = RoleArg::User)]
        role: RoleArg,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long, default_value = "")]
        full_name: String,
        #[arg(long, default_value = "")]
        company_name: String,
    },
    /// Remove the stored session
    Logout,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    User,
    Client,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::User => Role::User,
            RoleArg::Client => Role::Client,
        }
    }
}

type Store = Arc<dyn SessionStore>;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ConsoleConfig::from_env()?;
    let store = config.open_store()?;
    let sessions = SessionManager::new(store.clone(), BackendClient::new(&config.backend_url));

    info!("Console using backend {}", config.backend_url);

    match cli.command {
        Commands::Status => status(&config, store)?,
        Commands::Open { path, load } => {
            let mut shell = mount(&config, store);
            let screen = shell.open(&path);
            print_screen(&screen, &sessions, load).await?;
        }
        Commands::Login {
            role,
            email,
            password,
        } => {
            let form = LoginForm { email, password };
            sessions.login(role.into(), &form).await?;
            println!("Login successful!");
            reload(&config, store, &sessions).await?;
        }
        Commands::Register {
            role,
            email,
            password,
            confirm_password,
            full_name,
            company_name,
        } => {
            let form = RegisterForm {
                email,
                password,
                confirm_password,
                full_name,
                company_name,
            };
            sessions.register(role.into(), &form).await?;
            println!("Registration successful!");
            reload(&config, store, &sessions).await?;
        }
        Commands::Logout => {
            sessions.logout()?;
            reload(&config, store, &sessions).await?;
        }
    }

    Ok(())
}

fn mount(config: &ConsoleConfig, store: Store) -> ConsoleShell<Store> {
    let validator = TokenValidator::new(store).role_purge(config.role_purge());
    let mut shell = ConsoleShell::new(validator, config.refresh_policy);
    shell.mount();
    shell
}

/// Remount and show where the user ends up, as a page reload would
async fn reload(
    config: &ConsoleConfig,
    store: Store,
    sessions: &SessionManager<Store>,
) -> Result<()> {
    let mut shell = mount(config, store);
    let screen = shell.open("/dashboard");
    print_screen(&screen, sessions, false).await
}

fn status(config: &ConsoleConfig, store: Store) -> Result<()> {
    let validator = TokenValidator::new(store.clone()).role_purge(config.role_purge());
    let verdict = validator.check();

    let (authenticated, reason) = match verdict {
        Verdict::Valid => (true, None),
        Verdict::Invalid(reason) => (false, Some(reason.to_string())),
    };

    let claims = match verdict {
        Verdict::Valid => stored_claims(&store)?,
        Verdict::Invalid(_) => None,
    };

    let report = json!({
        "authenticated": authenticated,
        "reason": reason,
        "role": store.get(ROLE_KEY)?,
        "claims": claims,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn stored_claims(store: &Store) -> Result<Option<serde_json::Value>> {
    let Some(token) = store.get(TOKEN_KEY)? else {
        return Ok(None);
    };
    Ok(decode_claims(&token)
        .ok()
        .map(serde_json::to_value)
        .transpose()?)
}

async fn print_screen(
    screen: &Screen,
    sessions: &SessionManager<Store>,
    load: bool,
) -> Result<()> {
    let mut output = serde_json::to_value(screen)?;

    let loadable = match &screen.dashboard {
        Some(Dashboard::Client(None)) | None => None,
        Some(dashboard) => Some(dashboard.variant()),
    };

    if let (true, Some(variant)) = (load, loadable) {
        let data: serde_json::Map<String, serde_json::Value> = sessions
            .load_dashboard_data(variant)
            .await?
            .into_iter()
            .map(|(path, value)| (path.to_string(), value))
            .collect();
        output["data"] = serde_json::Value::Object(data);
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
