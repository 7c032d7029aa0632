//! CLI entry and dispatch.
//!
//! Commands map onto the app's route paths and pass through the session
//! gate before running, so onboarding, guest browsing, and auth prompts
//! behave the same here as in any other consumer of the core.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::api::{BackendClient, ContentClient};
use crate::auth::{AuthState, SessionManager};
use crate::config::Config;
use crate::gate::{self, GateAction, GateInput};
use crate::paths;
use crate::store::SessionStore;

mod commands;

#[derive(Parser)]
#[command(name = "opphub")]
#[command(version)]
#[command(about = "Opportunities Hub terminal client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Log out and clear the local session
    Logout,

    /// Show the current session state
    Status,

    /// Browse opportunity posts
    Posts {
        #[command(subcommand)]
        command: PostsCommands,
    },

    /// List post categories
    Categories,

    /// Show the home feed (fresh rail + latest posts)
    Home,

    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Perform the daily check-in
    Checkin,

    /// Show the community leaderboard
    Leaderboard {
        /// Entries per page
        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Number of pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum PostsCommands {
    /// Lists posts, newest first
    List {
        /// Number of pages to accumulate
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Only posts tagged with this category id
        #[arg(long)]
        category: Option<u64>,

        /// Case-insensitive search over title and content
        #[arg(long)]
        search: Option<String>,
    },
    /// Shows a single post
    Show {
        #[arg(value_name = "POST_ID")]
        id: u64,
    },
}

#[derive(clap::Subcommand)]
enum ProfileCommands {
    /// Show your profile
    Show,
    /// Update basic profile fields
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// May be given multiple times
        #[arg(long = "skill")]
        skills: Vec<String>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

/// Everything the command handlers need.
pub(crate) struct App {
    pub config: Config,
    pub store: SessionStore,
    pub content: ContentClient,
    pub backend: BackendClient,
    pub session: SessionManager,
    pub auth: AuthState,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config commands are purely local; skip session restore and gating.
    if let Commands::Config { command } = &cli.command {
        return match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        };
    }

    let config = Config::load().context("load config")?;
    let store = SessionStore::new();
    let content = ContentClient::new(config.content_base_url()?);
    let backend = BackendClient::new(config.api_base_url()?, store.clone());
    let session = SessionManager::new(backend.clone(), store.clone());

    // Cold-start restore; a missing session just means guest mode.
    let mut auth = AuthState::default();
    let _ = session.check_auth_status(&mut auth).await;

    let mut app = App {
        config,
        store,
        content,
        backend,
        session,
        auth,
    };

    if !apply_gate(&mut app, route_for(&cli.command))? {
        return Ok(());
    }

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&mut app, &email, &password).await,
        Commands::Signup {
            name,
            email,
            password,
        } => commands::auth::signup(&mut app, &name, &email, &password).await,
        Commands::Logout => commands::auth::logout(&mut app).await,
        Commands::Status => commands::auth::status(&app),

        Commands::Posts { command } => match command {
            PostsCommands::List {
                pages,
                category,
                search,
            } => commands::feed::list(&app, pages, category, search.as_deref()).await,
            PostsCommands::Show { id } => commands::feed::show(&app, id).await,
        },
        Commands::Categories => commands::feed::categories(&app).await,
        Commands::Home => commands::feed::home(&app).await,

        Commands::Profile { command } => match command {
            ProfileCommands::Show => commands::community::profile_show(&app).await,
            ProfileCommands::Update { name, bio, skills } => {
                commands::community::profile_update(&app, name, bio, skills).await
            }
        },
        Commands::Checkin => commands::community::check_in(&app).await,
        Commands::Leaderboard { limit, pages } => {
            commands::community::leaderboard(&app, limit, pages).await
        }

        Commands::Config { .. } => unreachable!("handled above"),
    }
}

/// The route path each command corresponds to.
fn route_for(command: &Commands) -> &'static str {
    match command {
        Commands::Login { .. } => "/login",
        Commands::Signup { .. } => "/signup",
        Commands::Profile {
            command: ProfileCommands::Update { .. },
        } => "/profile/edit",
        Commands::Profile { .. } | Commands::Checkin => "/profile",
        Commands::Leaderboard { .. } => "/community",
        _ => gate::HOME_PATH,
    }
}

/// Runs the session gate for the requested route and performs the
/// corresponding side effect. Returns false when the command itself
/// should not run.
fn apply_gate(app: &mut App, path: &str) -> Result<bool> {
    loop {
        let decision = gate::decide(&GateInput {
            onboarding_completed: app.store.onboarding_completed(),
            is_authenticated: app.auth.is_authenticated,
            loading: app.auth.loading,
            path,
        });

        match decision {
            GateAction::RedirectOnboarding => {
                commands::onboarding(&app.store)?;
                // Re-decide with the flag now set.
            }
            GateAction::AuthPrompt { title, message } => {
                anyhow::bail!("{title}\n{message}");
            }
            GateAction::RedirectHome => {
                println!("Already signed in. Nothing to do here.");
                return Ok(false);
            }
            GateAction::Wait | GateAction::Allow => return Ok(true),
        }
    }
}

/// Initializes file logging under ${OPPHUB_HOME}/logs.
///
/// Returns the appender guard; logging silently stays off if the log
/// directory cannot be created.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let dir = paths::logs_dir();
    std::fs::create_dir_all(&dir).ok()?;

    let appender = tracing_appender::rolling::daily(dir, "opphub.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("OPPHUB_LOG").unwrap_or_else(|_| EnvFilter::new("opphub=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}
