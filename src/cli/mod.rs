//! CLI module for the ClubHub command-line client.
//!
//! Provides subcommands for working with a ClubHub backend:
//! - `login`, `otp`, `signup`, `logout`, `whoami` - session management
//! - `open <path>` - open a page through the route gate and print it
//! - `contact` - send the public contact form
//! - `clubs`, `events`, `attendance` - coordinator and member actions
//! - `config check` - validate configuration file

use anyhow::{anyhow, Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::{ApiClient, FilePart};
use crate::auth::{FileSession, Gate, SessionStore, UserResolver, UserSource};
use crate::config::Config;
use crate::forms::{fields, Fields, SubmitError};
use crate::models::AttendanceStatus;
use crate::pages::{self, PageOutcome};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "clubhub")]
#[command(author, version, about = "Command-line client for the college clubs portal", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "clubhub.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Backend URL (overrides `[api] base_url`)
    #[arg(long, env = "CLUBHUB_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        email: String,
        #[arg(long, env = "CLUBHUB_PASSWORD")]
        password: String,
    },

    /// One-time passcode sign-in
    #[command(subcommand)]
    Otp(OtpCommands),

    /// Create an account and sign in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CLUBHUB_PASSWORD")]
        password: String,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Open a page, e.g. `/dashboard` or `/clubs/<id>`
    Open { path: String },

    /// Send a message through the contact form
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },

    /// Club management commands
    #[command(subcommand)]
    Clubs(ClubsCommands),

    /// Event management commands
    #[command(subcommand)]
    Events(EventsCommands),

    /// Attendance commands
    #[command(subcommand)]
    Attendance(AttendanceCommands),

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum OtpCommands {
    /// Email a passcode
    Send { email: String },
    /// Sign in with the emailed passcode
    Verify { email: String, code: String },
}

#[derive(Subcommand, Debug)]
pub enum ClubsCommands {
    /// Create a club (super-admin)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        /// Club image to upload
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Change a club's name or description
    Edit {
        club_name: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a club
    Delete { club_name: String },
    /// Ask to join a club
    Join { club_id: String },
    /// Leave a club
    Leave { club_id: String },
}

#[derive(Subcommand, Debug)]
pub enum EventsCommands {
    /// Create an event for a club you coordinate
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        club: String,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Registration fee
        #[arg(long)]
        fee: Option<String>,
        /// Event poster to upload
        #[arg(long)]
        poster: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AttendanceCommands {
    /// Record a member's attendance at an event
    Mark {
        event_id: String,
        user_id: String,
        /// present, absent or late
        #[arg(long, default_value = "present")]
        status: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

/// Everything a command needs to talk to the backend.
pub struct Context {
    pub client: Arc<ApiClient>,
    pub users: Arc<UserResolver>,
    pub gate: Gate,
}

impl Context {
    pub fn new(config: &Config) -> Result<Self> {
        let session: Arc<dyn SessionStore> = Arc::new(FileSession::open(config.session.token_path()));
        let client = Arc::new(
            ApiClient::new(&config.api, session.clone()).context("Failed to create HTTP client")?,
        );
        let users = Arc::new(UserResolver::new(client.clone()));
        let gate = Gate::new(session, users.clone());
        Ok(Self {
            client,
            users,
            gate,
        })
    }
}

/// Turn a failed submission into a printable error.
fn submit_failed(err: SubmitError) -> anyhow::Error {
    match err {
        SubmitError::Fields(errors) => anyhow!("Please fix the following:\n{}", errors),
        SubmitError::Unauthenticated => anyhow!("Not logged in. Run `clubhub login` first."),
        SubmitError::Global(message) => anyhow!(message),
    }
}

fn optional(values: &mut Fields, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        values.insert(name.to_string(), value.clone());
    }
}

fn read_upload(field: &str, path: Option<&Path>) -> Result<Option<FilePart>> {
    path.map(|p| {
        FilePart::from_path(field, p).with_context(|| format!("Failed to read {}", p.display()))
    })
    .transpose()
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, ctx: &Context) -> Result<()> {
    let client = ctx.client.as_ref();
    match &cli.command {
        Commands::Login { email, password } => {
            let landing = pages::auth::login_with_password(client, email, password)
                .await
                .map_err(submit_failed)?;
            println!("[OK] Logged in. Home: {}", landing);
        }
        Commands::Otp(OtpCommands::Send { email }) => {
            let message = pages::auth::send_otp(client, email).await.map_err(submit_failed)?;
            println!("{}", message);
        }
        Commands::Otp(OtpCommands::Verify { email, code }) => {
            let landing = pages::auth::verify_otp(client, email, code)
                .await
                .map_err(submit_failed)?;
            println!("[OK] Logged in. Home: {}", landing);
        }
        Commands::Signup {
            name,
            email,
            password,
            phone,
        } => {
            let mut values = fields([
                ("name", name.as_str()),
                ("email", email.as_str()),
                ("password", password.as_str()),
            ]);
            optional(&mut values, "phone", phone);
            let landing = pages::auth::signup(client, &values).await.map_err(submit_failed)?;
            println!("[OK] Account created. Home: {}", landing);
        }
        Commands::Logout => {
            pages::auth::logout(client);
            println!("Logged out.");
        }
        Commands::Whoami => cmd_whoami(ctx).await?,
        Commands::Open { path } => cmd_open(ctx, path).await?,
        Commands::Contact {
            name,
            email,
            subject,
            message,
        } => {
            let values = fields([
                ("name", name.as_str()),
                ("email", email.as_str()),
                ("subject", subject.as_str()),
                ("message", message.as_str()),
            ]);
            let reply = pages::contact::send_message(client, &values)
                .await
                .map_err(submit_failed)?;
            println!("{}", reply);
        }
        Commands::Clubs(command) => cmd_clubs(client, command).await?,
        Commands::Events(EventsCommands::Create {
            title,
            description,
            date,
            club,
            time,
            location,
            fee,
            poster,
        }) => {
            let mut values = fields([
                ("title", title.as_str()),
                ("description", description.as_str()),
                ("date", date.as_str()),
                ("club", club.as_str()),
            ]);
            optional(&mut values, "time", time);
            optional(&mut values, "location", location);
            optional(&mut values, "registrationFee", fee);
            let poster = read_upload("image", poster.as_deref())?;
            let event = pages::events::create_event(client, &values, poster)
                .await
                .map_err(submit_failed)?;
            println!("[OK] Event created: {} ({})", event.title, event.id);
        }
        Commands::Attendance(AttendanceCommands::Mark {
            event_id,
            user_id,
            status,
        }) => {
            let status: AttendanceStatus = status.parse().map_err(|e: String| anyhow!(e))?;
            pages::attendance::mark_attendance(client, event_id, user_id, status)
                .await
                .map_err(submit_failed)?;
            println!("[OK] Marked {} as {}", user_id, status);
        }
        Commands::Config(ConfigCommands::Check) => cmd_config_check(cli)?,
    }
    Ok(())
}

async fn cmd_whoami(ctx: &Context) -> Result<()> {
    if ctx.client.session().get().is_none() {
        println!("Not logged in.");
        return Ok(());
    }
    match ctx.users.resolve().await {
        Ok(user) => {
            println!("Name:   {}", user.name);
            println!("Email:  {}", user.email);
            println!("Role:   {}", user.role());
            println!("Home:   {}", user.role().home());
        }
        Err(crate::auth::ResolveError::Unauthenticated) => {
            println!("Session expired. Log in again.");
        }
        Err(e) => anyhow::bail!("{}", e),
    }
    Ok(())
}

async fn cmd_open(ctx: &Context, path: &str) -> Result<()> {
    match pages::open(&ctx.gate, &ctx.client, path).await {
        PageOutcome::Rendered { route, body } => {
            if route != crate::router::Route::parse(path) {
                println!("-> {}", route);
                println!();
            }
            print!("{}", body);
        }
        PageOutcome::Redirect(route) => println!("-> {}", route),
        PageOutcome::Failed(message) => anyhow::bail!("{}", message),
        PageOutcome::Crashed(message) => {
            anyhow::bail!("Something went wrong on this page ({}). Reload to try again.", message)
        }
    }
    Ok(())
}

async fn cmd_clubs(client: &ApiClient, command: &ClubsCommands) -> Result<()> {
    use pages::clubs;

    match command {
        ClubsCommands::Create {
            name,
            description,
            category,
            image,
        } => {
            let values = fields([
                ("name", name.as_str()),
                ("description", description.as_str()),
                ("category", category.as_str()),
            ]);
            let image = read_upload("image", image.as_deref())?;
            let club = clubs::create_club(client, &values, image)
                .await
                .map_err(submit_failed)?;
            println!("[OK] Club created: {} ({})", club.name, club.id);
        }
        ClubsCommands::Edit {
            club_name,
            name,
            description,
        } => {
            let mut values = Fields::new();
            optional(&mut values, "name", name);
            optional(&mut values, "description", description);
            if values.is_empty() {
                anyhow::bail!("Nothing to change. Pass --name or --description.");
            }
            let club = clubs::edit_club(client, club_name, &values)
                .await
                .map_err(submit_failed)?;
            println!("[OK] Club updated: {}", club.name);
        }
        ClubsCommands::Delete { club_name } => {
            clubs::delete_club(client, club_name)
                .await
                .map_err(submit_failed)?;
            println!("[OK] Club deleted: {}", club_name);
        }
        ClubsCommands::Join { club_id } => {
            let message = clubs::join_club(client, club_id).await.map_err(submit_failed)?;
            println!("{}", message);
        }
        ClubsCommands::Leave { club_id } => {
            let message = clubs::leave_club(client, club_id).await.map_err(submit_failed)?;
            println!("{}", message);
        }
    }
    Ok(())
}

fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!("[!!] Configuration file not found: {}", config_path.display());
        println!();
        println!("Defaults will be used.");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("API:");
            println!("  Base URL:        {}", config.api.base_url);
            println!("  Timeout:         {}s", config.api.timeout_secs);
            println!("  Ranking timeout: {}s", config.api.ranking_timeout_secs);
            println!();
            println!("Session:");
            println!("  Token file:      {}", config.session.token_path().display());
            println!();
            println!("Logging:");
            println!("  Level:           {}", config.logging.level);
            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file has errors:");
            println!();
            println!("  {:#}", e);
            Err(e)
        }
    }
}
