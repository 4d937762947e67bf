//! AirAdvisor CLI — the main entry point.
//!
//! Commands:
//! - `onboard`  — Initialize config and the default rule file
//! - `gateway`  — Start the HTTP API server
//! - `profile`  — Save or show a health profile
//! - `ask`      — Run one advisory question
//! - `doctor`   — Diagnose system health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "airadvisor",
    about = "AirAdvisor — personalized air-quality health advice",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and the default rule file
    Onboard,

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage health profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Ask for advice for a stored profile
    Ask {
        /// Profile name
        name: String,

        /// City to look up air quality for
        #[arg(short, long)]
        city: String,

        /// Also print the pipeline diagnostics as JSON
        #[arg(long)]
        diagnostics: bool,

        /// The question
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },

    /// Diagnose system health
    Doctor,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Create or replace a profile
    Set {
        name: String,

        /// e.g. asthma, heart, copd, pregnant, none
        #[arg(short, long)]
        condition: String,

        /// child, adult, or senior
        #[arg(short, long)]
        age_group: String,
    },

    /// Show a stored profile
    Show { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Profile { action } => match action {
            ProfileAction::Set {
                name,
                condition,
                age_group,
            } => commands::profile::set(&name, &condition, &age_group).await?,
            ProfileAction::Show { name } => commands::profile::show(&name).await?,
        },
        Commands::Ask {
            name,
            city,
            diagnostics,
            question,
        } => commands::ask::run(&name, &city, &question.join(" "), diagnostics).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
