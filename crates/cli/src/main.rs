//! Tableau provisioner CLI - migrations, settings, and headless runs.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! tp-cli migrate
//!
//! # Show or change the stored settings
//! tp-cli settings show
//! tp-cli settings save --url https://tableau.corp.local --sheet "New Hires"
//!
//! # Provision users from a worksheet export
//! tp-cli provision --table new-hires.json
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::settings::SettingsEdits;

#[derive(Parser)]
#[command(name = "tp-cli")]
#[command(author, version, about = "Tableau provisioner CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Show or change the extension settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Add the users of the configured worksheet to Tableau
    Provision {
        /// JSON file with worksheet summary data
        #[arg(short, long)]
        table: PathBuf,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the stored settings
    Show {
        /// Also list the worksheets in this JSON file
        #[arg(short, long)]
        table: Option<PathBuf>,
    },
    /// Save settings; pass an empty value to clear a field
    Save {
        /// Tableau server URL
        #[arg(long)]
        url: Option<String>,

        /// REST API version (e.g. 3.17)
        #[arg(long)]
        api_version: Option<String>,

        /// Site content URL (empty for the default site)
        #[arg(long)]
        site: Option<String>,

        /// Tableau username
        #[arg(long)]
        username: Option<String>,

        /// Tableau password
        #[arg(long, env = "TABLEAU_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Worksheet holding the users to add
        #[arg(long)]
        sheet: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Settings { action } => match action {
            SettingsAction::Show { table } => commands::settings::show(table).await?,
            SettingsAction::Save {
                url,
                api_version,
                site,
                username,
                password,
                sheet,
            } => {
                commands::settings::save(SettingsEdits {
                    server_url: url,
                    api_version,
                    site_name: site,
                    username,
                    password,
                    data_source_name: sheet,
                })
                .await?;
            }
        },
        Commands::Provision { table } => commands::provision::run(table).await?,
    }
    Ok(())
}
