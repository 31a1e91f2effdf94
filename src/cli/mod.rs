pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "admin")]
#[command(about = "Admin API - server and maintenance commands")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve,

    #[command(about = "Insert the permission vocabulary and the default roles")]
    Seed,

    #[command(about = "Issue a session token for a user id")]
    Token {
        #[arg(help = "User id to put in the token")]
        user_id: i64,
        #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },

    #[command(about = "Check whether a user may call a resource with a method")]
    Check {
        #[arg(help = "User id")]
        user_id: i64,
        #[arg(help = "Resource name, e.g. products")]
        resource: String,
        #[arg(long, default_value = "GET", help = "HTTP method")]
        method: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env();
    config.validate()?;

    match cli.command {
        Commands::Serve => crate::server::run(config).await,
        Commands::Seed => commands::seed::seed(&config, output_format).await,
        Commands::Token { user_id, hours } => {
            commands::token::issue(&config, user_id, hours, output_format)
        }
        Commands::Check {
            user_id,
            resource,
            method,
        } => commands::token::check(&config, user_id, &resource, &method, output_format).await,
    }
}
