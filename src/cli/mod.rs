pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jobly")]
#[command(about = "Jobly CLI - operational tasks for the Jobly API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Print a signed token for a username")]
    Token(commands::token::TokenArgs),

    #[command(about = "Register a user directly in the database")]
    CreateUser(commands::user::CreateUserArgs),

    #[command(about = "Check database connectivity")]
    Ping,
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

    match cli.command {
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::CreateUser(args) => commands::user::handle(args, output_format).await,
        Commands::Ping => commands::ping::handle(output_format).await,
    }
}
