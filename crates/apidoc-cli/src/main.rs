//! apidoc CLI - documentation gateway
//!
//! Serves the gateway and offers offline helpers for tokens, scopes and
//! password hashes, all driven by the same layered configuration.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod theme;

use commands::{config, password, scope, serve, token};

/// apidoc - documentation gateway
#[derive(Parser)]
#[command(name = "apidoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway
    Serve,

    /// View configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Issue and inspect access tokens
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// Evaluate scopes offline
    Scope {
        #[command(subcommand)]
        command: ScopeCommands,
    },

    /// Password helpers
    Password {
        #[command(subcommand)]
        command: PasswordCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved configuration and where each value came from
    Show,
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Issue a token signed with the configured secret
    Issue {
        /// Subject of the token
        #[arg(short, long)]
        user: String,

        /// Grant every scope
        #[arg(long, conflicts_with = "scope")]
        superuser: bool,

        /// Scope to grant (repeatable)
        #[arg(short, long, required_unless_present = "superuser")]
        scope: Vec<String>,
    },

    /// Verify a token and print its claims
    Inspect {
        /// The compact token
        token: String,
    },
}

#[derive(Subcommand)]
enum ScopeCommands {
    /// Check whether grants satisfy a route requirement
    Check {
        /// Granted scope (repeatable)
        #[arg(short, long)]
        grant: Vec<String>,

        /// Requirement template, e.g. `read:doc:appId:docId`
        #[arg(short, long)]
        require: String,

        /// Path parameter binding `name=value` (repeatable)
        #[arg(short, long)]
        param: Vec<String>,
    },
}

#[derive(Subcommand)]
enum PasswordCommands {
    /// Print a bcrypt hash for a user record
    Hash {
        /// Password to hash; read from stdin when omitted
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve => serve::run(config_path, cli.verbose).await?,
        Commands::Config {
            command: ConfigCommands::Show,
        } => config::show(config_path)?,
        Commands::Token { command } => match command {
            TokenCommands::Issue {
                user,
                superuser,
                scope,
            } => token::issue(config_path, &user, superuser, &scope)?,
            TokenCommands::Inspect { token } => token::inspect(config_path, &token)?,
        },
        Commands::Scope {
            command:
                ScopeCommands::Check {
                    grant,
                    require,
                    param,
                },
        } => scope::check(&grant, &require, &param)?,
        Commands::Password {
            command: PasswordCommands::Hash { password },
        } => password::hash(password)?,
    }

    Ok(())
}
