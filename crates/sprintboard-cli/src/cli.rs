use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "sprintboard")]
#[command(about = "Sprint and task tracking served as a JSON API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the board data file (or set SPRINTBOARD_FILE env var)
    #[arg(long, global = true, value_name = "FILE", env = "SPRINTBOARD_FILE")]
    pub file: Option<PathBuf>,

    /// Storage backend for the data file
    #[arg(long, global = true, value_enum, default_value_t = Backend::Json)]
    pub backend: Backend,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Json,
    /// Requires a build with the `sqlite` feature
    Sqlite,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// User operations
    User(UserCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on, e.g. 127.0.0.1:8000
    #[arg(long, env = "SPRINTBOARD_BIND")]
    pub bind: Option<String>,
    /// Base URL used in hyperlinks
    #[arg(long, env = "SPRINTBOARD_PUBLIC_URL")]
    pub public_url: Option<String>,
}

#[derive(Args)]
pub struct UserCommand {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Create a user and print its API token
    Add {
        #[arg(long)]
        username: String,
        #[command(flatten)]
        password: PasswordArgs,
        #[arg(long)]
        full_name: Option<String>,
    },
    /// Replace a user's password
    Passwd {
        #[arg(long)]
        username: String,
        #[command(flatten)]
        password: PasswordArgs,
    },
    /// List all users
    List,
    /// Get a specific user
    Get {
        #[arg(long)]
        username: String,
    },
    /// Stop a user from authenticating
    Deactivate {
        #[arg(long)]
        username: String,
    },
    /// Allow a deactivated user to authenticate again
    Activate {
        #[arg(long)]
        username: String,
    },
    /// Issue a new API token, invalidating the old one
    Token {
        #[arg(long)]
        username: String,
    },
    /// Delete a user; their tasks become unassigned
    Remove {
        #[arg(long)]
        username: String,
    },
}

/// Where a new password comes from. Prefer the env var or stdin; a flag
/// value is visible to other processes.
#[derive(Args)]
pub struct PasswordArgs {
    /// New password (or set SPRINTBOARD_PASSWORD env var)
    #[arg(long, env = "SPRINTBOARD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Read the password from the first line of stdin; wins over --password
    #[arg(long)]
    pub password_stdin: bool,
}
