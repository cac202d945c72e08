mod cli;
mod handlers;
mod output;
mod store;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use sprintboard_core::AppConfig;
use tracing_subscriber::EnvFilter;

/// `SPRINTBOARD_DEBUG_LOG` sends debug output to a file. Otherwise logs go
/// to stderr, filtered by `RUST_LOG`, so stdout stays clean JSON.
fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("SPRINTBOARD_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .init();
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load();
    if let Some(file) = cli.file {
        config.data_file = Some(file);
    }

    match cli.command {
        Commands::Serve(args) => {
            handlers::serve::handle(config, cli.backend, args).await?;
        }
        Commands::User(user_cmd) => {
            let store = store::open(cli.backend, &config.effective_data_file()).await?;
            handlers::user::handle(store.as_ref(), user_cmd.action).await?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "sprintboard",
                &mut std::io::stdout(),
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    };
    init_tracing(default_level)?;

    if let Err(e) = run(cli).await {
        output::output_error(&format!("{:#}", e));
    }
    Ok(())
}
