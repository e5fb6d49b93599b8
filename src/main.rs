//! ShetJi Loan Advisor
//!
//! Terminal chat assistant for loan questions in the Indian context. Each
//! message is sent to a hosted chat-completion model together with a fixed
//! advisory instruction and the conversation so far.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod providers;
mod ui;

use crate::config::{Config, ConfigError, Overrides};
use crate::conversation::Session;
use crate::core::Advisor;
use crate::ui::Console;

#[derive(Debug, Parser)]
#[command(name = "shetji", about = "ShetJi Loan Advisor - AI loan assistant", version)]
struct Cli {
    /// TOML config file
    #[arg(short, long, env = "ADVISOR_CONFIG")]
    config: Option<PathBuf>,

    /// Provider preset: mistral, openai or groq
    #[arg(long)]
    provider: Option<String>,

    /// Model identifier sent with every request
    #[arg(short, long)]
    model: Option<String>,

    /// Send a single message instead of entering interactive mode
    #[arg(long)]
    message: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "shetji=debug" } else { "shetji=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config_path = cli.config;
    let overrides = Overrides {
        provider: cli.provider,
        model: cli.model,
    };

    let startup = async {
        let config = Config::load(config_path.as_deref(), overrides)?;
        let instruction = config.load_instruction().await?;
        Ok::<_, ConfigError>((config, instruction))
    };

    let (config, instruction) = match startup.await {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };
    tracing::debug!(?config, "Configuration resolved");

    let provider = providers::from_config(&config)?;
    let advisor = Advisor::new(provider, instruction, config.model.clone());

    tracing::info!(
        provider = %advisor.provider_name(),
        model = %advisor.model(),
        instruction_chars = advisor.instruction().len(),
        "Advisor ready"
    );

    let mut console = Console::new(io::stdout(), io::stderr(), config.display.clone());

    if let Some(message) = cli.message {
        let mut session = Session::new();
        console.working()?;
        let exchange = advisor.respond(&mut session, &message).await?;
        console.done_working()?;

        if let Some(ref notice) = exchange.notice {
            console.notice(notice)?;
        }
        println!("{}", exchange.reply);
        return Ok(());
    }

    let stdin = BufReader::new(tokio::io::stdin());
    ui::run(&advisor, stdin, &mut console).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_single_message() {
        let cli = Cli::try_parse_from([
            "shetji",
            "--provider",
            "groq",
            "-m",
            "llama-3.3-70b-versatile",
            "--message",
            "I want a home loan.",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.provider.as_deref(), Some("groq"));
        assert_eq!(cli.model.as_deref(), Some("llama-3.3-70b-versatile"));
        assert_eq!(cli.message.as_deref(), Some("I want a home loan."));
        assert!(cli.verbose);
    }
}
