use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecr_cleanup::cleanup::CleanupOptions;
use ecr_cleanup::settings::{self, Credentials};

/// Delete untagged images from every repository in an AWS ECR registry
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Environment file to load before reading the AWS_ECR_CLEANUP_SCRIPT_* variables
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
    /// Keep going after a failed list or delete and report all failures at the end
    #[arg(long)]
    continue_on_error: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    settings::load_env_file(&cli.env_file)?;
    let credentials = Credentials::from_env().context("Failed to load configuration")?;

    let options = CleanupOptions {
        continue_on_error: cli.continue_on_error,
    };
    ecr_cleanup::run(&credentials, options).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["ecr-cleanup"]).unwrap();
        assert_eq!(cli.env_file, PathBuf::from(".env"));
        assert!(!cli.continue_on_error);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "ecr-cleanup",
            "--env-file",
            "/etc/ecr-cleanup.env",
            "--continue-on-error",
        ])
        .unwrap();
        assert_eq!(cli.env_file, PathBuf::from("/etc/ecr-cleanup.env"));
        assert!(cli.continue_on_error);
    }
}
