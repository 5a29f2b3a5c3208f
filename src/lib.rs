pub mod cleanup;
pub mod registry;
pub mod settings;

use anyhow::{Context, Result};
use std::io;
use tracing::info;

use cleanup::{Cleanup, CleanupOptions, CleanupReport};
use registry::EcrRegistry;
use settings::Credentials;

/// Build an ECR client from the given credentials and delete every untagged
/// image it can see
pub async fn run(credentials: &Credentials, options: CleanupOptions) -> Result<CleanupReport> {
    let registry = EcrRegistry::new(credentials)
        .await
        .context("Failed to create ECR client")?;
    info!("Connected to ECR in {}", credentials.region);

    Cleanup::new(&registry, options, io::stdout())
        .run()
        .await
}
