use anyhow::{bail, Context, Result};
use std::fmt;
use std::io::Write;
use tracing::{info, warn};

use crate::registry::{
    models::{DeleteOutcome, ImageIdentifier, Repository, TagStatus},
    ImageRegistry, RegistryError,
};

/// How the driver reacts to a failed list or delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Record per-repository failures and move on instead of aborting
    pub continue_on_error: bool,
}

/// A failure recorded while running with `continue_on_error`
#[derive(Debug)]
pub struct CleanupFailure {
    pub repository: String,
    pub digest: Option<String>,
    pub error: RegistryError,
}

impl fmt::Display for CleanupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.digest {
            Some(digest) => write!(f, "{}@{}: {}", self.repository, digest, self.error),
            None => write!(f, "{}: {}", self.repository, self.error),
        }
    }
}

/// An image the registry refused to delete inside an accepted request
///
/// Never fatal: untagged children of multi-arch manifest lists always come
/// back as "ImageReferencedByManifestList".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedImage {
    pub repository: String,
    pub digest: String,
    pub code: String,
    pub reason: String,
}

/// Summary of a completed run
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub repositories: usize,
    pub deleted: usize,
    pub rejected: Vec<RejectedImage>,
    pub failures: Vec<CleanupFailure>,
}

/// Deletes every untagged image in every repository of a registry
///
/// Progress lines go to `out`; the binary passes stdout.
pub struct Cleanup<'a, R: ImageRegistry + ?Sized, W: Write> {
    registry: &'a R,
    options: CleanupOptions,
    out: W,
}

impl<'a, R: ImageRegistry + ?Sized, W: Write> Cleanup<'a, R, W> {
    pub fn new(registry: &'a R, options: CleanupOptions, out: W) -> Self {
        Self {
            registry,
            options,
            out,
        }
    }

    /// Run the cleanup to completion
    ///
    /// Repositories and images are processed strictly in the order the
    /// registry returns them. Without `continue_on_error` the first error ends
    /// the run and nothing after it is attempted.
    pub async fn run(mut self) -> Result<CleanupReport> {
        let repositories = self
            .registry
            .list_repositories()
            .await
            .context("Failed to enumerate repositories")?;
        info!("Found {} repositories", repositories.len());

        let mut report = CleanupReport {
            repositories: repositories.len(),
            ..Default::default()
        };

        for repo in &repositories {
            self.clean_repository(repo, &mut report).await?;
        }

        info!(
            repositories = report.repositories,
            deleted = report.deleted,
            rejected = report.rejected.len(),
            failed = report.failures.len(),
            "Cleanup finished"
        );

        if !report.failures.is_empty() {
            let lines: Vec<String> = report
                .failures
                .iter()
                .map(|f| format!("  - {}", f))
                .collect();
            bail!(
                "{} operation(s) failed during cleanup:\n{}",
                report.failures.len(),
                lines.join("\n")
            );
        }

        Ok(report)
    }

    async fn clean_repository(
        &mut self,
        repo: &Repository,
        report: &mut CleanupReport,
    ) -> Result<()> {
        let images = match self
            .registry
            .list_images(&repo.name, TagStatus::Untagged)
            .await
        {
            Ok(images) => images,
            Err(error) => {
                return self.record_or_abort(report, repo, None, error);
            }
        };

        if images.is_empty() {
            info!("No untagged images in {}", repo.name);
            return Ok(());
        }
        info!("Found {} untagged images in {}", images.len(), repo.name);

        for image in &images {
            match self.delete_image(repo, image).await {
                Ok(DeleteOutcome::Deleted) => report.deleted += 1,
                Ok(DeleteOutcome::Rejected { code, reason }) => {
                    warn!(
                        "Image {} in repo {} was not deleted: {}: {}",
                        image.digest, repo.name, code, reason
                    );
                    report.rejected.push(RejectedImage {
                        repository: repo.name.clone(),
                        digest: image.digest.clone(),
                        code,
                        reason,
                    });
                }
                Err(error) => {
                    self.record_or_abort(report, repo, Some(&image.digest), error)?;
                }
            }
        }

        Ok(())
    }

    async fn delete_image(
        &mut self,
        repo: &Repository,
        image: &ImageIdentifier,
    ) -> std::result::Result<DeleteOutcome, RegistryError> {
        // Progress output is best effort
        let _ = writeln!(
            self.out,
            "#### Deleting image {} in repo {} ####",
            image.digest, repo.name
        );

        let outcome = self.registry.delete_image(&repo.name, &image.digest).await?;

        if outcome == DeleteOutcome::Deleted {
            let _ = writeln!(self.out, "... Image deleted!");
        }
        Ok(outcome)
    }

    fn record_or_abort(
        &self,
        report: &mut CleanupReport,
        repo: &Repository,
        digest: Option<&str>,
        error: RegistryError,
    ) -> Result<()> {
        if !self.options.continue_on_error {
            return Err(anyhow::Error::new(error)
                .context(format!("Cleanup of repository '{}' aborted", repo.name)));
        }

        warn!("{}; continuing with remaining work", error);
        report.failures.push(CleanupFailure {
            repository: repo.name.clone(),
            digest: digest.map(String::from),
            error,
        });
        Ok(())
    }
}
