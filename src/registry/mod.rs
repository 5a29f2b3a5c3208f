pub mod ecr;
pub mod models;

pub use ecr::EcrRegistry;

use crate::registry::models::{DeleteOutcome, ImageIdentifier, Repository, TagStatus};
use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by registry operations
///
/// Every variant is fatal to the caller by default; there is no distinction
/// between transient and permanent failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to describe repositories: {0}")]
    DescribeRepositories(String),

    #[error("Failed to list {tag_status} images in repository '{repository}': {message}")]
    ListImages {
        repository: String,
        tag_status: TagStatus,
        message: String,
    },

    #[error("Failed to delete image {digest} in repository '{repository}': {message}")]
    DeleteImage {
        repository: String,
        digest: String,
        message: String,
    },
}

/// Trait for container registries that can be cleaned up
///
/// Each method issues exactly one remote request and returns the first page of
/// results only.
#[async_trait]
pub trait ImageRegistry: Send + Sync {
    /// List repositories visible to the authenticated account
    async fn list_repositories(&self) -> Result<Vec<Repository>, RegistryError>;

    /// List images in a repository matching a tag status filter
    ///
    /// # Arguments
    /// * `repository` - The repository name (e.g., "my-app")
    /// * `tag_status` - Which images to return (e.g., only untagged ones)
    async fn list_images(
        &self,
        repository: &str,
        tag_status: TagStatus,
    ) -> Result<Vec<ImageIdentifier>, RegistryError>;

    /// Delete a single image, addressed by digest
    ///
    /// A per-image refusal inside an accepted request is reported as
    /// `DeleteOutcome::Rejected`, not as an error.
    async fn delete_image(
        &self,
        repository: &str,
        digest: &str,
    ) -> Result<DeleteOutcome, RegistryError>;
}
