use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ecr::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_ecr::types::{ImageIdentifier as EcrImageIdentifier, ListImagesFilter};
use aws_sdk_ecr::Client as EcrClient;
use tracing::debug;

use crate::registry::{
    models::{DeleteOutcome, ImageIdentifier, Repository, TagStatus},
    ImageRegistry, RegistryError,
};
use crate::settings::Credentials;

/// Reduce an AWS SDK error to "<code>: <message>"
///
/// SDK errors have verbose Display and Debug output; the service error code
/// and message are what an operator needs to see.
fn sdk_error_message<E>(err: &E) -> String
where
    E: ProvideErrorMetadata + std::error::Error,
{
    match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (None, Some(message)) => message.to_string(),
        _ => DisplayErrorContext(err).to_string(),
    }
}

impl From<TagStatus> for aws_sdk_ecr::types::TagStatus {
    fn from(status: TagStatus) -> Self {
        match status {
            TagStatus::Untagged => aws_sdk_ecr::types::TagStatus::Untagged,
            TagStatus::Tagged => aws_sdk_ecr::types::TagStatus::Tagged,
            TagStatus::Any => aws_sdk_ecr::types::TagStatus::Any,
        }
    }
}

/// AWS ECR backed registry
///
/// Holds a single client built from static credentials. Requests are issued
/// without pagination tokens, so only the first page of repositories and
/// images is ever seen.
pub struct EcrRegistry {
    client: EcrClient,
}

impl EcrRegistry {
    /// Create a new ECR registry client from static credentials
    pub async fn new(credentials: &Credentials) -> Result<Self> {
        let creds = aws_sdk_ecr::config::Credentials::new(
            &credentials.access_key_id,
            credentials.secret_access_key(),
            None,
            None,
            "static",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(creds)
            .region(aws_config::Region::new(credentials.region.clone()))
            .load()
            .await;

        let region = aws_config
            .region()
            .context("No region configured for ECR client")?;
        debug!("Created ECR client for region {}", region);

        Ok(Self::from_client(EcrClient::new(&aws_config)))
    }

    /// Wrap an already configured ECR client
    pub fn from_client(client: EcrClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageRegistry for EcrRegistry {
    async fn list_repositories(&self) -> Result<Vec<Repository>, RegistryError> {
        let response = self
            .client
            .describe_repositories()
            .send()
            .await
            .map_err(|e| RegistryError::DescribeRepositories(sdk_error_message(&e)))?;

        if response.next_token().is_some() {
            debug!("DescribeRepositories returned more pages; only the first is processed");
        }

        Ok(response
            .repositories()
            .iter()
            .filter_map(|repo| repo.repository_name())
            .map(Repository::new)
            .collect())
    }

    async fn list_images(
        &self,
        repository: &str,
        tag_status: TagStatus,
    ) -> Result<Vec<ImageIdentifier>, RegistryError> {
        let filter = ListImagesFilter::builder()
            .tag_status(tag_status.into())
            .build();

        let response = self
            .client
            .list_images()
            .repository_name(repository)
            .filter(filter)
            .send()
            .await
            .map_err(|e| RegistryError::ListImages {
                repository: repository.to_string(),
                tag_status,
                message: sdk_error_message(&e),
            })?;

        if response.next_token().is_some() {
            debug!(
                "ListImages for {} returned more pages; only the first is processed",
                repository
            );
        }

        let mut images = Vec::new();
        for id in response.image_ids() {
            match id.image_digest() {
                Some(digest) => images.push(ImageIdentifier {
                    digest: digest.to_string(),
                    tag: id.image_tag().map(String::from),
                }),
                None => debug!("Skipping image without digest in {}", repository),
            }
        }

        Ok(images)
    }

    async fn delete_image(
        &self,
        repository: &str,
        digest: &str,
    ) -> Result<DeleteOutcome, RegistryError> {
        let image = EcrImageIdentifier::builder().image_digest(digest).build();

        let response = self
            .client
            .batch_delete_image()
            .repository_name(repository)
            .image_ids(image)
            .send()
            .await
            .map_err(|e| RegistryError::DeleteImage {
                repository: repository.to_string(),
                digest: digest.to_string(),
                message: sdk_error_message(&e),
            })?;

        // BatchDeleteImage succeeds at the request level even when the image
        // itself could not be deleted.
        match response.failures().first() {
            Some(failure) => Ok(DeleteOutcome::Rejected {
                code: failure
                    .failure_code()
                    .map(|code| code.as_str().to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
                reason: failure
                    .failure_reason()
                    .unwrap_or("no reason given")
                    .to_string(),
            }),
            None => Ok(DeleteOutcome::Deleted),
        }
    }
}
