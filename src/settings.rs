use secrecy::{ExposeSecret, Secret};
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable holding the AWS access key ID
pub const ACCESS_KEY_ID_VAR: &str = "AWS_ECR_CLEANUP_SCRIPT_ID";
/// Environment variable holding the AWS secret access key
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_ECR_CLEANUP_SCRIPT_KEY";
/// Environment variable holding the AWS region
pub const REGION_VAR: &str = "AWS_ECR_CLEANUP_SCRIPT_REGION";

/// Fallback region. Never applied: a missing region variable is rejected
/// before this value could be used.
#[allow(dead_code)]
const DEFAULT_REGION: &str = "eu-west-1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing ENV Variable - {0}")]
    MissingVariable(&'static str),
}

/// Static AWS credentials and target region for a single cleanup run
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: Secret<String>,
    pub region: String,
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup
    ///
    /// Variables are checked in order (identity, secret, region) and the first
    /// missing one is reported. Empty values count as missing. Present values
    /// are kept verbatim.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingVariable(name))
        };

        let access_key_id = require(ACCESS_KEY_ID_VAR)?;
        let secret_access_key = Secret::new(require(SECRET_ACCESS_KEY_VAR)?);
        let region = require(REGION_VAR)?;

        debug!(region = %region, "Loaded ECR cleanup credentials");

        Ok(Self {
            access_key_id,
            secret_access_key,
            region,
        })
    }

    pub fn secret_access_key(&self) -> &str {
        self.secret_access_key.expose_secret()
    }
}

/// Outcome of trying to load a dotenv file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvFileStatus {
    Loaded,
    Missing,
}

/// Populate the process environment from a dotenv file
///
/// A missing file is not an error; the variables are then expected to be set
/// in the environment already. Variables that are already set win over the
/// file's values.
pub fn load_env_file(path: &Path) -> anyhow::Result<EnvFileStatus> {
    match dotenv::from_path(path) {
        Ok(()) => {
            info!("Loaded environment from {}", path.display());
            Ok(EnvFileStatus::Loaded)
        }
        Err(err) if err.not_found() => {
            info!(
                "{} file does not exist, will get the variables from the environment",
                path.display()
            );
            Ok(EnvFileStatus::Missing)
        }
        Err(err) => Err(anyhow::anyhow!(
            "Failed to load environment file {}: {}",
            path.display(),
            err
        )),
    }
}
