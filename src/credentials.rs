use std::{env, fmt};

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::{Credentials, Region};
use tokio::sync::OnceCell;
use tracing::info;

use crate::{adapters, model::fs::FSError};

const PROVIDER_NAME: &str = "objectfs-adapter";

#[async_trait]
pub trait StorageProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;

    async fn storage_client(&self) -> Result<&dyn adapters::Object, FSError>;
}

#[derive(Clone, Default)]
pub struct ProviderConfig {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
    pub region: String,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        fn non_empty_env(name: &str) -> Option<String> {
            env::var(name)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        }

        Self {
            access_key: non_empty_env("AWS_ACCESS_KEY_ID").unwrap_or_default(),
            secret_key: non_empty_env("AWS_SECRET_ACCESS_KEY").unwrap_or_default(),
            session_token: non_empty_env("AWS_SESSION_TOKEN"),
            region: non_empty_env("AWS_REGION")
                .or_else(|| non_empty_env("AWS_DEFAULT_REGION"))
                .unwrap_or_default(),
            endpoint: non_empty_env("AWS_ENDPOINT_URL"),
            force_path_style: non_empty_env("AWS_S3_FORCE_PATH_STYLE")
                .map(|value| value == "true" || value == "1")
                .unwrap_or(false),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

/// Clients are built on first use and cached; concurrent first calls resolve to a single client.
pub struct CredentialProvider {
    config: ProviderConfig,
    sdk_config: OnceCell<SdkConfig>,
    storage_client: OnceCell<aws_sdk_s3::Client>,
    identity_client: OnceCell<aws_sdk_sts::Client>,
}

impl CredentialProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            sdk_config: OnceCell::new(),
            storage_client: OnceCell::new(),
            identity_client: OnceCell::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ProviderConfig::from_env())
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }

    fn ensure_authenticated(&self) -> Result<(), FSError> {
        if self.is_authenticated() {
            return Ok(());
        }

        Err(FSError::NotAuthenticated(
            "access key, secret key and region must all be set".to_string(),
        ))
    }

    async fn sdk_config(&self) -> &SdkConfig {
        self.sdk_config
            .get_or_init(|| async {
                let credentials = Credentials::new(
                    self.config.access_key.clone(),
                    self.config.secret_key.clone(),
                    self.config.session_token.clone(),
                    None,
                    PROVIDER_NAME,
                );

                aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(self.config.region.clone()))
                    .credentials_provider(credentials)
                    .load()
                    .await
            })
            .await
    }

    pub async fn s3_client(&self) -> Result<&aws_sdk_s3::Client, FSError> {
        self.ensure_authenticated()?;

        let client = self
            .storage_client
            .get_or_init(|| async {
                info!(region = %self.config.region, endpoint = ?self.config.endpoint, "building storage client");

                let mut s3_builder = aws_sdk_s3::config::Builder::from(self.sdk_config().await);
                s3_builder.set_endpoint_url(self.config.endpoint.clone());
                let s3_config = s3_builder
                    .force_path_style(self.config.force_path_style)
                    .build();

                aws_sdk_s3::Client::from_conf(s3_config)
            })
            .await;

        Ok(client)
    }

    pub async fn identity_client(&self) -> Result<&aws_sdk_sts::Client, FSError> {
        self.ensure_authenticated()?;

        let client = self
            .identity_client
            .get_or_init(|| async {
                info!(region = %self.config.region, "building identity client");
                aws_sdk_sts::Client::new(self.sdk_config().await)
            })
            .await;

        Ok(client)
    }
}

impl fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("config", &self.config)
            .field("storage_client_ready", &self.storage_client.initialized())
            .field("identity_client_ready", &self.identity_client.initialized())
            .finish()
    }
}

#[async_trait]
impl StorageProvider for CredentialProvider {
    fn is_authenticated(&self) -> bool {
        !self.config.access_key.is_empty()
            && !self.config.secret_key.is_empty()
            && !self.config.region.is_empty()
    }

    async fn storage_client(&self) -> Result<&dyn adapters::Object, FSError> {
        let client: &dyn adapters::Object = self.s3_client().await?;

        Ok(client)
    }
}
