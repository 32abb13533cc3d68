//! Application state and the provider factory.
//!
//! Every request handler receives an [`AppState`] holding the three
//! providers (auth, expense storage, receipt storage) as trait objects. Which
//! backends sit behind them is decided once at startup from
//! [`Config::mode`].

use std::sync::Arc;

use spendtrack_auth::{AuthState, LocalAuthService};
use spendtrack_core::deployment::DeploymentMode;
use spendtrack_core::files::FileStorage;
use spendtrack_core::storage::ExpenseRepository;

use crate::config::Config;
use crate::files::LocalFileStorage;
use crate::storage::SqliteRepository;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub expenses: Arc<dyn ExpenseRepository>,
    pub files: Arc<dyn FileStorage>,
    pub auth: AuthState,
    pub config: Arc<Config>,
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}

impl AppState {
    pub fn new(
        expenses: Arc<dyn ExpenseRepository>,
        files: Arc<dyn FileStorage>,
        auth: AuthState,
        config: Config,
    ) -> Self {
        Self {
            expenses,
            files,
            auth,
            config: Arc::new(config),
        }
    }

    /// Builds the providers for the configured deployment mode.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let state = match config.mode {
            DeploymentMode::Local => Self::local(config).await?,
            DeploymentMode::Cloud => Self::cloud(config).await?,
        };

        tracing::info!(
            mode = %state.mode(),
            auth = %state.auth.service.mode(),
            "Providers initialized"
        );
        Ok(state)
    }

    pub fn mode(&self) -> DeploymentMode {
        self.config.mode
    }

    /// SQLite expenses, local accounts and receipts on disk.
    async fn local(config: Config) -> anyhow::Result<Self> {
        let expenses = SqliteRepository::new(&config.sqlite_path).await?;
        let files = LocalFileStorage::new(&config.upload_dir, &config.public_base_url);
        let auth_service = LocalAuthService::connect(&config.auth).await?;
        auth_service.spawn_session_purge(config.auth.session_purge_interval);

        tracing::info!(
            sqlite = %config.sqlite_path,
            uploads = %config.upload_dir.display(),
            "Using local providers"
        );

        let auth = AuthState::new(Arc::new(auth_service), config.auth.clone());
        Ok(Self::new(Arc::new(expenses), Arc::new(files), auth, config))
    }

    /// DynamoDB expenses, Cognito accounts and receipts in S3.
    #[cfg(feature = "cloud")]
    async fn cloud(config: Config) -> anyhow::Result<Self> {
        use anyhow::Context;
        use spendtrack_auth::CognitoAuthService;

        use crate::files::S3FileStorage;
        use crate::storage::DynamoDbRepository;

        let cognito = config
            .auth
            .cognito
            .clone()
            .context("COGNITO_CLIENT_ID is required in cloud mode")?;
        let bucket = config
            .aws
            .s3_bucket
            .clone()
            .context("S3_BUCKET_NAME is required in cloud mode")?;

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws.region.clone()))
            .load()
            .await;

        let expenses = DynamoDbRepository::from_sdk_config(
            &sdk_config,
            config.aws.dynamodb_endpoint_url.as_deref(),
            config.aws.dynamodb_table.clone(),
            config.aws.dynamodb_user_index.clone(),
        );
        let files = S3FileStorage::from_sdk_config(&sdk_config, bucket, config.aws.s3_region());
        let auth_service = CognitoAuthService::from_config(&cognito).await;

        tracing::info!(
            region = %config.aws.region,
            table = %expenses.table_name(),
            bucket = %files.bucket(),
            "Using AWS providers"
        );

        let auth = AuthState::new(Arc::new(auth_service), config.auth.clone());
        Ok(Self::new(Arc::new(expenses), Arc::new(files), auth, config))
    }

    #[cfg(not(feature = "cloud"))]
    async fn cloud(_config: Config) -> anyhow::Result<Self> {
        anyhow::bail!("cloud mode requires building with the `cloud` feature")
    }
}
