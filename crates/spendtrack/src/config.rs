use std::{env, path::PathBuf, time::Duration};

use anyhow::Context;
use spendtrack_auth::AuthConfig;
use spendtrack_core::deployment::{resolve_mode, DeploymentMode};
use spendtrack_core::files::DEFAULT_MAX_UPLOAD_BYTES;

/// AWS resources used in cloud mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    /// Default region for every AWS client (default: "us-east-1")
    pub region: String,
    /// Expenses table (default: "expenses")
    pub dynamodb_table: String,
    /// Global secondary index on `user_id`; listing scans without it.
    pub dynamodb_user_index: Option<String>,
    /// Endpoint override, e.g. DynamoDB Local.
    pub dynamodb_endpoint_url: Option<String>,
    /// Receipt bucket, required in cloud mode.
    pub s3_bucket: Option<String>,
    /// Bucket region when it differs from `region`.
    pub s3_region: Option<String>,
}

impl AwsConfig {
    /// Region used in public S3 object URLs.
    pub fn s3_region(&self) -> &str {
        self.s3_region.as_deref().unwrap_or(&self.region)
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: DeploymentMode,
    /// Path to SQLite expenses database (default: "spendtrack.db")
    pub sqlite_path: String,
    /// Directory receipts are written to in local mode (default: "uploads")
    pub upload_dir: PathBuf,
    /// Base of the URLs handed out for local receipts (default: "http://localhost:8000")
    pub public_base_url: String,
    /// Largest accepted receipt in bytes (default: 10 MiB)
    pub max_upload_bytes: usize,
    /// Per-request timeout (default: 30s)
    pub request_timeout: Duration,
    pub aws: AwsConfig,
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DEPLOYMENT_MODE` - `local` or `cloud`; `IS_LOCAL_DEMO=false` selects
    ///   cloud when unset (default: local)
    /// - `SQLITE_PATH` - SQLite database path (default: "spendtrack.db")
    /// - `UPLOAD_DIR` - local receipt directory (default: "uploads")
    /// - `PUBLIC_BASE_URL` - base of local receipt URLs (default: "http://localhost:8000")
    /// - `MAX_UPLOAD_BYTES` - receipt size limit (default: 10485760)
    /// - `REQUEST_TIMEOUT_SECS` - request timeout (default: 30)
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    /// - `DYNAMODB_TABLE_NAME` - expenses table (default: "expenses")
    /// - `DYNAMODB_USER_INDEX` - GSI on `user_id` (optional)
    /// - `DYNAMODB_ENDPOINT_URL` - DynamoDB endpoint override (optional)
    /// - `S3_BUCKET_NAME` - receipt bucket (required in cloud mode)
    /// - `S3_REGION` - bucket region (default: `AWS_REGION`)
    ///
    /// Auth settings are read by [`AuthConfig::from_env`].
    pub fn from_env() -> anyhow::Result<Self> {
        let mode = resolve_mode(
            non_empty_var("DEPLOYMENT_MODE").as_deref(),
            non_empty_var("IS_LOCAL_DEMO").as_deref(),
        )?;

        let aws = AwsConfig {
            region: non_empty_var("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            dynamodb_table: non_empty_var("DYNAMODB_TABLE_NAME")
                .unwrap_or_else(|| "expenses".to_string()),
            dynamodb_user_index: non_empty_var("DYNAMODB_USER_INDEX"),
            dynamodb_endpoint_url: non_empty_var("DYNAMODB_ENDPOINT_URL"),
            s3_bucket: non_empty_var("S3_BUCKET_NAME"),
            s3_region: non_empty_var("S3_REGION"),
        };

        Ok(Self {
            mode,
            sqlite_path: non_empty_var("SQLITE_PATH").unwrap_or_else(|| "spendtrack.db".to_string()),
            upload_dir: non_empty_var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            public_base_url: non_empty_var("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8000".to_string()),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES")?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS")?.unwrap_or(30)),
            aws,
            auth: AuthConfig::from_env()?,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parses a variable; unset or blank is `None`, garbage is an error.
fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    non_empty_var(key)
        .map(|v| v.trim().parse::<T>().with_context(|| format!("invalid {key}: {v}")))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 12] = [
        "DEPLOYMENT_MODE",
        "IS_LOCAL_DEMO",
        "SQLITE_PATH",
        "UPLOAD_DIR",
        "PUBLIC_BASE_URL",
        "MAX_UPLOAD_BYTES",
        "REQUEST_TIMEOUT_SECS",
        "AWS_REGION",
        "DYNAMODB_TABLE_NAME",
        "DYNAMODB_USER_INDEX",
        "S3_BUCKET_NAME",
        "S3_REGION",
    ];

    // Env vars are process-wide, so every case lives in one test.
    #[test]
    fn test_from_env() {
        for key in KEYS {
            env::remove_var(key);
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.mode, DeploymentMode::Local);
        assert_eq!(config.sqlite_path, "spendtrack.db");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.public_base_url, "http://localhost:8000");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.aws.region, "us-east-1");
        assert_eq!(config.aws.dynamodb_table, "expenses");
        assert_eq!(config.aws.s3_region(), "us-east-1");

        env::set_var("IS_LOCAL_DEMO", "False");
        env::set_var("S3_BUCKET_NAME", "receipts");
        env::set_var("S3_REGION", "eu-west-1");
        env::set_var("MAX_UPLOAD_BYTES", "1024");
        let config = Config::from_env().unwrap();
        assert_eq!(config.mode, DeploymentMode::Cloud);
        assert_eq!(config.aws.s3_bucket.as_deref(), Some("receipts"));
        assert_eq!(config.aws.s3_region(), "eu-west-1");
        assert_eq!(config.max_upload_bytes, 1024);

        env::set_var("DEPLOYMENT_MODE", "local");
        assert_eq!(Config::from_env().unwrap().mode, DeploymentMode::Local);

        env::set_var("MAX_UPLOAD_BYTES", "lots");
        assert!(Config::from_env().is_err());

        env::set_var("MAX_UPLOAD_BYTES", "1024");
        env::set_var("DEPLOYMENT_MODE", "hybrid");
        assert!(Config::from_env().is_err());

        for key in KEYS {
            env::remove_var(key);
        }
    }
}
