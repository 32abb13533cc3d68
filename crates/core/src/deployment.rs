//! Deployment mode selection.
//!
//! Every provider (auth, expense storage, file storage) has a local and a
//! cloud backend. The mode is a runtime decision made once at startup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which family of backends the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// SQLite expenses, local accounts and sessions, files on local disk.
    #[default]
    Local,
    /// Cognito, DynamoDB and S3.
    Cloud,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown deployment mode: {0} (expected 'local' or 'cloud')")]
pub struct ParseDeploymentModeError(pub String);

impl FromStr for DeploymentMode {
    type Err = ParseDeploymentModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "demo" | "local-demo" => Ok(Self::Local),
            "cloud" | "aws" => Ok(Self::Cloud),
            other => Err(ParseDeploymentModeError(other.to_string())),
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Cloud => write!(f, "cloud"),
        }
    }
}

/// Resolves the mode from the two supported settings.
///
/// An explicit mode wins. Otherwise the legacy boolean flag decides, where
/// anything other than a false-like value means local. With neither set the
/// server runs in local mode.
pub fn resolve_mode(
    explicit: Option<&str>,
    is_local_demo: Option<&str>,
) -> Result<DeploymentMode, ParseDeploymentModeError> {
    if let Some(mode) = explicit.filter(|s| !s.trim().is_empty()) {
        return mode.parse();
    }

    match is_local_demo.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "false" | "0" | "no" | "off") => Ok(DeploymentMode::Cloud),
        _ => Ok(DeploymentMode::Local),
    }
}
