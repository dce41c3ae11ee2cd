//! Configuration for Cropcast
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

use crate::types::CropcastError;

/// Cropcast - crop yield estimation API
#[derive(Parser, Debug, Clone)]
#[command(name = "cropcast")]
#[command(about = "Crop yield estimation API with subscription-gated access")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Enable development mode (MongoDB optional, default JWT secret)
    #[arg(
        long,
        env = "DEV_MODE",
        default_value = "false",
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "cropcast")]
    pub mongodb_db: String,

    /// JWT secret for token validation (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds (used when minting dev tokens)
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Base URL of the billing service for subscription tier lookups
    /// When unset, the stored profile tier is used instead
    #[arg(long, env = "BILLING_URL")]
    pub billing_url: Option<String>,

    /// Model version tag stamped on every prediction
    #[arg(long, env = "MODEL_VERSION", default_value = "v1.0")]
    pub model_version: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Get effective JWT secret (uses default in dev mode)
    pub fn jwt_secret(&self) -> Result<String, CropcastError> {
        match (&self.jwt_secret, self.dev_mode) {
            (Some(secret), _) => Ok(secret.clone()),
            (None, true) => Ok("dev-only-insecure-secret".to_string()),
            (None, false) => Err(CropcastError::Config(
                "JWT_SECRET is required in production mode".to_string(),
            )),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.jwt_secret.is_none() {
            return Err("JWT_SECRET is required in production mode".to_string());
        }

        if self.model_version.trim().is_empty() {
            return Err("MODEL_VERSION must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::parse_from(["cropcast", "--dev-mode", "true"])
    }

    #[test]
    fn test_dev_mode_defaults_jwt_secret() {
        let args = base_args();
        assert_eq!(args.jwt_secret().unwrap(), "dev-only-insecure-secret");
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_production_requires_jwt_secret() {
        let mut args = Args::parse_from(["cropcast"]);
        args.jwt_secret = None;
        assert!(args.validate().is_err());
        // No panic: a missing production secret is a Config error
        assert!(matches!(
            args.jwt_secret(),
            Err(CropcastError::Config(_))
        ));

        let args = Args::parse_from(["cropcast", "--jwt-secret", "s3cret"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.jwt_secret().unwrap(), "s3cret");
    }

    #[test]
    fn test_empty_model_version_rejected() {
        let args = Args::parse_from(["cropcast", "--dev-mode", "true", "--model-version", " "]);
        assert!(args.validate().is_err());
    }
}
