//! Credential and region configuration
//!
//! The billing service needs an access key, a secret key and a region. All
//! three must be present before any query is issued.

use crate::error::{CloudcostError, Result};
use std::fmt;

/// Environment variable holding the access key id
pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
/// Environment variable holding the secret access key
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
/// Environment variable holding the region
pub const REGION_VAR: &str = "AWS_REGION";

/// Access credentials and region for the billing service
#[derive(Clone, PartialEq, Eq)]
pub struct BillingConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl fmt::Debug for BillingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BillingConfig")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

impl BillingConfig {
    /// Build the configuration from CLI values (which fall back to the environment)
    ///
    /// Blank values count as missing. The error names every missing setting.
    pub fn from_cli(
        access_key_id: Option<&str>,
        secret_access_key: Option<&str>,
        region: Option<&str>,
    ) -> Result<Self> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.map(str::trim).filter(|s| !s.is_empty())
        }

        let mut missing = Vec::new();
        let access_key_id = present(access_key_id);
        if access_key_id.is_none() {
            missing.push(ACCESS_KEY_ID_VAR);
        }
        let secret_access_key = present(secret_access_key);
        if secret_access_key.is_none() {
            missing.push(SECRET_ACCESS_KEY_VAR);
        }
        let region = present(region);
        if region.is_none() {
            missing.push(REGION_VAR);
        }

        match (access_key_id, secret_access_key, region) {
            (Some(access_key_id), Some(secret_access_key), Some(region)) => Ok(Self {
                access_key_id: access_key_id.to_string(),
                secret_access_key: secret_access_key.to_string(),
                region: region.to_string(),
            }),
            _ => Err(CloudcostError::Config(format!(
                "AWS credentials or region not set: {}",
                missing.join(", ")
            ))),
        }
    }

    /// Build the configuration straight from the process environment
    pub fn from_env() -> Result<Self> {
        let access_key_id = std::env::var(ACCESS_KEY_ID_VAR).ok();
        let secret_access_key = std::env::var(SECRET_ACCESS_KEY_VAR).ok();
        let region = std::env::var(REGION_VAR).ok();
        Self::from_cli(
            access_key_id.as_deref(),
            secret_access_key.as_deref(),
            region.as_deref(),
        )
    }
}
