//! Runtime configuration.
//!
//! All configuration is read once at startup into an explicit [`ApiConfig`]
//! and passed into components at construction. There is no process-wide
//! memoized settings loader.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default HTTP bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default HTTP bind port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default label for the synthetic bucket of models without a model type.
pub const DEFAULT_NULL_MODEL_TYPE_LABEL: &str = "Uncategorized";

/// What `model_type_count` does with perceptual models whose model type is
/// null.
///
/// The legacy behavior iterated existing model-type rows and never saw null
/// values, silently dropping such models from the mapping. Both behaviors are
/// supported; `Bucket` keeps the per-category counts summing to the filtered
/// total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullModelTypePolicy {
    /// Models without a model type are absent from the mapping.
    Drop,
    /// Models without a model type are counted under a synthetic label.
    Bucket { label: String },
}

impl Default for NullModelTypePolicy {
    fn default() -> Self {
        NullModelTypePolicy::Bucket {
            label: DEFAULT_NULL_MODEL_TYPE_LABEL.to_string(),
        }
    }
}

impl NullModelTypePolicy {
    /// Parse the policy from its environment representation.
    ///
    /// `"drop"` selects [`NullModelTypePolicy::Drop`]; `"bucket"` selects
    /// [`NullModelTypePolicy::Bucket`] with the given label.
    pub fn from_parts(policy: &str, label: Option<String>) -> Result<Self> {
        match policy {
            "drop" => Ok(NullModelTypePolicy::Drop),
            "bucket" => Ok(NullModelTypePolicy::Bucket {
                label: label.unwrap_or_else(|| DEFAULT_NULL_MODEL_TYPE_LABEL.to_string()),
            }),
            other => Err(Error::Config(format!(
                "NULL_MODEL_TYPE_POLICY must be \"drop\" or \"bucket\", got \"{}\"",
                other
            ))),
        }
    }
}

/// Complete API configuration, assembled from the environment at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// HTTP bind host.
    pub host: String,
    /// HTTP bind port.
    pub port: u16,
    /// CORS origin whitelist.
    pub allowed_origins: Vec<String>,
    /// Public base URL advertised in the OpenAPI document.
    pub public_base_url: Option<String>,
    /// Bucket policy for models without a model type.
    pub null_model_type_policy: NullModelTypePolicy,
}

impl ApiConfig {
    /// Build the configuration from environment variables.
    ///
    /// `DATABASE_URL` is required; everything else has a default. Call
    /// `dotenvy::dotenv()` before this if a `.env` file should participate.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| Error::Config("DATABASE_URL is not set".to_string()))?;

        let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: \"{}\"", raw)))?,
            Err(_) => DEFAULT_PORT,
        };

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|raw| Self::parse_origins(&raw))
            .unwrap_or_default();

        let public_base_url = std::env::var("PUBLIC_BASE_URL").ok();

        let policy_name =
            std::env::var("NULL_MODEL_TYPE_POLICY").unwrap_or_else(|_| "bucket".to_string());
        let policy_label = std::env::var("NULL_MODEL_TYPE_LABEL").ok();
        let null_model_type_policy = NullModelTypePolicy::from_parts(&policy_name, policy_label)?;

        Ok(Self {
            database_url,
            host,
            port,
            allowed_origins,
            public_base_url,
            null_model_type_policy,
        })
    }

    /// Split a comma-separated origin list, dropping empty entries.
    pub fn parse_origins(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_splits_and_trims() {
        let origins = ApiConfig::parse_origins("http://localhost:5173, https://hydromap.org ,");
        assert_eq!(
            origins,
            vec![
                "http://localhost:5173".to_string(),
                "https://hydromap.org".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_origins_empty() {
        assert!(ApiConfig::parse_origins("").is_empty());
    }

    #[test]
    fn test_policy_default_is_bucket() {
        match NullModelTypePolicy::default() {
            NullModelTypePolicy::Bucket { label } => {
                assert_eq!(label, DEFAULT_NULL_MODEL_TYPE_LABEL)
            }
            NullModelTypePolicy::Drop => panic!("default policy should be Bucket"),
        }
    }

    #[test]
    fn test_policy_from_parts_drop() {
        assert_eq!(
            NullModelTypePolicy::from_parts("drop", None).unwrap(),
            NullModelTypePolicy::Drop
        );
    }

    #[test]
    fn test_policy_from_parts_bucket_with_label() {
        assert_eq!(
            NullModelTypePolicy::from_parts("bucket", Some("None".to_string())).unwrap(),
            NullModelTypePolicy::Bucket {
                label: "None".to_string()
            }
        );
    }

    #[test]
    fn test_policy_from_parts_rejects_unknown() {
        let err = NullModelTypePolicy::from_parts("maybe", None).unwrap_err();
        assert!(err.to_string().contains("NULL_MODEL_TYPE_POLICY"));
    }
}
