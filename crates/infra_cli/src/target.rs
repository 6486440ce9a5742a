use infra_core::Configuration;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_ACCOUNT: &str = "unknown-account";
pub const UNKNOWN_REGION: &str = "unknown-region";

/// Where the synthesized stack deploys. Absent values stay absent; the
/// provisioning backend resolves them at deploy time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTarget {
    pub account: Option<String>,
    pub region: Option<String>,
}

impl DeploymentTarget {
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            account: config.account_id.clone(),
            region: config.region.clone(),
        }
    }

    pub fn is_env_agnostic(&self) -> bool {
        self.account.is_none() || self.region.is_none()
    }

    /// `aws://{account}/{region}` with `unknown-*` placeholders.
    pub fn environment_uri(&self) -> String {
        format!(
            "aws://{}/{}",
            self.account.as_deref().unwrap_or(UNKNOWN_ACCOUNT),
            self.region.as_deref().unwrap_or(UNKNOWN_REGION),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_target_renders_account_and_region() {
        let config = Configuration::default()
            .with_target(Some("123456789012".to_string()), Some("eu-west-1".to_string()));
        let target = DeploymentTarget::from_config(&config);
        assert!(!target.is_env_agnostic());
        assert_eq!(target.environment_uri(), "aws://123456789012/eu-west-1");
    }

    #[test]
    fn missing_values_use_placeholders() {
        let target = DeploymentTarget {
            account: None,
            region: Some("us-east-1".to_string()),
        };
        assert!(target.is_env_agnostic());
        assert_eq!(target.environment_uri(), "aws://unknown-account/us-east-1");
    }
}
