use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PROJECT_NAME: &str = "lambda-monorepo-example";

/// Environment keys the stack reads its configuration from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    ProjectName,
    Stage,
    Identifier,
    Owner,
    Account,
    Region,
}

impl ConfigKey {
    pub fn env_name(self) -> &'static str {
        match self {
            Self::ProjectName => "PROJECT_NAME",
            Self::Stage => "STAGE",
            Self::Identifier => "IDENTIFIER",
            Self::Owner => "OWNER",
            Self::Account => "CDK_DEFAULT_ACCOUNT",
            Self::Region => "CDK_DEFAULT_REGION",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_name())
    }
}

/// Inputs of a single assembly. Read once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub project_name: String,
    pub stage_name: Option<String>,
    pub identifier: Option<String>,
    pub owner: Option<String>,
    pub account_id: Option<String>,
    pub region: Option<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            stage_name: None,
            identifier: None,
            owner: None,
            account_id: None,
            region: None,
        }
    }
}

impl Configuration {
    /// Builds a configuration from any string key/value source, e.g.
    /// `|key| std::env::var(key).ok()`.
    ///
    /// Blank values count as absent. A missing `PROJECT_NAME` keeps the
    /// default project name; an explicitly blank one is kept blank so that
    /// assembly rejects it.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: ConfigKey| non_blank(lookup(key.env_name()));
        let project_name = match lookup(ConfigKey::ProjectName.env_name()) {
            Some(value) => value.trim().to_string(),
            None => DEFAULT_PROJECT_NAME.to_string(),
        };

        Self {
            project_name,
            stage_name: read(ConfigKey::Stage),
            identifier: read(ConfigKey::Identifier),
            owner: read(ConfigKey::Owner),
            account_id: read(ConfigKey::Account),
            region: read(ConfigKey::Region),
        }
    }

    pub fn from_map(values: &BTreeMap<String, String>) -> Self {
        Self::from_lookup(|key| values.get(key).cloned())
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage_name = Some(stage.into());
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_target(mut self, account_id: Option<String>, region: Option<String>) -> Self {
        self.account_id = account_id;
        self.region = region;
        self
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
