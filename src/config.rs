//! Run configuration.
//!
//! ```toml
//! [wechat]
//! error_policy = "fail-fast"
//!
//! [wechat.owners]
//! alice = "Alice"
//! ```
//!
//! Any key can be overridden from the environment, e.g.
//! `WECHAT_IR__WECHAT__ERROR_POLICY=collect-all`.

use crate::error::ConfigError;
use crate::owner::OwnerMapping;
use crate::pipeline::ErrorPolicy;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const ENV_PREFIX: &str = "WECHAT_IR";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wechat: WechatConfig,
}

/// `[wechat]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WechatConfig {
    #[serde(default)]
    pub owners: BTreeMap<String, String>,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Validated owner mapping for a run.
    pub fn owner_mapping(&self) -> Result<OwnerMapping, ConfigError> {
        OwnerMapping::new(self.wechat.owners.clone())
    }
}
