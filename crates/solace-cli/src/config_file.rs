//! Optional TOML config file merged with CLI overrides (SPEC_FULL.md AMBIENT STACK:
//! "the same struct-with-serde-plus-CLI-override shape `foundry_config::Config`
//! uses, scaled down"). Every field is optional here since the file itself is
//! optional and any field it omits falls back to [`solace_analysis::Config`]'s own
//! `Default`.

use eyre::{Context, Result};
use serde::Deserialize;
use solace_analysis::Config;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PartialConfig {
    pub map_depth: Option<u32>,
    pub persistent_users: Option<u32>,
    pub use_concrete_users: Option<bool>,
    pub use_global_contracts: Option<bool>,
    pub escalate_requires: Option<bool>,
}

impl PartialConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).wrap_err_with(|| format!("reading config file at {}", path.display()))?;
        toml::from_str(&text).wrap_err_with(|| format!("parsing config file at {} as TOML", path.display()))
    }

    pub fn apply(&self, base: Config) -> Config {
        Config {
            map_depth: self.map_depth.unwrap_or(base.map_depth),
            persistent_users: self.persistent_users.unwrap_or(base.persistent_users),
            use_concrete_users: self.use_concrete_users.unwrap_or(base.use_concrete_users),
            use_global_contracts: self.use_global_contracts.unwrap_or(base.use_global_contracts),
            escalate_requires: self.escalate_requires.unwrap_or(base.escalate_requires),
        }
    }
}
