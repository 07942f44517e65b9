use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

use crate::naming;

/// Provider mapping table: lowercase provider id -> service type name.
/// Loaded once at startup; declaration order is preserved and reported
/// by `ProviderResolver::available_providers`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProvidersCfg {
    #[serde(default)]
    pub mapping: IndexMap<String, String>,
}

fn default_api_key() -> SecretString {
    SecretString::from("")
}
fn default_version() -> String {
    "v1".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_retry_times() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    100
}
fn default_skills_path() -> String {
    "/skills".to_string()
}

/// Connection/auth block for one provider family. Every field has a
/// fallback default, so a partial (or absent) block is never an error.
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceCfg {
    #[serde(default)]
    pub base_url: String,
    /// Sent verbatim as `Authorization: Bearer <api_key>`.
    #[serde(default = "default_api_key")]
    pub api_key: SecretString,
    #[serde(default = "default_version")]
    pub version: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_times")]
    pub retry_times: u32,
    /// Delay between retry attempts in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,
    #[serde(default = "default_skills_path")]
    pub skills_path: String,
}

impl Default for ServiceCfg {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: default_api_key(),
            version: default_version(),
            timeout: default_timeout(),
            retry_times: default_retry_times(),
            retry_delay: default_retry_delay(),
            skills_path: default_skills_path(),
        }
    }
}

/// Per-provider service configuration blocks, keyed by config key
/// (e.g. `sharp_api`).
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServicesCfg(pub HashMap<String, ServiceCfg>);

impl ServicesCfg {
    pub fn get(&self, key: &str) -> Option<&ServiceCfg> {
        self.0.get(key)
    }

    /// Config record for a service type name, via the derived config key.
    /// A missing record yields full defaults, not an error.
    pub fn for_type(&self, type_name: &str) -> ServiceCfg {
        let key = naming::config_key_for(type_name);
        self.0.get(&key).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub providers: ProvidersCfg,
    #[serde(default)]
    pub services: ServicesCfg,
}

impl Config {
    /// Load a Config from a file path (JSON or TOML by extension). If the
    /// extension is missing or unrecognized, try JSON first, then TOML.
    pub fn from_path<P: AsRef<Path>>(path: P) -> crate::error::CoreResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(crate::error::SkillwireError::from)?;
        let s = std::str::from_utf8(&bytes)
            .map_err(|e| crate::error::SkillwireError::Other(e.into()))?;
        let cfg: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str::<Self>(s)
                .map_err(|e| crate::error::SkillwireError::Other(e.into()))?,
            Some("toml") => toml::from_str::<Self>(s)
                .map_err(|e| crate::error::SkillwireError::Other(e.into()))?,
            _ => serde_json::from_str::<Self>(s)
                .map_err(|e| crate::error::SkillwireError::Other(e.into()))
                .or_else(|_| {
                    toml::from_str::<Self>(s)
                        .map_err(|e| crate::error::SkillwireError::Other(e.into()))
                })?,
        };
        Ok(cfg)
    }
}
