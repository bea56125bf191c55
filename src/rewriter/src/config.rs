use std::path::Path;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::native::FUNC_PROMQL_AGGREGATE_BY;

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "labelinject.toml";

/// Prefix for environment overrides, e.g. `LABELINJECT__INJECT__LABEL`
pub const ENV_PREFIX: &str = "LABELINJECT__";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InjectConfig {
    /// Label to inject when none is given explicitly
    pub label: Option<String>,
    /// Name the native function is exposed under
    pub function_name: String,
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            label: None,
            function_name: FUNC_PROMQL_AGGREGATE_BY.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    pub inject: InjectConfig,
}

impl Configuration {
    fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load defaults, then `labelinject.toml`, then `LABELINJECT__*` env vars
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from_path(DEFAULT_CONFIG_FILE)
    }

    /// Same as [`Configuration::load`] with a different configuration file
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        let config = Self::figment(path.as_ref()).extract().map_err(Box::new)?;
        Ok(config)
    }
}
