use std::collections::HashMap;
use std::path::Path;

use config::{Config, Environment};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::errors::{to_env_var, ConfigError};

pub const DEFAULT_TAVILY_HOST: &str = "https://api.tavily.com";

/// Identifies the managed agent the front-ends talk to.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    pub agent_id: String,
    pub agent_alias_id: String,
}

impl AgentSettings {
    /// Load from the process environment, with values from `env_file` taking
    /// precedence when the file exists.
    pub fn load(env_file: Option<&Path>) -> Result<Self, ConfigError> {
        load_settings(None, env_file, &[])
    }
}

/// Settings for the search tool function.
#[derive(Clone, Deserialize)]
pub struct SearchSettings {
    pub tavily_api_key: String,
    pub tavily_api_host: String,
}

impl SearchSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        load_settings(None, None, &[("tavily_api_host", DEFAULT_TAVILY_HOST)])
    }
}

impl std::fmt::Debug for SearchSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSettings")
            .field("tavily_api_key", &"<redacted>")
            .field("tavily_api_host", &self.tavily_api_host)
            .finish()
    }
}

/// Build a settings struct from the environment (or `env_source` when given),
/// layering the `.env` file on top.
pub(crate) fn load_settings<T: DeserializeOwned>(
    env_source: Option<HashMap<String, String>>,
    env_file: Option<&Path>,
    defaults: &[(&str, &str)],
) -> Result<T, ConfigError> {
    let mut builder = Config::builder();
    for (key, value) in defaults {
        builder = builder.set_default(*key, *value)?;
    }
    builder = builder.add_source(Environment::default().source(env_source));

    if let Some(path) = env_file.filter(|path| path.exists()) {
        #[allow(deprecated)]
        let entries = dotenv::from_path_iter(path)?;
        for entry in entries {
            let (key, value) = entry?;
            builder = builder.set_override(key.to_lowercase(), value)?;
        }
        tracing::debug!(path = %path.display(), "applied env file overrides");
    }

    let config = builder.build()?;

    match config.try_deserialize() {
        Ok(settings) => Ok(settings),
        Err(err) => {
            tracing::debug!("Configuration error: {:?}", &err);

            let error_str = err.to_string();
            if error_str.starts_with("missing field") {
                // "missing field `agent_id`"
                let field = error_str
                    .trim_start_matches("missing field `")
                    .trim_end_matches('`');
                Err(ConfigError::MissingEnvVar {
                    env_var: to_env_var(field),
                })
            } else if let config::ConfigError::NotFound(field) = &err {
                Err(ConfigError::MissingEnvVar {
                    env_var: to_env_var(field),
                })
            } else {
                Err(ConfigError::Other(err))
            }
        }
    }
}
