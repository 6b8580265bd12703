use clap::Args;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/cuadre.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub api_key: String,
    pub access_token: String,
    pub level: String,
    pub loading_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:54321".to_string(),
            api_key: String::new(),
            access_token: String::new(),
            level: "info".to_string(),
            loading_timeout_secs: 15,
        }
    }
}

/// Overrides accepted on the command line. Keys and tokens are only read
/// from the config file or the environment.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<String>,
    /// Override the store root URL.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Override the log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    level: Option<String>,
    /// Seconds before the busy indicator gives up waiting visibly.
    #[arg(long, global = true)]
    loading_timeout_secs: Option<u64>,
}

pub fn load(args: ConfigArgs) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("CUADRE"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(level) = args.level {
        settings.level = level;
    }
    if let Some(secs) = args.loading_timeout_secs {
        settings.loading_timeout_secs = secs;
    }

    Ok(settings)
}
