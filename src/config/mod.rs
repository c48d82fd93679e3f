use std::time::Duration;

use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{find_config_file, read_config};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_YOUTUBE_URL: &str = "https://www.googleapis.com/youtube/v3/search";

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    #[serde(default)]
    generator: Generator,
    #[serde(default)]
    video: Video,
    #[serde(default)]
    cache: Cache,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    database_uri: String,
    #[serde(default)]
    docs: bool,
}

/// Generative course API (Gemini).
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Generator {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout_secs: u64,
}

/// Video search API (YouTube Data API).
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Video {
    api_key: Option<String>,
    base_url: String,
    timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Postgres,
    Memory,
    Disabled,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Cache {
    backend: CacheBackend,
    database_uri: Option<String>,
    ttl_secs: u64,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            api_key: None,
            model: String::from("gemini-2.0-flash-exp"),
            base_url: String::from(DEFAULT_GEMINI_URL),
            timeout_secs: 60,
        }
    }
}

impl Default for Video {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: String::from(DEFAULT_YOUTUBE_URL),
            timeout_secs: 5,
        }
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Postgres,
            database_uri: None,
            ttl_secs: 60 * 60 * 24 * 30,
        }
    }
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let read_cfg = |use_local| -> ConfigResult<Self> {
                    let bytes = read_config(use_local)?;
                    let config: Self = toml::from_slice(&bytes)?;
                    Ok(config)
                };

                match read_cfg(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, error::ConfigError::ConfigNotFound) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Config not found.");
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    #[inline]
    pub fn video(&self) -> &Video {
        &self.video
    }

    #[inline]
    pub fn cache(&self) -> &Cache {
        &self.cache
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }
}

/// Config value first, then the environment variable.
fn key_or_env(key: Option<&String>, var: &str) -> Option<String> {
    key.filter(|k| !k.is_empty())
        .cloned()
        .or_else(|| std::env::var(var).ok().filter(|k| !k.is_empty()))
}

impl Generator {
    pub fn api_key(&self) -> Option<String> {
        key_or_env(self.api_key.as_ref(), "GEMINI_API_KEY")
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Video {
    pub fn api_key(&self) -> Option<String> {
        key_or_env(self.api_key.as_ref(), "YOUTUBE_API_KEY")
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Cache {
    pub fn backend(&self) -> CacheBackend {
        self.backend
    }

    pub fn database_uri(&self) -> Option<&str> {
        self.database_uri.as_deref()
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}
