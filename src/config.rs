use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_USER_AGENT: &str = "CommunityDirectoryBot (communitybuilders.es@gmail.com)";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub store_path: PathBuf,
    pub images_dir: PathBuf,
    pub geocode_url: String,
    pub user_agent: String,
    pub http_timeout_secs: u64,
}

impl Settings {
    /// Defaults, then `community_intake.toml` if present, then `COMMUNITY_*` env vars.
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("community_intake").required(false))
            .add_source(Environment::with_prefix("COMMUNITY"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("store_path", "communities.json")?
            .set_default("images_dir", "images")?
            .set_default("geocode_url", DEFAULT_GEOCODE_URL)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .set_default("http_timeout_secs", 5)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    /// Shared HTTP client for the geocoder and the logo fetcher.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.http_timeout())
            .build()
    }
}

// ── Tests ──
