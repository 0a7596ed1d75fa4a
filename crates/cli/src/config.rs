use std::time::Duration;

use anyhow::{Context, Result};
use storage::services::geocoding::GeocoderConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub geocoder: GeocoderConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let mut geocoder = GeocoderConfig::default();

        if let Ok(base_url) = std::env::var("GEOCODER_BASE_URL") {
            geocoder.base_url = base_url;
        }
        if let Ok(user_agent) = std::env::var("GEOCODER_USER_AGENT") {
            geocoder.user_agent = user_agent;
        }
        if let Ok(timeout) = std::env::var("GEOCODER_TIMEOUT_SECS") {
            let secs: u64 = timeout
                .parse()
                .context("GEOCODER_TIMEOUT_SECS must be a number of seconds")?;
            anyhow::ensure!(secs > 0, "GEOCODER_TIMEOUT_SECS must be at least 1");
            geocoder.timeout = Duration::from_secs(secs);
        }

        Ok(Self { geocoder })
    }
}
