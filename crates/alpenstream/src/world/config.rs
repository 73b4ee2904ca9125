use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{event, Level};

use crate::content::load_service::UrlPattern;
use crate::content::rate_limiter::{DEFAULT_PERIOD_MS, DEFAULT_RATE};
use crate::content::scheduler::{
    DEFAULT_GPU_QUAD_LIMIT, DEFAULT_PURGE_TIMEOUT_MS, DEFAULT_RAM_QUAD_LIMIT,
    DEFAULT_RETIREMENT_AGE_MS, DEFAULT_UPDATE_TIMEOUT_MS,
};
use crate::content::slot_limiter::DEFAULT_SLOT_LIMIT;
use crate::helpers::AlpError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// May contain a `%HOST%` placeholder, replaced per request from
    /// `load_balancing_targets`.
    pub base_url: String,
    pub url_pattern: UrlPattern,
    #[serde(default)]
    pub file_ending: String,
    #[serde(default)]
    pub load_balancing_targets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub terrain_service: ServiceConfig,
    pub ortho_service: ServiceConfig,
    pub vector_service: Option<ServiceConfig>,

    pub gpu_quad_limit: usize,
    pub ram_quad_limit: usize,
    pub slot_limit: usize,
    pub request_rate: usize,
    pub request_period_ms: u64,

    pub update_timeout_ms: u64,
    pub purge_timeout_ms: u64,
    pub retirement_age_ms: u64,
    pub transfer_timeout_ms: u64,
    pub permissible_screen_space_error: f64,

    /// Disk cache directory; resolved via the platform cache dir when unset.
    pub cache_dir: Option<PathBuf>,
    /// Serialised `TileHeights` pyramid for the AabbDecorator.
    pub height_pyramid_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            terrain_service: ServiceConfig {
                base_url: "https://alpinemaps.cg.tuwien.ac.at/tiles/alpine_png/".to_string(),
                url_pattern: UrlPattern::Zxy,
                file_ending: ".png".to_string(),
                load_balancing_targets: Vec::new(),
            },
            ortho_service: ServiceConfig {
                base_url: "https://maps%HOST%.wien.gv.at/basemap/bmaporthofoto30cm/normal/google3857/"
                    .to_string(),
                url_pattern: UrlPattern::ZyxYPointingSouth,
                file_ending: ".jpeg".to_string(),
                load_balancing_targets: vec![
                    "".to_string(),
                    "1".to_string(),
                    "2".to_string(),
                    "3".to_string(),
                    "4".to_string(),
                ],
            },
            vector_service: None,
            gpu_quad_limit: DEFAULT_GPU_QUAD_LIMIT,
            ram_quad_limit: DEFAULT_RAM_QUAD_LIMIT,
            slot_limit: DEFAULT_SLOT_LIMIT,
            request_rate: DEFAULT_RATE,
            request_period_ms: DEFAULT_PERIOD_MS,
            update_timeout_ms: DEFAULT_UPDATE_TIMEOUT_MS,
            purge_timeout_ms: DEFAULT_PURGE_TIMEOUT_MS,
            retirement_age_ms: DEFAULT_RETIREMENT_AGE_MS,
            transfer_timeout_ms: 5000,
            permissible_screen_space_error: 2.0,
            cache_dir: None,
            height_pyramid_path: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), AlpError> {
        for service in [&self.terrain_service, &self.ortho_service]
            .into_iter()
            .chain(self.vector_service.as_ref())
        {
            let probe = service.base_url.replace("%HOST%", "lb");
            url::Url::parse(&probe)
                .map_err(|e| AlpError::InvalidInput(format!("bad base url {probe}: {e}")))?;
        }
        if self.ram_quad_limit < self.gpu_quad_limit {
            return Err(AlpError::InvalidInput(
                "ram quad limit below gpu quad limit".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolved_cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("org", "alpenstream", "alpenstream")
            .map(|dirs| dirs.cache_dir().join("tile_cache"))
            .unwrap_or_else(|| PathBuf::from("./tile_cache"))
    }
}

pub fn load_config(path: &Path) -> Result<Config, AlpError> {
    let bytes = std::fs::read(path)?;
    let config: Config = serde_json::from_slice(&bytes)
        .map_err(|e| AlpError::InvalidInput(format!("failed to parse config: {e}")))?;
    config.validate()?;
    event!(Level::INFO, "config loaded from {}", path.display());
    Ok(config)
}
