use bytes::Bytes;
use serde::{Deserialize, Serialize};
use threadpool::ThreadPool;

use crate::content::download_client::Client;
use crate::content::pipeline::PipelineMessage;
use crate::content::tile_id::{Scheme, TileId};
use crate::content::types::{NetworkInfo, NetworkStatus, TileLayer};
use crate::helpers::channel::Sender;
use crate::helpers::hash::hash_uri;
use crate::helpers::time::time_since_epoch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlPattern {
    Zxy,
    Zyx,
    ZxyYPointingSouth,
    ZyxYPointingSouth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Ortho,
    Height,
    Vector,
}

/// Stateless fetcher for one layer's tile service. `load` runs the HTTP GET
/// on the shared worker pool and reports the classified outcome back on the
/// completion channel; failures are never retried here, re-requesting is the
/// scheduler's job.
pub struct TileLoadService {
    client: Client,
    pool: ThreadPool,
    base_url: String,
    url_pattern: UrlPattern,
    file_ending: String,
    load_balancing_targets: Vec<String>,
    layer: LayerKind,
    completions: Sender<PipelineMessage>,
}

impl TileLoadService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_url: &str,
        url_pattern: UrlPattern,
        file_ending: &str,
        load_balancing_targets: Vec<String>,
        layer: LayerKind,
        client: Client,
        pool: ThreadPool,
        completions: Sender<PipelineMessage>,
    ) -> TileLoadService {
        TileLoadService {
            client,
            pool,
            base_url: base_url.to_string(),
            url_pattern,
            file_ending: file_ending.to_string(),
            load_balancing_targets,
            layer,
            completions,
        }
    }

    pub fn build_tile_url(&self, tile_id: &TileId) -> String {
        let tile = tile_id.to_scheme(Scheme::Tms);
        let (x, y) = tile.coords;
        let n_y_tiles = 1u32 << tile.zoom_level;
        let tile_address = match self.url_pattern {
            UrlPattern::Zxy => format!("{}/{}/{}", tile.zoom_level, x, y),
            UrlPattern::Zyx => format!("{}/{}/{}", tile.zoom_level, y, x),
            UrlPattern::ZxyYPointingSouth => {
                format!("{}/{}/{}", tile.zoom_level, x, n_y_tiles - y - 1)
            }
            UrlPattern::ZyxYPointingSouth => {
                format!("{}/{}/{}", tile.zoom_level, n_y_tiles - y - 1, x)
            }
        };
        if self.load_balancing_targets.is_empty() {
            return format!("{}{}{}", self.base_url, tile_address, self.file_ending);
        }
        // hash the path so a given tile keeps hitting the same host, which
        // keeps intermediate http caches warm
        let hash = (hash_uri(&tile_address) % 1024) as f32;
        let index = ((hash / 1024.1) * self.load_balancing_targets.len() as f32) as usize;
        let host = &self.load_balancing_targets[index];
        format!(
            "{}{}{}",
            self.base_url.replace("%HOST%", host),
            tile_address,
            self.file_ending
        )
    }

    pub fn load(&self, tile_id: TileId) {
        let url = self.build_tile_url(&tile_id);
        let client = self.client.clone();
        let completions = self.completions.clone();
        let layer = self.layer;
        self.pool.execute(move || {
            let (status, data) = fetch(&client, &url);
            let network_info = NetworkInfo::new(status, time_since_epoch());
            if status == NetworkStatus::NetworkError {
                log::debug!("fetch of {url} failed");
            }
            let _ = completions.send(PipelineMessage::TileLoaded(
                layer,
                TileLayer {
                    id: tile_id,
                    network_info,
                    data,
                },
            ));
        });
    }
}

fn fetch(client: &Client, url: &str) -> (NetworkStatus, Bytes) {
    match client.get(url) {
        Ok(response) if response.status() == 404 => (NetworkStatus::NotFound, Bytes::new()),
        Ok(response) if (200..300).contains(&response.status()) => match response.bytes() {
            Ok(data) => (NetworkStatus::Good, data),
            Err(_) => (NetworkStatus::NetworkError, Bytes::new()),
        },
        Ok(_) | Err(_) => (NetworkStatus::NetworkError, Bytes::new()),
    }
}
