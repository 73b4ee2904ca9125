use std::collections::HashMap;

use bytes::Bytes;

use crate::content::load_service::LayerKind;
use crate::content::tile_id::TileId;
use crate::content::types::{LayeredTile, NetworkInfo, NetworkStatus, TileLayer};

/// Joins the per-layer responses for one tile into a `LayeredTile` once all
/// configured layers have arrived.
pub struct LayerAssembler {
    ortho_data: HashMap<TileId, TileLayer>,
    height_data: HashMap<TileId, TileLayer>,
    vector_data: HashMap<TileId, TileLayer>,
    vector_enabled: bool,
}

impl LayerAssembler {
    pub fn new(vector_enabled: bool) -> LayerAssembler {
        LayerAssembler {
            ortho_data: HashMap::new(),
            height_data: HashMap::new(),
            vector_data: HashMap::new(),
            vector_enabled,
        }
    }

    pub fn n_items_in_flight(&self) -> usize {
        self.ortho_data.len() + self.height_data.len() + self.vector_data.len()
    }

    pub fn deliver(&mut self, layer: LayerKind, tile: TileLayer) -> Option<LayeredTile> {
        let id = tile.id;
        match layer {
            LayerKind::Ortho => self.ortho_data.insert(id, tile),
            LayerKind::Height => self.height_data.insert(id, tile),
            LayerKind::Vector => self.vector_data.insert(id, tile),
        };
        self.check_and_join(id)
    }

    pub fn deliver_ortho(&mut self, tile: TileLayer) -> Option<LayeredTile> {
        self.deliver(LayerKind::Ortho, tile)
    }

    pub fn deliver_height(&mut self, tile: TileLayer) -> Option<LayeredTile> {
        self.deliver(LayerKind::Height, tile)
    }

    pub fn deliver_vector(&mut self, tile: TileLayer) -> Option<LayeredTile> {
        self.deliver(LayerKind::Vector, tile)
    }

    fn check_and_join(&mut self, id: TileId) -> Option<LayeredTile> {
        let complete = self.ortho_data.contains_key(&id)
            && self.height_data.contains_key(&id)
            && (!self.vector_enabled || self.vector_data.contains_key(&id));
        if !complete {
            return None;
        }
        let ortho = self.ortho_data.remove(&id)?;
        let height = self.height_data.remove(&id)?;
        let vector = self.vector_data.remove(&id);
        Some(Self::join(ortho, height, vector))
    }

    /// Status is the severity-max of ortho and height, timestamp the min.
    /// The vector overlay is excluded from the join: it is 404 for tiles
    /// without POIs, which must not invalidate the terrain. All payloads are
    /// blanked unless the joined status is `Good`.
    pub fn join(ortho: TileLayer, height: TileLayer, vector: Option<TileLayer>) -> LayeredTile {
        debug_assert_eq!(ortho.id, height.id);
        let network_info = NetworkInfo::join(ortho.network_info, height.network_info);
        let data_filter = |data: Bytes| {
            if network_info.status == NetworkStatus::Good {
                data
            } else {
                Bytes::new()
            }
        };
        let vector_data = vector
            .filter(|v| {
                debug_assert_eq!(ortho.id, v.id);
                v.network_info.status == NetworkStatus::Good
            })
            .map(|v| data_filter(v.data))
            .unwrap_or_default();
        LayeredTile {
            id: ortho.id,
            network_info,
            ortho: data_filter(ortho.data),
            height: data_filter(height.data),
            vector: vector_data,
        }
    }
}
