use std::collections::HashMap;

use crate::content::tile_id::TileId;
use crate::content::types::{LayeredTile, TileQuad};

/// Collects the four sibling tiles of a quad, keyed by the parent id.
#[derive(Default)]
pub struct QuadAssembler {
    quads: HashMap<TileId, TileQuad>,
}

impl QuadAssembler {
    pub fn new() -> QuadAssembler {
        QuadAssembler::default()
    }

    pub fn n_items_in_flight(&self) -> usize {
        self.quads.len()
    }

    /// Register a quad and return the four child tiles to fetch.
    pub fn load(&mut self, tile_id: TileId) -> [TileId; 4] {
        self.quads.insert(tile_id, TileQuad::new(tile_id));
        tile_id.children()
    }

    /// Slot a finished tile into its quad; returns the quad once complete.
    /// A tile for an unknown parent is a pipeline bug upstream and is
    /// discarded.
    pub fn deliver_tile(&mut self, tile: LayeredTile) -> Option<TileQuad> {
        let parent = tile.id.parent();
        let Some(quad) = self.quads.get_mut(&parent) else {
            debug_assert!(false, "delivered tile {} for unknown quad {}", tile.id, parent);
            return None;
        };
        quad.tiles[quad.n_tiles] = tile;
        quad.n_tiles += 1;
        if quad.n_tiles == 4 {
            return self.quads.remove(&parent);
        }
        None
    }
}
