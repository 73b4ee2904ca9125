use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use cgmath::{Vector2, Vector3};

use crate::content::tile_id::{Scheme, TileId};
use crate::helpers::coord_utils::{world_to_lat_long, EARTH_CIRCUMFERENCE, ORIGIN_SHIFT};
use crate::helpers::geometry::Aabb;
use crate::helpers::{AlpError, TileLoadingContext};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SrsBounds {
    pub min: Vector2<f64>,
    pub max: Vector2<f64>,
}

/// Web-mercator bounds of a tile (TMS orientation, y growing north).
pub fn tile_bounds(id: &TileId) -> SrsBounds {
    let id = id.to_scheme(Scheme::Tms);
    let tiles_per_axis = (1u64 << id.zoom_level) as f64;
    let width_of_a_tile = EARTH_CIRCUMFERENCE / tiles_per_axis;
    let height_of_a_tile = EARTH_CIRCUMFERENCE / tiles_per_axis;
    let absolute_min = Vector2::new(-ORIGIN_SHIFT, -ORIGIN_SHIFT);
    let min = absolute_min
        + Vector2::new(
            id.coords.0 as f64 * width_of_a_tile,
            id.coords.1 as f64 * height_of_a_tile,
        );
    let max = min + Vector2::new(width_of_a_tile, height_of_a_tile);
    SrsBounds { min, max }
}

/// Tile bounds plus height bounds. Heights are stretched by the web-mercator
/// latitude factor so they live in the same distorted metres as x and y.
pub fn make_bounds(id: &TileId, min_height: f32, max_height: f32) -> Aabb {
    let srs_bounds = tile_bounds(id);
    let lat = world_to_lat_long(Vector2::new(
        0.0,
        srs_bounds.max.y.max(-srs_bounds.min.y),
    ))
    .x;
    let lat_height_factor = 1.0 / (lat * std::f64::consts::PI / 180.0).cos();
    Aabb {
        min: Vector3::new(
            srs_bounds.min.x,
            srs_bounds.min.y,
            min_height as f64 * lat_height_factor,
        ),
        max: Vector3::new(
            srs_bounds.max.x,
            srs_bounds.max.y,
            max_height as f64 * lat_height_factor,
        ),
    }
}

const TILE_HEIGHTS_FORMAT_VERSION: u8 = 1;
const FALLBACK_HEIGHT_BOUNDS: (f32, f32) = (0.0, 9000.0);

/// Sparse pyramid of per-tile (min, max) terrain heights. A query walks up
/// the ancestor chain to the deepest entry present, so a single root entry
/// already covers the whole world.
#[derive(Debug, Clone, Default)]
pub struct TileHeights {
    data: HashMap<TileId, (f32, f32)>,
}

impl TileHeights {
    pub fn new() -> TileHeights {
        TileHeights::default()
    }

    pub fn emplace(&mut self, id: TileId, bounds: (f32, f32)) {
        self.data.insert(id.to_scheme(Scheme::Tms), bounds);
    }

    pub fn query(&self, id: &TileId) -> (f32, f32) {
        let mut id = id.to_scheme(Scheme::Tms);
        loop {
            if let Some(bounds) = self.data.get(&id) {
                return *bounds;
            }
            if id.zoom_level == 0 {
                return FALLBACK_HEIGHT_BOUNDS;
            }
            id = id.parent();
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn serialise(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(2 + self.data.len() * 17);
        bytes.push(TILE_HEIGHTS_FORMAT_VERSION);
        let mut entries: Vec<(&TileId, &(f32, f32))> = self.data.iter().collect();
        entries.sort_by_key(|(id, _)| (id.zoom_level, id.coords));
        // writes to a Vec cannot fail
        let _ = bytes.write_u32::<LittleEndian>(entries.len() as u32);
        for (id, (min, max)) in entries {
            let _ = bytes.write_u8(id.zoom_level);
            let _ = bytes.write_u32::<LittleEndian>(id.coords.0);
            let _ = bytes.write_u32::<LittleEndian>(id.coords.1);
            let _ = bytes.write_f32::<LittleEndian>(*min);
            let _ = bytes.write_f32::<LittleEndian>(*max);
        }
        bytes
    }

    pub fn deserialise(bytes: &[u8]) -> Result<TileHeights, AlpError> {
        let mut reader = Cursor::new(bytes);
        let version = reader
            .read_u8()
            .tile_loading("height pyramid is truncated")?;
        if version != TILE_HEIGHTS_FORMAT_VERSION {
            return Err(AlpError::InvalidInput(format!(
                "unsupported height pyramid version {version}"
            )));
        }
        let count = reader
            .read_u32::<LittleEndian>()
            .tile_loading("height pyramid is truncated")?;
        let mut heights = TileHeights::new();
        for _ in 0..count {
            let zoom_level = reader.read_u8().tile_loading("height pyramid entry")?;
            let x = reader
                .read_u32::<LittleEndian>()
                .tile_loading("height pyramid entry")?;
            let y = reader
                .read_u32::<LittleEndian>()
                .tile_loading("height pyramid entry")?;
            let min = reader
                .read_f32::<LittleEndian>()
                .tile_loading("height pyramid entry")?;
            let max = reader
                .read_f32::<LittleEndian>()
                .tile_loading("height pyramid entry")?;
            heights.emplace(TileId::new(zoom_level, (x, y), Scheme::Tms), (min, max));
        }
        Ok(heights)
    }
}

/// Maps a tile id to its 3D bounding box using the height pyramid.
#[derive(Debug)]
pub struct AabbDecorator {
    tile_heights: TileHeights,
}

impl AabbDecorator {
    pub fn make(tile_heights: TileHeights) -> Arc<AabbDecorator> {
        Arc::new(AabbDecorator { tile_heights })
    }

    pub fn aabb(&self, id: &TileId) -> Aabb {
        let (min_height, max_height) = self.tile_heights.query(id);
        make_bounds(id, min_height, max_height)
    }
}
