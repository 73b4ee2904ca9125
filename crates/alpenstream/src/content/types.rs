use crate::content::tile_id::TileId;
use crate::helpers::geometry::Aabb;
use bytes::Bytes;

/// Outcome of a tile fetch, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NetworkStatus {
    Good = 0,
    NotFound = 1,
    NetworkError = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    pub status: NetworkStatus,
    pub timestamp_ms: u64,
}

impl NetworkInfo {
    pub fn new(status: NetworkStatus, timestamp_ms: u64) -> NetworkInfo {
        NetworkInfo {
            status,
            timestamp_ms,
        }
    }

    /// A compound is as bad as its worst and as stale as its stalest part.
    pub fn join(a: NetworkInfo, b: NetworkInfo) -> NetworkInfo {
        NetworkInfo {
            status: a.status.max(b.status),
            timestamp_ms: a.timestamp_ms.min(b.timestamp_ms),
        }
    }
}

/// Anything keyed by a tile id; the caches are generic over this.
pub trait NamedTile {
    fn tile_id(&self) -> TileId;
}

/// One layer (ortho, height or vector) of one tile, as it comes back from a
/// tile service. `data` is empty unless the status is `Good`.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub id: TileId,
    pub network_info: NetworkInfo,
    pub data: Bytes,
}

impl NamedTile for TileLayer {
    fn tile_id(&self) -> TileId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayeredTile {
    pub id: TileId,
    pub network_info: NetworkInfo,
    pub ortho: Bytes,
    pub height: Bytes,
    pub vector: Bytes,
}

impl Default for LayeredTile {
    fn default() -> LayeredTile {
        LayeredTile {
            id: TileId::root(),
            network_info: NetworkInfo::new(NetworkStatus::Good, 0),
            ortho: Bytes::new(),
            height: Bytes::new(),
            vector: Bytes::new(),
        }
    }
}

impl NamedTile for LayeredTile {
    fn tile_id(&self) -> TileId {
        self.id
    }
}

/// The four children of `id`, the unit of request, delivery and caching.
/// `tiles[..n_tiles]` are filled in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub struct TileQuad {
    pub id: TileId,
    pub n_tiles: usize,
    pub tiles: [LayeredTile; 4],
}

impl TileQuad {
    pub fn new(id: TileId) -> TileQuad {
        TileQuad {
            id,
            n_tiles: 0,
            tiles: Default::default(),
        }
    }

    pub fn network_info(&self) -> NetworkInfo {
        let mut info = NetworkInfo::new(NetworkStatus::Good, u64::MAX);
        for tile in &self.tiles[..self.n_tiles] {
            info = NetworkInfo::join(info, tile.network_info);
        }
        info
    }
}

impl NamedTile for TileQuad {
    fn tile_id(&self) -> TileId {
        self.id
    }
}

/// What the GPU consumer currently holds, mirrored scheduler-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuCacheInfo {
    pub id: TileId,
}

impl NamedTile for GpuCacheInfo {
    fn tile_id(&self) -> TileId {
        self.id
    }
}

pub type SrsAndHeightBounds = Aabb;

#[derive(Debug, Clone, PartialEq)]
pub struct GpuLayeredTile {
    pub id: TileId,
    pub bounds: SrsAndHeightBounds,
    pub ortho: Bytes,
    pub height: Bytes,
    pub vector: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GpuTileQuad {
    pub id: TileId,
    pub tiles: [GpuLayeredTile; 4],
}

impl NamedTile for GpuTileQuad {
    fn tile_id(&self) -> TileId {
        self.id
    }
}
