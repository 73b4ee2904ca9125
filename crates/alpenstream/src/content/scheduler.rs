use std::collections::HashSet;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{event, Level};

use crate::cache::{disk, Cache};
use crate::content::aabb_decorator::AabbDecorator;
use crate::content::refine::refine_functor;
use crate::content::tile_id::{quadtree_traverse, TileId};
use crate::content::types::{
    GpuCacheInfo, GpuLayeredTile, GpuTileQuad, NetworkStatus, TileQuad,
};
use crate::dynamics::Camera;
use crate::helpers::time::time_since_epoch;
use crate::helpers::{AlpError, TileLoadingContext};

pub const ORTHO_TILE_SIZE: u32 = 256;
pub const HEIGHT_TILE_SIZE: u32 = 64;

pub const DEFAULT_UPDATE_TIMEOUT_MS: u64 = 100;
pub const DEFAULT_PURGE_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_GPU_QUAD_LIMIT: usize = 512;
pub const DEFAULT_RAM_QUAD_LIMIT: usize = 12000;
pub const DEFAULT_RETIREMENT_AGE_MS: u64 = 24 * 60 * 60 * 1000;

/// The RAM purge only runs once the cache overshoots its limit by this
/// divisor's worth, so a steady trickle of deliveries doesn't thrash it.
const PURGE_TOLERANCE_DIVISOR: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuQuadsDelta {
    pub added: Vec<GpuTileQuad>,
    pub removed: Vec<TileId>,
}

impl GpuQuadsDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    pub n_ram_quads: usize,
    pub n_gpu_quads: usize,
}

/// Owns the caches and decides, per camera, what to fetch, what to publish
/// to the GPU consumer and what to drop. All methods run on the pipeline
/// thread; timers are exposed as deadlines for the pipeline loop to drive.
pub struct Scheduler {
    permissible_screen_space_error: f64,
    update_timeout: Duration,
    purge_timeout: Duration,
    gpu_quad_limit: usize,
    ram_quad_limit: usize,
    retirement_age_ms: u64,
    enabled: bool,
    reachable: bool,

    current_camera: Option<Camera>,
    aabb_decorator: Option<Arc<AabbDecorator>>,
    ram_cache: Cache<TileQuad>,
    gpu_cache_info: Cache<GpuCacheInfo>,

    update_deadline: Option<Instant>,
    purge_deadline: Option<Instant>,

    default_ortho_tile: Bytes,
    default_height_tile: Bytes,
    disk_cache_dir: PathBuf,
}

impl Scheduler {
    pub fn new(
        default_ortho_tile: Bytes,
        default_height_tile: Bytes,
        disk_cache_dir: PathBuf,
    ) -> Scheduler {
        Scheduler {
            permissible_screen_space_error: 2.0,
            update_timeout: Duration::from_millis(DEFAULT_UPDATE_TIMEOUT_MS),
            purge_timeout: Duration::from_millis(DEFAULT_PURGE_TIMEOUT_MS),
            gpu_quad_limit: DEFAULT_GPU_QUAD_LIMIT,
            ram_quad_limit: DEFAULT_RAM_QUAD_LIMIT,
            retirement_age_ms: DEFAULT_RETIREMENT_AGE_MS,
            enabled: false,
            reachable: true,
            current_camera: None,
            aabb_decorator: None,
            ram_cache: Cache::new(),
            gpu_cache_info: Cache::new(),
            update_deadline: None,
            purge_deadline: None,
            default_ortho_tile,
            default_height_tile,
            disk_cache_dir,
        }
    }

    /// A plain white `size` x `size` JPEG, substituted for missing ortho
    /// payloads on GPU publish.
    pub fn white_jpeg_tile(size: u32) -> Result<Bytes, AlpError> {
        let img = image::RgbImage::from_pixel(size, size, image::Rgb([255, 255, 255]));
        let mut encoded = Vec::new();
        img.write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Jpeg)
            .tile_loading("failed to encode default ortho tile")?;
        Ok(Bytes::from(encoded))
    }

    /// A zeroed 16 bit grayscale `size` x `size` PNG, substituted for
    /// missing height payloads on GPU publish.
    pub fn black_png_tile(size: u32) -> Result<Bytes, AlpError> {
        let img = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::new(size, size);
        let mut encoded = Vec::new();
        img.write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)
            .tile_loading("failed to encode default height tile")?;
        Ok(Bytes::from(encoded))
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.schedule_update();
    }

    pub fn set_network_reachability(&mut self, reachable: bool) {
        self.reachable = reachable;
        if reachable {
            self.schedule_update();
        }
    }

    pub fn set_aabb_decorator(&mut self, aabb_decorator: Arc<AabbDecorator>) {
        self.aabb_decorator = Some(aabb_decorator);
    }

    pub fn set_permissible_screen_space_error(&mut self, error_px: f64) {
        self.permissible_screen_space_error = error_px;
    }

    pub fn set_gpu_quad_limit(&mut self, limit: usize) {
        self.gpu_quad_limit = limit;
    }

    pub fn set_ram_quad_limit(&mut self, limit: usize) {
        self.ram_quad_limit = limit;
    }

    pub fn set_update_timeout(&mut self, timeout_ms: u64) {
        self.update_timeout = Duration::from_millis(timeout_ms);
        if self.update_deadline.is_some() {
            self.update_deadline = Some(Instant::now() + self.update_timeout);
        }
    }

    pub fn set_purge_timeout(&mut self, timeout_ms: u64) {
        self.purge_timeout = Duration::from_millis(timeout_ms);
    }

    pub fn set_retirement_age(&mut self, age_ms: u64) {
        self.retirement_age_ms = age_ms;
    }

    pub fn ram_cache(&self) -> &Cache<TileQuad> {
        &self.ram_cache
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            n_ram_quads: self.ram_cache.n_cached_objects(),
            n_gpu_quads: self.gpu_cache_info.n_cached_objects(),
        }
    }

    /// Coalesced by the update timer: the first call arms it, further calls
    /// until it fires only replace the camera.
    pub fn update_camera(&mut self, camera: Camera) {
        self.current_camera = Some(camera);
        self.schedule_update();
    }

    pub fn receive_quad(&mut self, quad: TileQuad) -> TileId {
        debug_assert!(quad.n_tiles >= 1 && quad.n_tiles <= 4);
        debug_assert!(quad.tiles[..quad.n_tiles]
            .iter()
            .all(|t| t.id.parent() == quad.id));
        let id = quad.id;
        self.ram_cache.insert(quad);
        self.schedule_update();
        self.schedule_purge();
        id
    }

    pub fn receive_quads(&mut self, quads: Vec<TileQuad>) -> Vec<TileId> {
        quads.into_iter().map(|q| self.receive_quad(q)).collect()
    }

    fn schedule_update(&mut self) {
        if self.enabled && self.update_deadline.is_none() {
            self.update_deadline = Some(Instant::now() + self.update_timeout);
        }
    }

    /// A debounce that is deliberately NOT restarted by later deliveries, so
    /// a steady stream of arrivals still triggers cleanup eventually.
    fn schedule_purge(&mut self) {
        if self.purge_deadline.is_none() {
            self.purge_deadline = Some(Instant::now() + self.purge_timeout);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.update_deadline, self.purge_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire any elapsed timers; returns the request set and the GPU delta if
    /// an update ran.
    pub fn process_timers(
        &mut self,
        now: Instant,
    ) -> (Option<Vec<TileId>>, Option<GpuQuadsDelta>) {
        let mut requests = None;
        let mut delta = None;
        if self.update_deadline.is_some_and(|deadline| now >= deadline) {
            self.update_deadline = None;
            delta = self.update_gpu_quads();
            requests = self.send_quad_requests();
            self.schedule_purge();
        }
        if self.purge_deadline.is_some_and(|deadline| now >= deadline) {
            self.purge_deadline = None;
            self.purge_ram_cache();
        }
        (requests, delta)
    }

    fn tiles_for_current_camera_position(&self) -> Vec<TileId> {
        let (Some(camera), Some(decorator)) = (&self.current_camera, &self.aabb_decorator) else {
            return Vec::new();
        };
        let refine = refine_functor(
            camera,
            decorator,
            self.permissible_screen_space_error,
            ORTHO_TILE_SIZE as f64,
        );
        let mut inner_nodes = Vec::new();
        quadtree_traverse(TileId::root(), &refine, &mut inner_nodes);
        inner_nodes
    }

    /// The full current desire minus what RAM already answers. NotFound is
    /// authoritative until retirement; NetworkError is always re-eligible.
    /// Gated on reachability: while offline nothing is emitted, in-flight
    /// work drains normally.
    pub fn send_quad_requests(&mut self) -> Option<Vec<TileId>> {
        if !self.enabled || !self.reachable {
            return None;
        }
        if self.current_camera.is_none() || self.aabb_decorator.is_none() {
            return None;
        }
        let now = time_since_epoch();
        let mut tiles = self.tiles_for_current_camera_position();
        tiles.retain(|id| match self.ram_cache.peek_at(id) {
            None => true,
            Some(quad) => {
                let info = quad.network_info();
                match info.status {
                    NetworkStatus::NetworkError => true,
                    NetworkStatus::Good | NetworkStatus::NotFound => {
                        now.saturating_sub(info.timestamp_ms) > self.retirement_age_ms
                    }
                }
            }
        });
        Some(tiles)
    }

    /// Recompute the camera-optimized working set: the most recently used
    /// RAM quads that the current camera demands, capped at the GPU limit.
    /// Published as a delta against the GPU mirror; added and removed are
    /// disjoint.
    pub fn update_gpu_quads(&mut self) -> Option<GpuQuadsDelta> {
        let decorator = self.aabb_decorator.clone()?;
        self.current_camera.as_ref()?;

        let desired: HashSet<TileId> = self
            .tiles_for_current_camera_position()
            .into_iter()
            .collect();

        let mut candidates: Vec<TileId> = Vec::new();
        self.ram_cache.visit(|quad| {
            if desired.contains(&quad.id) {
                candidates.push(quad.id);
            }
            candidates.len() < self.gpu_quad_limit
        });

        let mut added_ids = Vec::new();
        for id in &candidates {
            self.ram_cache.touch(id);
            if !self.gpu_cache_info.contains(id) {
                added_ids.push(*id);
            }
            self.gpu_cache_info.insert(GpuCacheInfo { id: *id });
        }

        let removed: Vec<TileId> = self
            .gpu_cache_info
            .purge(self.gpu_quad_limit)
            .into_iter()
            .map(|info| info.id)
            .collect();

        let added: Vec<GpuTileQuad> = added_ids
            .iter()
            .filter_map(|id| self.ram_cache.peek_at(id))
            .map(|quad| unpack_quad(quad, &decorator, &self.default_ortho_tile, &self.default_height_tile))
            .collect();

        let delta = GpuQuadsDelta { added, removed };
        if delta.is_empty() {
            None
        } else {
            Some(delta)
        }
    }

    pub fn purge_ram_cache(&mut self) {
        let tolerance = self.ram_quad_limit / PURGE_TOLERANCE_DIVISOR;
        if self.ram_cache.n_cached_objects() <= self.ram_quad_limit + tolerance {
            return;
        }
        let purged = self.ram_cache.purge(self.ram_quad_limit);
        event!(Level::DEBUG, "purged {} quads from ram cache", purged.len());
    }

    /// Best effort: a failed persist is logged and otherwise ignored.
    pub fn persist_tiles(&self) {
        let mut quads: Vec<&TileQuad> = Vec::with_capacity(self.ram_cache.n_cached_objects());
        self.ram_cache.visit(|quad| {
            quads.push(quad);
            true
        });
        if let Err(e) = disk::write_quads(&self.disk_cache_dir, quads.into_iter()) {
            event!(Level::WARN, "failed to persist tile cache: {e}");
        }
    }

    pub fn read_disk_cache(&mut self) {
        let quads = disk::read_quads(&self.disk_cache_dir);
        event!(Level::INFO, "read {} quads from disk cache", quads.len());
        self.ram_cache.insert_all(quads);
        self.ram_cache.purge(self.ram_quad_limit);
    }
}

/// Prepare a quad for the GPU consumer: every child slot gets decorator
/// bounds and a full payload, substituting the defaults where a layer is
/// missing. This keeps the renderer's "every published tile has a texture"
/// invariant even for NotFound children.
fn unpack_quad(
    quad: &TileQuad,
    decorator: &AabbDecorator,
    default_ortho: &Bytes,
    default_height: &Bytes,
) -> GpuTileQuad {
    let unpack_tile = |id: &TileId, ortho: &Bytes, height: &Bytes, vector: &Bytes| GpuLayeredTile {
        id: *id,
        bounds: decorator.aabb(id),
        ortho: if ortho.is_empty() {
            default_ortho.clone()
        } else {
            ortho.clone()
        },
        height: if height.is_empty() {
            default_height.clone()
        } else {
            height.clone()
        },
        vector: vector.clone(),
    };

    let empty = Bytes::new();
    let mut tiles: Vec<GpuLayeredTile> = quad.tiles[..quad.n_tiles]
        .iter()
        .map(|tile| unpack_tile(&tile.id, &tile.ortho, &tile.height, &tile.vector))
        .collect();
    // children a partial quad never delivered still get published, with
    // default payloads
    for child in quad.id.children() {
        if tiles.len() == 4 {
            break;
        }
        if tiles.iter().any(|tile| tile.id == child) {
            continue;
        }
        tiles.push(unpack_tile(&child, &empty, &empty, &empty));
    }

    let tiles: [GpuLayeredTile; 4] = tiles
        .try_into()
        .unwrap_or_else(|_| {
            quad.id
                .children()
                .map(|child| unpack_tile(&child, &empty, &empty, &empty))
        });

    GpuTileQuad { id: quad.id, tiles }
}
