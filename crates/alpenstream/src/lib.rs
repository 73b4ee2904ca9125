mod cache;
mod content;
mod dynamics;
mod helpers;
mod world;

#[cfg(test)]
mod tests;

pub use cache::Cache;
pub use content::{
    start_pipeline, AabbDecorator, Command, Event, GpuCacheInfo, GpuLayeredTile, GpuQuadsDelta,
    GpuTileQuad, LayeredTile, NamedTile, NetworkInfo, NetworkStatus, Pipeline, Scheduler,
    SchedulerStats, Scheme, SrsAndHeightBounds, TileHeights, TileId, TileLayer, TileQuad,
    UrlPattern,
};
pub use dynamics::{stored_positions, Camera};
pub use helpers::geometry::{Aabb, Plane};
pub use helpers::{init_logging, AlpError};
pub use world::{load_config, Config, ServiceConfig};
