use std::path::PathBuf;

mod cache;
mod camera;
mod limiters;
mod load_service;
mod pipeline;
mod refine;
mod tile_id;

pub fn unique_temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "alpenstream-{}-{}-{:016x}",
        tag,
        std::process::id(),
        rand::random::<u64>()
    ))
}
