#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::{Duration, Instant};

    use crate::content::load_service::UrlPattern;
    use crate::content::pipeline::{start_pipeline, Event};
    use crate::content::tile_id::TileId;
    use crate::dynamics::stored_positions;
    use crate::tests::unique_temp_dir;
    use crate::world::{Config, ServiceConfig};

    fn unreachable_service(path: &str) -> ServiceConfig {
        // port 9 (discard) refuses connections immediately on a loopback
        ServiceConfig {
            base_url: format!("http://127.0.0.1:9/{path}/"),
            url_pattern: UrlPattern::Zxy,
            file_ending: ".bin".to_string(),
            load_balancing_targets: Vec::new(),
        }
    }

    /// End to end over the real stages, without a network: every fetch fails
    /// with NetworkError, the quads still assemble, reach the RAM cache and
    /// get published to the GPU consumer with default payloads.
    #[test]
    fn pipeline_drains_offline() {
        let cache_dir = unique_temp_dir("pipeline-offline");
        let config = Config {
            terrain_service: unreachable_service("terrain"),
            ortho_service: unreachable_service("ortho"),
            cache_dir: Some(cache_dir.clone()),
            update_timeout_ms: 10,
            transfer_timeout_ms: 500,
            ..Config::default()
        };

        let pipeline = start_pipeline(config).expect("pipeline starts");
        pipeline.set_enabled(true).expect("send");
        let mut camera = stored_positions::stephansdom();
        camera.set_viewport_size((640, 360));
        pipeline.update_camera(camera).expect("send");

        let deadline = Instant::now() + Duration::from_secs(30);
        let mut received: Vec<TileId> = Vec::new();
        let mut published: HashSet<TileId> = HashSet::new();
        while Instant::now() < deadline && (received.is_empty() || published.is_empty()) {
            match pipeline.next_event_timeout(Duration::from_millis(250)) {
                Some(Event::QuadReceived(id)) => received.push(id),
                Some(Event::GpuQuadsUpdated { added, removed }) => {
                    let added_ids: HashSet<TileId> =
                        added.iter().map(|quad| quad.id).collect();
                    let removed_ids: HashSet<TileId> = removed.iter().copied().collect();
                    assert!(added_ids.is_disjoint(&removed_ids));
                    for quad in &added {
                        for tile in &quad.tiles {
                            // failed fetches render with the default payloads
                            assert!(!tile.ortho.is_empty());
                            assert!(!tile.height.is_empty());
                        }
                    }
                    for id in &removed_ids {
                        assert!(published.contains(id));
                    }
                    published.retain(|id| !removed_ids.contains(id));
                    published.extend(added_ids);
                }
                None => {}
            }
        }

        assert!(!received.is_empty(), "no quads were delivered");
        assert!(!published.is_empty(), "nothing was published to the gpu");
        // every published quad was delivered beforehand
        let received: HashSet<TileId> = received.into_iter().collect();
        assert!(published.iter().all(|id| received.contains(id)));

        drop(pipeline);
        let _ = std::fs::remove_dir_all(cache_dir);
    }
}
