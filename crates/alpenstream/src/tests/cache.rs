#[cfg(test)]
mod tests {
    use crate::cache::Cache;
    use crate::content::tile_id::{Scheme, TileId};
    use crate::content::types::GpuCacheInfo;

    fn id(zoom: u8, x: u32, y: u32) -> TileId {
        TileId::new(zoom, (x, y), Scheme::Tms)
    }

    fn filled_cache(ids: &[TileId]) -> Cache<GpuCacheInfo> {
        let mut cache = Cache::new();
        cache.insert_all(ids.iter().map(|id| GpuCacheInfo { id: *id }));
        cache
    }

    fn visit_order(cache: &Cache<GpuCacheInfo>) -> Vec<TileId> {
        let mut order = Vec::new();
        cache.visit(|info| {
            order.push(info.id);
            true
        });
        order
    }

    #[test]
    fn insert_contains_peek() {
        let a = id(0, 0, 0);
        let b = id(1, 1, 1);
        let mut cache = filled_cache(&[a]);
        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert_eq!(cache.peek_at(&a).map(|info| info.id), Some(a));
        assert!(cache.peek_at(&b).is_none());
        assert_eq!(cache.n_cached_objects(), 1);
        cache.insert(GpuCacheInfo { id: b });
        assert_eq!(cache.n_cached_objects(), 2);
    }

    #[test]
    fn visit_runs_most_recent_first() {
        let (a, b, c) = (id(0, 0, 0), id(1, 1, 1), id(2, 2, 2));
        let mut cache = filled_cache(&[a, b, c]);
        assert_eq!(visit_order(&cache), vec![c, b, a]);

        cache.touch(&a);
        assert_eq!(visit_order(&cache), vec![a, c, b]);

        // peeking must not promote
        let _ = cache.peek_at(&b);
        assert_eq!(visit_order(&cache), vec![a, c, b]);

        // re-inserting counts as touching
        cache.insert(GpuCacheInfo { id: b });
        assert_eq!(visit_order(&cache), vec![b, a, c]);
    }

    #[test]
    fn visit_stops_when_asked() {
        let cache = filled_cache(&[id(0, 0, 0), id(1, 1, 1), id(2, 2, 2)]);
        let mut n_visited = 0;
        cache.visit(|_| {
            n_visited += 1;
            n_visited < 2
        });
        assert_eq!(n_visited, 2);
    }

    #[test]
    fn purge_drops_least_recent_entries() {
        let ids: Vec<TileId> = (0..6).map(|i| id(5, i, i)).collect();
        let mut cache = filled_cache(&ids);
        cache.touch(&ids[0]);

        let removed = cache.purge(3);
        assert_eq!(cache.n_cached_objects(), 3);
        let removed_ids: Vec<TileId> = removed.iter().map(|info| info.id).collect();
        // ids[0] was touched, so the three oldest others go, oldest first
        assert_eq!(removed_ids, vec![ids[1], ids[2], ids[3]]);
        assert!(cache.contains(&ids[0]));
        assert!(cache.contains(&ids[4]));
        assert!(cache.contains(&ids[5]));
    }

    #[test]
    fn purge_below_limit_is_a_no_op() {
        let mut cache = filled_cache(&[id(0, 0, 0), id(1, 1, 1)]);
        assert!(cache.purge(2).is_empty());
        assert_eq!(cache.n_cached_objects(), 2);
    }
}
