use std::collections::HashMap;

use crate::content::tile_id::TileId;
use crate::content::types::NamedTile;
use crate::helpers::time::time_since_epoch;

struct CacheObject<T> {
    data: T,
    stamp: u64,
    last_touched_ms: u64,
}

/// Bounded map from tile id to tile, with recency tracking. `insert` and
/// `touch` update recency, `peek_at` does not. Ordering ties on the wall
/// clock are broken by a monotonic stamp, which keeps `visit` and `purge`
/// deterministic within one run.
pub struct Cache<T: NamedTile> {
    objects: HashMap<TileId, CacheObject<T>>,
    stamp_counter: u64,
}

impl<T: NamedTile> Default for Cache<T> {
    fn default() -> Self {
        Cache::new()
    }
}

impl<T: NamedTile> Cache<T> {
    pub fn new() -> Cache<T> {
        Cache {
            objects: HashMap::new(),
            stamp_counter: 0,
        }
    }

    pub fn insert(&mut self, tile: T) {
        self.stamp_counter += 1;
        let id = tile.tile_id();
        self.objects.insert(
            id,
            CacheObject {
                data: tile,
                stamp: self.stamp_counter,
                last_touched_ms: time_since_epoch(),
            },
        );
    }

    pub fn insert_all(&mut self, tiles: impl IntoIterator<Item = T>) {
        for tile in tiles {
            self.insert(tile);
        }
    }

    pub fn contains(&self, id: &TileId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn touch(&mut self, id: &TileId) {
        self.stamp_counter += 1;
        if let Some(object) = self.objects.get_mut(id) {
            object.stamp = self.stamp_counter;
            object.last_touched_ms = time_since_epoch();
        }
    }

    pub fn peek_at(&self, id: &TileId) -> Option<&T> {
        self.objects.get(id).map(|object| &object.data)
    }

    pub fn n_cached_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Visit entries most-recent-first, stopping when `visitor` returns
    /// false. Recency is not updated.
    pub fn visit<'a>(&'a self, mut visitor: impl FnMut(&'a T) -> bool) {
        let mut order: Vec<&CacheObject<T>> = self.objects.values().collect();
        order.sort_by(|a, b| {
            (b.last_touched_ms, b.stamp).cmp(&(a.last_touched_ms, a.stamp))
        });
        for object in order {
            if !visitor(&object.data) {
                return;
            }
        }
    }

    /// Drop least-recently-touched entries until at most `limit` remain.
    /// Returns the evicted tiles, least recent first.
    pub fn purge(&mut self, limit: usize) -> Vec<T> {
        if self.objects.len() <= limit {
            return Vec::new();
        }
        let mut order: Vec<(TileId, u64, u64)> = self
            .objects
            .iter()
            .map(|(id, object)| (*id, object.last_touched_ms, object.stamp))
            .collect();
        order.sort_by(|a, b| (a.1, a.2).cmp(&(b.1, b.2)));
        let n_to_remove = self.objects.len() - limit;
        let mut removed = Vec::with_capacity(n_to_remove);
        for (id, _, _) in order.into_iter().take(n_to_remove) {
            if let Some(object) = self.objects.remove(&id) {
                removed.push(object.data);
            }
        }
        removed
    }
}
