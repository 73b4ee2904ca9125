use std::collections::VecDeque;

use crate::content::tile_id::TileId;

pub const DEFAULT_RATE: usize = 100;
pub const DEFAULT_PERIOD_MS: u64 = 1000;

/// Lets at most `rate` requests through per sliding window of `period_ms`.
/// Overflow is queued; `next_deadline_ms` tells the pipeline loop when to
/// call `process_queue` again. Time is passed in explicitly so the window
/// behavior is testable without sleeping.
pub struct RateLimiter {
    rate: usize,
    period_ms: u64,
    send_timestamps: VecDeque<u64>,
    request_queue: VecDeque<TileId>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        RateLimiter::new()
    }
}

impl RateLimiter {
    pub fn new() -> RateLimiter {
        RateLimiter {
            rate: DEFAULT_RATE,
            period_ms: DEFAULT_PERIOD_MS,
            send_timestamps: VecDeque::new(),
            request_queue: VecDeque::new(),
        }
    }

    pub fn set_limit(&mut self, rate: usize, period_ms: u64) {
        debug_assert!(rate > 0);
        debug_assert!(period_ms > 0);
        self.rate = rate;
        self.period_ms = period_ms;
    }

    pub fn queue_len(&self) -> usize {
        self.request_queue.len()
    }

    /// Forward the id immediately if the window allows it, else queue it.
    pub fn request_quad(&mut self, id: TileId, now_ms: u64) -> Option<TileId> {
        self.prune_window(now_ms);
        if self.send_timestamps.len() < self.rate {
            self.send_timestamps.push_back(now_ms);
            Some(id)
        } else {
            self.request_queue.push_back(id);
            None
        }
    }

    /// Drain as many queued ids as the window allows right now.
    pub fn process_queue(&mut self, now_ms: u64) -> Vec<TileId> {
        self.prune_window(now_ms);
        let mut released = Vec::new();
        while self.send_timestamps.len() < self.rate {
            let Some(id) = self.request_queue.pop_front() else {
                break;
            };
            self.send_timestamps.push_back(now_ms);
            released.push(id);
        }
        released
    }

    /// When the oldest in-window send falls out of the window, earliest time
    /// queued ids can go out. None while the queue is empty.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        if self.request_queue.is_empty() {
            return None;
        }
        self.send_timestamps.front().map(|t| t + self.period_ms)
    }

    fn prune_window(&mut self, now_ms: u64) {
        while let Some(&sent) = self.send_timestamps.front() {
            if now_ms >= sent + self.period_ms {
                self.send_timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}
