#[cfg(test)]
mod tests {
    use crate::content::rate_limiter::RateLimiter;
    use crate::content::slot_limiter::SlotLimiter;
    use crate::content::tile_id::{Scheme, TileId};
    use crate::content::types::TileQuad;

    fn id(zoom: u8, x: u32, y: u32) -> TileId {
        TileId::new(zoom, (x, y), Scheme::Tms)
    }

    fn quad(tile_id: TileId) -> TileQuad {
        TileQuad::new(tile_id)
    }

    #[test]
    fn slot_limiter_caps_in_flight_requests() {
        let mut limiter = SlotLimiter::new();
        limiter.set_limit(2);
        let ids = [id(1, 0, 0), id(1, 1, 0), id(1, 0, 1), id(1, 1, 1)];
        let forwarded = limiter.request_quads(&ids);
        assert_eq!(forwarded, vec![ids[0], ids[1]]);
        assert_eq!(limiter.slots_taken(), 2);

        // finishing one admits the first queued id
        let (delivered, admitted) = limiter.deliver_quad(quad(ids[0]));
        assert_eq!(delivered.id, ids[0]);
        assert_eq!(admitted, Some(ids[2]));
        assert_eq!(limiter.slots_taken(), 2);
    }

    #[test]
    fn slot_limiter_deduplicates_in_flight_ids() {
        let mut limiter = SlotLimiter::new();
        limiter.set_limit(4);
        let ids = [id(1, 0, 0), id(1, 1, 0)];
        assert_eq!(limiter.request_quads(&ids).len(), 2);
        // the scheduler resends its full desire; nothing goes out twice
        assert!(limiter.request_quads(&ids).is_empty());
        assert_eq!(limiter.slots_taken(), 2);
    }

    #[test]
    fn slot_limiter_queue_is_replaced_on_each_request() {
        let mut limiter = SlotLimiter::new();
        limiter.set_limit(2);
        let first = [id(1, 0, 0), id(1, 1, 0), id(1, 0, 1), id(1, 1, 1)];
        limiter.request_quads(&first);

        // camera moved on, stale queued desires (first[2], first[3]) vanish
        let second = [id(1, 0, 0), id(1, 1, 0), id(2, 2, 2), id(2, 3, 3)];
        assert!(limiter.request_quads(&second).is_empty());
        let (_, admitted) = limiter.deliver_quad(quad(first[0]));
        assert_eq!(admitted, Some(id(2, 2, 2)));
    }

    #[test]
    fn rate_limiter_enforces_the_window() {
        let mut limiter = RateLimiter::new();
        limiter.set_limit(3, 1000);

        assert!(limiter.request_quad(id(1, 0, 0), 0).is_some());
        assert!(limiter.request_quad(id(1, 1, 0), 10).is_some());
        assert!(limiter.request_quad(id(1, 0, 1), 20).is_some());
        // window full
        assert!(limiter.request_quad(id(1, 1, 1), 30).is_none());
        assert!(limiter.request_quad(id(2, 0, 0), 40).is_none());
        assert_eq!(limiter.queue_len(), 2);
        assert_eq!(limiter.next_deadline_ms(), Some(1000));

        // nothing drains before the first send leaves the window
        assert!(limiter.process_queue(999).is_empty());
        // at 1005 only the send from t=0 has expired
        assert_eq!(limiter.process_queue(1005), vec![id(1, 1, 1)]);
        assert_eq!(limiter.next_deadline_ms(), Some(1010));
        assert_eq!(limiter.process_queue(1050), vec![id(2, 0, 0)]);
        assert_eq!(limiter.next_deadline_ms(), None);
    }

    #[test]
    fn rate_limiter_never_exceeds_rate_in_any_window() {
        let mut limiter = RateLimiter::new();
        let (rate, period) = (5, 100);
        limiter.set_limit(rate, period);

        let mut emissions: Vec<u64> = Vec::new();
        let mut now = 0;
        for i in 0..60u32 {
            now = i as u64 * 7;
            if limiter
                .request_quad(id(10, i, i), now)
                .is_some()
            {
                emissions.push(now);
            }
            emissions.extend(limiter.process_queue(now).iter().map(|_| now));
        }
        // drain the rest
        for _ in 0..40 {
            now += period;
            emissions.extend(limiter.process_queue(now).iter().map(|_| now));
        }
        assert_eq!(emissions.len(), 60);
        for (i, start) in emissions.iter().enumerate() {
            let in_window = emissions[i..]
                .iter()
                .take_while(|t| **t < start + period)
                .count();
            assert!(
                in_window <= rate,
                "{in_window} emissions within one window starting at {start}"
            );
        }
    }
}
