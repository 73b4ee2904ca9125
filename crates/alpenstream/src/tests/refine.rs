#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::content::aabb_decorator::{AabbDecorator, TileHeights};
    use crate::content::refine::refine_functor;
    use crate::content::tile_id::{Scheme, TileId};
    use crate::dynamics::stored_positions;

    fn decorator() -> Arc<AabbDecorator> {
        let mut heights = TileHeights::new();
        heights.emplace(TileId::root(), (100.0, 4000.0));
        AabbDecorator::make(heights)
    }

    #[test]
    fn max_zoom_is_never_refined() {
        let decorator = decorator();
        let mut camera = stored_positions::stephansdom();
        camera.set_viewport_size((1920, 1080));
        let refine = refine_functor(&camera, &decorator, 2.0, 256.0);
        assert!(!refine(&TileId::new(18, (69 << 11, 83 << 11), Scheme::Tms)));
        assert!(!refine(&TileId::new(25, (0, 0), Scheme::Tms)));
    }

    #[test]
    fn tiles_around_the_camera_refine() {
        let decorator = decorator();
        let mut camera = stored_positions::stephansdom();
        camera.set_viewport_size((1920, 1080));
        let refine = refine_functor(&camera, &decorator, 2.0, 256.0);
        assert!(refine(&TileId::root()));
        // the zoom chain over central Vienna
        assert!(refine(&TileId::new(1, (1, 1), Scheme::Tms)));
        assert!(refine(&TileId::new(4, (8, 10), Scheme::Tms)));
        assert!(refine(&TileId::new(12, (2234, 2675), Scheme::Tms)));
    }

    #[test]
    fn tiles_outside_the_frustum_do_not_refine() {
        let decorator = decorator();
        let mut camera = stored_positions::stephansdom();
        camera.set_viewport_size((1920, 1080));
        let refine = refine_functor(&camera, &decorator, 2.0, 256.0);
        // pacific, on the opposite side of the planet
        assert!(!refine(&TileId::new(10, (0, 512), Scheme::Tms)));
        // grossglockner flank, west-south-west and behind the view
        assert!(!refine(&TileId::new(9, (273, 332), Scheme::Tms)));
    }

    #[test]
    fn higher_threshold_refines_less_deep() {
        let decorator = decorator();
        let mut camera = stored_positions::stephansdom();
        camera.set_viewport_size((1920, 1080));
        let strict = refine_functor(&camera, &decorator, 2.0, 256.0);
        let relaxed = refine_functor(&camera, &decorator, 1024.0, 256.0);
        let vienna_z12 = TileId::new(12, (2234, 2675), Scheme::Tms);
        assert!(strict(&vienna_z12));
        assert!(!relaxed(&vienna_z12));
    }
}
