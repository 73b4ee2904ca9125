use cgmath::{InnerSpace, Vector2, Vector3};

use crate::content::aabb_decorator::AabbDecorator;
use crate::content::tile_id::{TileId, MAX_ZOOM_LEVEL};
use crate::dynamics::Camera;
use crate::helpers::geometry::{clip, triangulise, Triangle};

fn nearest_vertex(position: Vector3<f64>, triangles: &[Triangle]) -> Vector3<f64> {
    let distance2 = |point: &Vector3<f64>| (*point - position).magnitude2();
    let mut nearest_point = triangles[0][0];
    let mut nearest_distance = distance2(&nearest_point);
    for triangle in triangles {
        for point in triangle {
            let current = distance2(point);
            if current < nearest_distance {
                nearest_point = *point;
                nearest_distance = current;
            }
        }
    }
    nearest_point
}

/// Screen-space-error test: does this tile need to be subdivided for the
/// given camera? Compares the on-screen size of one source texel at the
/// tile's nearest visible point against `error_threshold_px`.
pub fn refine_functor<'a>(
    camera: &Camera,
    aabb_decorator: &'a AabbDecorator,
    error_threshold_px: f64,
    tile_size: f64,
) -> impl Fn(&TileId) -> bool + 'a {
    let clipping_planes = camera.four_clipping_planes();
    let vp_mat = camera.world_view_projection_matrix();
    let camera_position = camera.position();
    let camera_x_axis = camera.x_axis();
    let viewport_width = camera.viewport_size().0 as f64;

    move |tile: &TileId| {
        if tile.zoom_level >= MAX_ZOOM_LEVEL {
            return false;
        }

        let tile_aabb = aabb_decorator.aabb(tile);

        let triangles = clip(triangulise(&tile_aabb), &clipping_planes);
        if triangles.is_empty() {
            return false;
        }

        let nearest_point = nearest_vertex(camera_position, &triangles);
        let aabb_width = tile_aabb.size().x;
        let other_point = nearest_point + camera_x_axis * (aabb_width / tile_size);

        let nearest_clip = vp_mat * nearest_point.extend(1.0);
        let other_clip = vp_mat * other_point.extend(1.0);
        let nearest_ndc = nearest_clip.truncate() / nearest_clip.w;
        let other_ndc = other_clip.truncate() / other_clip.w;

        let clip_space_difference = Vector2::new(
            nearest_ndc.x - other_ndc.x,
            nearest_ndc.y - other_ndc.y,
        )
        .magnitude();
        if !clip_space_difference.is_finite() {
            // nearest point (numerically) at the eye, definitely too coarse
            return true;
        }

        clip_space_difference * 0.5 * viewport_width >= error_threshold_px
    }
}
