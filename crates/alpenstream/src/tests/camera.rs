#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Point3, Vector3};

    use crate::dynamics::{stored_positions, Camera};

    #[test]
    fn look_at_point_projects_to_the_screen_centre() {
        let eye = Point3::new(1000.0, 2000.0, 500.0);
        let target = Point3::new(1000.0, 3000.0, 0.0);
        let camera = Camera::new(eye, target);

        let clip = camera.world_view_projection_matrix()
            * Vector3::new(target.x, target.y, target.z).extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-9);
        assert!(ndc.y.abs() < 1e-9);
        assert!(clip.w > 0.0);
    }

    #[test]
    fn position_and_x_axis() {
        let eye = Point3::new(10.0, 20.0, 30.0);
        let camera = Camera::new(eye, Point3::new(10.0, 120.0, 30.0));
        let position = camera.position();
        assert!((position - Vector3::new(10.0, 20.0, 30.0)).magnitude() < 1e-9);
        // looking along +y, camera right is +x
        let x_axis = camera.x_axis();
        assert!((x_axis - Vector3::unit_x()).magnitude() < 1e-9);
    }

    #[test]
    fn four_clipping_planes_contain_the_view_direction() {
        use crate::helpers::coord_utils::lat_long_alt_to_world;

        let mut camera = stored_positions::stephansdom();
        camera.set_viewport_size((1920, 1080));
        let planes = camera.four_clipping_planes();
        assert_eq!(planes.len(), 4);

        // the camera looks at the dom, which must be inside all side planes
        let target =
            lat_long_alt_to_world(Vector3::new(48.20851144787232, 16.373082444395656, 171.28));
        for plane in &planes {
            assert!(
                plane.signed_distance(target) > 0.0,
                "point ahead of the camera clipped by a side plane"
            );
        }
        // a point far behind the camera is outside at least one plane
        let eye = camera.position();
        let behind = eye + (eye - target) * 100.0;
        assert!(planes.iter().any(|p| p.signed_distance(behind) < 0.0));
    }
}
