use cgmath::{Point3, Vector3};

use crate::dynamics::Camera;
use crate::helpers::coord_utils::lat_long_alt_to_world;

// coordinate transformer: https://epsg.io/transform#s_srs=4326&t_srs=3857

pub fn stephansdom() -> Camera {
    let coords = lat_long_alt_to_world(Vector3::new(48.20851144787232, 16.373082444395656, 171.28));
    Camera::new(
        Point3::new(coords.x, coords.y - 500.0, coords.z + 500.0),
        Point3::new(coords.x, coords.y, coords.z),
    )
}

pub fn grossglockner() -> Camera {
    let coords = lat_long_alt_to_world(Vector3::new(47.07386676653372, 12.694470292406267, 3798.0));
    Camera::new(
        Point3::new(coords.x - 300.0, coords.y - 400.0, coords.z + 100.0),
        Point3::new(coords.x, coords.y, coords.z - 100.0),
    )
}

pub fn oestl_hochgrubach_spitze() -> Camera {
    let coords = lat_long_alt_to_world(Vector3::new(47.5587933, 12.3450985, 2277.0));
    Camera::new(
        Point3::new(coords.x, coords.y - 500.0, coords.z + 500.0),
        Point3::new(coords.x, coords.y, coords.z),
    )
}
