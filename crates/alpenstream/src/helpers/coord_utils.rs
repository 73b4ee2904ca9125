use cgmath::{Vector2, Vector3};

// EPSG:3857 (web mercator). Coordinates are metres, 0 m northing on the
// equator, 0 m easting on the prime meridian. Vienna is about 1 822 577 m
// east and 6 141 664 m north.
pub const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
pub const EARTH_CIRCUMFERENCE: f64 = 2.0 * std::f64::consts::PI * SEMI_MAJOR_AXIS;
pub const ORIGIN_SHIFT: f64 = EARTH_CIRCUMFERENCE / 2.0;

pub fn lat_long_to_world(lat_long: Vector2<f64>) -> Vector2<f64> {
    let x = lat_long.y / 180.0 * ORIGIN_SHIFT;
    let y = ((90.0 + lat_long.x) * std::f64::consts::PI / 360.0).tan().ln() / std::f64::consts::PI
        * ORIGIN_SHIFT;
    Vector2::new(x, y)
}

pub fn lat_long_alt_to_world(lat_long_alt: Vector3<f64>) -> Vector3<f64> {
    let world = lat_long_to_world(Vector2::new(lat_long_alt.x, lat_long_alt.y));
    Vector3::new(world.x, world.y, lat_long_alt.z)
}

pub fn world_to_lat_long(world: Vector2<f64>) -> Vector2<f64> {
    let long = world.x / ORIGIN_SHIFT * 180.0;
    let lat = ((world.y / ORIGIN_SHIFT * std::f64::consts::PI).exp().atan() * 2.0
        - std::f64::consts::PI / 2.0)
        .to_degrees();
    Vector2::new(lat, long)
}
