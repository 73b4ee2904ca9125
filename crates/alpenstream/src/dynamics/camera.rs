use cgmath::{Deg, InnerSpace, Matrix, Matrix4, Point3, SquareMatrix, Vector3, Vector4};

use crate::helpers::geometry::Plane;

pub const DEFAULT_FIELD_OF_VIEW_DEG: f64 = 45.0;

const NEAR_CLIPPING: f64 = 1.0;
const FAR_CLIPPING: f64 = 100_000.0;

/// A view over the web-mercator world (x east, y north, z up). Only what the
/// refinement test and the scheduler need: position, the double-precision
/// view-projection and the four side frustum planes.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    camera_transformation: Matrix4<f64>, // camera space -> world space
    field_of_view: f64,                  // vertical, degrees
    viewport_size: (u32, u32),
    near: f64,
    far: f64,
}

impl Camera {
    pub fn new(position: Point3<f64>, view_at: Point3<f64>) -> Camera {
        let view = Matrix4::look_at_rh(position, view_at, Vector3::unit_z());
        let camera_transformation = view.invert().unwrap_or_else(Matrix4::identity);
        Camera {
            camera_transformation,
            field_of_view: DEFAULT_FIELD_OF_VIEW_DEG,
            viewport_size: (800, 450),
            near: NEAR_CLIPPING,
            far: FAR_CLIPPING,
        }
    }

    pub fn position(&self) -> Vector3<f64> {
        self.camera_transformation.w.truncate()
    }

    /// Camera right in world space.
    pub fn x_axis(&self) -> Vector3<f64> {
        self.camera_transformation.x.truncate().normalize()
    }

    pub fn viewport_size(&self) -> (u32, u32) {
        self.viewport_size
    }

    pub fn set_viewport_size(&mut self, viewport_size: (u32, u32)) {
        debug_assert!(viewport_size.0 > 0 && viewport_size.1 > 0);
        self.viewport_size = viewport_size;
    }

    pub fn field_of_view(&self) -> f64 {
        self.field_of_view
    }

    pub fn set_field_of_view(&mut self, degrees: f64) {
        self.field_of_view = degrees;
    }

    pub fn camera_matrix(&self) -> Matrix4<f64> {
        self.camera_transformation
            .invert()
            .unwrap_or_else(Matrix4::identity)
    }

    pub fn projection_matrix(&self) -> Matrix4<f64> {
        let aspect = self.viewport_size.0 as f64 / self.viewport_size.1 as f64;
        cgmath::perspective(Deg(self.field_of_view), aspect, self.near, self.far)
    }

    /// Webmercator to clip space. Double precision only; the translation part
    /// is far too large for f32.
    pub fn world_view_projection_matrix(&self) -> Matrix4<f64> {
        self.projection_matrix() * self.camera_matrix()
    }

    /// Left, right, bottom, top. Near and far are deliberately absent: they
    /// get adjusted from loaded geometry, so culling against them while
    /// deciding what to load would deadlock.
    pub fn four_clipping_planes(&self) -> [Plane; 4] {
        let m = self.world_view_projection_matrix();
        let rows = [m.row(0), m.row(1), m.row(3)];
        let raw: [Vector4<f64>; 4] = [
            rows[2] + rows[0], // left
            rows[2] - rows[0], // right
            rows[2] + rows[1], // bottom
            rows[2] - rows[1], // top
        ];
        raw.map(|v| {
            let normal = v.truncate();
            let length = normal.magnitude();
            if length > 0.0 {
                Plane {
                    normal: normal / length,
                    distance: v.w / length,
                }
            } else {
                Plane {
                    normal: Vector3::unit_z(),
                    distance: 0.0,
                }
            }
        })
    }
}
