use cgmath::{InnerSpace, Vector3, Zero};

pub type Triangle = [Vector3<f64>; 3];

/// Axis-aligned box in web-mercator metres, z carrying height bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl Aabb {
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn corners(&self) -> [Vector3<f64>; 8] {
        let mut corners = [Vector3::zero(); 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            *corner = Vector3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
        }
        corners
    }
}

/// Half space `dot(normal, p) + distance >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub distance: f64,
}

impl Plane {
    pub fn signed_distance(&self, point: Vector3<f64>) -> f64 {
        self.normal.dot(point) + self.distance
    }
}

// Two triangles per face, corners indexed with x = bit 0, y = bit 1, z = bit 2.
const FACE_QUADS: [[usize; 4]; 6] = [
    [0, 1, 3, 2], // z min
    [4, 5, 7, 6], // z max
    [0, 1, 5, 4], // y min
    [2, 3, 7, 6], // y max
    [0, 2, 6, 4], // x min
    [1, 3, 7, 5], // x max
];

pub fn triangulise(aabb: &Aabb) -> Vec<Triangle> {
    let corners = aabb.corners();
    let mut triangles = Vec::with_capacity(12);
    for quad in &FACE_QUADS {
        triangles.push([corners[quad[0]], corners[quad[1]], corners[quad[2]]]);
        triangles.push([corners[quad[0]], corners[quad[2]], corners[quad[3]]]);
    }
    triangles
}

/// Sutherland-Hodgman style clipping of a triangle soup against a set of
/// half spaces. Returns the (re-triangulated) geometry inside all of them.
pub fn clip(triangles: Vec<Triangle>, planes: &[Plane]) -> Vec<Triangle> {
    planes.iter().fold(triangles, |current, plane| {
        let mut clipped = Vec::with_capacity(current.len());
        for triangle in &current {
            clip_triangle(triangle, plane, &mut clipped);
        }
        clipped
    })
}

fn intersection(a: Vector3<f64>, b: Vector3<f64>, dist_a: f64, dist_b: f64) -> Vector3<f64> {
    let t = dist_a / (dist_a - dist_b);
    a + (b - a) * t
}

fn clip_triangle(triangle: &Triangle, plane: &Plane, out: &mut Vec<Triangle>) {
    let distances = [
        plane.signed_distance(triangle[0]),
        plane.signed_distance(triangle[1]),
        plane.signed_distance(triangle[2]),
    ];
    let inside: Vec<usize> = (0..3).filter(|&i| distances[i] >= 0.0).collect();

    match inside.len() {
        3 => out.push(*triangle),
        2 => {
            let (a, b) = (inside[0], inside[1]);
            let c = 3 - a - b;
            let ac = intersection(triangle[a], triangle[c], distances[a], distances[c]);
            let bc = intersection(triangle[b], triangle[c], distances[b], distances[c]);
            out.push([triangle[a], triangle[b], bc]);
            out.push([triangle[a], bc, ac]);
        }
        1 => {
            let a = inside[0];
            let b = (a + 1) % 3;
            let c = (a + 2) % 3;
            let ab = intersection(triangle[a], triangle[b], distances[a], distances[b]);
            let ac = intersection(triangle[a], triangle[c], distances[a], distances[c]);
            out.push([triangle[a], ab, ac]);
        }
        _ => {}
    }
}
