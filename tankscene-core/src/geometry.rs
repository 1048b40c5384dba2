/// Unit primitives consumed by the scene composer
///
/// Every shape fits the unit box centred on the origin, so the composer sizes
/// parts purely through scale transforms. Cylinders and tori have their axis
/// along +Y.
use std::collections::HashSet;
use std::f32::consts::{PI, TAU};

use nalgebra::{Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }

    fn at(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal from the winding order; zero for degenerate faces
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let edge1 = self.vertices[1].position - v0;
        let edge2 = self.vertices[2].position - v0;

        edge1
            .cross(&edge2)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// The primitive kinds the scene is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Cube,
    Cylinder,
    Sphere,
    Torus,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Cube, Shape::Cylinder, Shape::Sphere, Shape::Torus];

    /// Tessellate the unit shape
    pub fn mesh(self) -> Mesh {
        match self {
            Shape::Cube => Mesh::cube(1.0),
            Shape::Cylinder => Mesh::cylinder(16),
            Shape::Sphere => Mesh::sphere(8, 16),
            Shape::Torus => Mesh::torus(0.35, 0.15, 16, 8),
        }
    }
}

/// Line segment used by the wireframe pass
pub type Edge = (Point3<f32>, Point3<f32>);

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Split a quad (counter-clockwise seen from outside) into two triangles
    fn add_quad(&mut self, quad: [Vertex; 4]) {
        self.add_triangle(Triangle::new(quad[0], quad[1], quad[2]));
        self.add_triangle(Triangle::new(quad[0], quad[2], quad[3]));
    }

    /// Axis-aligned cube with edge length `size`
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let x = Vector3::x();
        let y = Vector3::y();
        let z = Vector3::z();
        // (normal, u, v) with u x v == normal so each face winds outward.
        let faces = [(x, y, z), (-x, z, y), (y, z, x), (-y, x, z), (z, x, y), (-z, y, x)];

        let mut mesh = Self::with_capacity(12);
        for (n, u, v) in faces {
            let center = Point3::from(n * half);
            let corner = |su: f32, sv: f32| Vertex::at(center + u * (su * half) + v * (sv * half), n);
            mesh.add_quad([
                corner(-1.0, -1.0),
                corner(1.0, -1.0),
                corner(1.0, 1.0),
                corner(-1.0, 1.0),
            ]);
        }
        mesh
    }

    /// Capped cylinder of radius 0.5 spanning y in [-0.5, 0.5]
    pub fn cylinder(segments: usize) -> Self {
        let segments = segments.max(3);
        let mut mesh = Self::with_capacity(segments * 4);
        let up = Vector3::y();
        let top = Point3::new(0.0, 0.5, 0.0);
        let bottom = Point3::new(0.0, -0.5, 0.0);

        for i in 0..segments {
            let a0 = TAU * i as f32 / segments as f32;
            let a1 = TAU * (i + 1) as f32 / segments as f32;
            let (n0, n1) = (radial(a0), radial(a1));
            let rim = |n: Vector3<f32>, h: f32| Point3::new(n.x * 0.5, h, n.z * 0.5);

            mesh.add_quad([
                Vertex::at(rim(n0, -0.5), n0),
                Vertex::at(rim(n1, -0.5), n1),
                Vertex::at(rim(n1, 0.5), n1),
                Vertex::at(rim(n0, 0.5), n0),
            ]);
            mesh.add_triangle(Triangle::new(
                Vertex::at(top, up),
                Vertex::at(rim(n0, 0.5), up),
                Vertex::at(rim(n1, 0.5), up),
            ));
            mesh.add_triangle(Triangle::new(
                Vertex::at(bottom, -up),
                Vertex::at(rim(n1, -0.5), -up),
                Vertex::at(rim(n0, -0.5), -up),
            ));
        }
        mesh
    }

    /// UV sphere of radius 0.5
    pub fn sphere(rings: usize, segments: usize) -> Self {
        let rings = rings.max(2);
        let segments = segments.max(3);
        let mut mesh = Self::with_capacity(rings * segments * 2);

        let point = |ring: usize, seg: usize| {
            let phi = PI * ring as f32 / rings as f32;
            let theta = TAU * seg as f32 / segments as f32;
            let n = Vector3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            Vertex::at(Point3::from(n * 0.5), n)
        };

        for ring in 0..rings {
            for seg in 0..segments {
                mesh.add_quad([
                    point(ring, seg),
                    point(ring, seg + 1),
                    point(ring + 1, seg + 1),
                    point(ring + 1, seg),
                ]);
            }
        }
        mesh
    }

    /// Torus around the Y axis; `major + minor` should be 0.5 for a unit shape
    pub fn torus(major: f32, minor: f32, rings: usize, sides: usize) -> Self {
        let rings = rings.max(3);
        let sides = sides.max(3);
        let mut mesh = Self::with_capacity(rings * sides * 2);

        let point = |ring: usize, side: usize| {
            let around = TAU * ring as f32 / rings as f32;
            let tube = TAU * side as f32 / sides as f32;
            let out = radial(around);
            let n = out * tube.cos() + Vector3::y() * tube.sin();
            Vertex::at(Point3::from(out * major + n * minor), n)
        };

        for ring in 0..rings {
            for side in 0..sides {
                mesh.add_quad([
                    point(ring, side),
                    point(ring + 1, side),
                    point(ring + 1, side + 1),
                    point(ring, side + 1),
                ]);
            }
        }
        mesh
    }

    /// Unique triangle edges, for drawing the mesh as lines
    pub fn edges(&self) -> Vec<Edge> {
        let key = |p: &Point3<f32>| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
        let mut seen = HashSet::new();
        let mut edges = Vec::new();

        for triangle in &self.triangles {
            for i in 0..3 {
                let a = triangle.vertices[i].position;
                let b = triangle.vertices[(i + 1) % 3].position;
                let (ka, kb) = (key(&a), key(&b));
                if ka == kb {
                    continue;
                }
                let k = if ka < kb { (ka, kb) } else { (kb, ka) };
                if seen.insert(k) {
                    edges.push((a, b));
                }
            }
        }
        edges
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Unit vector in the XZ plane; angle measured from +X towards -Z so that
/// increasing angles wind counter-clockwise seen from +Y
fn radial(angle: f32) -> Vector3<f32> {
    Vector3::new(angle.cos(), 0.0, -angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fits_unit_box(mesh: &Mesh) -> bool {
        mesh.triangles.iter().flat_map(|t| t.vertices.iter()).all(|v| {
            let p = v.position;
            p.x.abs() <= 0.5 + 1e-5 && p.y.abs() <= 0.5 + 1e-5 && p.z.abs() <= 0.5 + 1e-5
        })
    }

    #[test]
    fn test_cube_faces_point_outward() {
        let mesh = Mesh::cube(1.0);
        assert_eq!(mesh.triangles.len(), 12);
        for triangle in &mesh.triangles {
            let center = (triangle.vertices[0].position.coords
                + triangle.vertices[1].position.coords
                + triangle.vertices[2].position.coords)
                / 3.0;
            assert!(triangle.calculate_normal().dot(&center) > 0.0);
        }
    }

    #[test]
    fn test_cube_has_twelve_edges_plus_diagonals() {
        // 12 box edges + one diagonal per face
        assert_eq!(Mesh::cube(1.0).edges().len(), 18);
    }

    #[test]
    fn test_unit_shapes_fit_unit_box() {
        for shape in Shape::ALL {
            let mesh = shape.mesh();
            assert!(!mesh.triangles.is_empty(), "{shape:?} is empty");
            assert!(fits_unit_box(&mesh), "{shape:?} exceeds the unit box");
        }
    }

    #[test]
    fn test_cylinder_side_normals_point_outward() {
        let mesh = Mesh::cylinder(12);
        let side = &mesh.triangles[0];
        let n = side.calculate_normal();
        let p = side.vertices[0].position.coords;
        assert!(n.y.abs() < 1e-5);
        assert!(n.dot(&Vector3::new(p.x, 0.0, p.z)) > 0.0);
    }

    #[test]
    fn test_degenerate_triangle_has_zero_normal() {
        let v = Vertex::new(0.0, 0.0, 0.0, 0.0, 1.0, 0.0);
        let t = Triangle::new(v, v, v);
        assert_eq!(t.calculate_normal(), Vector3::zeros());
    }
}
