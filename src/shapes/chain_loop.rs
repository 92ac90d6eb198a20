use crate::error::PhysicsError;
use crate::math::{Aabb, Transform2, Vector2};
use crate::Result;

/// A closed chain of line segments, used for static boundaries.
///
/// The last vertex connects back to the first. Segments are two-sided: a circle
/// touching a segment from either side is pushed away from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainLoop {
    vertices: Vec<Vector2>,
}

impl ChainLoop {
    /// Creates a loop through the given vertices (in local space).
    ///
    /// At least three vertices are required, all of them finite.
    pub fn create_loop(vertices: &[Vector2]) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(PhysicsError::InvalidParameter(format!(
                "a chain loop needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if let Some(bad) = vertices.iter().find(|v| !v.is_finite()) {
            return Err(PhysicsError::InvalidParameter(format!(
                "chain loop vertex {} is not finite",
                bad
            )));
        }

        Ok(Self {
            vertices: vertices.to_vec(),
        })
    }

    /// Creates a loop following the four corners of an axis-aligned rectangle
    /// `(0,0)`, `(w,0)`, `(w,h)`, `(0,h)`
    pub fn rectangle(width: f32, height: f32) -> Result<Self> {
        Self::create_loop(&[
            Vector2::new(0.0, 0.0),
            Vector2::new(width, 0.0),
            Vector2::new(width, height),
            Vector2::new(0.0, height),
        ])
    }

    pub fn get_vertices(&self) -> &[Vector2] {
        &self.vertices
    }

    pub fn segment_count(&self) -> usize {
        self.vertices.len()
    }

    /// Iterates over the closed loop's segments as `(start, end)` pairs in local space
    pub fn segments(&self) -> impl Iterator<Item = (Vector2, Vector2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    pub fn get_world_bounds(&self, transform: &Transform2) -> Aabb {
        let world: Vec<Vector2> = self
            .vertices
            .iter()
            .map(|v| transform.transform_point(*v))
            .collect();
        // create_loop guarantees at least three vertices
        Aabb::from_points(&world).unwrap_or_else(|| Aabb::new(transform.position, transform.position))
    }
}

/// Returns the point on segment `a`-`b` closest to `p`
pub fn closest_point_on_segment(a: Vector2, b: Vector2, p: Vector2) -> Vector2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= crate::math::EPSILON {
        return a;
    }
    let t = crate::math::clamp((p - a).dot(&ab) / len_sq, 0.0, 1.0);
    a + ab * t
}
