mod circle;
mod chain_loop;

pub use self::circle::Circle;
pub use self::chain_loop::{closest_point_on_segment, ChainLoop};

use crate::math::{Aabb, Transform2};

/// The collision shapes a body can carry
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A solid disc, used for dynamic bubbles
    Circle(Circle),

    /// A closed polygon outline, used for static boundaries
    ChainLoop(ChainLoop),
}

impl Shape {
    /// Shorthand for a circle shape
    pub fn circle(radius: f32) -> Self {
        Shape::Circle(Circle::new(radius))
    }

    /// Returns the type name of the shape
    pub fn shape_type(&self) -> &'static str {
        match self {
            Shape::Circle(_) => "Circle",
            Shape::ChainLoop(_) => "ChainLoop",
        }
    }

    /// Area enclosed by the shape for mass computation. Chains are outlines and have none.
    pub fn get_area(&self) -> f32 {
        match self {
            Shape::Circle(circle) => circle.get_area(),
            Shape::ChainLoop(_) => 0.0,
        }
    }

    /// Rotational inertia about the body origin for the given mass
    pub fn get_inertia(&self, mass: f32) -> f32 {
        match self {
            Shape::Circle(circle) => circle.get_inertia(mass),
            Shape::ChainLoop(_) => 0.0,
        }
    }

    pub fn get_world_bounds(&self, transform: &Transform2) -> Aabb {
        match self {
            Shape::Circle(circle) => circle.get_world_bounds(transform),
            Shape::ChainLoop(chain) => chain.get_world_bounds(transform),
        }
    }

    /// The radius if this is a circle
    pub fn radius(&self) -> Option<f32> {
        match self {
            Shape::Circle(circle) => Some(circle.get_radius()),
            Shape::ChainLoop(_) => None,
        }
    }
}

impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Shape::Circle(circle)
    }
}

impl From<ChainLoop> for Shape {
    fn from(chain: ChainLoop) -> Self {
        Shape::ChainLoop(chain)
    }
}
