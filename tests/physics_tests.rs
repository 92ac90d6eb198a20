use approx::assert_relative_eq;
use bubble_pit::{
    error::PhysicsError,
    math::Vector2,
    BodyDef, ChainLoop, Material, PhysicsWorld, RigidBody, RigidBodyType, Shape, SimulationConfig,
};

fn zero_gravity_world() -> PhysicsWorld {
    PhysicsWorld::with_config(SimulationConfig {
        gravity: Vector2::ZERO,
        ..SimulationConfig::default()
    })
}

fn boxed_world(width: f32, height: f32) -> PhysicsWorld {
    let mut world = PhysicsWorld::new();
    let walls = ChainLoop::rectangle(width, height).unwrap();
    world.create_body(&BodyDef::fixed(), walls.into(), 0.0).unwrap();
    world
}

#[test]
fn test_rigid_body_creation() {
    // A dynamic circle takes its mass from area and density
    let body = RigidBody::new(&BodyDef::dynamic(Vector2::new(0.0, 10.0)), Shape::circle(1.0), 2.0).unwrap();

    assert_eq!(body.get_position(), Vector2::new(0.0, 10.0));
    assert_eq!(body.get_body_type(), RigidBodyType::Dynamic);
    assert!(body.get_linear_velocity().is_zero());
    assert_relative_eq!(body.get_mass(), std::f32::consts::PI * 2.0, epsilon = 1e-5);
    assert_relative_eq!(body.get_inertia(), 0.5 * body.get_mass(), epsilon = 1e-5);

    // Static bodies never move, whatever their density
    let wall = RigidBody::new(&BodyDef::fixed(), Shape::circle(1.0), 5.0).unwrap();
    assert_eq!(wall.get_inverse_mass(), 0.0);
    assert_eq!(wall.get_inverse_inertia(), 0.0);
}

#[test]
fn test_invalid_body_definitions() {
    // Negative and non-finite densities are rejected
    let def = BodyDef::dynamic(Vector2::ZERO);
    assert!(matches!(
        RigidBody::new(&def, Shape::circle(1.0), -1.0),
        Err(PhysicsError::InvalidParameter(_))
    ));
    assert!(matches!(
        RigidBody::new(&def, Shape::circle(1.0), f32::NAN),
        Err(PhysicsError::InvalidParameter(_))
    ));

    // A chain loop cannot move
    let walls = ChainLoop::rectangle(1.0, 1.0).unwrap();
    assert!(matches!(
        RigidBody::new(&def, walls.into(), 0.0),
        Err(PhysicsError::InvalidParameter(_))
    ));

    // A loop needs at least three vertices
    assert!(matches!(
        ChainLoop::create_loop(&[Vector2::ZERO, Vector2::new(1.0, 0.0)]),
        Err(PhysicsError::InvalidParameter(_))
    ));
}

#[test]
fn test_gravity_simulation() {
    let mut world = PhysicsWorld::new();
    let handle = world
        .create_body(&BodyDef::dynamic(Vector2::new(0.0, 10.0)), Shape::circle(0.5), 1.0)
        .unwrap();

    let dt = world.get_config().time_step;
    let mut expected_position = 10.0;
    let mut expected_velocity = 0.0;

    for _ in 0..60 {
        world.step().unwrap();

        // Semi-implicit Euler: velocity first, then position
        expected_velocity -= 10.0 * dt;
        expected_position += expected_velocity * dt;

        let body = world.get_body(handle).unwrap();
        assert_relative_eq!(body.get_linear_velocity().y, expected_velocity, epsilon = 1e-3);
        assert_relative_eq!(body.get_position().y, expected_position, epsilon = 1e-3);
    }

    assert_eq!(world.step_count(), 60);
    assert_relative_eq!(world.get_time(), 1.0, epsilon = 1e-4);
}

#[test]
fn test_body_ignoring_gravity() {
    let mut world = PhysicsWorld::new();
    let def = BodyDef {
        affected_by_gravity: false,
        ..BodyDef::dynamic(Vector2::new(1.0, 1.0))
    };
    let handle = world.create_body(&def, Shape::circle(0.5), 1.0).unwrap();

    for _ in 0..30 {
        world.step().unwrap();
    }

    assert_eq!(world.get_body(handle).unwrap().get_position(), Vector2::new(1.0, 1.0));
}

#[test]
fn test_elastic_collision_exchanges_velocities() {
    let mut world = zero_gravity_world();
    let bouncy = Material::new(0.0, 1.0);

    let left = BodyDef {
        linear_velocity: Vector2::new(2.0, 0.0),
        ..BodyDef::dynamic(Vector2::new(-1.0, 0.0)).with_material(bouncy)
    };
    let right = BodyDef {
        linear_velocity: Vector2::new(-2.0, 0.0),
        ..BodyDef::dynamic(Vector2::new(1.0, 0.0)).with_material(bouncy)
    };
    let a = world.create_body(&left, Shape::circle(0.5), 1.0).unwrap();
    let b = world.create_body(&right, Shape::circle(0.5), 1.0).unwrap();

    for _ in 0..60 {
        world.step().unwrap();
    }

    let va = world.get_body(a).unwrap().get_linear_velocity();
    let vb = world.get_body(b).unwrap().get_linear_velocity();

    // Equal masses swap velocities in an elastic head-on collision
    assert_relative_eq!(va.x, -2.0, epsilon = 1e-2);
    assert_relative_eq!(vb.x, 2.0, epsilon = 1e-2);

    // Momentum is conserved
    assert_relative_eq!(va.x + vb.x, 0.0, epsilon = 1e-3);

    // And they end up apart
    let pa = world.get_body(a).unwrap().get_position();
    let pb = world.get_body(b).unwrap().get_position();
    assert!(pa.distance(&pb) > 1.0);
}

#[test]
fn test_inelastic_collision_keeps_bodies_apart() {
    let mut world = zero_gravity_world();

    let a = world
        .create_body(
            &BodyDef {
                linear_velocity: Vector2::new(3.0, 0.0),
                ..BodyDef::dynamic(Vector2::new(-1.0, 0.0))
            },
            Shape::circle(0.5),
            1.0,
        )
        .unwrap();
    let b = world
        .create_body(&BodyDef::dynamic(Vector2::new(1.0, 0.0)), Shape::circle(0.5), 1.0)
        .unwrap();

    for _ in 0..120 {
        world.step().unwrap();
        let pa = world.get_body(a).unwrap().get_position();
        let pb = world.get_body(b).unwrap().get_position();
        assert!(pa.distance(&pb) > 0.9, "bodies sank into each other");
    }

    // Without restitution both move on together at half the speed
    let va = world.get_body(a).unwrap().get_linear_velocity();
    let vb = world.get_body(b).unwrap().get_linear_velocity();
    assert_relative_eq!(va.x + vb.x, 3.0, epsilon = 1e-3);
    assert_relative_eq!(va.x, 1.5, epsilon = 0.05);
}

#[test]
fn test_boundary_contains_bodies() {
    let mut world = boxed_world(4.0, 4.0);

    // A ball thrown sideways at a wall while falling to the floor
    let ball = world
        .create_body(
            &BodyDef {
                linear_velocity: Vector2::new(8.0, 0.0),
                ..BodyDef::dynamic(Vector2::new(2.0, 3.0))
            },
            Shape::circle(0.5),
            1.0,
        )
        .unwrap();

    for _ in 0..600 {
        world.step().unwrap();
        let p = world.get_body(ball).unwrap().get_position();
        assert!(p.x > 0.25 && p.x < 3.75, "ball left the box at {}", p);
        assert!(p.y > 0.25 && p.y < 3.75, "ball left the box at {}", p);
    }

    // Resting on the floor
    let p = world.get_body(ball).unwrap().get_position();
    assert_relative_eq!(p.y, 0.5, epsilon = 0.05);
}

#[test]
fn test_snapshot_follows_insertion_order() {
    let mut world = boxed_world(10.0, 10.0);
    let big = world
        .create_body(&BodyDef::dynamic(Vector2::new(3.0, 5.0)), Shape::circle(1.0), 1.0)
        .unwrap();
    let small = world
        .create_body(&BodyDef::dynamic(Vector2::new(7.0, 5.0)), Shape::circle(0.3), 1.0)
        .unwrap();

    let snapshot = world.snapshot();
    let handles: Vec<_> = snapshot.iter().map(|(handle, _)| handle).collect();
    assert_eq!(handles.len(), 3);
    assert_eq!(&handles[1..], &[big, small]);

    // The boundary carries no radius, circles do
    assert_eq!(snapshot.get(handles[0]).unwrap().radius, None);
    assert_eq!(snapshot.get(small).unwrap().radius, Some(0.3));
}

#[test]
fn test_add_linear_velocity() {
    let mut world = zero_gravity_world();
    let handle = world
        .create_body(&BodyDef::dynamic(Vector2::ZERO), Shape::circle(0.5), 1.0)
        .unwrap();

    world.add_linear_velocity(handle, Vector2::new(1.0, 2.0)).unwrap();
    world.add_linear_velocity(handle, Vector2::new(1.0, 0.0)).unwrap();
    assert_eq!(world.get_body(handle).unwrap().get_linear_velocity(), Vector2::new(2.0, 2.0));

    // Non-finite changes are refused
    assert!(world
        .add_linear_velocity(handle, Vector2::new(f32::NAN, 0.0))
        .is_err());

    // Removed bodies are gone
    world.remove_body(handle).unwrap();
    assert!(matches!(
        world.add_linear_velocity(handle, Vector2::new(1.0, 0.0)),
        Err(PhysicsError::ResourceNotFound(_))
    ));
}

#[test]
fn test_non_finite_gravity_skips_step() {
    let mut world = PhysicsWorld::new();
    let handle = world
        .create_body(&BodyDef::dynamic(Vector2::new(0.0, 5.0)), Shape::circle(0.5), 1.0)
        .unwrap();

    world.set_gravity(Vector2::new(f32::NAN, 0.0));
    assert!(matches!(world.step(), Err(PhysicsError::SimulationError(_))));
    assert_eq!(world.step_count(), 0);
    assert_eq!(world.get_body(handle).unwrap().get_position(), Vector2::new(0.0, 5.0));

    // Recovers once gravity is valid again
    world.set_gravity(Vector2::new(0.0, -10.0));
    world.step().unwrap();
    assert_eq!(world.step_count(), 1);
}

#[test]
fn test_diverging_step_is_rolled_back() {
    let mut world = PhysicsWorld::new();
    let def = BodyDef {
        linear_velocity: Vector2::new(f32::MAX, 0.0),
        ..BodyDef::dynamic(Vector2::new(3.39e38, 0.0))
    };
    let handle = world.create_body(&def, Shape::circle(0.5), 1.0).unwrap();

    // The position would overflow to infinity
    assert!(matches!(world.step(), Err(PhysicsError::SimulationError(_))));

    // Nothing about the body changed
    let body = world.get_body(handle).unwrap();
    assert_eq!(body.get_position(), Vector2::new(3.39e38, 0.0));
    assert_eq!(body.get_linear_velocity(), Vector2::new(f32::MAX, 0.0));
    assert_eq!(world.step_count(), 0);
}
