use approx::assert_relative_eq;
use bubble_pit::core::BodyTransform;
use bubble_pit::error::PhysicsError;
use bubble_pit::math::{Aabb, Vector2};
use bubble_pit::scene::{
    bubble_density, bubble_radius, fling_velocity, gravity_from_sensor, simulation_area, spawn_position,
    BubbleGestures, BubbleView, DisplayRotation, EmptyState, GestureHandler, OrientationAdapter, Placement, QuestStatisticsScene,
    QuestType, QuestTypeRegistry, RenderSurface, SceneConfig, SceneLayout, SceneListener, SensorAccuracy,
    SensorReading, SolvedQuests, StatisticsSource, ViewId,
};
use bubble_pit::{BodyDef, ControllerConfig, PhysicsController, RigidBodyType, Shape, SimulationConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::f32::consts::PI;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct RecordingView {
    placements: Vec<Placement>,
}

impl BubbleView for RecordingView {
    fn place(&mut self, placement: Placement) {
        self.placements.push(placement);
    }
}

struct FixedStatistics {
    counts: HashMap<String, u32>,
    synchronizing: bool,
}

impl StatisticsSource for FixedStatistics {
    fn solved_counts(&self) -> bubble_pit::Result<HashMap<String, u32>> {
        Ok(self.counts.clone())
    }

    fn is_synchronizing(&self) -> bool {
        self.synchronizing
    }
}

struct BrokenStatistics;

impl StatisticsSource for BrokenStatistics {
    fn solved_counts(&self) -> bubble_pit::Result<HashMap<String, u32>> {
        Err(PhysicsError::Storage("database closed".to_string()))
    }
}

#[derive(Default)]
struct RecordingListener {
    clicks: Mutex<Vec<(String, u32, ViewId)>>,
}

impl SceneListener for RecordingListener {
    fn on_clicked_quest_type(&self, quest_type: &QuestType, solved_count: u32, view: ViewId) {
        self.clicks
            .lock()
            .unwrap()
            .push((quest_type.name.clone(), solved_count, view));
    }
}

fn registry() -> Arc<dyn QuestTypeRegistry> {
    Arc::new(vec![
        QuestType::new("AddRoadName", "ic_quest_street"),
        QuestType::new("AddOpeningHours", "ic_quest_opening_hours"),
        QuestType::new("AddRecyclingType", "ic_quest_recycling"),
    ])
}

fn counts(entries: &[(&str, u32)]) -> HashMap<String, u32> {
    entries.iter().map(|(name, count)| (name.to_string(), *count)).collect()
}

fn fast_controller() -> Arc<PhysicsController> {
    Arc::new(
        PhysicsController::with_config(
            SimulationConfig::default(),
            ControllerConfig {
                step_interval: Duration::from_millis(2),
                ..ControllerConfig::default()
            },
        )
        .unwrap(),
    )
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

#[test]
fn test_bubble_radius_formula() {
    let k = 0.01;

    // cbrt(3 * k * count / 4π)
    assert_relative_eq!(bubble_radius(100, k), (3.0 / (4.0 * PI)).cbrt(), epsilon = 1e-5);
    assert_eq!(bubble_radius(0, k), 0.0);

    // Monotone in the count
    let mut previous = 0.0;
    for count in (0..5000).step_by(7) {
        let radius = bubble_radius(count, k);
        assert!(radius >= previous, "radius shrank at {}", count);
        previous = radius;
    }
}

#[test]
fn test_bubble_radius_ratio() {
    // Four times the quests gives cbrt(4) times the radius
    let ratio = bubble_radius(100, 0.01) / bubble_radius(25, 0.01);
    assert_relative_eq!(ratio, 4.0f32.cbrt(), epsilon = 1e-4);
    assert_relative_eq!(ratio, 1.587, epsilon = 1e-3);
}

#[test]
fn test_bubble_density_matches_ball_mass() {
    // Disc area times density equals the ball volume
    let r = 0.7;
    let disc_mass = PI * r * r * bubble_density(r);
    let ball_volume = 4.0 / 3.0 * PI * r * r * r;
    assert_relative_eq!(disc_mass, ball_volume, epsilon = 1e-5);
}

#[test]
fn test_simulation_area() {
    let config = SceneConfig::default();

    // Nothing solved still gives a usable area
    assert_eq!(simulation_area(0, &config), 1.0);

    // 55 quests of 0.01 m³ fill 55% of one square meter
    assert_relative_eq!(simulation_area(55, &config), 1.0, epsilon = 1e-5);
    assert_relative_eq!(simulation_area(110, &config), 2.0, epsilon = 1e-5);
}

#[test]
fn test_scene_layout() {
    let layout = SceneLayout::new(1000.0, 500.0, 2.0).unwrap();
    assert_relative_eq!(layout.pixels_per_meter, 500.0, epsilon = 1e-3);
    assert_relative_eq!(layout.width_m(), 2.0, epsilon = 1e-5);
    assert_relative_eq!(layout.height_m(), 1.0, epsilon = 1e-5);
    assert_eq!(layout.bounds.min, Vector2::ZERO);

    // Degenerate sizes are clamped, non-finite ones rejected
    let clamped = SceneLayout::new(0.0, 100.0, 1.0).unwrap();
    assert_eq!(clamped.width_px, 1.0);
    assert!(matches!(
        SceneLayout::new(f32::NAN, 100.0, 1.0),
        Err(PhysicsError::Configuration(_))
    ));
    assert!(matches!(
        SceneLayout::new(100.0, 100.0, f32::INFINITY),
        Err(PhysicsError::Configuration(_))
    ));
}

#[test]
fn test_spawn_position_inside_bounds() {
    let mut rng = StdRng::seed_from_u64(7);
    let bounds = Aabb::new(Vector2::ZERO, Vector2::new(3.0, 2.0));

    for _ in 0..500 {
        let p = spawn_position(&mut rng, 0.4, &bounds);
        assert!(p.x >= 0.4 && p.x <= 2.6, "x out of range: {}", p);
        assert!(p.y >= 0.4 && p.y <= 1.6, "y out of range: {}", p);
    }

    // A bubble wider than the area sits at the center of that axis
    let p = spawn_position(&mut rng, 1.2, &bounds);
    assert_eq!(p.y, 1.0);
    assert!(p.x >= 1.2 && p.x <= 1.8);
}

#[test]
fn test_fling_velocity() {
    // θ = 90° turns (10, 0) into (0, 10) before scaling
    let ppm = 100.0;
    let v = fling_velocity(Vector2::new(10.0, 0.0), 90.0, ppm, 0.3);
    assert_relative_eq!(v.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(v.y, 10.0 * 0.3 / ppm, epsilon = 1e-6);

    // No rotation only scales
    let v = fling_velocity(Vector2::new(-50.0, 20.0), 0.0, ppm, 0.3);
    assert_relative_eq!(v.x, -0.15, epsilon = 1e-6);
    assert_relative_eq!(v.y, 0.06, epsilon = 1e-6);
}

#[test]
fn test_gravity_from_sensor() {
    let reading = SensorReading::new(1.0, 9.0, 0.5, SensorAccuracy::High);

    assert_eq!(
        gravity_from_sensor(&reading, DisplayRotation::Rotation0),
        Some(Vector2::new(-1.0, -9.0))
    );
    assert_eq!(
        gravity_from_sensor(&reading, DisplayRotation::Rotation90),
        Some(Vector2::new(9.0, -1.0))
    );
    assert_eq!(
        gravity_from_sensor(&reading, DisplayRotation::Rotation180),
        Some(Vector2::new(1.0, 9.0))
    );
    assert_eq!(
        gravity_from_sensor(&reading, DisplayRotation::Rotation270),
        Some(Vector2::new(-9.0, 1.0))
    );

    // Low is the least accuracy still trusted
    let low = SensorReading::new(1.0, 9.0, 0.5, SensorAccuracy::Low);
    assert!(gravity_from_sensor(&low, DisplayRotation::Rotation0).is_some());
    let unreliable = SensorReading::new(1.0, 9.0, 0.5, SensorAccuracy::Unreliable);
    assert_eq!(gravity_from_sensor(&unreliable, DisplayRotation::Rotation0), None);

    assert_eq!(DisplayRotation::from_degrees(-90), Some(DisplayRotation::Rotation270));
    assert_eq!(DisplayRotation::from_degrees(45), None);
}

#[test]
fn test_orientation_adapter_sets_gravity() {
    let controller = fast_controller();
    let adapter = OrientationAdapter::new(Arc::clone(&controller), DisplayRotation::Rotation0);

    assert!(adapter.on_sensor_changed(&SensorReading::new(0.0, 9.81, 0.0, SensorAccuracy::Medium)));
    assert_eq!(controller.gravity(), Vector2::new(-0.0, -9.81));

    // Turning the display turns gravity with it
    adapter.set_display_rotation(DisplayRotation::Rotation90);
    assert!(adapter.on_sensor_changed(&SensorReading::new(0.0, 9.81, 0.0, SensorAccuracy::Medium)));
    assert_eq!(controller.gravity(), Vector2::new(9.81, -0.0));

    // Unreliable readings leave gravity alone
    assert!(!adapter.on_sensor_changed(&SensorReading::new(5.0, 5.0, 0.0, SensorAccuracy::Unreliable)));
    assert_eq!(controller.gravity(), Vector2::new(9.81, 0.0));
}

#[test]
fn test_placement_flips_y_and_rotation() {
    let transform = BodyTransform {
        position: Vector2::new(1.0, 2.0),
        angle: PI / 2.0,
        linear_velocity: Vector2::ZERO,
        angular_velocity: 0.0,
        radius: Some(0.5),
        body_type: RigidBodyType::Dynamic,
    };

    let placement = Placement::of(&transform, 100.0, 500.0);
    assert_relative_eq!(placement.center_x, 100.0, epsilon = 1e-4);
    assert_relative_eq!(placement.center_y, 300.0, epsilon = 1e-4);
    assert_relative_eq!(placement.rotation_degrees, -90.0, epsilon = 1e-3);
    assert_relative_eq!(placement.diameter, 100.0, epsilon = 1e-4);
}

#[test]
fn test_render_surface_tracks_bodies() {
    let controller = fast_controller();
    let a = controller
        .create_body(BodyDef::dynamic(Vector2::new(1.0, 1.0)), Shape::circle(0.5), 1.0)
        .unwrap();
    let b = controller
        .create_body(BodyDef::dynamic(Vector2::new(2.0, 1.0)), Shape::circle(0.25), 1.0)
        .unwrap();

    let mut surface = RenderSurface::new(10.0, 100.0);
    let view_a = surface.add_view(RecordingView::default(), a);
    let view_b = surface.add_view(RecordingView::default(), b);
    assert_ne!(view_a, view_b);
    assert_eq!(surface.body_of(view_b), Some(b));

    // Nothing is placed before the first invalidation
    assert_eq!(surface.placement(view_a), None);
    assert_eq!(surface.rotation_degrees(view_a), 0.0);

    assert_eq!(surface.on_invalidate(&controller.snapshot()), 2);
    let placed = surface.view(view_b).unwrap().placements[0];
    assert_relative_eq!(placed.center_x, 20.0, epsilon = 1e-4);
    assert_relative_eq!(placed.center_y, 90.0, epsilon = 1e-4);
    assert_relative_eq!(placed.diameter, 5.0, epsilon = 1e-4);

    // Views keep the order they were added in
    let order: Vec<_> = surface.views().map(|(id, _)| id).collect();
    assert_eq!(order, vec![view_a, view_b]);
}

#[test]
fn test_solved_quests_load() {
    let source = counts(&[
        ("AddOpeningHours", 25),
        ("AddRoadName", 100),
        ("AddRecyclingType", 25),
        ("NoSuchQuest", 7),
    ]);
    let solved = SolvedQuests::load(&source, registry().as_ref()).unwrap();

    // Unknown quest types are dropped, the rest sorted largest first
    let names: Vec<_> = solved.entries().iter().map(|(q, _)| q.name.as_str()).collect();
    assert_eq!(names, vec!["AddRoadName", "AddOpeningHours", "AddRecyclingType"]);
    assert_eq!(solved.total(), 150);
    assert_eq!(solved.get("AddRoadName"), Some(100));
    assert_eq!(solved.get("NoSuchQuest"), None);

    // Failures of the source are passed on
    assert!(matches!(
        SolvedQuests::load(&BrokenStatistics, registry().as_ref()),
        Err(PhysicsError::Storage(_))
    ));
}

#[test]
fn test_empty_states() {
    let syncing = Arc::new(FixedStatistics {
        counts: HashMap::new(),
        synchronizing: true,
    });
    let mut scene: QuestStatisticsScene<RecordingView> =
        QuestStatisticsScene::new(fast_controller(), syncing, registry(), None, SceneConfig::default());
    scene.load().unwrap();
    assert_eq!(scene.empty_state(), Some(EmptyState::Syncing));

    let idle = Arc::new(FixedStatistics {
        counts: counts(&[("AddRoadName", 0)]),
        synchronizing: false,
    });
    let mut scene: QuestStatisticsScene<RecordingView> =
        QuestStatisticsScene::new(fast_controller(), idle, registry(), None, SceneConfig::default());
    scene.load().unwrap();
    assert_eq!(scene.empty_state(), Some(EmptyState::NoQuests));

    // An empty scene still sets up on a one square meter area
    let layout = scene.setup(400.0, 400.0).unwrap();
    assert_relative_eq!(layout.pixels_per_meter, 400.0, epsilon = 1e-3);
}

#[test]
fn test_scene_setup_creates_bodies_in_order() {
    let controller = fast_controller();
    let statistics = Arc::new(counts(&[("AddOpeningHours", 25), ("AddRoadName", 100)]));
    let mut scene = QuestStatisticsScene::new(
        Arc::clone(&controller),
        statistics,
        registry(),
        None,
        SceneConfig::default(),
    );

    // Bubbles need the walls first
    let mut rng = StdRng::seed_from_u64(42);
    assert!(matches!(
        scene.add_quests(&mut rng, |_, _, _| RecordingView::default()),
        Err(PhysicsError::InvalidState(_))
    ));

    scene.load().unwrap();
    assert_eq!(scene.empty_state(), None);
    let layout = scene.setup(1080.0, 1920.0).unwrap();

    // 125 quests fill 55% of the area
    let area = layout.width_m() * layout.height_m();
    assert_relative_eq!(area, 0.01 * 125.0 / 0.55, epsilon = 1e-3);

    let bubbles = scene.add_quests(&mut rng, |_, _, _| RecordingView::default()).unwrap().to_vec();
    assert_eq!(bubbles.len(), 2);

    // Largest first, so the smaller bubble is drawn on top
    assert_eq!(bubbles[0].quest_type.name, "AddRoadName");
    assert_eq!(bubbles[1].quest_type.name, "AddOpeningHours");
    assert!(bubbles[0].body < bubbles[1].body);
    assert_relative_eq!(bubbles[0].radius / bubbles[1].radius, 4.0f32.cbrt(), epsilon = 1e-4);

    // The walls and both bubbles are in the world
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.len(), 3);
    let boundary = snapshot.get(scene.boundary().unwrap()).unwrap();
    assert_eq!(boundary.body_type, RigidBodyType::Static);
    for bubble in &bubbles {
        let transform = snapshot.get(bubble.body).unwrap();
        assert_eq!(transform.radius, Some(bubble.radius));
        assert!(layout.bounds.contains_point(transform.position));

        // Views were placed at once
        assert!(scene.surface().placement(bubble.view).is_some());
    }

    // Setting up again changes nothing
    scene.setup(1080.0, 1920.0).unwrap();
    assert_eq!(controller.snapshot().len(), 3);
}

#[test]
fn test_scene_gestures() {
    let controller = fast_controller();
    let listener = Arc::new(RecordingListener::default());
    let mut scene = QuestStatisticsScene::new(
        Arc::clone(&controller),
        Arc::new(counts(&[("AddRoadName", 100)])),
        registry(),
        Some(listener.clone() as Arc<dyn SceneListener>),
        SceneConfig::default(),
    );
    scene.load().unwrap();
    let layout = scene.setup(600.0, 600.0).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let bubble = scene.add_quests(&mut rng, |_, _, _| RecordingView::default()).unwrap()[0].clone();

    let gestures = scene.gestures(bubble.view).unwrap();

    // Tap reports the quest type to the listener
    gestures.on_tap();
    assert_eq!(
        listener.clicks.lock().unwrap().as_slice(),
        &[("AddRoadName".to_string(), 100, bubble.view)]
    );

    // Fling on an unturned bubble only scales
    gestures.on_fling(Vector2::new(10.0, 0.0)).unwrap();
    let expected = 10.0 * 0.3 / layout.pixels_per_meter;
    assert!(wait_until(Duration::from_secs(2), || {
        let v = controller.transform(bubble.body).unwrap().linear_velocity;
        (v.x - expected).abs() < 1e-6 && v.y.abs() < 1e-6
    }));

    // A destroyed scene refuses flings
    scene.destroy();
    assert!(matches!(
        gestures.on_fling(Vector2::new(10.0, 0.0)),
        Err(PhysicsError::InvalidState(_))
    ));
}

#[test]
fn test_fling_follows_drawn_rotation() {
    let controller = fast_controller();
    let ppm = 100.0;

    // A body turned a quarter clockwise
    let def = BodyDef {
        angle: -PI / 2.0,
        affected_by_gravity: false,
        ..BodyDef::dynamic(Vector2::new(2.0, 2.0))
    };
    let body = controller.create_body(def, Shape::circle(0.5), 1.0).unwrap();

    let mut surface = RenderSurface::new(ppm, 400.0);
    let view = surface.add_view(RecordingView::default(), body);
    surface.on_invalidate(&controller.snapshot());
    assert_relative_eq!(surface.rotation_degrees(view), 90.0, epsilon = 1e-4);

    let gestures = BubbleGestures::new(
        QuestType::new("AddRoadName", "ic_quest_street"),
        1,
        view,
        body,
        Arc::clone(&controller),
        None,
        ppm,
        0.3,
    );

    // The view's own +x now points down the screen
    gestures.on_fling(Vector2::new(10.0, 0.0)).unwrap();
    let expected = -10.0 * 0.3 / ppm;
    assert!(wait_until(Duration::from_secs(2), || {
        let v = controller.transform(body).unwrap().linear_velocity;
        (v.y - expected).abs() < 1e-6 && v.x.abs() < 1e-6
    }));
    controller.destroy();
}

#[test]
fn test_scene_repaints_after_steps() {
    let controller = fast_controller();
    let mut scene = QuestStatisticsScene::new(
        Arc::clone(&controller),
        Arc::new(counts(&[("AddRoadName", 40), ("AddRecyclingType", 10)])),
        registry(),
        None,
        SceneConfig::default(),
    );
    scene.load().unwrap();
    scene.setup(800.0, 600.0).unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    scene.add_quests(&mut rng, |_, _, _| RecordingView::default()).unwrap();

    // Paused: nothing to repaint
    assert!(!scene.frame());

    scene.resume().unwrap();
    assert!(wait_until(Duration::from_secs(2), || scene.frame()));
    scene.pause().unwrap();

    // The views followed the bodies
    let snapshot = controller.snapshot();
    for bubble in scene.bubbles() {
        let view = scene.surface().view(bubble.view).unwrap();
        assert!(view.placements.len() >= 2);
        let transform = snapshot.get(bubble.body).unwrap();
        let last = scene.surface().placement(bubble.view).unwrap();
        let expected = Placement::of(transform, scene.layout().unwrap().pixels_per_meter, 600.0);
        // A step may have landed between the last frame and this snapshot
        assert!((last.diameter - expected.diameter).abs() < 1e-3);
    }

    scene.destroy();
    assert!(scene.resume().is_err());
}
