pub mod config;
pub mod bubbles;
pub mod statistics;
pub mod render;
pub mod input;
pub mod orientation;
pub mod quest_scene;

pub use self::config::{SceneConfig, FLING_SPEED_FACTOR, ONE_QUEST_SIZE_IN_M3, QUESTS_FILL_FACTOR};
pub use self::bubbles::{bubble_density, bubble_radius, fling_velocity, simulation_area, spawn_position, SceneLayout};
pub use self::statistics::{EmptyState, QuestType, QuestTypeRegistry, SolvedQuests, StatisticsSource};
pub use self::render::{BubbleView, Placement, RenderSurface, ViewId};
pub use self::input::{BubbleGestures, GestureHandler, SceneListener};
pub use self::orientation::{gravity_from_sensor, DisplayRotation, OrientationAdapter, SensorAccuracy, SensorReading};
pub use self::quest_scene::{QuestBubble, QuestStatisticsScene};
