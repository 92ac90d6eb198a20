#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Volume of one solved quest, in cubic meters
pub const ONE_QUEST_SIZE_IN_M3: f32 = 0.01;

/// Fraction of the scene area covered by bubbles
pub const QUESTS_FILL_FACTOR: f32 = 0.55;

/// Multiplier from fling speed to simulation velocity
pub const FLING_SPEED_FACTOR: f32 = 0.3;

/// Tuning of the quest statistics scene
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SceneConfig {
    /// Volume represented by one solved quest (m³)
    pub quest_volume: f32,

    pub fill_factor: f32,

    pub fling_speed_factor: f32,

    /// Area (m²) used when there is nothing to show
    pub min_area: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            quest_volume: ONE_QUEST_SIZE_IN_M3,
            fill_factor: QUESTS_FILL_FACTOR,
            fling_speed_factor: FLING_SPEED_FACTOR,
            min_area: 1.0,
        }
    }
}
