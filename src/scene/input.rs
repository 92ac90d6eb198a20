use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::core::{BodyHandle, PhysicsController};
use crate::math::{to_degrees, Vector2};
use crate::scene::{fling_velocity, QuestType, ViewId};
use crate::Result;

/// Gestures recognised on a bubble view
pub trait GestureHandler {
    fn on_tap(&self);

    /// A fling with `velocity` in pixels per second (y up), measured in the
    /// view's own frame.
    ///
    /// The view turns with its body, so the velocity is rotated by the body's
    /// counter-clockwise angle ([`BodyTransform::angle`](crate::core::BodyTransform))
    /// into the world frame. That is the negation of the clockwise
    /// [`Placement::rotation_degrees`](crate::scene::Placement) shown on screen.
    fn on_fling(&self, velocity: Vector2) -> Result<()>;
}

/// Told when the user taps a quest bubble
pub trait SceneListener: Send + Sync {
    fn on_clicked_quest_type(&self, quest_type: &QuestType, solved_count: u32, view: ViewId);
}

/// Gesture handling attached to one quest bubble
#[derive(Clone)]
pub struct BubbleGestures {
    quest_type: QuestType,

    solved_count: u32,

    view: ViewId,

    body: BodyHandle,

    controller: Arc<PhysicsController>,

    listener: Option<Arc<dyn SceneListener>>,

    pixels_per_meter: f32,

    speed_factor: f32,
}

impl BubbleGestures {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        quest_type: QuestType,
        solved_count: u32,
        view: ViewId,
        body: BodyHandle,
        controller: Arc<PhysicsController>,
        listener: Option<Arc<dyn SceneListener>>,
        pixels_per_meter: f32,
        speed_factor: f32,
    ) -> Self {
        Self {
            quest_type,
            solved_count,
            view,
            body,
            controller,
            listener,
            pixels_per_meter,
            speed_factor,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn view(&self) -> ViewId {
        self.view
    }
}

impl GestureHandler for BubbleGestures {
    fn on_tap(&self) {
        if let Some(listener) = &self.listener {
            listener.on_clicked_quest_type(&self.quest_type, self.solved_count, self.view);
        }
    }

    fn on_fling(&self, velocity: Vector2) -> Result<()> {
        let angle = self.controller.transform(self.body)?.angle;
        let delta = fling_velocity(velocity, to_degrees(angle), self.pixels_per_meter, self.speed_factor);
        debug!("fling on {} adds {} to {:?}", self.quest_type.name, delta, self.body);
        self.controller.add_linear_velocity(self.body, delta)
    }
}

impl fmt::Debug for BubbleGestures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BubbleGestures")
            .field("quest_type", &self.quest_type.name)
            .field("solved_count", &self.solved_count)
            .field("view", &self.view)
            .field("body", &self.body)
            .finish()
    }
}
