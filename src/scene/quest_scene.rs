use std::sync::Arc;

use log::{debug, info};
use rand::Rng;

use crate::bodies::BodyDef;
use crate::core::{BodyHandle, PhysicsController, RepaintSignal};
use crate::error::PhysicsError;
use crate::scene::{
    bubble_density, bubble_radius, simulation_area, spawn_position, BubbleGestures, BubbleView, EmptyState,
    QuestType, QuestTypeRegistry, RenderSurface, SceneConfig, SceneLayout, SceneListener, SolvedQuests,
    StatisticsSource, ViewId,
};
use crate::shapes::{ChainLoop, Shape};
use crate::Result;

/// One quest type shown as a bubble
#[derive(Debug, Clone, PartialEq)]
pub struct QuestBubble {
    pub quest_type: QuestType,

    pub solved_count: u32,

    pub radius: f32,

    pub body: BodyHandle,

    pub view: ViewId,
}

/// The ball pit: one bubble per solved quest type, bouncing inside the view.
///
/// Setup runs in three calls: [`load`] reads the statistics, [`setup`] sizes the
/// simulation to the view and builds its walls, [`add_quests`] drops the
/// bubbles in. The scene then draws itself from controller snapshots whenever
/// [`frame`] finds the repaint signal set.
///
/// [`load`]: QuestStatisticsScene::load
/// [`setup`]: QuestStatisticsScene::setup
/// [`add_quests`]: QuestStatisticsScene::add_quests
/// [`frame`]: QuestStatisticsScene::frame
pub struct QuestStatisticsScene<V> {
    controller: Arc<PhysicsController>,

    statistics: Arc<dyn StatisticsSource>,

    registry: Arc<dyn QuestTypeRegistry>,

    listener: Option<Arc<dyn SceneListener>>,

    config: SceneConfig,

    repaint: RepaintSignal,

    solved: SolvedQuests,

    layout: Option<SceneLayout>,

    boundary: Option<BodyHandle>,

    surface: RenderSurface<V>,

    bubbles: Vec<QuestBubble>,
}

impl<V: BubbleView> QuestStatisticsScene<V> {
    /// Creates the scene and registers its repaint signal as the controller's
    /// step listener
    pub fn new(
        controller: Arc<PhysicsController>,
        statistics: Arc<dyn StatisticsSource>,
        registry: Arc<dyn QuestTypeRegistry>,
        listener: Option<Arc<dyn SceneListener>>,
        config: SceneConfig,
    ) -> Self {
        let repaint = RepaintSignal::new();
        controller.set_step_listener(repaint.clone());

        Self {
            controller,
            statistics,
            registry,
            listener,
            config,
            repaint,
            solved: SolvedQuests::default(),
            layout: None,
            boundary: None,
            surface: RenderSurface::new(1.0, 0.0),
            bubbles: Vec::new(),
        }
    }

    /// Reads solved counts from the statistics source
    pub fn load(&mut self) -> Result<&SolvedQuests> {
        self.solved = SolvedQuests::load(self.statistics.as_ref(), self.registry.as_ref())?;
        Ok(&self.solved)
    }

    /// What to show instead of bubbles, if there are none to show
    pub fn empty_state(&self) -> Option<EmptyState> {
        if !self.solved.is_empty() {
            None
        } else if self.statistics.is_synchronizing() {
            Some(EmptyState::Syncing)
        } else {
            Some(EmptyState::NoQuests)
        }
    }

    /// Sizes the simulation to a `width_px × height_px` view and builds the
    /// walls around it. Runs once; later calls return the existing layout.
    pub fn setup(&mut self, width_px: f32, height_px: f32) -> Result<SceneLayout> {
        if let Some(layout) = self.layout {
            return Ok(layout);
        }

        let area = simulation_area(self.solved.total(), &self.config);
        let layout = SceneLayout::new(width_px, height_px, area)?;

        let (w, h) = (layout.width_m(), layout.height_m());
        let walls = ChainLoop::rectangle(w, h)?;
        let boundary = self.controller.create_body(BodyDef::fixed(), Shape::from(walls), 0.0)?;

        self.surface.set_scale(layout.pixels_per_meter, layout.height_px);
        self.layout = Some(layout);
        self.boundary = Some(boundary);

        info!(
            "scene set up: {:.2} x {:.2} m at {:.1} px/m",
            w, h, layout.pixels_per_meter
        );
        Ok(layout)
    }

    /// Creates one bubble body and view per loaded quest type, largest first.
    ///
    /// `make_view` builds the view for a quest type, its solved count and radius
    /// in meters.
    pub fn add_quests<R, F>(&mut self, rng: &mut R, mut make_view: F) -> Result<&[QuestBubble]>
    where
        R: Rng + ?Sized,
        F: FnMut(&QuestType, u32, f32) -> V,
    {
        let layout = self
            .layout
            .ok_or_else(|| PhysicsError::InvalidState("add_quests called before setup".to_string()))?;

        for (quest_type, solved_count) in self.solved.entries() {
            let radius = bubble_radius(*solved_count, self.config.quest_volume);
            let position = spawn_position(rng, radius, &layout.bounds);

            let body = self.controller.create_body(
                BodyDef::dynamic(position),
                Shape::circle(radius),
                bubble_density(radius),
            )?;
            let view = self.surface.add_view(make_view(quest_type, *solved_count, radius), body);

            debug!(
                "added {} bubble r={:.3} at {} for {} solved",
                quest_type.name, radius, position, solved_count
            );
            self.bubbles.push(QuestBubble {
                quest_type: quest_type.clone(),
                solved_count: *solved_count,
                radius,
                body,
                view,
            });
        }

        // Place views right away rather than on the first step
        self.surface.on_invalidate(&self.controller.snapshot());
        Ok(&self.bubbles)
    }

    /// Gesture handling for a bubble's view
    pub fn gestures(&self, view: ViewId) -> Option<BubbleGestures> {
        let bubble = self.bubbles.iter().find(|bubble| bubble.view == view)?;
        Some(BubbleGestures::new(
            bubble.quest_type.clone(),
            bubble.solved_count,
            bubble.view,
            bubble.body,
            Arc::clone(&self.controller),
            self.listener.clone(),
            self.surface.pixels_per_meter(),
            self.config.fling_speed_factor,
        ))
    }

    /// Redraws from the latest snapshot if a step happened since the last frame
    pub fn frame(&mut self) -> bool {
        if !self.repaint.take() {
            return false;
        }
        self.surface.on_invalidate(&self.controller.snapshot());
        true
    }

    pub fn resume(&self) -> Result<()> {
        self.controller.resume()
    }

    pub fn pause(&self) -> Result<()> {
        self.controller.pause()
    }

    pub fn destroy(&self) {
        self.controller.destroy();
    }

    pub fn controller(&self) -> &Arc<PhysicsController> {
        &self.controller
    }

    pub fn solved(&self) -> &SolvedQuests {
        &self.solved
    }

    pub fn layout(&self) -> Option<SceneLayout> {
        self.layout
    }

    pub fn boundary(&self) -> Option<BodyHandle> {
        self.boundary
    }

    pub fn bubbles(&self) -> &[QuestBubble] {
        &self.bubbles
    }

    pub fn surface(&self) -> &RenderSurface<V> {
        &self.surface
    }

    pub fn repaint_signal(&self) -> &RepaintSignal {
        &self.repaint
    }
}
