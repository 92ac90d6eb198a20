use std::collections::HashMap;

use log::trace;

use crate::core::{BodyHandle, BodyTransform, WorldSnapshot};
use crate::math::to_degrees;

/// Identifies a view added to a [`RenderSurface`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u32);

impl ViewId {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Where a bubble view goes on screen, in pixels with y pointing down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub center_x: f32,

    pub center_y: f32,

    /// Clockwise, as screen rotations are
    pub rotation_degrees: f32,

    pub diameter: f32,
}

impl Placement {
    /// Maps a simulation transform (y up, counter-clockwise angles) to the screen
    pub fn of(transform: &BodyTransform, pixels_per_meter: f32, height_px: f32) -> Self {
        let radius = transform.radius.unwrap_or(0.0);
        Self {
            center_x: transform.position.x * pixels_per_meter,
            center_y: height_px - transform.position.y * pixels_per_meter,
            rotation_degrees: -to_degrees(transform.angle),
            diameter: 2.0 * radius * pixels_per_meter,
        }
    }
}

/// A widget that can be moved to follow a body
pub trait BubbleView {
    fn place(&mut self, placement: Placement);
}

struct TrackedView<V> {
    body: BodyHandle,

    view: V,

    /// Last placement applied, if the body has been seen yet
    placement: Option<Placement>,
}

/// Keeps a set of views in sync with the bodies they represent
pub struct RenderSurface<V> {
    pixels_per_meter: f32,

    height_px: f32,

    views: Vec<(ViewId, TrackedView<V>)>,

    index: HashMap<ViewId, usize>,

    next_id: u32,
}

impl<V: BubbleView> RenderSurface<V> {
    pub fn new(pixels_per_meter: f32, height_px: f32) -> Self {
        Self {
            pixels_per_meter,
            height_px,
            views: Vec::new(),
            index: HashMap::new(),
            next_id: 1,
        }
    }

    /// Changes the scale applied on the next invalidation
    pub fn set_scale(&mut self, pixels_per_meter: f32, height_px: f32) {
        self.pixels_per_meter = pixels_per_meter;
        self.height_px = height_px;
    }

    pub fn pixels_per_meter(&self) -> f32 {
        self.pixels_per_meter
    }

    /// Tracks `view` as the on-screen form of `body`
    pub fn add_view(&mut self, view: V, body: BodyHandle) -> ViewId {
        let id = ViewId(self.next_id);
        self.next_id += 1;
        self.index.insert(id, self.views.len());
        self.views.push((
            id,
            TrackedView {
                body,
                view,
                placement: None,
            },
        ));
        id
    }

    /// Places every view whose body is in `snapshot`; returns how many were placed
    pub fn on_invalidate(&mut self, snapshot: &WorldSnapshot) -> usize {
        let mut placed = 0;
        for (_, tracked) in self.views.iter_mut() {
            if let Some(transform) = snapshot.get(tracked.body) {
                let placement = Placement::of(transform, self.pixels_per_meter, self.height_px);
                tracked.view.place(placement);
                tracked.placement = Some(placement);
                placed += 1;
            }
        }
        trace!("placed {} of {} views for step {}", placed, self.views.len(), snapshot.step());
        placed
    }

    pub fn view(&self, id: ViewId) -> Option<&V> {
        self.tracked(id).map(|tracked| &tracked.view)
    }

    pub fn body_of(&self, id: ViewId) -> Option<BodyHandle> {
        self.tracked(id).map(|tracked| tracked.body)
    }

    /// The last placement applied to a view
    pub fn placement(&self, id: ViewId) -> Option<Placement> {
        self.tracked(id).and_then(|tracked| tracked.placement)
    }

    /// Current on-screen rotation of a view, zero until its body has been seen
    pub fn rotation_degrees(&self, id: ViewId) -> f32 {
        self.placement(id).map_or(0.0, |placement| placement.rotation_degrees)
    }

    /// Views in the order they were added
    pub fn views(&self) -> impl Iterator<Item = (ViewId, &V)> {
        self.views.iter().map(|(id, tracked)| (*id, &tracked.view))
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    fn tracked(&self, id: ViewId) -> Option<&TrackedView<V>> {
        self.index.get(&id).map(|&i| &self.views[i].1)
    }
}
