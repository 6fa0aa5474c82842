//! The view transform between world locations and viewport pixels.
//!
//! [`CoordinateSystem`] owns the zoom level and the camera center, and animates
//! both:
//!
//! - **Zoom** eases linearly toward a goal scale over `scale_frames` ticks. An
//!   optional focal point keeps the world location under the cursor fixed.
//! - **Pan** sequences are queued. Keyboard pans glide along one axis with a
//!   cosine ease-in/ease-out; drag pans apply a single delta on the next tick.
//!   Every queued sequence advances once per tick, so pans run concurrently.
//!
//! # Transform
//!
//! ```text
//! screen.x = width / 2  + (world.x - center.x) * scale
//! screen.y = height / 2 + (world.y - center.y) * scale
//! ```
//!
//! Screen Y grows downward, so panning "up" moves the center toward negative Y.
//!
//! # Example
//!
//! ```
//! use mday_core::config::EngineConfig;
//! use mday_core::location::{Location, ScreenPoint};
//! use mday_core::view::CoordinateSystem;
//!
//! let mut view = CoordinateSystem::with_config(&EngineConfig::default());
//! view.set_viewport(200, 100);
//!
//! assert_eq!(view.to_viewport_point(Location::ORIGIN), ScreenPoint::new(100.0, 50.0));
//!
//! view.zoom_in(None);
//! for _ in 0..13 {
//!     view.tick();
//! }
//! assert_eq!(view.scale(), 1.5);
//! assert_eq!(view.scale_increment(), 0.0);
//! ```

use std::collections::VecDeque;
use std::f64::consts::PI;

use glam::DVec2;
use tracing::{debug, trace};

use crate::command::Command;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::location::{Location, ScreenPoint};
use crate::observer::{CommandConsumer, TickObserver};

/// World-to-screen transform with animated zoom and pan.
#[derive(Debug, Clone)]
pub struct CoordinateSystem {
    width: u32,
    height: u32,
    center: Location,

    scale: f64,
    scale_goal: f64,
    scale_increment: f64,
    focal_point: Option<ScreenPoint>,

    /// Queued pan sequences; each advances by one delta per tick.
    pans: Vec<VecDeque<DVec2>>,

    min_scale: f64,
    max_scale: f64,
    zoom_factor: f64,
    scale_frames: u32,
    pan_frames: u32,
    pan_percent: f64,
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self::with_config(&EngineConfig::default())
    }
}

impl CoordinateSystem {
    /// Creates a coordinate system centred on the origin using the viewport
    /// size, scale bounds and animation lengths from `config`.
    #[must_use]
    pub fn with_config(config: &EngineConfig) -> Self {
        let scale = config.initial_scale.clamp(config.min_scale, config.max_scale);
        Self {
            width: config.viewport_width,
            height: config.viewport_height,
            center: Location::ORIGIN,
            scale,
            scale_goal: scale,
            scale_increment: 0.0,
            focal_point: None,
            pans: Vec::new(),
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_factor: config.zoom_factor,
            scale_frames: config.scale_frames.max(1),
            pan_frames: config.pan_frames.max(1),
            pan_percent: config.pan_percent,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Viewport width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Viewport height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Resizes the viewport.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Current scale, in pixels per world unit.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Scale the zoom animation is heading for.
    #[must_use]
    pub const fn scale_goal(&self) -> f64 {
        self.scale_goal
    }

    /// Per-tick scale step of the running zoom animation; zero when idle.
    #[must_use]
    pub const fn scale_increment(&self) -> f64 {
        self.scale_increment
    }

    /// Jumps to `scale` (clamped), cancelling any zoom animation.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(self.min_scale, self.max_scale);
        self.scale_goal = self.scale;
        self.scale_increment = 0.0;
        self.focal_point = None;
    }

    /// World location at the centre of the viewport.
    #[must_use]
    pub const fn center(&self) -> Location {
        self.center
    }

    /// Moves the camera centre.
    pub fn set_center(&mut self, center: Location) {
        self.center = center;
    }

    /// Number of pan sequences still running.
    #[must_use]
    pub fn pending_pans(&self) -> usize {
        self.pans.len()
    }

    // =========================================================================
    // Transform
    // =========================================================================

    /// Converts a world location to a viewport point.
    #[must_use]
    pub fn to_viewport_point(&self, location: Location) -> ScreenPoint {
        let half = self.half_viewport();
        let p = half + (location.as_vec() - self.center.as_vec()) * self.scale;
        ScreenPoint::new(p.x, p.y)
    }

    /// Converts a viewport point to a world location.
    #[must_use]
    pub fn to_world_location(&self, point: ScreenPoint) -> Location {
        let half = self.half_viewport();
        Location::from_vec((DVec2::from(point) - half) / self.scale + self.center.as_vec())
    }

    /// Whether `location`, grown by `radius`, overlaps the visible world
    /// rectangle.
    #[must_use]
    pub fn contains(&self, location: Location, radius: f64) -> bool {
        location.is_inside(self.top_left(), self.bottom_right(), radius)
    }

    fn half_viewport(&self) -> DVec2 {
        DVec2::new(f64::from(self.width), f64::from(self.height)) / 2.0
    }

    /// Half the visible world extent along each axis.
    fn half_extent(&self) -> DVec2 {
        self.half_viewport() / self.scale
    }

    fn anchor(&self, fx: f64, fy: f64) -> Location {
        let half = self.half_extent();
        self.center.offset(half.x * fx, half.y * fy)
    }

    /// World location at the top-left corner of the viewport.
    #[must_use]
    pub fn top_left(&self) -> Location {
        self.anchor(-1.0, -1.0)
    }

    /// World location at the middle of the top edge.
    #[must_use]
    pub fn top_mid(&self) -> Location {
        self.anchor(0.0, -1.0)
    }

    /// World location at the top-right corner.
    #[must_use]
    pub fn top_right(&self) -> Location {
        self.anchor(1.0, -1.0)
    }

    /// World location at the middle of the left edge.
    #[must_use]
    pub fn mid_left(&self) -> Location {
        self.anchor(-1.0, 0.0)
    }

    /// World location at the middle of the right edge.
    #[must_use]
    pub fn mid_right(&self) -> Location {
        self.anchor(1.0, 0.0)
    }

    /// World location at the bottom-left corner.
    #[must_use]
    pub fn bottom_left(&self) -> Location {
        self.anchor(-1.0, 1.0)
    }

    /// World location at the middle of the bottom edge.
    #[must_use]
    pub fn bottom_mid(&self) -> Location {
        self.anchor(0.0, 1.0)
    }

    /// World location at the bottom-right corner.
    #[must_use]
    pub fn bottom_right(&self) -> Location {
        self.anchor(1.0, 1.0)
    }

    // =========================================================================
    // Zoom
    // =========================================================================

    /// Starts zooming in by the configured factor around `focal_point`.
    pub fn zoom_in(&mut self, focal_point: Option<ScreenPoint>) {
        self.zoom_to(self.scale_goal * self.zoom_factor, focal_point);
    }

    /// Starts zooming out by the configured factor around `focal_point`.
    pub fn zoom_out(&mut self, focal_point: Option<ScreenPoint>) {
        self.zoom_to(self.scale_goal / self.zoom_factor, focal_point);
    }

    /// Replaces the zoom animation. The goal is clamped up front so the
    /// increment always aims at a reachable scale.
    fn zoom_to(&mut self, goal: f64, focal_point: Option<ScreenPoint>) {
        self.scale_goal = goal.clamp(self.min_scale, self.max_scale);
        self.scale_increment = (self.scale_goal - self.scale) / f64::from(self.scale_frames);
        self.focal_point = focal_point;
        debug!(
            goal = self.scale_goal,
            increment = self.scale_increment,
            "zoom started"
        );
    }

    fn step_zoom(&mut self) {
        let gap = self.scale_goal - self.scale;
        if gap == 0.0 {
            self.scale_increment = 0.0;
            self.focal_point = None;
            return;
        }

        let anchor = self.focal_point.map(|p| (p, self.to_world_location(p)));

        let next = (self.scale + self.scale_increment).clamp(self.min_scale, self.max_scale);
        // Settle within half a step, when the step no longer changes the
        // scale, or when it would pass the goal.
        let settles = self.scale_increment == 0.0
            || gap.abs() <= self.scale_increment.abs() / 2.0
            || next == self.scale
            || (self.scale_goal - next) * gap < 0.0;

        if settles {
            self.scale = self.scale_goal;
            self.scale_increment = 0.0;
        } else {
            self.scale = next;
        }

        if let Some((point, before)) = anchor {
            let after = self.to_world_location(point);
            self.center = self.center + (before - after);
        }

        if self.scale_increment == 0.0 {
            self.focal_point = None;
        }
    }

    // =========================================================================
    // Pan
    // =========================================================================

    /// Queues a drag pan. The screen delta is divided by the scale so the same
    /// drag covers the same screen distance at every zoom level.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.pans
            .push(VecDeque::from([DVec2::new(dx, dy) / self.scale]));
    }

    /// Glides the view up by a fraction of the visible height.
    pub fn pan_up(&mut self) {
        let distance = self.pan_distance().y;
        self.glide(DVec2::new(0.0, -distance));
    }

    /// Glides the view down by a fraction of the visible height.
    pub fn pan_down(&mut self) {
        let distance = self.pan_distance().y;
        self.glide(DVec2::new(0.0, distance));
    }

    /// Glides the view left by a fraction of the visible width.
    pub fn pan_left(&mut self) {
        let distance = self.pan_distance().x;
        self.glide(DVec2::new(-distance, 0.0));
    }

    /// Glides the view right by a fraction of the visible width.
    pub fn pan_right(&mut self) {
        let distance = self.pan_distance().x;
        self.glide(DVec2::new(distance, 0.0));
    }

    fn pan_distance(&self) -> DVec2 {
        self.half_extent() * 2.0 * self.pan_percent
    }

    /// Queues the per-tick differences of `total * (1 - (cos(iπ/N) + 1) / 2)`
    /// for `i` in `0..=N`.
    fn glide(&mut self, total: DVec2) {
        let frames = f64::from(self.pan_frames);
        let mut previous = DVec2::ZERO;
        let deltas = (0..=self.pan_frames)
            .map(|i| {
                let eased = 1.0 - ((f64::from(i) * PI / frames).cos() + 1.0) / 2.0;
                let current = total * eased;
                let delta = current - previous;
                previous = current;
                delta
            })
            .collect();
        self.pans.push(deltas);
    }

    fn step_pans(&mut self) {
        for deltas in &mut self.pans {
            if let Some(delta) = deltas.pop_front() {
                self.center = self.center + Location::from_vec(delta);
            }
        }
        self.pans.retain(|deltas| !deltas.is_empty());
    }

    /// Advances the zoom and pan animations by one tick.
    pub fn tick(&mut self) {
        self.step_zoom();
        self.step_pans();
        trace!(scale = self.scale, center = %self.center, "view ticked");
    }
}

impl TickObserver for CoordinateSystem {
    fn tick(&mut self) -> Result<(), EngineError> {
        CoordinateSystem::tick(self);
        Ok(())
    }
}

impl CommandConsumer for CoordinateSystem {
    fn name(&self) -> &str {
        "view"
    }

    fn accept(&mut self, command: &Command) -> Result<(), EngineError> {
        match command {
            Command::ZoomIn(point) => self.zoom_in(*point),
            Command::ZoomOut(point) => self.zoom_out(*point),
            Command::PanBy { dx, dy } => self.pan(*dx, *dy),
            Command::PanUp => self.pan_up(),
            Command::PanDown => self.pan_down(),
            Command::PanLeft => self.pan_left(),
            Command::PanRight => self.pan_right(),
            Command::Resize { width, height } => self.set_viewport(*width, *height),
            _ => {}
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
