//! Background hosting
//!
//! A [`Stage`] is what a page section mounts: it owns one background, the
//! viewport it was sized for, the pointer tracker feeding it and the frame
//! clock. Hosts forward resize, pointer and frame events; the stage decides
//! when a frame is skipped.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Tuning;
use crate::error::BackdropError;
use crate::geometry::{ClientRect, Point, Size};
use crate::orbits::OrbitHubs;
use crate::particles::ParticleField;
use crate::pointer::PointerTracker;
use crate::random::seeded;
use crate::rings::RingWaves;
use crate::surface::Surface;
use crate::viewport::{DeviceClass, TouchPolicy, Viewport};

/// Timing of one animation frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Seconds since the previous frame (0 on the first frame after a pause)
    pub dt: f32,
    /// Host timestamp in seconds
    pub time: f64,
}

/// Turns host frame timestamps (milliseconds) into [`Frame`]s
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, now_ms: f64) -> Frame {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0).max(0.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        Frame {
            dt,
            time: now_ms / 1000.0,
        }
    }

    /// Forget the last timestamp so the next tick starts from `dt = 0`
    pub fn pause(&mut self) {
        self.last_ms = None;
    }
}

/// The available backgrounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundKind {
    /// Hero particle field
    Particles,
    /// Contact ring waves
    Rings,
    /// Technologies orbit hubs
    Orbits,
}

impl BackgroundKind {
    pub const ALL: [BackgroundKind; 3] = [
        BackgroundKind::Particles,
        BackgroundKind::Orbits,
        BackgroundKind::Rings,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BackgroundKind::Particles => "particles",
            BackgroundKind::Rings => "rings",
            BackgroundKind::Orbits => "orbits",
        }
    }

    /// Page section that hosts this background
    pub fn section(self) -> &'static str {
        match self {
            BackgroundKind::Particles => "hero",
            BackgroundKind::Rings => "contact",
            BackgroundKind::Orbits => "technologies",
        }
    }

    /// The hero field also treats touch-capable devices as mobile
    pub fn touch_policy(self) -> TouchPolicy {
        match self {
            BackgroundKind::Particles => TouchPolicy::WidthOrTouch,
            BackgroundKind::Rings | BackgroundKind::Orbits => TouchPolicy::WidthOnly,
        }
    }

    /// Create the background with its own random stream
    pub fn build(self, tuning: &Tuning, seed: u64) -> Box<dyn Background> {
        let rng = seeded(seed);
        match self {
            Self::Particles => Box::new(ParticleField::new(tuning.particles.clone(), rng)),
            Self::Rings => Box::new(RingWaves::new(tuning.rings.clone(), rng)),
            Self::Orbits => Box::new(OrbitHubs::new(tuning.orbits.clone(), rng)),
        }
    }
}

impl fmt::Display for BackgroundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts a background name or the name of the section hosting it
impl FromStr for BackgroundKind {
    type Err = BackdropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackgroundKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s) || k.section().eq_ignore_ascii_case(s))
            .ok_or_else(|| BackdropError::UnknownKind(s.to_string()))
    }
}

/// A simulated, drawable background
pub trait Background {
    fn kind(&self) -> BackgroundKind;

    /// Number of live entities (particles, rings or hubs)
    fn population(&self) -> usize;

    /// Discard the population and rebuild it for a new size and class
    fn resize(&mut self, size: Size, class: DeviceClass);

    /// Document pointer moved; `local` is surface-local and may lie outside
    fn pointer_moved(&mut self, _local: Point) {}

    /// Advance the simulation by one frame
    fn step(&mut self, frame: &Frame, pointer: Point);

    /// Draw the current state onto a cleared surface
    fn render(&self, surface: &mut dyn Surface, pointer: Point);
}

/// A mounted background with its viewport, pointer and clock
pub struct Stage {
    background: Box<dyn Background>,
    viewport: Viewport,
    pointer: PointerTracker,
    clock: FrameClock,
    visible: bool,
}

impl Stage {
    pub fn new(background: Box<dyn Background>) -> Self {
        Self {
            background,
            viewport: Viewport::new(),
            pointer: PointerTracker::new(),
            clock: FrameClock::new(),
            visible: true,
        }
    }

    pub fn kind(&self) -> BackgroundKind {
        self.background.kind()
    }

    pub fn background(&self) -> &dyn Background {
        self.background.as_ref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Surface-local pointer position the next frame will use
    pub fn pointer(&self) -> Point {
        self.pointer.position()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Container resized; regenerates the population when size or class changed
    pub fn resize(&mut self, size: Size, class: DeviceClass) -> bool {
        match self.viewport.observe(size, class) {
            Some(change) => {
                debug!(
                    kind = %self.kind(),
                    width = size.width,
                    height = size.height,
                    ?class,
                    reclassified = change.reclassified,
                    "regenerating background"
                );
                self.background.resize(size, class);
                true
            }
            None => false,
        }
    }

    /// Pointer moved over the surface element
    pub fn surface_pointer_move(&mut self, client: Point, rect: &ClientRect) {
        self.pointer.on_surface_move(client, rect);
    }

    /// Touch moved over the surface element
    pub fn touch_move(&mut self, touches: &[Point], rect: &ClientRect) {
        self.pointer.on_touch_move(touches, rect);
    }

    /// Pointer moved anywhere in the document
    pub fn global_pointer_move(&mut self, client: Point, rect: &ClientRect) {
        self.pointer.on_global_move(client, rect);
        if self.visible && !self.viewport.size().is_empty() {
            self.background.pointer_moved(rect.to_local(client));
        }
    }

    /// Pause or resume; a hidden stage neither steps nor draws
    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        if !visible {
            self.clock.pause();
        }
        debug!(kind = %self.kind(), visible, "visibility changed");
    }

    /// Run one frame at host time `now_ms`
    ///
    /// Returns false when the frame was skipped: hidden, zero-sized or no
    /// drawing context.
    pub fn frame(&mut self, now_ms: f64, surface: &mut dyn Surface) -> bool {
        if !self.visible {
            return false;
        }
        let frame = self.clock.tick(now_ms);
        if self.viewport.size().is_empty() || !surface.is_available() {
            return false;
        }

        let pointer = self.pointer.position();
        self.background.step(&frame, pointer);
        surface.clear();
        self.background.render(surface, pointer);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Recorder;

    fn stage(kind: BackgroundKind) -> Stage {
        Stage::new(kind.build(&Tuning::default(), 11))
    }

    #[test]
    fn clock_first_tick_has_zero_dt() {
        let mut clock = FrameClock::new();
        let first = clock.tick(1000.0);
        assert_eq!(first.dt, 0.0);
        assert_eq!(first.time, 1.0);

        let second = clock.tick(1016.0);
        assert!((second.dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn clock_pause_rebases() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        clock.pause();
        assert_eq!(clock.tick(60_000.0).dt, 0.0);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut clock = FrameClock::new();
        clock.tick(500.0);
        assert_eq!(clock.tick(400.0).dt, 0.0);
    }

    #[test]
    fn kind_parses_names_and_sections() {
        assert_eq!("particles".parse::<BackgroundKind>().unwrap(), BackgroundKind::Particles);
        assert_eq!("Hero".parse::<BackgroundKind>().unwrap(), BackgroundKind::Particles);
        assert_eq!("contact".parse::<BackgroundKind>().unwrap(), BackgroundKind::Rings);
        assert_eq!("technologies".parse::<BackgroundKind>().unwrap(), BackgroundKind::Orbits);
        assert!(matches!(
            "stars".parse::<BackgroundKind>(),
            Err(BackdropError::UnknownKind(_))
        ));
    }

    #[test]
    fn build_matches_kind() {
        for kind in BackgroundKind::ALL {
            assert_eq!(kind.build(&Tuning::default(), 1).kind(), kind);
        }
    }

    #[test]
    fn zero_sized_stage_skips_frames() {
        let mut stage = stage(BackgroundKind::Particles);
        let mut rec = Recorder::new();
        assert!(!stage.frame(0.0, &mut rec));
        assert!(rec.ops().is_empty());
    }

    #[test]
    fn missing_context_skips_frames() {
        let mut stage = stage(BackgroundKind::Orbits);
        stage.resize(Size::new(800.0, 600.0), DeviceClass::Desktop);
        let mut rec = Recorder::unavailable();
        assert!(!stage.frame(0.0, &mut rec));
        assert!(rec.ops().is_empty());
    }

    #[test]
    fn resize_regenerates_only_on_change() {
        let mut stage = stage(BackgroundKind::Particles);
        assert!(stage.resize(Size::new(800.0, 600.0), DeviceClass::Desktop));
        assert_eq!(stage.background().population(), 200);
        assert!(!stage.resize(Size::new(800.0, 600.0), DeviceClass::Desktop));
        assert!(stage.resize(Size::new(800.0, 600.0), DeviceClass::Mobile));
        assert_eq!(stage.background().population(), 100);
        assert_eq!(stage.viewport().size(), Size::new(800.0, 600.0));
        assert_eq!(stage.viewport().class(), DeviceClass::Mobile);
    }

    #[test]
    fn frame_clears_then_draws() {
        let mut stage = stage(BackgroundKind::Particles);
        stage.resize(Size::new(800.0, 600.0), DeviceClass::Desktop);
        let mut rec = Recorder::new();

        assert!(stage.frame(0.0, &mut rec));
        assert_eq!(rec.ops()[0], crate::surface::DrawOp::Clear);
        assert_eq!(rec.count_filled(), 200);
    }

    #[test]
    fn hidden_stage_skips_frames_and_pointer_rings() {
        let mut stage = stage(BackgroundKind::Rings);
        let rect = ClientRect::new(0.0, 0.0, 800.0, 600.0);
        stage.resize(rect.size(), DeviceClass::Desktop);
        stage.set_visible(false);

        stage.global_pointer_move(Point::new(10.0, 10.0), &rect);
        assert_eq!(stage.background().population(), 0);

        let mut rec = Recorder::new();
        assert!(!stage.frame(16.0, &mut rec));

        stage.set_visible(true);
        stage.global_pointer_move(Point::new(10.0, 10.0), &rect);
        assert_eq!(stage.background().population(), 1);
    }

    #[test]
    fn global_pointer_outside_rect_still_spawns_ring() {
        let mut stage = stage(BackgroundKind::Rings);
        let rect = ClientRect::new(0.0, 1000.0, 800.0, 600.0);
        stage.resize(rect.size(), DeviceClass::Desktop);

        stage.global_pointer_move(Point::new(10.0, 10.0), &rect);

        assert_eq!(stage.background().population(), 1);
        assert_eq!(stage.pointer(), Point::ORIGIN, "tracker ignores outside moves");
    }
}
