//! Contact ring waves
//!
//! Rings spawn on a timer and under the pointer, expand at their own speed
//! and fade out. The collection is a bounded FIFO: pushing past the cap
//! drops the oldest ring.

use std::collections::VecDeque;

use tracing::trace;

use crate::background::{Background, BackgroundKind, Frame};
use crate::config::{Profiles, RingProfile};
use crate::geometry::{Point, Size};
use crate::random::{SimRng, uniform};
use crate::surface::{Rgba, Surface};
use crate::viewport::DeviceClass;

/// An expanding, fading circle
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    /// Center, fixed at spawn
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// The ring is removed once `radius` reaches this
    pub max_radius: f32,
    /// Growth in px/s
    pub speed: f32,
    pub line_width: f32,
    pub alpha: f32,
}

impl Ring {
    /// Grow and fade by `dt` seconds; returns whether the ring survives
    fn advance(&mut self, dt: f32, fade: f32) -> bool {
        self.radius += self.speed * dt;
        self.alpha -= fade * dt;
        self.is_alive()
    }

    pub fn is_alive(&self) -> bool {
        self.radius < self.max_radius && self.alpha > 0.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The ring wave simulation
pub struct RingWaves {
    rings: VecDeque<Ring>,
    profiles: Profiles<RingProfile>,
    class: DeviceClass,
    size: Size,
    /// Time of the last automatic spawn, in seconds; set by the first frame
    last_spawn: Option<f64>,
    rng: SimRng,
}

impl RingWaves {
    pub fn new(profiles: Profiles<RingProfile>, rng: SimRng) -> Self {
        Self {
            rings: VecDeque::new(),
            profiles,
            class: DeviceClass::Desktop,
            size: Size::default(),
            last_spawn: None,
            rng,
        }
    }

    pub fn profile(&self) -> &RingProfile {
        self.profiles.for_class(self.class)
    }

    /// Live rings, oldest first
    pub fn rings(&self) -> impl ExactSizeIterator<Item = &Ring> {
        self.rings.iter()
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Spawn a ring centered on `center`
    pub fn spawn_at(&mut self, center: Point) {
        let profile = self.profiles.for_class(self.class);
        let ring = Ring {
            x: center.x,
            y: center.y,
            radius: profile.initial_radius,
            max_radius: profile.base_max_radius * uniform(&mut self.rng, 0.7, 1.3),
            speed: uniform(&mut self.rng, profile.min_speed, profile.max_speed),
            line_width: uniform(&mut self.rng, profile.min_line, profile.max_line),
            alpha: profile.initial_alpha,
        };
        let cap = profile.max_rings;

        self.rings.push_back(ring);
        while self.rings.len() > cap {
            self.rings.pop_front();
            trace!(cap, "evicted oldest ring");
        }
    }

    /// Spawn a ring somewhere on the surface
    pub fn spawn_random(&mut self) {
        let center = Point::new(
            uniform(&mut self.rng, 0.0, self.size.width),
            uniform(&mut self.rng, 0.0, self.size.height),
        );
        self.spawn_at(center);
    }

    /// Fire the auto-spawn timer if its interval has elapsed at `now`
    ///
    /// The timer restarts from `now`, not from the scheduled instant, so it
    /// drifts with frame timing.
    pub fn auto_spawn(&mut self, now: f64) -> bool {
        let last = *self.last_spawn.get_or_insert(now);
        let every = f64::from(self.profile().auto_spawn_every);

        if now - last >= every {
            self.spawn_random();
            self.last_spawn = Some(now);
            true
        } else {
            false
        }
    }

    /// Grow and fade all rings by `dt` seconds, dropping finished ones
    pub fn advance(&mut self, dt: f32) {
        let fade = self.profile().fade;
        self.rings.retain_mut(|ring| ring.advance(dt, fade));
    }
}

impl Background for RingWaves {
    fn kind(&self) -> BackgroundKind {
        BackgroundKind::Rings
    }

    fn population(&self) -> usize {
        self.rings.len()
    }

    fn resize(&mut self, size: Size, class: DeviceClass) {
        self.size = size;
        self.class = class;
        self.rings.clear();
    }

    fn pointer_moved(&mut self, local: Point) {
        trace!(x = local.x, y = local.y, "pointer ring");
        self.spawn_at(local);
    }

    fn step(&mut self, frame: &Frame, _pointer: Point) {
        self.auto_spawn(frame.time);
        self.advance(frame.dt);
    }

    fn render(&self, surface: &mut dyn Surface, _pointer: Point) {
        for ring in &self.rings {
            surface.stroke_circle(
                ring.center(),
                ring.radius,
                Rgba::ink(ring.alpha.max(0.0)),
                ring.line_width,
            );
        }
    }
}
