//! Technologies orbit hubs
//!
//! Each hub drifts around its origin, is pushed by the pointer and carries a
//! ring of evenly spaced nodes that rotate with it. Nodes are derived from the
//! hub every frame rather than stored. Integration is scaled by wall-clock
//! `dt`, unlike the particle field.
//!
//! Orbit inflation and the inter-hub links both use the state at the start of
//! the frame's step; nodes are placed around the stepped hub.

use std::f32::consts::TAU;

use rand::Rng;
use tracing::debug;

use crate::background::{Background, BackgroundKind, Frame};
use crate::config::{OrbitProfile, Profiles};
use crate::geometry::{Point, Size};
use crate::random::{SimRng, uniform, uniform_count};
use crate::surface::{Rgba, Surface};
use crate::viewport::DeviceClass;

/// Link alpha between two coincident hubs
const LINK_BASE_ALPHA: f32 = 0.14;
/// Links fainter than this are not drawn
const LINK_MIN_ALPHA: f32 = 0.02;
const NODE_ALPHA: f32 = 0.35;
const CENTER_RADIUS: f32 = 1.5;
const CENTER_ALPHA: f32 = 0.25;

/// A hub and the parameters of its orbit
#[derive(Debug, Clone)]
pub struct Hub {
    pub x: f32,
    pub y: f32,
    /// Resting position the return spring pulls toward
    pub origin_x: f32,
    pub origin_y: f32,
    /// Velocity in px/s
    pub vx: f32,
    pub vy: f32,
    /// Orbit radius before pointer inflation
    pub radius: f32,
    pub node_count: usize,
    /// Rotation of node 0, in radians
    pub base_angle: f32,
    /// Angular speed in rad/s
    pub speed: f32,
    /// Rotation direction, +1 or -1
    pub dir: f32,
    pub drift_speed: f32,
    pub drift_phase: f32,
    /// Pointer distance measured before the last step moved the hub
    pub pointer_dist: f32,
}

impl Hub {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Unit-scale idle drift at `time` seconds
    ///
    /// Two out-of-phase waves so x and y never move in lockstep.
    pub fn drift(&self, time: f64) -> (f32, f32) {
        let t = time * f64::from(self.drift_speed);
        let phase = f64::from(self.drift_phase);
        ((t + phase).cos() as f32, (t + phase * 1.5).sin() as f32)
    }

    /// Advance the hub physics by `dt` seconds
    pub fn step(&mut self, profile: &OrbitProfile, pointer: Point, dt: f32, time: f64) {
        let dx = self.x - pointer.x;
        let dy = self.y - pointer.y;
        let dist = dx.hypot(dy);
        let reach = profile.repulse_radius;
        self.pointer_dist = dist;

        if dist > 0.0 && dist < reach {
            let force = (reach - dist) / reach * profile.repulse_force;
            self.vx += dx / dist * force * dt;
            self.vy += dy / dist * force * dt;
        }

        self.vx += (self.origin_x - self.x) * profile.return_force * dt;
        self.vy += (self.origin_y - self.y) * profile.return_force * dt;

        let (drift_x, drift_y) = self.drift(time);
        self.vx += drift_x * profile.drift_force * dt;
        self.vy += drift_y * profile.drift_force * dt;

        self.vx *= profile.friction;
        self.vy *= profile.friction;

        self.x += self.vx * dt;
        self.y += self.vy * dt;

        self.base_angle += self.dir * self.speed * dt;
    }

    /// Orbit radius, inflated while the pointer was near the hub center
    pub fn orbit_radius(&self, profile: &OrbitProfile) -> f32 {
        let dist = self.pointer_dist;
        let reach = profile.repulse_radius;
        if dist < reach {
            self.radius * (1.0 + profile.radius_growth * (reach - dist) / reach)
        } else {
            self.radius
        }
    }

    /// Positions of the orbiting nodes for the current state
    pub fn nodes(&self, profile: &OrbitProfile, pointer: Point) -> Vec<Point> {
        let radius = self.orbit_radius(profile);
        let count = self.node_count.max(1) as f32;

        (0..self.node_count)
            .map(|i| {
                let angle = self.base_angle + i as f32 * TAU / count;
                let (sin, cos) = angle.sin_cos();
                let node = Point::new(self.x + cos * radius, self.y + sin * radius);
                let extra = node_push(node, pointer, profile);
                Point::new(node.x + cos * extra, node.y + sin * extra)
            })
            .collect()
    }
}

/// Outward push on a single node near the pointer
///
/// Applied on top of the hub-level inflation in [`Hub::orbit_radius`], so a
/// node close to the pointer is displaced twice.
fn node_push(node: Point, pointer: Point, profile: &OrbitProfile) -> f32 {
    let dist = node.distance(pointer);
    let reach = profile.repulse_radius;
    if dist < reach {
        profile.node_repulse * (reach - dist) / reach
    } else {
        0.0
    }
}

/// Offset applied to all geometry, following the pointer around the center
///
/// Each axis is capped at half of `magnitude`.
pub fn parallax(pointer: Point, size: Size, magnitude: f32) -> Point {
    if size.is_empty() {
        return Point::ORIGIN;
    }
    let center = size.center();
    let nx = ((pointer.x - center.x) / size.width).clamp(-0.5, 0.5);
    let ny = ((pointer.y - center.y) / size.height).clamp(-0.5, 0.5);
    Point::new(nx * magnitude, ny * magnitude)
}

/// Alpha of the link between two hubs on a surface `width` wide
pub fn link_alpha(a: Point, b: Point, width: f32) -> f32 {
    (LINK_BASE_ALPHA - a.distance(b) / (width * 1.6)).max(0.0)
}

/// The orbit hub simulation
pub struct OrbitHubs {
    pub hubs: Vec<Hub>,
    /// Hub positions at the start of the last step, where links are drawn
    link_anchors: Vec<Point>,
    profiles: Profiles<OrbitProfile>,
    class: DeviceClass,
    size: Size,
    rng: SimRng,
}

impl OrbitHubs {
    pub fn new(profiles: Profiles<OrbitProfile>, rng: SimRng) -> Self {
        Self {
            hubs: Vec::new(),
            link_anchors: Vec::new(),
            profiles,
            class: DeviceClass::Desktop,
            size: Size::default(),
            rng,
        }
    }

    pub fn profile(&self) -> &OrbitProfile {
        self.profiles.for_class(self.class)
    }

    /// Replace all hubs with new ones placed inside the surface margins
    pub fn populate(&mut self, size: Size, class: DeviceClass) {
        self.size = size;
        self.class = class;
        let profile = self.profiles.for_class(class).clone();
        let rng = &mut self.rng;

        self.hubs = (0..profile.hubs)
            .map(|_| {
                let x = uniform(rng, size.width * 0.05, size.width * 0.95);
                let y = uniform(rng, size.height * 0.10, size.height * 0.90);
                Hub {
                    x,
                    y,
                    origin_x: x,
                    origin_y: y,
                    vx: 0.0,
                    vy: 0.0,
                    radius: uniform(rng, profile.min_radius, profile.max_radius),
                    node_count: uniform_count(rng, profile.min_nodes, profile.max_nodes),
                    base_angle: uniform(rng, 0.0, TAU),
                    speed: uniform(rng, profile.min_speed, profile.max_speed).to_radians(),
                    dir: if rng.gen_bool(0.5) { -1.0 } else { 1.0 },
                    drift_speed: uniform(rng, 0.6, 1.4),
                    drift_phase: uniform(rng, 0.0, TAU),
                    pointer_dist: f32::INFINITY,
                }
            })
            .collect();
        self.link_anchors = self.hubs.iter().map(Hub::position).collect();

        debug!(
            count = self.hubs.len(),
            width = size.width,
            height = size.height,
            ?class,
            "populated orbit hubs"
        );
    }

    fn render_links(&self, surface: &mut dyn Surface, shift: Point) {
        let links = self.profile().hub_links;
        let n = self.link_anchors.len();

        for i in 0..n {
            for j in (i + 1)..(i + 1 + links).min(n) {
                let a = self.link_anchors[i];
                let b = self.link_anchors[j];
                let alpha = link_alpha(a, b, self.size.width);
                if alpha > LINK_MIN_ALPHA {
                    surface.stroke_line(a.offset(shift), b.offset(shift), Rgba::ink(alpha), 1.0);
                }
            }
        }
    }
}

impl Background for OrbitHubs {
    fn kind(&self) -> BackgroundKind {
        BackgroundKind::Orbits
    }

    fn population(&self) -> usize {
        self.hubs.len()
    }

    fn resize(&mut self, size: Size, class: DeviceClass) {
        self.populate(size, class);
    }

    fn step(&mut self, frame: &Frame, pointer: Point) {
        self.link_anchors.clear();
        self.link_anchors.extend(self.hubs.iter().map(Hub::position));

        let profile = self.profiles.for_class(self.class);
        for hub in &mut self.hubs {
            hub.step(profile, pointer, frame.dt, frame.time);
        }
    }

    fn render(&self, surface: &mut dyn Surface, pointer: Point) {
        let profile = self.profile();
        let shift = parallax(pointer, self.size, profile.parallax);

        self.render_links(surface, shift);

        let guide = Rgba::ink(profile.bg_line_alpha);
        for hub in &self.hubs {
            let center = hub.position().offset(shift);
            for node in hub.nodes(profile, pointer) {
                let node = node.offset(shift);
                surface.stroke_line(center, node, guide, 1.0);
                surface.fill_circle(node, profile.node_size, Rgba::ink(NODE_ALPHA));
            }
            surface.fill_circle(center, CENTER_RADIUS, Rgba::ink(CENTER_ALPHA));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded;
    use crate::surface::{DrawOp, Recorder};

    fn hubs() -> OrbitHubs {
        let mut sim = OrbitHubs::new(
            Profiles {
                mobile: OrbitProfile::mobile(),
                desktop: OrbitProfile::desktop(),
            },
            seeded(3),
        );
        sim.populate(Size::new(800.0, 600.0), DeviceClass::Desktop);
        sim
    }

    fn lone_hub(x: f32, y: f32) -> Hub {
        Hub {
            x,
            y,
            origin_x: x,
            origin_y: y,
            vx: 0.0,
            vy: 0.0,
            radius: 50.0,
            node_count: 4,
            base_angle: 0.0,
            speed: 0.5,
            dir: 1.0,
            drift_speed: 1.0,
            drift_phase: 0.0,
            pointer_dist: f32::INFINITY,
        }
    }

    fn far_away() -> Point {
        Point::new(-10_000.0, -10_000.0)
    }

    #[test]
    fn populate_places_hubs_inside_margins() {
        let sim = hubs();
        assert_eq!(sim.hubs.len(), 14);
        for hub in &sim.hubs {
            assert!((40.0..760.0).contains(&hub.origin_x));
            assert!((60.0..540.0).contains(&hub.origin_y));
            assert!((42.0..95.0).contains(&hub.radius));
            assert!((6..=14).contains(&hub.node_count));
            assert!(hub.dir == 1.0 || hub.dir == -1.0);
            assert!(hub.speed > 0.0 && hub.speed < 0.5_f32.to_radians());
        }
    }

    #[test]
    fn mobile_population() {
        let mut sim = hubs();
        sim.populate(Size::new(375.0, 600.0), DeviceClass::Mobile);
        assert_eq!(sim.hubs.len(), 7);
        assert!(sim.hubs.iter().all(|h| h.radius < 60.0));
    }

    #[test]
    fn without_pointer_only_return_and_drift_act() {
        let profile = OrbitProfile::desktop();
        let mut hub = lone_hub(200.0, 200.0);
        hub.x = 230.0;
        hub.vx = 5.0;
        hub.vy = -2.0;
        let before = hub.clone();
        let (dt, time) = (0.016, 3.25);

        hub.step(&profile, far_away(), dt, time);

        let (drift_x, drift_y) = before.drift(time);
        let mut vx = before.vx;
        vx += (before.origin_x - before.x) * profile.return_force * dt;
        vx += drift_x * profile.drift_force * dt;
        vx *= profile.friction;
        let mut vy = before.vy;
        vy += (before.origin_y - before.y) * profile.return_force * dt;
        vy += drift_y * profile.drift_force * dt;
        vy *= profile.friction;

        assert!((hub.vx - vx).abs() < 1e-6);
        assert!((hub.vy - vy).abs() < 1e-6);
    }

    #[test]
    fn pointer_repels_hub() {
        let profile = OrbitProfile::desktop();
        let mut near = lone_hub(200.0, 200.0);
        let mut far = lone_hub(200.0, 200.0);

        near.step(&profile, Point::new(150.0, 200.0), 0.016, 0.0);
        far.step(&profile, far_away(), 0.016, 0.0);

        assert!(near.vx > far.vx, "pointer on the left pushes the hub right");
    }

    #[test]
    fn rotation_follows_direction() {
        let profile = OrbitProfile::desktop();
        let mut hub = lone_hub(0.0, 0.0);
        hub.dir = -1.0;
        hub.step(&profile, far_away(), 0.5, 0.0);
        assert!((hub.base_angle + 0.25).abs() < 1e-6);
    }

    #[test]
    fn drift_moves_idle_hubs() {
        let mut sim = hubs();
        let start: Vec<Point> = sim.hubs.iter().map(Hub::position).collect();

        let mut time = 0.0;
        for _ in 0..120 {
            time += 1.0 / 60.0;
            let frame = Frame {
                dt: 1.0 / 60.0,
                time,
            };
            sim.step(&frame, far_away());
        }

        let moved = sim
            .hubs
            .iter()
            .zip(&start)
            .filter(|(hub, p)| hub.position().distance(**p) > 1e-3)
            .count();
        assert_eq!(moved, sim.hubs.len());
    }

    #[test]
    fn orbit_inflates_near_pointer() {
        let profile = OrbitProfile::desktop();
        let mut hub = lone_hub(100.0, 100.0);
        assert_eq!(hub.orbit_radius(&profile), 50.0);

        hub.step(&profile, far_away(), 0.016, 0.0);
        assert_eq!(hub.orbit_radius(&profile), 50.0);

        hub.pointer_dist = 0.0;
        assert!((hub.orbit_radius(&profile) - 65.0).abs() < 1e-4);
    }

    #[test]
    fn inflation_uses_distance_before_the_step() {
        let profile = OrbitProfile::desktop();
        let reach = profile.repulse_radius;
        // Just inside the repulse radius, moving out of it this frame
        let pointer = Point::new(reach - 0.05, 0.0);
        let mut hub = lone_hub(0.0, 0.0);
        hub.vx = -40.0;

        hub.step(&profile, pointer, 0.016, 0.0);

        assert!(hub.position().distance(pointer) > reach);
        assert!((hub.pointer_dist - (reach - 0.05)).abs() < 1e-4);
        let expected = 50.0 * (1.0 + profile.radius_growth * 0.05 / reach);
        assert!(hub.orbit_radius(&profile) > 50.0);
        assert!((hub.orbit_radius(&profile) - expected).abs() < 1e-4);
    }

    #[test]
    fn links_start_from_positions_before_the_step() {
        let mut sim = hubs();
        for (hub, x) in sim.hubs.iter_mut().zip([100.0, 140.0]) {
            (hub.x, hub.y) = (x, 100.0);
            (hub.origin_x, hub.origin_y) = (x, 100.0);
        }

        sim.step(&Frame { dt: 0.1, time: 1.0 }, Point::new(110.0, 100.0));
        assert!(sim.hubs[0].x < 100.0, "pointer pushed the first hub");

        let mut rec = Recorder::new();
        sim.render_links(&mut rec, Point::ORIGIN);
        assert!(rec.ops().iter().any(|op| matches!(
            op,
            DrawOp::Line { from, to, .. }
                if *from == Point::new(100.0, 100.0) && *to == Point::new(140.0, 100.0)
        )));
    }

    #[test]
    fn nodes_are_evenly_spaced() {
        let profile = OrbitProfile::desktop();
        let hub = lone_hub(100.0, 100.0);
        let nodes = hub.nodes(&profile, far_away());

        assert_eq!(nodes.len(), 4);
        assert!((nodes[0].x - 150.0).abs() < 1e-4 && (nodes[0].y - 100.0).abs() < 1e-4);
        assert!((nodes[1].x - 100.0).abs() < 1e-4 && (nodes[1].y - 150.0).abs() < 1e-4);
        for node in &nodes {
            assert!((node.distance(hub.position()) - 50.0).abs() < 1e-3);
        }
    }

    #[test]
    fn node_near_pointer_is_pushed_twice() {
        let profile = OrbitProfile::desktop();
        let mut hub = lone_hub(100.0, 100.0);
        // Pointer right on node 0: hub inflation plus the full node push
        let pointer = Point::new(150.0, 100.0);
        hub.pointer_dist = hub.position().distance(pointer);
        let nodes = hub.nodes(&profile, pointer);

        let inflated = hub.orbit_radius(&profile);
        let node_dist = nodes[0].distance(hub.position());
        assert!(inflated > 50.0);
        assert!(node_dist > inflated, "node push adds to the inflated orbit");
    }

    #[test]
    fn parallax_is_zero_at_center_and_capped() {
        let size = Size::new(800.0, 600.0);
        assert_eq!(parallax(Point::new(400.0, 300.0), size, 12.0), Point::ORIGIN);
        assert_eq!(parallax(Point::new(800.0, 0.0), size, 12.0), Point::new(6.0, -6.0));
        assert_eq!(parallax(Point::new(5000.0, -900.0), size, 12.0), Point::new(6.0, -6.0));
        assert_eq!(parallax(Point::ORIGIN, Size::default(), 12.0), Point::ORIGIN);
    }

    #[test]
    fn link_alpha_falls_with_distance() {
        let a = Point::ORIGIN;
        assert!((link_alpha(a, a, 800.0) - 0.14).abs() < 1e-6);
        assert!(link_alpha(a, Point::new(100.0, 0.0), 800.0) < 0.14);
        assert_eq!(link_alpha(a, Point::new(1000.0, 0.0), 800.0), 0.0);
    }

    #[test]
    fn render_draws_guides_nodes_and_centers() {
        let sim = hubs();
        let mut rec = Recorder::new();
        rec.clear();
        sim.render(&mut rec, far_away());

        let nodes: usize = sim.hubs.iter().map(|h| h.node_count).sum();
        assert_eq!(rec.count_filled(), nodes + sim.hubs.len());
        assert!(rec.count_lines() >= nodes);
        assert!(rec.count_lines() <= nodes + sim.hubs.len() * 3);
    }
}
