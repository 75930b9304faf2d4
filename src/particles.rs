//! Hero particle field
//!
//! Particles rest at a random origin, get pushed away by the pointer and
//! spring back. Nearby particles are linked by faint lines. Integration is
//! per frame (not scaled by elapsed time), so the frame rate sets the pace.

use tracing::debug;

use crate::background::{Background, BackgroundKind, Frame};
use crate::config::{ParticleProfile, Profiles};
use crate::geometry::{Point, Size};
use crate::random::{SimRng, uniform};
use crate::surface::{Rgba, Surface};
use crate::viewport::DeviceClass;

/// A point particle anchored to its origin
#[derive(Debug, Clone)]
pub struct Particle {
    /// Current position
    pub x: f32,
    pub y: f32,
    /// Resting position; never changes after creation
    pub origin_x: f32,
    pub origin_y: f32,
    /// Velocity in px per frame
    pub vx: f32,
    pub vy: f32,
    /// Radius for rendering
    pub radius: f32,
    pub opacity: f32,
    /// Indices of linked particles, rebuilt every frame
    pub connections: Vec<usize>,
}

impl Particle {
    /// Create a particle at rest on its origin
    pub fn at_rest(x: f32, y: f32, radius: f32, opacity: f32) -> Self {
        Self {
            x,
            y,
            origin_x: x,
            origin_y: y,
            vx: 0.0,
            vy: 0.0,
            radius,
            opacity,
            connections: Vec::new(),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Distance from the resting position
    pub fn displacement(&self) -> f32 {
        (self.x - self.origin_x).hypot(self.y - self.origin_y)
    }

    fn distance_to(&self, other: &Particle) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The particle field simulation
pub struct ParticleField {
    pub particles: Vec<Particle>,
    profiles: Profiles<ParticleProfile>,
    class: DeviceClass,
    rng: SimRng,
}

impl ParticleField {
    pub fn new(profiles: Profiles<ParticleProfile>, rng: SimRng) -> Self {
        Self {
            particles: Vec::new(),
            profiles,
            class: DeviceClass::Desktop,
            rng,
        }
    }

    /// Constants for the current device class
    pub fn profile(&self) -> &ParticleProfile {
        self.profiles.for_class(self.class)
    }

    /// Replace the population with fresh particles scattered over `size`
    pub fn populate(&mut self, size: Size, class: DeviceClass) {
        self.class = class;
        let profile = self.profiles.for_class(class).clone();

        self.particles = (0..profile.particle_count)
            .map(|_| {
                let x = uniform(&mut self.rng, 0.0, size.width);
                let y = uniform(&mut self.rng, 0.0, size.height);
                let radius = uniform(&mut self.rng, profile.min_size, profile.max_size);
                let opacity = uniform(&mut self.rng, profile.min_opacity, profile.max_opacity);
                Particle::at_rest(x, y, radius, opacity)
            })
            .collect();

        debug!(
            count = self.particles.len(),
            width = size.width,
            height = size.height,
            ?class,
            "populated particle field"
        );
    }

    /// Apply pointer repulsion, the return spring and friction, then integrate
    pub fn apply_forces(&mut self, pointer: Point) {
        let profile = self.profiles.for_class(self.class);

        for particle in &mut self.particles {
            let dx = particle.x - pointer.x;
            let dy = particle.y - pointer.y;
            let distance = (dx * dx + dy * dy).sqrt();

            if distance < profile.mouse_radius && distance > 0.0 {
                let force = (profile.mouse_radius - distance) / profile.mouse_radius
                    * profile.repulsion_force;
                particle.vx += dx / distance * force;
                particle.vy += dy / distance * force;
            }

            particle.vx += (particle.origin_x - particle.x) * profile.return_force;
            particle.vy += (particle.origin_y - particle.y) * profile.return_force;

            particle.vx *= profile.friction;
            particle.vy *= profile.friction;

            particle.x += particle.vx;
            particle.y += particle.vy;
        }
    }

    /// Rebuild the link graph
    ///
    /// Greedy and order dependent: each particle scans the ones after it and
    /// links while both ends are under the cap. The relation is symmetric.
    pub fn update_connections(&mut self) {
        let profile = self.profiles.for_class(self.class);
        let max = profile.max_connections;
        let reach = profile.connection_distance;

        for particle in &mut self.particles {
            particle.connections.clear();
        }

        let n = self.particles.len();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.particles[i].connections.len() >= max {
                    break;
                }

                let distance = self.particles[i].distance_to(&self.particles[j]);
                if distance < reach && self.particles[j].connections.len() < max {
                    self.particles[i].connections.push(j);
                    self.particles[j].connections.push(i);
                }
            }
        }
    }

    /// Number of distinct links
    pub fn connection_count(&self) -> usize {
        self.particles.iter().map(|p| p.connections.len()).sum::<usize>() / 2
    }
}

impl Background for ParticleField {
    fn kind(&self) -> BackgroundKind {
        BackgroundKind::Particles
    }

    fn population(&self) -> usize {
        self.particles.len()
    }

    fn resize(&mut self, size: Size, class: DeviceClass) {
        self.populate(size, class);
    }

    fn step(&mut self, _frame: &Frame, pointer: Point) {
        self.apply_forces(pointer);
        self.update_connections();
    }

    fn render(&self, surface: &mut dyn Surface, _pointer: Point) {
        let profile = self.profile();
        let reach = profile.connection_distance;

        // Links first so particles sit on top; each pair once
        for (i, particle) in self.particles.iter().enumerate() {
            for &j in particle.connections.iter().filter(|&&j| j > i) {
                let other = &self.particles[j];
                let distance = particle.distance_to(other);
                let alpha = ((reach - distance) / reach).max(0.0) * profile.link_alpha;
                surface.stroke_line(particle.position(), other.position(), Rgba::ink(alpha), 1.0);
            }
        }

        for particle in &self.particles {
            surface.fill_circle(
                particle.position(),
                particle.radius,
                Rgba::ink(particle.opacity),
            );
        }
    }
}
