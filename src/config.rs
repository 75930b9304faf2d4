//! Tuning for the three backgrounds
//!
//! Every constant has a mobile and a desktop value; the viewport's device
//! class picks one profile per background. Defaults reproduce the landing
//! page. A YAML (or JSON) document may override any subset of keys:
//!
//! ```yaml
//! particles:
//!   desktop:
//!     particle_count: 320
//! rings:
//!   mobile:
//!     max_rings: 12
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{BackdropError, Result};
use crate::viewport::DeviceClass;

/// A mobile and a desktop variant of the same profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profiles<T> {
    pub mobile: T,
    pub desktop: T,
}

impl<T> Profiles<T> {
    /// Profile for a device class
    pub fn for_class(&self, class: DeviceClass) -> &T {
        match class {
            DeviceClass::Mobile => &self.mobile,
            DeviceClass::Desktop => &self.desktop,
        }
    }
}

/// Hero particle field constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParticleProfile {
    /// Population created on every resize
    pub particle_count: usize,
    /// Pointer influence radius
    pub mouse_radius: f32,
    /// Impulse at zero distance from the pointer
    pub repulsion_force: f32,
    /// Spring constant toward the origin
    pub return_force: f32,
    /// Velocity multiplier applied every frame
    pub friction: f32,
    /// Particles closer than this may be linked
    pub connection_distance: f32,
    /// Cap on links per particle
    pub max_connections: usize,
    pub min_size: f32,
    pub max_size: f32,
    pub min_opacity: f32,
    pub max_opacity: f32,
    /// Stroke alpha of a zero-length link
    pub link_alpha: f32,
}

impl ParticleProfile {
    pub fn mobile() -> Self {
        Self {
            particle_count: 100,
            mouse_radius: 120.0,
            connection_distance: 100.0,
            max_connections: 3,
            ..Self::desktop()
        }
    }

    pub fn desktop() -> Self {
        Self {
            particle_count: 200,
            mouse_radius: 180.0,
            repulsion_force: 1.0,
            return_force: 0.025,
            friction: 0.95,
            connection_distance: 140.0,
            max_connections: 4,
            min_size: 1.0,
            max_size: 4.0,
            min_opacity: 0.3,
            max_opacity: 0.8,
            link_alpha: 0.25,
        }
    }

    fn validate(&self, scope: &str) -> Result<()> {
        ensure(self.mouse_radius > 0.0, || format!("{scope}.mouse_radius must be positive"))?;
        ensure(self.return_force > 0.0, || format!("{scope}.return_force must be positive"))?;
        ensure(self.friction > 0.0 && self.friction <= 1.0, || {
            format!("{scope}.friction must be in (0, 1]")
        })?;
        ensure(self.connection_distance > 0.0, || {
            format!("{scope}.connection_distance must be positive")
        })?;
        ensure(self.min_size > 0.0 && self.min_size <= self.max_size, || {
            format!("{scope}.min_size must be positive and not above max_size")
        })?;
        ensure(self.min_opacity <= self.max_opacity, || {
            format!("{scope}.min_opacity must not exceed max_opacity")
        })
    }
}

/// Contact ring wave constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RingProfile {
    /// Seconds between automatic spawns
    pub auto_spawn_every: f32,
    /// Population cap; the oldest ring is dropped beyond it
    pub max_rings: usize,
    /// Maximum radius before the random 0.7..1.3 factor
    pub base_max_radius: f32,
    /// Growth speed range in px/s
    pub min_speed: f32,
    pub max_speed: f32,
    pub min_line: f32,
    pub max_line: f32,
    /// Alpha lost per second
    pub fade: f32,
    pub initial_alpha: f32,
    pub initial_radius: f32,
}

impl RingProfile {
    pub fn mobile() -> Self {
        Self {
            max_rings: 20,
            base_max_radius: 140.0,
            ..Self::desktop()
        }
    }

    pub fn desktop() -> Self {
        Self {
            auto_spawn_every: 0.9,
            max_rings: 40,
            base_max_radius: 220.0,
            min_speed: 24.0,
            max_speed: 48.0,
            min_line: 0.6,
            max_line: 1.2,
            fade: 0.35,
            initial_alpha: 0.55,
            initial_radius: 1.0,
        }
    }

    fn validate(&self, scope: &str) -> Result<()> {
        ensure(self.auto_spawn_every > 0.0, || {
            format!("{scope}.auto_spawn_every must be positive")
        })?;
        ensure(self.max_rings >= 1, || format!("{scope}.max_rings must be at least 1"))?;
        ensure(self.min_speed > 0.0 && self.min_speed <= self.max_speed, || {
            format!("{scope}.min_speed must be positive and not above max_speed")
        })?;
        ensure(self.min_line <= self.max_line, || {
            format!("{scope}.min_line must not exceed max_line")
        })?;
        ensure(self.fade > 0.0, || format!("{scope}.fade must be positive"))?;
        ensure(self.initial_alpha > 0.0, || format!("{scope}.initial_alpha must be positive"))?;
        ensure(
            self.initial_radius > 0.0 && self.initial_radius < self.base_max_radius * 0.7,
            || format!("{scope}.initial_radius must be positive and below the smallest max radius"),
        )
    }
}

/// Technologies orbit hub constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrbitProfile {
    /// Number of hubs created on every resize
    pub hubs: usize,
    /// Orbit radius range
    pub min_radius: f32,
    pub max_radius: f32,
    /// Orbiting node count range (inclusive)
    pub min_nodes: usize,
    pub max_nodes: usize,
    /// Rotation speed range in degrees per second
    pub min_speed: f32,
    pub max_speed: f32,
    /// Parallax magnitude across the whole surface
    pub parallax: f32,
    /// Alpha of the radial guide lines
    pub bg_line_alpha: f32,
    /// How many following hubs each hub links to
    pub hub_links: usize,
    pub repulse_radius: f32,
    /// Pointer push on the hub center in px/s^2
    pub repulse_force: f32,
    /// Spring toward the origin in px/s^2
    pub return_force: f32,
    pub friction: f32,
    pub node_size: f32,
    /// Orbit inflation at zero pointer distance
    pub radius_growth: f32,
    /// Strength of the idle drift
    pub drift_force: f32,
    /// Extra outward push per node near the pointer
    pub node_repulse: f32,
}

impl OrbitProfile {
    pub fn mobile() -> Self {
        Self {
            hubs: 7,
            min_radius: 26.0,
            max_radius: 60.0,
            parallax: 6.0,
            repulse_radius: 120.0,
            ..Self::desktop()
        }
    }

    pub fn desktop() -> Self {
        Self {
            hubs: 14,
            min_radius: 42.0,
            max_radius: 95.0,
            min_nodes: 6,
            max_nodes: 14,
            min_speed: 0.12,
            max_speed: 0.5,
            parallax: 12.0,
            bg_line_alpha: 0.09,
            hub_links: 3,
            repulse_radius: 160.0,
            repulse_force: 50.0,
            return_force: 8.0,
            friction: 0.9,
            node_size: 2.0,
            radius_growth: 0.3,
            drift_force: 6.0,
            node_repulse: 24.0,
        }
    }

    fn validate(&self, scope: &str) -> Result<()> {
        ensure(self.min_radius > 0.0 && self.min_radius <= self.max_radius, || {
            format!("{scope}.min_radius must be positive and not above max_radius")
        })?;
        ensure(self.min_nodes >= 1 && self.min_nodes <= self.max_nodes, || {
            format!("{scope}.min_nodes must be at least 1 and not above max_nodes")
        })?;
        ensure(self.min_speed <= self.max_speed, || {
            format!("{scope}.min_speed must not exceed max_speed")
        })?;
        ensure(self.repulse_radius > 0.0, || {
            format!("{scope}.repulse_radius must be positive")
        })?;
        ensure(self.friction > 0.0 && self.friction <= 1.0, || {
            format!("{scope}.friction must be in (0, 1]")
        })
    }
}

/// Complete tuning for all backgrounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tuning {
    pub particles: Profiles<ParticleProfile>,
    pub rings: Profiles<RingProfile>,
    pub orbits: Profiles<OrbitProfile>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            particles: Profiles {
                mobile: ParticleProfile::mobile(),
                desktop: ParticleProfile::desktop(),
            },
            rings: Profiles {
                mobile: RingProfile::mobile(),
                desktop: RingProfile::desktop(),
            },
            orbits: Profiles {
                mobile: OrbitProfile::mobile(),
                desktop: OrbitProfile::desktop(),
            },
        }
    }
}

impl Tuning {
    /// Load overrides from a file (`.json` as JSON, anything else as YAML)
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&source)
        } else {
            Self::from_yaml_str(&source)
        }
    }

    /// Apply a YAML document of overrides on top of the defaults
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let overlay: Value = serde_yaml::from_str(source)?;
        Self::with_overrides(overlay)
    }

    /// Apply a JSON document of overrides on top of the defaults
    pub fn from_json_str(source: &str) -> Result<Self> {
        let overlay: serde_json::Value = serde_json::from_str(source)?;
        Self::with_overrides(serde_yaml::to_value(overlay)?)
    }

    /// Serialize the full tuning as JSON (the form handed to the web crate)
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reject values the simulators cannot run with
    pub fn validate(&self) -> Result<()> {
        self.particles.mobile.validate("particles.mobile")?;
        self.particles.desktop.validate("particles.desktop")?;
        self.rings.mobile.validate("rings.mobile")?;
        self.rings.desktop.validate("rings.desktop")?;
        self.orbits.mobile.validate("orbits.mobile")?;
        self.orbits.desktop.validate("orbits.desktop")
    }

    fn with_overrides(overlay: Value) -> Result<Self> {
        let mut merged = serde_yaml::to_value(Self::default())?;
        merge(&mut merged, overlay);
        let tuning: Tuning = serde_yaml::from_value(merged)?;
        tuning.validate()?;
        Ok(tuning)
    }
}

/// Deep-merge `overlay` into `base`; mappings merge key by key, anything else replaces
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(BackdropError::InvalidTuning(message()))
    }
}
