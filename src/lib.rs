//! backdrop - pointer-reactive animated canvas backgrounds.
//!
//! Three decorative simulations for a landing page, each drawn once per
//! animation frame:
//!
//! - [`particles`]: a field of particles repelled by the pointer and linked
//!   to their neighbours (hero section)
//! - [`orbits`]: hubs with orbiting nodes that drift and dodge the pointer
//!   (technologies section)
//! - [`rings`]: expanding, fading rings spawned on a timer and by the pointer
//!   (contact section)
//!
//! Hosts mount a [`Stage`] per section, forward resize and pointer events,
//! and call [`Stage::frame`] with a [`Surface`] to draw on.

pub mod background;
pub mod config;
pub mod error;
pub mod geometry;
pub mod orbits;
pub mod particles;
pub mod pointer;
pub mod random;
pub mod rings;
pub mod surface;
pub mod viewport;

pub use background::{Background, BackgroundKind, Frame, FrameClock, Stage};
pub use config::Tuning;
pub use error::{BackdropError, Result};
pub use geometry::{ClientRect, Point, Size};
pub use pointer::{PointerBus, PointerTracker, SubscriptionId};
pub use surface::{DrawOp, Recorder, Rgba, Surface};
pub use viewport::{DeviceClass, TouchPolicy};
