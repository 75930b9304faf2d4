//! Viewport tracking and device classification
//!
//! A background is sized to its container and tuned by device class. The
//! viewport remembers the last observed size and class so hosts can forward
//! every resize event and only regenerate populations when something changed.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Window width below which a device is treated as mobile
pub const MOBILE_BREAKPOINT: f32 = 768.0;

/// Device class selecting which tuning profile applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

/// How touch capability feeds into classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPolicy {
    /// Only the window width decides
    WidthOnly,
    /// Narrow windows and touch-capable devices are both mobile
    WidthOrTouch,
}

impl DeviceClass {
    /// Classify from the window width and whether the device supports touch
    pub fn classify(window_width: f32, touch_capable: bool, policy: TouchPolicy) -> Self {
        let narrow = window_width < MOBILE_BREAKPOINT;
        let touch = policy == TouchPolicy::WidthOrTouch && touch_capable;
        if narrow || touch {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn is_mobile(self) -> bool {
        self == DeviceClass::Mobile
    }
}

/// What changed in an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportChange {
    pub resized: bool,
    pub reclassified: bool,
}

/// Last observed surface size and device class
#[derive(Debug, Clone)]
pub struct Viewport {
    size: Size,
    class: DeviceClass,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// A viewport that has not been sized yet (0x0, desktop)
    pub fn new() -> Self {
        Self {
            size: Size::default(),
            class: DeviceClass::Desktop,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    /// Record a new container size and class
    ///
    /// Returns `None` when neither changed, so repeated resize events with the
    /// same geometry keep the current population.
    pub fn observe(&mut self, size: Size, class: DeviceClass) -> Option<ViewportChange> {
        let change = ViewportChange {
            resized: size != self.size,
            reclassified: class != self.class,
        };
        self.size = size;
        self.class = class;

        if change.resized || change.reclassified {
            Some(change)
        } else {
            None
        }
    }
}
