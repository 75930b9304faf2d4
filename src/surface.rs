//! Drawing surfaces
//!
//! Backgrounds draw through the [`Surface`] trait so the same simulation can
//! paint a browser canvas, an SVG document or an in-memory recording.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// An RGBA color; channels are 0-255, alpha is 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Black at the given alpha; every background is monochrome ink
    pub const fn ink(alpha: f32) -> Self {
        Self::new(0, 0, 0, alpha)
    }
}

/// CSS `rgba()` notation, accepted by canvas and SVG alike
impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Target of the per-frame drawing operations
pub trait Surface {
    /// Whether a drawing context is available this frame
    fn is_available(&self) -> bool {
        true
    }

    /// Erase the whole surface
    fn clear(&mut self);

    /// Stroke a straight line segment
    fn stroke_line(&mut self, from: Point, to: Point, color: Rgba, width: f32);

    /// Stroke a full circle outline
    fn stroke_circle(&mut self, center: Point, radius: f32, color: Rgba, width: f32);

    /// Fill a full circle
    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba);
}

/// One recorded drawing operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Clear,
    Line {
        from: Point,
        to: Point,
        color: Rgba,
        width: f32,
    },
    StrokeCircle {
        center: Point,
        radius: f32,
        color: Rgba,
        width: f32,
    },
    FillCircle {
        center: Point,
        radius: f32,
        color: Rgba,
    },
}

impl DrawOp {
    /// Issue this operation against another surface
    pub fn apply(&self, surface: &mut dyn Surface) {
        match *self {
            DrawOp::Clear => surface.clear(),
            DrawOp::Line {
                from,
                to,
                color,
                width,
            } => surface.stroke_line(from, to, color, width),
            DrawOp::StrokeCircle {
                center,
                radius,
                color,
                width,
            } => surface.stroke_circle(center, radius, color, width),
            DrawOp::FillCircle {
                center,
                radius,
                color,
            } => surface.fill_circle(center, radius, color),
        }
    }
}

/// Surface that records the operations of the current frame
///
/// `clear` starts a new frame, so after any number of frames the recorder
/// holds exactly what the last one drew.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    ops: Vec<DrawOp>,
    unavailable: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that behaves like a surface without a drawing context
    pub fn unavailable() -> Self {
        Self {
            ops: Vec::new(),
            unavailable: true,
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    /// Replay the recorded frame onto another surface
    pub fn replay(&self, surface: &mut dyn Surface) {
        for op in &self.ops {
            op.apply(surface);
        }
    }

    pub fn count_lines(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count()
    }

    pub fn count_filled(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillCircle { .. }))
            .count()
    }

    pub fn count_stroked(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::StrokeCircle { .. }))
            .count()
    }
}

impl Surface for Recorder {
    fn is_available(&self) -> bool {
        !self.unavailable
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgba, width: f32) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, color: Rgba, width: f32) {
        self.ops.push(DrawOp::StrokeCircle {
            center,
            radius,
            color,
            width,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        self.ops.push(DrawOp::FillCircle {
            center,
            radius,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ink_renders_as_css() {
        assert_eq!(Rgba::ink(0.25).to_string(), "rgba(0, 0, 0, 0.25)");
        assert_eq!(Rgba::new(255, 10, 0, 1.0).to_string(), "rgba(255, 10, 0, 1)");
    }

    #[test]
    fn clear_starts_a_new_frame() {
        let mut rec = Recorder::new();
        rec.clear();
        rec.fill_circle(Point::new(1.0, 1.0), 2.0, Rgba::ink(0.5));
        rec.clear();
        rec.stroke_circle(Point::new(3.0, 3.0), 4.0, Rgba::ink(0.5), 1.0);

        assert_eq!(rec.ops().len(), 2);
        assert_eq!(rec.ops()[0], DrawOp::Clear);
        assert_eq!(rec.count_stroked(), 1);
        assert_eq!(rec.count_filled(), 0);
    }

    #[test]
    fn replay_copies_ops() {
        let mut rec = Recorder::new();
        rec.clear();
        rec.stroke_line(Point::ORIGIN, Point::new(5.0, 5.0), Rgba::ink(0.1), 1.0);

        let mut copy = Recorder::new();
        rec.replay(&mut copy);
        assert_eq!(copy.ops(), rec.ops());
    }

    #[test]
    fn unavailable_recorder() {
        assert!(Recorder::new().is_available());
        assert!(!Recorder::unavailable().is_available());
    }

    #[test]
    fn draw_op_debug_snapshot() {
        let op = DrawOp::FillCircle {
            center: Point::new(10.0, 20.0),
            radius: 1.5,
            color: Rgba::ink(0.25),
        };
        insta::assert_debug_snapshot!(op, @r"
        FillCircle {
            center: Point {
                x: 10.0,
                y: 20.0,
            },
            radius: 1.5,
            color: Rgba {
                r: 0,
                g: 0,
                b: 0,
                a: 0.25,
            },
        }
        ");
    }

    #[test]
    fn draw_op_json_is_tagged() {
        let json = serde_json::to_string(&DrawOp::Clear).unwrap();
        assert_eq!(json, r#"{"op":"clear"}"#);
    }
}
