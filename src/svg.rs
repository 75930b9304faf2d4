use backdrop::{Point, Rgba, Size, Surface};

/// Surface that writes SVG elements
#[derive(Debug, Clone)]
pub struct SvgSurface {
    size: Size,
    body: String,
}

impl SvgSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            body: String::new(),
        }
    }

    /// The complete SVG document
    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = self.size.width,
            h = self.size.height,
            body = self.body,
        )
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self) {
        self.body.clear();
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgba, width: f32) {
        self.body.push_str(&format!(
            "  <line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{color}\" stroke-width=\"{width}\"/>\n",
            from.x, from.y, to.x, to.y
        ));
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, color: Rgba, width: f32) {
        self.body.push_str(&format!(
            "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{width}\"/>\n",
            center.x, center.y, radius
        ));
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        self.body.push_str(&format!(
            "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{color}\"/>\n",
            center.x, center.y, radius
        ));
    }
}
