use crate::foundation::core::{Canvas, Point, Rgb8};
use crate::foundation::error::{VizError, VizResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::frame::Frame;
use vello_cpu::kurbo::{self, Shape as _};

/// Anti-aliased vector drawing on top of an RGB [`Frame`].
///
/// Shapes are rasterized by `vello_cpu` into a premultiplied RGBA scratch pixmap, which is then
/// composited over the frame. A painter with nothing drawn leaves the frame untouched.
pub struct Painter {
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    width: u16,
    height: u16,
    dirty: bool,
}

impl Painter {
    pub fn new(canvas: Canvas) -> VizResult<Self> {
        let width = u16::try_from(canvas.width)
            .map_err(|_| VizError::validation("canvas width must fit in u16"))?;
        let height = u16::try_from(canvas.height)
            .map_err(|_| VizError::validation("canvas height must fit in u16"))?;
        if width == 0 || height == 0 {
            return Err(VizError::validation("canvas width/height must be non-zero"));
        }
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
            width,
            height,
            dirty: false,
        })
    }

    fn begin(&mut self) {
        self.ctx.reset();
        self.ctx.set_transform(kurbo::Affine::IDENTITY);
        self.dirty = false;
    }

    fn set_color(&mut self, color: Rgb8) {
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, 255));
    }

    pub fn line(&mut self, a: Point, b: Point, color: Rgb8, width: f64) {
        if width <= 0.0 || !width.is_finite() {
            return;
        }
        let mut p = kurbo::BezPath::new();
        p.move_to(kpt(a));
        p.line_to(kpt(b));
        self.set_color(color);
        self.ctx.set_stroke(kurbo::Stroke::new(width));
        self.ctx.stroke_path(&p);
        self.dirty = true;
    }

    pub fn polyline(&mut self, pts: &[Point], closed: bool, color: Rgb8, width: f64) {
        if pts.len() < 2 || width <= 0.0 || !width.is_finite() {
            return;
        }
        let p = path_through(pts, closed);
        self.set_color(color);
        self.ctx
            .set_stroke(kurbo::Stroke::new(width).with_join(kurbo::Join::Round));
        self.ctx.stroke_path(&p);
        self.dirty = true;
    }

    pub fn fill_polygon(&mut self, pts: &[Point], color: Rgb8) {
        if pts.len() < 3 {
            return;
        }
        let p = path_through(pts, true);
        self.set_color(color);
        self.ctx.fill_path(&p);
        self.dirty = true;
    }

    pub fn fill_circle(&mut self, center: Point, radius: f64, color: Rgb8) {
        if radius <= 0.0 || !radius.is_finite() {
            return;
        }
        let p = circle_path(center, radius);
        self.set_color(color);
        self.ctx.fill_path(&p);
        self.dirty = true;
    }

    pub fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgb8, width: f64) {
        if radius <= 0.0 || width <= 0.0 || !radius.is_finite() {
            return;
        }
        let p = circle_path(center, radius);
        self.set_color(color);
        self.ctx.set_stroke(kurbo::Stroke::new(width));
        self.ctx.stroke_path(&p);
        self.dirty = true;
    }

    /// Axis-aligned rectangle spanning `min..max`.
    pub fn fill_rect(&mut self, min: Point, max: Point, color: Rgb8) {
        if max.x <= min.x || max.y <= min.y {
            return;
        }
        self.set_color(color);
        self.ctx
            .fill_rect(&kurbo::Rect::new(min.x, min.y, max.x, max.y));
        self.dirty = true;
    }

    /// Rasterize pending shapes and composite them over `frame`.
    fn finish_onto(&mut self, frame: &mut Frame) -> VizResult<()> {
        if !self.dirty {
            return Ok(());
        }
        if frame.width != u32::from(self.width) || frame.height != u32::from(self.height) {
            return Err(VizError::evaluation("painter and frame sizes differ"));
        }
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        premul_over_rgb(&mut frame.data, self.pixmap.data_as_u8_slice())?;
        self.dirty = false;
        Ok(())
    }
}

/// A frame together with the painter used to draw on it.
pub struct Surface<'a> {
    pub frame: &'a mut Frame,
    painter: &'a mut Painter,
}

impl<'a> Surface<'a> {
    pub fn new(frame: &'a mut Frame, painter: &'a mut Painter) -> Self {
        Self { frame, painter }
    }

    pub fn canvas(&self) -> Canvas {
        self.frame.canvas()
    }

    /// Draw shapes with `f` and composite them onto the frame in one pass.
    pub fn paint(&mut self, f: impl FnOnce(&mut Painter)) -> VizResult<()> {
        self.painter.begin();
        f(self.painter);
        self.painter.finish_onto(self.frame)
    }
}

fn kpt(p: Point) -> kurbo::Point {
    kurbo::Point::new(p.x, p.y)
}

fn path_through(pts: &[Point], closed: bool) -> kurbo::BezPath {
    let mut p = kurbo::BezPath::new();
    let mut it = pts.iter();
    if let Some(first) = it.next() {
        p.move_to(kpt(*first));
    }
    for pt in it {
        p.line_to(kpt(*pt));
    }
    if closed {
        p.close_path();
    }
    p
}

fn circle_path(center: Point, radius: f64) -> kurbo::BezPath {
    let c = kurbo::Circle::new(kpt(center), radius);
    let mut p = kurbo::BezPath::new();
    for el in c.path_elements(0.1) {
        p.push(el);
    }
    p
}

/// `dst = src + dst·(1 − src.a)` for premultiplied RGBA8 `src` over RGB8 `dst`.
fn premul_over_rgb(dst: &mut [u8], src: &[u8]) -> VizResult<()> {
    if dst.len() / 3 != src.len() / 4 || !dst.len().is_multiple_of(3) {
        return Err(VizError::evaluation(
            "premul_over_rgb expects matching rgb8/rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(3).zip(src.chunks_exact(4)) {
        let sa = u16::from(s[3]);
        if sa == 0 {
            continue;
        }
        if sa == 255 {
            d.copy_from_slice(&s[..3]);
            continue;
        }
        let inv = 255 - sa;
        for c in 0..3 {
            d[c] = s[c].saturating_add(mul_div255_u8(u16::from(d[c]), inv));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/painter.rs"]
mod tests;
