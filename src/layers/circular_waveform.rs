use crate::audio::spectrum::ExpSmoother;
use crate::config::Palette;
use crate::foundation::core::Point;
use crate::foundation::error::VizResult;
use crate::foundation::math::mean_abs;
use crate::layers::{FrameContext, LayerInit, LayerRender};
use crate::render::color::gradient;
use crate::render::painter::{Painter, Surface};
use std::f64::consts::TAU;

const MIN_SAMPLES: usize = 256;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircularWaveformStyle {
    #[default]
    Mirror,
    Filled,
    Bars,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
struct CircularWaveformOptions {
    style: CircularWaveformStyle,
    line_width: f64,
    window_duration: f64,
    smoothing: f32,
    points: usize,
}

impl Default for CircularWaveformOptions {
    fn default() -> Self {
        Self {
            style: CircularWaveformStyle::default(),
            line_width: 2.0,
            window_duration: 0.5,
            smoothing: 0.7,
            points: 360,
        }
    }
}

/// Waveform wrapped around the canvas center.
pub struct CircularWaveformLayer {
    opts: CircularWaveformOptions,
    center: Point,
    radius: f64,
    palette: Palette,
    smoother: ExpSmoother,
}

impl CircularWaveformLayer {
    pub const TYPE: &'static str = "circular_waveform";

    pub fn new(init: &LayerInit<'_>) -> VizResult<Self> {
        let mut opts: CircularWaveformOptions = init.parse_options(Self::TYPE)?;
        opts.points = opts.points.max(2);
        Ok(Self {
            smoother: ExpSmoother::new(opts.smoothing),
            opts,
            center: init.canvas.center(),
            radius: init.canvas.orbit_radius(),
            palette: init.palette,
        })
    }

    fn polar(&self, angle: f64, r: f64) -> Point {
        Point::new(
            self.center.x + r * angle.cos(),
            self.center.y + r * angle.sin(),
        )
    }

    fn ring(&self, values: &[f32], scale: f64) -> Vec<Point> {
        let n = values.len();
        values
            .iter()
            .enumerate()
            .map(|(i, &a)| {
                let angle = TAU * i as f64 / (n - 1) as f64;
                self.polar(angle, self.radius * (1.0 + f64::from(a) * scale))
            })
            .collect()
    }

    fn draw(&self, p: &mut Painter, values: &[f32], amplitude: f32) {
        let Palette {
            primary, secondary, ..
        } = self.palette;
        let lw = self.opts.line_width;
        match self.opts.style {
            CircularWaveformStyle::Mirror => {
                p.polyline(&self.ring(values, 0.5), true, gradient(primary, secondary, 0.3), lw);
                p.polyline(&self.ring(values, -0.5), true, gradient(primary, secondary, 0.7), lw);
            }
            CircularWaveformStyle::Filled => {
                p.fill_polygon(&self.ring(values, 0.3), gradient(primary, secondary, amplitude));
            }
            CircularWaveformStyle::Bars => {
                let color = gradient(primary, secondary, amplitude);
                let n = values.len();
                for (i, &a) in values.iter().enumerate() {
                    let angle = TAU * i as f64 / (n - 1) as f64;
                    let inner = self.polar(angle, self.radius - 10.0);
                    // Negative samples pull the bar inward past its base.
                    let outer = self.polar(angle, self.radius * (1.0 + f64::from(a)));
                    p.line(inner, outer, color, lw);
                }
            }
        }
    }
}

/// Peak-normalized samples picked at `points` evenly spaced indices.
pub(crate) fn ring_samples(segment: &[f32], points: usize) -> Option<Vec<f32>> {
    let peak = segment.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if peak <= 0.0 || !peak.is_finite() || segment.is_empty() {
        return None;
    }
    let len = segment.len();
    Some(
        (0..points)
            .map(|i| {
                let idx = (i * len / points).min(len - 1);
                segment[idx] / peak
            })
            .collect(),
    )
}

impl LayerRender for CircularWaveformLayer {
    fn layer_type(&self) -> &str {
        Self::TYPE
    }

    fn render_direct(&mut self, cx: &FrameContext<'_>, surface: &mut Surface<'_>) -> VizResult<()> {
        let Some(segment) = cx
            .audio
            .segment(cx.time, self.opts.window_duration)
            .filter(|s| s.len() >= MIN_SAMPLES)
        else {
            tracing::trace!(time = cx.time, "circular_waveform: window too short");
            return Ok(());
        };
        let Some(values) = ring_samples(segment, self.opts.points) else {
            return Ok(());
        };
        let values = self.smoother.smooth(values);
        let amplitude = mean_abs(&values);
        surface.paint(|p| self.draw(p, &values, amplitude))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/circular_waveform.rs"]
mod tests;
