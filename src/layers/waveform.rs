use crate::audio::spectrum::ExpSmoother;
use crate::config::Palette;
use crate::foundation::core::{Canvas, Point, Rgb8};
use crate::foundation::error::{VizError, VizResult};
use crate::foundation::math::mean_abs;
use crate::layers::{FrameContext, LayerInit, LayerRender};
use crate::render::color::gradient;
use crate::render::painter::{Painter, Surface};

const MAX_POINTS: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveformStyle {
    Simple,
    Mirror,
    Filled,
    Energy,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
struct WaveformOptions {
    style: Option<WaveformStyle>,
    line_width: f64,
    window_duration: f64,
    smoothing: f32,
}

impl Default for WaveformOptions {
    fn default() -> Self {
        Self {
            style: None,
            line_width: 2.0,
            window_duration: 0.5,
            smoothing: 0.7,
        }
    }
}

/// Oscilloscope-style trace of the audio window around the current time.
pub struct WaveformLayer {
    style: WaveformStyle,
    line_width: f64,
    window: f64,
    canvas: Canvas,
    palette: Palette,
    smoother: ExpSmoother,
}

impl WaveformLayer {
    pub const TYPE: &'static str = "waveform";

    pub fn new(init: &LayerInit<'_>) -> VizResult<Self> {
        let opts: WaveformOptions = init.parse_options(Self::TYPE)?;
        let style = opts
            .style
            .ok_or_else(|| VizError::config("waveform options require 'style'"))?;
        Ok(Self {
            style,
            line_width: opts.line_width,
            window: opts.window_duration,
            canvas: init.canvas,
            palette: init.palette,
            smoother: ExpSmoother::new(opts.smoothing),
        })
    }

    /// Screen positions for `samples` spread across the full width around the center line.
    fn trace(&self, samples: &[f32], sign: f64) -> Vec<Point> {
        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);
        let cy = f64::from(self.canvas.height / 2);
        let last = samples.len().saturating_sub(1).max(1) as f64;
        samples
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let x = (w - 1.0) * i as f64 / last;
                Point::new(x, cy + sign * f64::from(s) * h * 0.4)
            })
            .collect()
    }

    fn color(&self, ratio: f32) -> Rgb8 {
        gradient(self.palette.primary, self.palette.secondary, ratio)
    }

    fn draw(&self, p: &mut Painter, samples: &[f32], amplitude: f32) {
        let lw = self.line_width;
        match self.style {
            WaveformStyle::Simple => {
                p.polyline(&self.trace(samples, 1.0), false, self.color(amplitude), lw);
            }
            WaveformStyle::Mirror => {
                p.polyline(&self.trace(samples, -1.0), false, self.color(0.3), lw);
                p.polyline(&self.trace(samples, 1.0), false, self.color(0.7), lw);
            }
            WaveformStyle::Filled => {
                let pts = self.trace(samples, 1.0);
                let (w, h) = (f64::from(self.canvas.width), f64::from(self.canvas.height));
                let mut poly = pts.clone();
                poly.push(Point::new(w - 1.0, h - 1.0));
                poly.push(Point::new(0.0, h - 1.0));
                p.fill_polygon(&poly, self.color(amplitude));
                if lw > 0.0 {
                    p.polyline(&pts, false, Rgb8::WHITE, lw);
                }
            }
            WaveformStyle::Energy => {
                let pts = self.trace(samples, 1.0);
                let color = self.color(amplitude);
                for seg in pts.windows(2) {
                    let dy = (seg[1].y - seg[0].y).abs();
                    let thickness = (lw * (1.0 + dy / 10.0)).trunc().max(1.0);
                    p.line(seg[0], seg[1], color, thickness);
                }
            }
        }
    }
}

/// Keep every `len / max`-th sample, then cap at `max` points.
pub(crate) fn decimate(samples: &[f32], max: usize) -> Vec<f32> {
    if samples.len() <= max || max == 0 {
        return samples.to_vec();
    }
    let step = samples.len() / max;
    samples.iter().step_by(step).take(max).copied().collect()
}

impl LayerRender for WaveformLayer {
    fn layer_type(&self) -> &str {
        Self::TYPE
    }

    fn render_direct(&mut self, cx: &FrameContext<'_>, surface: &mut Surface<'_>) -> VizResult<()> {
        let Some(segment) = cx.audio.segment(cx.time, self.window) else {
            tracing::trace!(time = cx.time, "waveform: no audio window");
            return Ok(());
        };
        let samples = self.smoother.smooth(decimate(segment, MAX_POINTS));
        if samples.len() < 2 {
            return Ok(());
        }
        let amplitude = mean_abs(&samples);
        surface.paint(|p| self.draw(p, &samples, amplitude))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/waveform.rs"]
mod tests;
