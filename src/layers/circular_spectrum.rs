use crate::audio::spectrum::{
    ExpSmoother, MagnitudeSpectrum, apply_linear_weights, log_compress, normalize_by_max,
    resample_log,
};
use crate::foundation::core::{Point, Rgb8};
use crate::foundation::error::{VizError, VizResult};
use crate::layers::{FrameContext, LayerInit, LayerRender};
use crate::render::painter::Surface;
use std::f64::consts::TAU;

const WINDOW_SECS: f64 = 0.1;
const FFT_SAMPLES: usize = 1024;
const MIN_SAMPLES: usize = 256;
const MAX_BINS: usize = 48;

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
struct CircularSpectrumOptions {
    bins: usize,
    bar_width: f64,
    smoothing: f32,
    rotation_speed: f64,
}

impl Default for CircularSpectrumOptions {
    fn default() -> Self {
        Self {
            bins: MAX_BINS,
            bar_width: 3.0,
            smoothing: 0.3,
            rotation_speed: 0.0,
        }
    }
}

/// Radial spokes over log-spaced frequency bins, with a round cap at each tip.
pub struct CircularSpectrumLayer {
    opts: CircularSpectrumOptions,
    center: Point,
    radius: f64,
    color: Rgb8,
    fft: MagnitudeSpectrum,
    smoother: ExpSmoother,
}

impl CircularSpectrumLayer {
    pub const TYPE: &'static str = "circular_spectrum";

    pub fn new(init: &LayerInit<'_>) -> VizResult<Self> {
        let mut opts: CircularSpectrumOptions = init.parse_options(Self::TYPE)?;
        if opts.bins == 0 {
            return Err(VizError::config("circular_spectrum 'bins' must be > 0"));
        }
        opts.bins = opts.bins.min(MAX_BINS);
        Ok(Self {
            smoother: ExpSmoother::new(1.0 - opts.smoothing),
            opts,
            center: init.canvas.center(),
            radius: init.canvas.orbit_radius(),
            color: init.palette.primary,
            fft: MagnitudeSpectrum::new(),
        })
    }

    fn bins_at(&mut self, cx: &FrameContext<'_>) -> VizResult<Option<Vec<f32>>> {
        let Some(segment) = cx
            .audio
            .segment(cx.time, WINDOW_SECS)
            .filter(|s| s.len() >= MIN_SAMPLES)
        else {
            tracing::trace!(time = cx.time, "circular_spectrum: window too short");
            return Ok(None);
        };
        let segment = &segment[..segment.len().min(FFT_SAMPLES)];
        let mut mags = self.fft.magnitudes(segment)?;
        log_compress(&mut mags);
        apply_linear_weights(&mut mags, 0.5, 2.0);
        normalize_by_max(&mut mags);
        Ok(Some(resample_log(&mags, self.opts.bins)))
    }
}

impl LayerRender for CircularSpectrumLayer {
    fn layer_type(&self) -> &str {
        Self::TYPE
    }

    fn render_direct(&mut self, cx: &FrameContext<'_>, surface: &mut Surface<'_>) -> VizResult<()> {
        let Some(bins) = self.bins_at(cx)? else {
            return Ok(());
        };
        let amps = self.smoother.smooth(bins);
        // Spokes are spread over the configured bin count even if the spectrum came back shorter.
        let n = self.opts.bins;
        let inner = self.radius * 0.3;
        let bw = self.opts.bar_width;
        let cap = (bw / 2.0).trunc() + 1.0;
        let rotation = cx.time * self.opts.rotation_speed;
        let (c, color) = (self.center, self.color);
        let radius = self.radius;
        surface.paint(|p| {
            for i in 0..n {
                let amp = f64::from(amps.get(i).copied().unwrap_or(0.0));
                let angle = TAU * i as f64 / n as f64 + rotation;
                let (sin, cos) = angle.sin_cos();
                let outer = inner + radius * amp * 0.8;
                let tip = Point::new(c.x + cos * outer, c.y + sin * outer);
                p.line(Point::new(c.x + cos * inner, c.y + sin * inner), tip, color, bw);
                p.fill_circle(tip, cap, color);
            }
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/circular_spectrum.rs"]
mod tests;
