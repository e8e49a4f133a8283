use crate::audio::spectrum::{
    ExpSmoother, MagnitudeSpectrum, log_compress, normalize_by_max, resample_linear,
};
use crate::config::Palette;
use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{VizError, VizResult};
use crate::layers::{FrameContext, LayerInit, LayerRender};
use crate::render::color::gradient;
use crate::render::painter::{Painter, Surface};
use std::f64::consts::TAU;

const WINDOW_SECS: f64 = 0.05;
const FFT_SAMPLES: usize = 512;
const MIN_SAMPLES: usize = 256;
const MAX_BINS: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumStyle {
    Bars,
    Circular,
    Wave,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
struct SpectrumOptions {
    style: Option<SpectrumStyle>,
    bins: Option<usize>,
    bar_spacing: f64,
    use_alpha: bool,
    smoothing: f32,
    wave_smoothing: f32,
    inner_radius: f64,
    rotation_speed: f64,
    wave_thickness: f64,
}

impl Default for SpectrumOptions {
    fn default() -> Self {
        Self {
            style: None,
            bins: None,
            bar_spacing: 2.0,
            use_alpha: false,
            smoothing: 0.3,
            wave_smoothing: 0.5,
            inner_radius: 50.0,
            rotation_speed: 0.3,
            wave_thickness: 2.0,
        }
    }
}

/// Frequency bars, spokes or a wave from a short FFT around the current time.
pub struct SpectrumLayer {
    style: SpectrumStyle,
    bins: usize,
    opts: SpectrumOptions,
    canvas: Canvas,
    palette: Palette,
    fft: MagnitudeSpectrum,
    smoother: ExpSmoother,
}

impl SpectrumLayer {
    pub const TYPE: &'static str = "spectrum";

    pub fn new(init: &LayerInit<'_>) -> VizResult<Self> {
        let opts: SpectrumOptions = init.parse_options(Self::TYPE)?;
        let style = opts
            .style
            .ok_or_else(|| VizError::config("spectrum options require 'style'"))?;
        let bins = opts
            .bins
            .ok_or_else(|| VizError::config("spectrum options require 'bins'"))?;
        if bins == 0 {
            return Err(VizError::config("spectrum 'bins' must be > 0"));
        }
        // The smoothing constants weight the new frame; the smoother keeps the old one.
        let response = match style {
            SpectrumStyle::Wave => opts.wave_smoothing,
            SpectrumStyle::Bars | SpectrumStyle::Circular => opts.smoothing,
        };
        Ok(Self {
            style,
            bins: bins.min(MAX_BINS),
            canvas: init.canvas,
            palette: init.palette,
            fft: MagnitudeSpectrum::new(),
            smoother: ExpSmoother::new(1.0 - response),
            opts,
        })
    }

    /// Log-compressed, peak-normalized spectrum resampled to the configured bin count.
    fn instant_spectrum(&mut self, cx: &FrameContext<'_>) -> VizResult<Option<Vec<f32>>> {
        let Some(segment) = cx
            .audio
            .segment(cx.time, WINDOW_SECS)
            .filter(|s| s.len() >= MIN_SAMPLES)
        else {
            tracing::trace!(time = cx.time, "spectrum: window too short");
            return Ok(None);
        };
        let segment = &segment[..segment.len().min(FFT_SAMPLES)];
        let mut mags = self.fft.magnitudes(segment)?;
        log_compress(&mut mags);
        normalize_by_max(&mut mags);
        Ok(Some(resample_linear(&mags, self.bins)))
    }

    fn color(&self, i: usize, n: usize, level: Option<f32>) -> crate::foundation::core::Rgb8 {
        let c = gradient(
            self.palette.primary,
            self.palette.secondary,
            i as f32 / n.max(1) as f32,
        );
        match level {
            Some(f) if self.opts.use_alpha => c.scaled(f * 0.8 + 0.2),
            _ => c,
        }
    }

    fn draw_bars(&self, p: &mut Painter, raw: &[f32], smoothed: &[f32]) {
        let n = raw.len();
        let (w, h) = (f64::from(self.canvas.width), f64::from(self.canvas.height));
        let spacing = self.opts.bar_spacing;
        let bar_w = ((w - (n as f64 - 1.0) * spacing) / n as f64).trunc().max(1.0);
        let total = n as f64 * bar_w + (n as f64 - 1.0) * spacing;
        let start_x = ((w - total) / 2.0).floor();
        for (i, (&f, &s)) in raw.iter().zip(smoothed).enumerate() {
            let height = (f64::from(s) * h * 0.7).trunc();
            let x = start_x + i as f64 * (bar_w + spacing);
            p.fill_rect(
                Point::new(x, h - height),
                Point::new(x + bar_w, h),
                self.color(i, n, Some(f)),
            );
        }
    }

    fn draw_circular(&self, p: &mut Painter, time: f64, raw: &[f32], smoothed: &[f32]) {
        let n = raw.len();
        let c = self.canvas.center();
        let inner = self.opts.inner_radius;
        let outer = c.x.min(c.y) - 10.0;
        let rotation = time * self.opts.rotation_speed;
        for (i, (&f, &s)) in raw.iter().zip(smoothed).enumerate() {
            let angle = TAU * i as f64 / n as f64 + rotation;
            let (sin, cos) = angle.sin_cos();
            let len = inner + f64::from(s) * (outer - inner);
            let thickness = (f64::from(s) * 8.0 + 1.0).trunc();
            p.line(
                Point::new(c.x + cos * inner, c.y + sin * inner),
                Point::new(c.x + cos * len, c.y + sin * len),
                self.color(i, n, Some(f)),
                thickness,
            );
        }
    }

    fn draw_wave(&self, p: &mut Painter, raw: &[f32], smoothed: &[f32]) {
        let n = raw.len();
        if n < 2 {
            return;
        }
        let (w, h) = (f64::from(self.canvas.width), f64::from(self.canvas.height));
        let pts: Vec<Point> = smoothed
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let x = (w - 1.0) * i as f64 / (n - 1) as f64;
                Point::new(x, h - (f64::from(s) * h * 0.4 + h * 0.3))
            })
            .collect();
        for (i, seg) in pts.windows(2).enumerate() {
            let level = (raw[i] + raw[i + 1]) / 2.0;
            p.line(seg[0], seg[1], self.color(i, n, Some(level)), self.opts.wave_thickness);
        }
    }
}

impl LayerRender for SpectrumLayer {
    fn layer_type(&self) -> &str {
        Self::TYPE
    }

    fn render_direct(&mut self, cx: &FrameContext<'_>, surface: &mut Surface<'_>) -> VizResult<()> {
        let Some(raw) = self.instant_spectrum(cx)? else {
            return Ok(());
        };
        if raw.is_empty() {
            return Ok(());
        }
        let smoothed = self.smoother.smooth(raw.clone());
        let time = cx.time;
        surface.paint(|p| match self.style {
            SpectrumStyle::Bars => self.draw_bars(p, &raw, &smoothed),
            SpectrumStyle::Circular => self.draw_circular(p, time, &raw, &smoothed),
            SpectrumStyle::Wave => self.draw_wave(p, &raw, &smoothed),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/spectrum.rs"]
mod tests;
