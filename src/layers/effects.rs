//! Full-frame post-processing applied in a configured order.

use crate::foundation::core::Canvas;
use crate::foundation::error::{VizError, VizResult};
use crate::foundation::math::to_channel;
use crate::layers::{FrameContext, LayerInit, LayerRender};
use crate::render::blur::gaussian_blur;
use crate::render::frame::Frame;
use crate::render::painter::Surface;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use rayon::prelude::*;
use std::f64::consts::TAU;

const CH: usize = Frame::CHANNELS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Glow,
    Vignette,
    Grain,
    Chromatic,
}

impl Effect {
    pub const ALL: [Effect; 4] = [Self::Glow, Self::Vignette, Self::Grain, Self::Chromatic];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Glow => "glow",
            Self::Vignette => "vignette",
            Self::Grain => "grain",
            Self::Chromatic => "chromatic",
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
struct EffectsOptions {
    effects: Vec<String>,
    glow_intensity: f32,
    glow_size: u32,
    vignette_strength: f32,
    grain_amount: f32,
    chromatic_shift: f64,
}

impl Default for EffectsOptions {
    fn default() -> Self {
        Self {
            effects: Vec::new(),
            glow_intensity: 0.3,
            glow_size: 15,
            vignette_strength: 0.3,
            grain_amount: 0.05,
            chromatic_shift: 2.0,
        }
    }
}

/// Post-processing chain over whatever the layers below produced.
pub struct EffectsLayer {
    chain: Vec<Effect>,
    opts: EffectsOptions,
    /// Separable vignette weights, each peaking at 1.0.
    vignette: (Vec<f32>, Vec<f32>),
    rng: Pcg64Mcg,
}

impl EffectsLayer {
    pub const TYPE: &'static str = "effects";

    pub fn new(init: &LayerInit<'_>) -> VizResult<Self> {
        let opts: EffectsOptions = init.parse_options(Self::TYPE)?;
        let chain = opts
            .effects
            .iter()
            .map(|name| {
                Effect::parse(name).ok_or_else(|| {
                    let valid: Vec<&str> = Effect::ALL.iter().map(|e| e.as_str()).collect();
                    VizError::config(format!(
                        "unknown effect '{name}' (valid: {})",
                        valid.join(", ")
                    ))
                })
            })
            .collect::<VizResult<Vec<_>>>()?;
        Ok(Self {
            vignette: vignette_weights(init.canvas),
            chain,
            opts,
            rng: Pcg64Mcg::seed_from_u64(init.seed),
        })
    }

    pub fn chain(&self) -> &[Effect] {
        &self.chain
    }
}

impl LayerRender for EffectsLayer {
    fn layer_type(&self) -> &str {
        Self::TYPE
    }

    fn render_direct(&mut self, cx: &FrameContext<'_>, surface: &mut Surface<'_>) -> VizResult<()> {
        let frame = &mut *surface.frame;
        for effect in &self.chain {
            match effect {
                Effect::Glow => glow(frame, self.opts.glow_size, self.opts.glow_intensity)?,
                Effect::Vignette => {
                    vignette(frame, &self.vignette.0, &self.vignette.1, self.opts.vignette_strength)
                }
                Effect::Grain => grain(frame, self.opts.grain_amount, &mut self.rng),
                Effect::Chromatic => chromatic(frame, cx.time, self.opts.chromatic_shift),
            }
        }
        Ok(())
    }
}

/// `frame + blur(frame)·intensity`, saturating.
pub(crate) fn glow(frame: &mut Frame, size: u32, intensity: f32) -> VizResult<()> {
    if intensity <= 0.0 {
        return Ok(());
    }
    let blurred = gaussian_blur(frame, size)?;
    for (d, b) in frame.data.iter_mut().zip(&blurred.data) {
        *d = to_channel(f32::from(*d) + f32::from(*b) * intensity);
    }
    Ok(())
}

fn gaussian_weights(n: u32, sigma: f64) -> Vec<f32> {
    let mid = (f64::from(n) - 1.0) / 2.0;
    let denom = 2.0 * sigma * sigma;
    let w: Vec<f64> = (0..n)
        .map(|i| {
            let x = f64::from(i) - mid;
            (-x * x / denom).exp()
        })
        .collect();
    let peak = w.iter().copied().fold(0.0, f64::max);
    if peak > 0.0 {
        w.iter().map(|v| (v / peak) as f32).collect()
    } else {
        vec![1.0; w.len()]
    }
}

pub(crate) fn vignette_weights(canvas: Canvas) -> (Vec<f32>, Vec<f32>) {
    (
        gaussian_weights(canvas.width, f64::from(canvas.width) / 3.0),
        gaussian_weights(canvas.height, f64::from(canvas.height) / 3.0),
    )
}

/// Scale each pixel by `1 − (1 − g)·strength`, where `g` is a centered Gaussian peaking at 1.
pub(crate) fn vignette(frame: &mut Frame, gx: &[f32], gy: &[f32], strength: f32) {
    if strength <= 0.0 || gx.len() != frame.width as usize || gy.len() != frame.height as usize {
        return;
    }
    let stride = frame.stride();
    frame
        .data
        .par_chunks_mut(stride)
        .zip(gy.par_iter())
        .for_each(|(row, &wy)| {
            for (px, &wx) in row.chunks_exact_mut(CH).zip(gx) {
                let m = 1.0 - (1.0 - wx * wy) * strength;
                for c in px {
                    *c = (f32::from(*c) * m).clamp(0.0, 255.0) as u8;
                }
            }
        });
}

/// Add zero-mean Gaussian noise with standard deviation `amount·255` to every channel.
pub(crate) fn grain(frame: &mut Frame, amount: f32, rng: &mut Pcg64Mcg) {
    if amount <= 0.0 {
        return;
    }
    let sd = f64::from(amount) * 255.0;
    for c in &mut frame.data {
        let noise = standard_normal(rng) * sd;
        *c = (f64::from(*c) + noise).clamp(0.0, 255.0) as u8;
    }
}

fn standard_normal(rng: &mut Pcg64Mcg) -> f64 {
    // Box-Muller; u1 in (0, 1] keeps ln finite.
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// Offsets for the chromatic split at `time`.
pub(crate) fn chromatic_offsets(time: f64, shift: f64) -> (i64, i64) {
    (
        (time.sin() * shift).trunc() as i64,
        ((time * 0.7).cos() * shift).trunc() as i64,
    )
}

/// Move red by `(sx, sy)` and blue by `(−sx, −sy)`; vacated pixels become 0.
pub(crate) fn chromatic(frame: &mut Frame, time: f64, shift: f64) {
    if shift.is_nan() || shift <= 0.0 {
        return;
    }
    let (w, h) = (i64::from(frame.width), i64::from(frame.height));
    // Any offset past the longer side already samples outside the frame.
    let lim = w.max(h);
    let (sx, sy) = chromatic_offsets(time, shift);
    let (sx, sy) = (sx.clamp(-lim, lim), sy.clamp(-lim, lim));
    if sx == 0 && sy == 0 {
        return;
    }
    let src = frame.data.clone();
    let stride = frame.stride();
    let sample = |x: i64, y: i64, c: usize| -> u8 {
        if (0..w).contains(&x) && (0..h).contains(&y) {
            src[y as usize * stride + x as usize * CH + c]
        } else {
            0
        }
    };
    frame
        .data
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i64;
            for (x, px) in row.chunks_exact_mut(CH).enumerate() {
                let x = x as i64;
                px[0] = sample(x - sx, y - sy, 0);
                px[2] = sample(x + sx, y + sy, 2);
            }
        });
}

#[cfg(test)]
#[path = "../../tests/unit/layers/effects.rs"]
mod tests;
