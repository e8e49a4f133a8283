use crate::config::Palette;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{VizError, VizResult};
use crate::layers::{FrameContext, LayerInit, LayerRender};
use crate::render::blur::{gaussian_blur, kernel_for_amount};
use crate::render::color::gradient;
use crate::render::frame::Frame;
use crate::render::painter::Surface;
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundStyle {
    Solid,
    Gradient,
    Animated,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientDirection {
    #[default]
    Vertical,
    Horizontal,
    Radial,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
struct BackgroundOptions {
    #[serde(alias = "type")]
    style: Option<BackgroundStyle>,
    direction: GradientDirection,
    color: Option<Rgb8>,
    color1: Option<Rgb8>,
    color2: Option<Rgb8>,
    blur: f32,
    wave_speed1: f32,
    wave_speed2: f32,
    wave_speed3: f32,
    wave_amplitude: f32,
}

impl Default for BackgroundOptions {
    fn default() -> Self {
        Self {
            style: None,
            direction: GradientDirection::default(),
            color: None,
            color1: None,
            color2: None,
            blur: 0.0,
            wave_speed1: 2.0,
            wave_speed2: 1.5,
            wave_speed3: 3.0,
            wave_amplitude: 0.3,
        }
    }
}

/// Fills the whole canvas: a solid color, a static gradient, or a flowing sine plasma.
pub struct BackgroundLayer {
    style: BackgroundStyle,
    direction: GradientDirection,
    solid: Rgb8,
    color1: Rgb8,
    color2: Rgb8,
    blur: f32,
    speeds: [f32; 3],
    amplitude: f32,
}

impl BackgroundLayer {
    pub const TYPE: &'static str = "background";

    pub fn new(init: &LayerInit<'_>) -> VizResult<Self> {
        let opts: BackgroundOptions = init.parse_options(Self::TYPE)?;
        let style = opts
            .style
            .ok_or_else(|| VizError::config("background options require 'style'"))?;
        let Palette {
            primary,
            secondary,
            background,
        } = init.palette;
        Ok(Self {
            style,
            direction: opts.direction,
            solid: opts.color.unwrap_or(background),
            color1: opts.color1.unwrap_or(primary),
            color2: opts.color2.unwrap_or(secondary),
            blur: opts.blur,
            speeds: [opts.wave_speed1, opts.wave_speed2, opts.wave_speed3],
            amplitude: opts.wave_amplitude,
        })
    }

    fn fill_gradient(&self, frame: &mut Frame) {
        let (w, h) = (frame.width, frame.height);
        let stride = frame.stride();
        let (c1, c2) = (self.color1, self.color2);
        match self.direction {
            GradientDirection::Vertical => {
                frame
                    .data
                    .par_chunks_mut(stride)
                    .enumerate()
                    .for_each(|(y, row)| {
                        let px = gradient(c1, c2, unit_ratio(y as u32, h)).to_array();
                        for dst in row.chunks_exact_mut(3) {
                            dst.copy_from_slice(&px);
                        }
                    });
            }
            GradientDirection::Horizontal => {
                let line: Vec<u8> = (0..w)
                    .flat_map(|x| gradient(c1, c2, unit_ratio(x, w)).to_array())
                    .collect();
                frame
                    .data
                    .par_chunks_mut(stride)
                    .for_each(|row| row.copy_from_slice(&line));
            }
            GradientDirection::Radial => {
                let (cx, cy) = (f64::from(w / 2), f64::from(h / 2));
                let max_d = (cx * cx + cy * cy).sqrt();
                frame
                    .data
                    .par_chunks_mut(stride)
                    .enumerate()
                    .for_each(|(y, row)| {
                        let dy = y as f64 - cy;
                        for (x, dst) in row.chunks_exact_mut(3).enumerate() {
                            let dx = x as f64 - cx;
                            let ratio = if max_d > 0.0 {
                                ((dx * dx + dy * dy).sqrt() / max_d) as f32
                            } else {
                                0.0
                            };
                            dst.copy_from_slice(&gradient(c1, c2, ratio).to_array());
                        }
                    });
            }
        }
    }

    fn fill_animated(&self, frame: &mut Frame, time: f64) {
        let stride = frame.stride();
        let [s1, s2, s3] = self.speeds.map(f64::from);
        let amp = f64::from(self.amplitude);
        let (c1, c2) = (self.color1, self.color2);
        frame
            .data
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| {
                let y = y as f64;
                let w1 = (y * 0.01 + time * s1).sin() * amp + 0.7;
                let w2 = (y * 0.015 + time * s2).sin() * amp + 0.7;
                for (x, dst) in row.chunks_exact_mut(3).enumerate() {
                    let w3 = (x as f64 * 0.01 + time * s3).sin() * amp + 0.7;
                    let ratio = ((w1 + w2 + w3) / 3.0) as f32;
                    // `ratio` weights the first color.
                    dst.copy_from_slice(&gradient(c2, c1, ratio).to_array());
                }
            });
    }
}

fn unit_ratio(i: u32, len: u32) -> f32 {
    if len > 1 {
        i as f32 / (len - 1) as f32
    } else {
        0.0
    }
}

impl LayerRender for BackgroundLayer {
    fn layer_type(&self) -> &str {
        Self::TYPE
    }

    fn render_direct(&mut self, cx: &FrameContext<'_>, surface: &mut Surface<'_>) -> VizResult<()> {
        let frame = &mut *surface.frame;
        match self.style {
            BackgroundStyle::Solid => frame.fill(self.solid),
            BackgroundStyle::Gradient => self.fill_gradient(frame),
            BackgroundStyle::Animated => self.fill_animated(frame, cx.time),
        }
        if self.blur > 0.0 {
            *frame = gaussian_blur(frame, kernel_for_amount(self.blur))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/background.rs"]
mod tests;
