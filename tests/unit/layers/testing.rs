use crate::audio::source::{AudioSource, PcmAudio};
use crate::config::Palette;
use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::VizResult;
use crate::layers::{FrameContext, LayerInit, LayerRender};
use crate::render::frame::Frame;
use crate::render::painter::{Painter, Surface};

pub(crate) const PRIMARY: Rgb8 = Rgb8::new(255, 0, 0);
pub(crate) const SECONDARY: Rgb8 = Rgb8::new(0, 0, 255);

pub(crate) fn palette() -> Palette {
    Palette {
        primary: PRIMARY,
        secondary: SECONDARY,
        background: Rgb8::new(10, 20, 30),
    }
}

pub(crate) fn canvas(width: u32, height: u32) -> Canvas {
    Canvas { width, height }
}

pub(crate) fn init(canvas: Canvas, options: &serde_json::Value) -> LayerInit<'_> {
    LayerInit {
        canvas,
        palette: palette(),
        options,
        seed: 7,
    }
}

pub(crate) fn render_at(
    layer: &mut dyn LayerRender,
    audio: &dyn AudioSource,
    time: f64,
    frame: &mut Frame,
) -> VizResult<()> {
    let mut painter = Painter::new(frame.canvas())?;
    let cx = FrameContext { time, audio };
    layer.render_direct(&cx, &mut Surface::new(frame, &mut painter))
}

pub(crate) fn sine(sample_rate: u32, secs: f64, freq: f64, amp: f32) -> PcmAudio {
    let n = (secs * f64::from(sample_rate)) as usize;
    let samples = (0..n)
        .map(|i| {
            let t = i as f64 / f64::from(sample_rate);
            amp * (2.0 * std::f64::consts::PI * freq * t).sin() as f32
        })
        .collect();
    PcmAudio::new(samples, sample_rate).expect("valid sample rate")
}

pub(crate) fn silence(secs: f64) -> PcmAudio {
    PcmAudio::silent(secs, 22050).expect("valid silence")
}

pub(crate) fn lit_pixels(frame: &Frame) -> usize {
    frame
        .data
        .chunks_exact(3)
        .filter(|px| px.iter().any(|&c| c != 0))
        .count()
}
