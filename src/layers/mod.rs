//! The closed set of layer variants and the render contract they share.

pub(crate) mod background;
pub(crate) mod circular_spectrum;
pub(crate) mod circular_waveform;
pub(crate) mod effects;
pub(crate) mod particles;
pub(crate) mod spectrum;
pub(crate) mod waveform;

use crate::audio::source::AudioSource;
use crate::config::Palette;
use crate::foundation::core::Canvas;
use crate::foundation::error::{VizError, VizResult};
use crate::render::blend::{BlendMode, blend_in_place};
use crate::render::frame::Frame;
use crate::render::painter::{Painter, Surface};
use serde::Deserialize as _;

pub use background::BackgroundLayer;
pub use circular_spectrum::CircularSpectrumLayer;
pub use circular_waveform::CircularWaveformLayer;
pub use effects::EffectsLayer;
pub use particles::circular::CircularParticlesLayer;
pub use particles::linear::ParticlesLayer;
pub use spectrum::SpectrumLayer;
pub use waveform::WaveformLayer;

/// Per-frame inputs handed to every layer.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    /// Presentation time in seconds.
    pub time: f64,
    pub audio: &'a dyn AudioSource,
}

/// Everything a layer constructor may read.
#[derive(Clone, Copy, Debug)]
pub struct LayerInit<'a> {
    pub canvas: Canvas,
    pub palette: Palette,
    /// The layer type's options block from the pipeline configuration.
    pub options: &'a serde_json::Value,
    /// Seed for this layer's random stream.
    pub seed: u64,
}

impl LayerInit<'_> {
    /// Deserialize the options block into a typed struct, reporting failures as config errors.
    pub fn parse_options<T: serde::de::DeserializeOwned>(&self, layer_type: &str) -> VizResult<T> {
        T::deserialize(self.options)
            .map_err(|e| VizError::config(format!("invalid '{layer_type}' options: {e}")))
    }
}

/// Render contract shared by all layers, and the extension point for externally registered ones.
///
/// `render_direct` draws straight onto `surface`. Layers keep their temporal state (smoothing
/// history, particle pools) in `self` and are called exactly once per frame, in time order.
pub trait LayerRender {
    fn layer_type(&self) -> &str;

    fn render_direct(&mut self, cx: &FrameContext<'_>, surface: &mut Surface<'_>) -> VizResult<()>;
}

/// Built-in layer variants plus an escape hatch for registered extensions.
pub enum LayerKind {
    Background(BackgroundLayer),
    Waveform(WaveformLayer),
    CircularWaveform(CircularWaveformLayer),
    Spectrum(SpectrumLayer),
    CircularSpectrum(CircularSpectrumLayer),
    Particles(ParticlesLayer),
    CircularParticles(CircularParticlesLayer),
    Effects(EffectsLayer),
    External(Box<dyn LayerRender>),
}

impl LayerKind {
    fn as_render_mut(&mut self) -> &mut dyn LayerRender {
        match self {
            Self::Background(l) => l,
            Self::Waveform(l) => l,
            Self::CircularWaveform(l) => l,
            Self::Spectrum(l) => l,
            Self::CircularSpectrum(l) => l,
            Self::Particles(l) => l,
            Self::CircularParticles(l) => l,
            Self::Effects(l) => l,
            Self::External(l) => l.as_mut(),
        }
    }

    fn as_render(&self) -> &dyn LayerRender {
        match self {
            Self::Background(l) => l,
            Self::Waveform(l) => l,
            Self::CircularWaveform(l) => l,
            Self::Spectrum(l) => l,
            Self::CircularSpectrum(l) => l,
            Self::Particles(l) => l,
            Self::CircularParticles(l) => l,
            Self::Effects(l) => l,
            Self::External(l) => l.as_ref(),
        }
    }
}

impl LayerRender for LayerKind {
    fn layer_type(&self) -> &str {
        self.as_render().layer_type()
    }

    fn render_direct(&mut self, cx: &FrameContext<'_>, surface: &mut Surface<'_>) -> VizResult<()> {
        self.as_render_mut().render_direct(cx, surface)
    }
}

#[derive(Debug, serde::Deserialize)]
struct CommonOptions {
    #[serde(default = "full_opacity")]
    opacity: f32,
    #[serde(default)]
    blend_mode: Option<String>,
}

fn full_opacity() -> f32 {
    1.0
}

/// One pipeline slot: a layer variant plus how its output joins the running frame.
pub struct Layer {
    kind: LayerKind,
    opacity: f32,
    blend: BlendMode,
    isolated: Option<Frame>,
}

impl Layer {
    /// Wrap `kind`, reading `opacity` and `blend_mode` from the layer's options block.
    pub fn new(kind: LayerKind, options: &serde_json::Value) -> VizResult<Self> {
        let common = CommonOptions::deserialize(options).map_err(|e| {
            VizError::config(format!("invalid '{}' options: {e}", kind.layer_type()))
        })?;
        let blend = match common.blend_mode.as_deref() {
            None => BlendMode::Overwrite,
            Some(name) => BlendMode::parse_or_overwrite(name, kind.layer_type()),
        };
        let opacity = if common.opacity.is_finite() {
            common.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Ok(Self {
            kind,
            opacity,
            blend,
            isolated: None,
        })
    }

    pub fn layer_type(&self) -> &str {
        self.kind.layer_type()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    /// Paint directly when opaque, otherwise render into a blank canvas and blend it in.
    pub fn render(
        &mut self,
        cx: &FrameContext<'_>,
        frame: &mut Frame,
        painter: &mut Painter,
    ) -> VizResult<()> {
        if self.blend == BlendMode::Overwrite || self.opacity >= 0.99 {
            return self
                .kind
                .render_direct(cx, &mut Surface::new(frame, painter));
        }
        let mut isolated = match self.isolated.take() {
            Some(mut f) if f.canvas() == frame.canvas() => {
                f.clear();
                f
            }
            _ => Frame::new(frame.canvas()),
        };
        let res = self
            .kind
            .render_direct(cx, &mut Surface::new(&mut isolated, painter))
            .and_then(|()| blend_in_place(self.blend, frame, &isolated, self.opacity));
        self.isolated = Some(isolated);
        res
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/mod.rs"]
mod tests;

#[cfg(test)]
#[path = "../../tests/unit/layers/testing.rs"]
pub(crate) mod testing;
