use crate::audio::source::AudioSource;
use crate::config::Config;
use crate::foundation::core::Canvas;
use crate::foundation::error::{VizError, VizResult};
use crate::foundation::math::layer_seed;
use crate::layers::{FrameContext, Layer, LayerInit};
use crate::pipeline::registry::LayerRegistry;
use crate::render::frame::Frame;
use crate::render::painter::Painter;

/// Diagnostic listing entry for one assembled layer.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct LayerInfo {
    pub index: usize,
    pub layer_type: String,
    pub blend_mode: &'static str,
}

/// Ordered layer stack for one render session.
///
/// Layers carry temporal state, so a pipeline must see frames in time order and is not shared
/// between threads.
pub struct Pipeline {
    canvas: Canvas,
    layers: Vec<Layer>,
    painter: Painter,
}

impl Pipeline {
    /// Instantiate every layer named in `cfg.pipeline.order` through `registry`.
    #[tracing::instrument(skip_all, fields(layers = cfg.pipeline.order.len()))]
    pub fn assemble(cfg: &Config, registry: &LayerRegistry) -> VizResult<Self> {
        let canvas = cfg.canvas();
        let palette = cfg.palette();
        let mut layers = Vec::with_capacity(cfg.pipeline.order.len());
        for (slot, name) in cfg.pipeline.order.iter().enumerate() {
            if !registry.contains(name) {
                return Err(VizError::UnknownLayer {
                    name: name.clone(),
                    available: registry.available(),
                });
            }
            let options = cfg.layer_options(name).ok_or_else(|| {
                VizError::config(format!("pipeline has no options block for layer '{name}'"))
            })?;
            let init = LayerInit {
                canvas,
                palette,
                options,
                seed: layer_seed(cfg.seed, slot, name),
            };
            let layer = Layer::new(registry.create(name, &init)?, options)?;
            tracing::info!(
                slot,
                layer = %name,
                blend = layer.blend_mode().as_str(),
                opacity = layer.opacity(),
                "+ layer"
            );
            layers.push(layer);
        }
        Ok(Self {
            canvas,
            painter: Painter::new(canvas)?,
            layers,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer_info(&self) -> Vec<LayerInfo> {
        self.layers
            .iter()
            .enumerate()
            .map(|(index, l)| LayerInfo {
                index,
                layer_type: l.layer_type().to_owned(),
                blend_mode: l.blend_mode().as_str(),
            })
            .collect()
    }

    /// Render the frame at `time`: a zeroed canvas folded through every layer in order.
    pub fn render_frame(&mut self, time: f64, audio: &dyn AudioSource) -> VizResult<Frame> {
        let mut frame = Frame::new(self.canvas);
        let cx = FrameContext { time, audio };
        for layer in &mut self.layers {
            layer.render(&cx, &mut frame, &mut self.painter)?;
        }
        Ok(frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/renderer.rs"]
mod tests;
