use crate::foundation::error::{VizError, VizResult};
use crate::layers::{
    BackgroundLayer, CircularParticlesLayer, CircularSpectrumLayer, CircularWaveformLayer,
    EffectsLayer, LayerInit, LayerKind, ParticlesLayer, SpectrumLayer, WaveformLayer,
};
use std::collections::BTreeMap;

/// Builds one layer from its resolved construction inputs.
pub type LayerFactory = Box<dyn Fn(&LayerInit<'_>) -> VizResult<LayerKind> + Send + Sync>;

/// Maps layer-type names to constructors.
///
/// The registry is an explicit value handed to [`Pipeline::assemble`](crate::Pipeline::assemble);
/// there is no global registration.
#[derive(Default)]
pub struct LayerRegistry {
    factories: BTreeMap<String, LayerFactory>,
}

impl LayerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in layer variant.
    pub fn with_builtin() -> Self {
        let mut r = Self::new();
        r.register(BackgroundLayer::TYPE, |i| {
            BackgroundLayer::new(i).map(LayerKind::Background)
        });
        r.register(WaveformLayer::TYPE, |i| {
            WaveformLayer::new(i).map(LayerKind::Waveform)
        });
        r.register(CircularWaveformLayer::TYPE, |i| {
            CircularWaveformLayer::new(i).map(LayerKind::CircularWaveform)
        });
        r.register(SpectrumLayer::TYPE, |i| {
            SpectrumLayer::new(i).map(LayerKind::Spectrum)
        });
        r.register(CircularSpectrumLayer::TYPE, |i| {
            CircularSpectrumLayer::new(i).map(LayerKind::CircularSpectrum)
        });
        r.register(ParticlesLayer::TYPE, |i| {
            ParticlesLayer::new(i).map(LayerKind::Particles)
        });
        r.register(CircularParticlesLayer::TYPE, |i| {
            CircularParticlesLayer::new(i).map(LayerKind::CircularParticles)
        });
        r.register(EffectsLayer::TYPE, |i| {
            EffectsLayer::new(i).map(LayerKind::Effects)
        });
        r
    }

    /// Register (or replace) the constructor for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&LayerInit<'_>) -> VizResult<LayerKind> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Box::new(factory)).is_some() {
            tracing::debug!(layer = %name, "replaced layer constructor");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn available(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Construct a layer of type `name`.
    pub fn create(&self, name: &str, init: &LayerInit<'_>) -> VizResult<LayerKind> {
        let factory = self.factories.get(name).ok_or_else(|| VizError::UnknownLayer {
            name: name.to_owned(),
            available: self.available(),
        })?;
        factory(init)
    }
}

impl std::fmt::Debug for LayerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerRegistry")
            .field("layers", &self.available())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/registry.rs"]
mod tests;
