//! Typed render configuration, loaded from JSON.

use crate::foundation::core::{Canvas, Fps, Rgb8};
use crate::foundation::error::{VizError, VizResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Root configuration document.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub video: VideoConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    pub visualization: VisualizationConfig,
    pub pipeline: PipelineConfig,
    /// Seed for every random stream in the pipeline.
    #[serde(default)]
    pub seed: u64,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Decode sample rate in Hz.
    pub sample_rate: u32,
    /// Peak-normalize the decoded track.
    pub normalize: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            normalize: true,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VisualizationConfig {
    pub colors: Palette,
}

/// Reference colors shared by all layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Palette {
    pub primary: Rgb8,
    pub secondary: Rgb8,
    #[serde(default = "default_background")]
    pub background: Rgb8,
}

fn default_background() -> Rgb8 {
    Rgb8::BLACK
}

/// Layer order plus one free-form options block per layer type.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PipelineConfig {
    pub order: Vec<String>,
    #[serde(flatten)]
    pub layers: BTreeMap<String, serde_json::Value>,
}

/// Values the CLI may override after loading.
#[derive(Clone, Copy, Debug, Default)]
pub struct Overrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
}

impl Config {
    pub fn from_json_str(s: &str) -> VizResult<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| VizError::config(format!("invalid config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> VizResult<Self> {
        use anyhow::Context as _;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> VizResult<()> {
        let VideoConfig { width, height, fps } = self.video;
        if !(1..=u32::from(u16::MAX)).contains(&width) || !(1..=u32::from(u16::MAX)).contains(&height)
        {
            return Err(VizError::config(format!(
                "video width/height must be in 1..=65535, got {width}x{height}"
            )));
        }
        if fps == 0 {
            return Err(VizError::config("video fps must be > 0"));
        }
        if self.audio.sample_rate == 0 {
            return Err(VizError::config("audio sample_rate must be > 0"));
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, o: Overrides) -> VizResult<()> {
        if let Some(w) = o.width {
            self.video.width = w;
        }
        if let Some(h) = o.height {
            self.video.height = h;
        }
        if let Some(f) = o.fps {
            self.video.fps = f;
        }
        self.validate()
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.video.width,
            height: self.video.height,
        }
    }

    pub fn fps(&self) -> VizResult<Fps> {
        Fps::new(self.video.fps, 1)
    }

    pub fn palette(&self) -> Palette {
        self.visualization.colors
    }

    /// Options block for a layer type, if present.
    pub fn layer_options(&self, layer_type: &str) -> Option<&serde_json::Value> {
        self.pipeline.layers.get(layer_type)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/mod.rs"]
mod tests;
