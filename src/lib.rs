//! audioviz renders an audio track into a synchronized video through a stack of audio-reactive
//! layers.
//!
//! - Load a [`Config`] and an [`AudioSource`] (for example [`PcmAudio`] via [`load_track`])
//! - Assemble a [`Pipeline`] from a [`LayerRegistry`], or let a [`RenderSession`] do it
//! - Render single frames or stream a range into a [`FrameSink`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod audio;
pub(crate) mod config;
pub(crate) mod encode;
/// Layer variants and the render contract they share.
pub mod layers;
pub(crate) mod pipeline;
pub(crate) mod render;
pub(crate) mod session;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Point, Rgb8, Vec2};
pub use crate::foundation::error::{VizError, VizResult};

pub use crate::audio::decode::{decode_audio_mono, load_track};
pub use crate::audio::onsets::{energy_onsets, estimate_tempo};
pub use crate::audio::source::{AudioSource, PcmAudio};
pub use crate::config::{
    AudioConfig, Config, Overrides, Palette, PipelineConfig, VideoConfig, VisualizationConfig,
};
pub use crate::encode::ffmpeg::{FfmpegSink, ensure_parent_dir, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::layers::{FrameContext, Layer, LayerInit, LayerKind, LayerRender};
pub use crate::pipeline::registry::{LayerFactory, LayerRegistry};
pub use crate::pipeline::renderer::{LayerInfo, Pipeline};
pub use crate::render::blend::BlendMode;
pub use crate::render::frame::Frame;
pub use crate::render::painter::{Painter, Surface};
pub use crate::session::render_session::{RenderSession, RenderSessionOpts, RenderStats};
