use crate::audio::source::AudioSource;
use crate::config::Config;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::{VizError, VizResult};
use crate::pipeline::registry::LayerRegistry;
use crate::pipeline::renderer::Pipeline;
use crate::render::frame::Frame;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

/// Options controlling `RenderSession` range rendering behavior.
#[derive(Clone, Debug)]
pub struct RenderSessionOpts {
    /// Bounded channel capacity between the renderer and the encoder thread.
    pub channel_capacity: usize,
    /// Audio file handed to the sink for muxing.
    pub audio_path: Option<PathBuf>,
}

impl Default for RenderSessionOpts {
    fn default() -> Self {
        Self {
            channel_capacity: 4,
            audio_path: None,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Total frames in the requested range.
    pub frames_total: u64,
    /// Frames rendered and delivered to the sink.
    pub frames_rendered: u64,
    /// Whether the render stopped early on the cancel flag.
    pub cancelled: bool,
}

/// Drives one assembled [`Pipeline`] over a timeline.
///
/// Frames are produced strictly in order on the calling thread; only the sink runs on a
/// separate encoder thread.
pub struct RenderSession {
    pipeline: Pipeline,
    fps: Fps,
    opts: RenderSessionOpts,
    cancel: Arc<AtomicBool>,
}

impl RenderSession {
    pub fn new(pipeline: Pipeline, fps: Fps, opts: RenderSessionOpts) -> Self {
        Self {
            pipeline,
            fps,
            opts,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Assemble a pipeline from `cfg` and wrap it in a session.
    pub fn from_config(
        cfg: &Config,
        registry: &LayerRegistry,
        opts: RenderSessionOpts,
    ) -> VizResult<Self> {
        let pipeline = Pipeline::assemble(cfg, registry)?;
        Ok(Self::new(pipeline, cfg.fps()?, opts))
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Flag that stops `render_range` before the next frame once set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// `[0, floor(duration · fps))`.
    pub fn full_range(&self, duration_secs: f64) -> VizResult<FrameRange> {
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            return Err(VizError::validation("audio duration must be finite and >= 0"));
        }
        FrameRange::new(
            FrameIndex(0),
            FrameIndex(self.fps.secs_to_frames_floor(duration_secs)),
        )
    }

    /// Render one frame at `time` seconds.
    pub fn render_frame(&mut self, time: f64, audio: &dyn AudioSource) -> VizResult<Frame> {
        self.pipeline.render_frame(time, audio)
    }

    /// Render a frame range and stream frames into a sink.
    ///
    /// Frame `i` is rendered at `i / fps`. The sink receives frames in strictly increasing frame
    /// index order and is finalized even when the render is cancelled.
    #[tracing::instrument(skip_all, fields(start = range.start.0, end = range.end.0))]
    pub fn render_range(
        &mut self,
        range: FrameRange,
        audio: &dyn AudioSource,
        sink: &mut dyn FrameSink,
    ) -> VizResult<RenderStats> {
        if range.is_empty() {
            return Err(VizError::validation("render_range range must be non-empty"));
        }

        let canvas = self.pipeline.canvas();
        let cfg = SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.fps,
            audio_path: self.opts.audio_path.clone(),
        };
        let cap = self.opts.channel_capacity.max(1);
        let progress_every = u64::from(self.fps.num / self.fps.den.max(1)).max(1);

        std::thread::scope(|scope| -> VizResult<RenderStats> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let sink_ref: &mut dyn FrameSink = sink;

            let enc = scope.spawn(move || -> VizResult<()> {
                sink_ref.begin(cfg)?;
                let mut next = range.start.0;
                let pushed = rx.iter().try_for_each(|msg| {
                    if msg.idx.0 != next {
                        return Err(VizError::evaluation(format!(
                            "encoder expected frame {next}, got {}",
                            msg.idx.0
                        )));
                    }
                    sink_ref.push_frame(msg.idx, &msg.frame)?;
                    next += 1;
                    Ok(())
                });
                let ended = sink_ref.end();
                pushed.and(ended)
            });

            let mut stats = RenderStats {
                frames_total: range.len_frames(),
                ..RenderStats::default()
            };
            let produce_res = (|| -> VizResult<()> {
                for f in range.start.0..range.end.0 {
                    if self.cancel.load(Ordering::Relaxed) {
                        tracing::info!(frame = f, "render cancelled");
                        stats.cancelled = true;
                        return Ok(());
                    }
                    let idx = FrameIndex(f);
                    let frame = self
                        .pipeline
                        .render_frame(self.fps.frame_time_secs(idx), audio)?;
                    tx.send(FrameMsg { idx, frame }).map_err(|_| {
                        VizError::evaluation("encoder thread is not accepting frames")
                    })?;
                    stats.frames_rendered += 1;
                    if stats.frames_rendered.is_multiple_of(progress_every) {
                        tracing::debug!(
                            rendered = stats.frames_rendered,
                            total = stats.frames_total,
                            "progress"
                        );
                    }
                }
                Ok(())
            })();

            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| VizError::evaluation("encoder thread panicked"))?;

            // The encoder's error explains a failed send better than the send itself.
            enc_res?;
            produce_res?;
            Ok(stats)
        })
    }
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: Frame,
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
