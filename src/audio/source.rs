use crate::foundation::error::{VizError, VizResult};

/// Read-only view of a preloaded audio track, queried by layers once per frame.
///
/// Implementations must answer from memory: no blocking I/O happens while a frame renders.
pub trait AudioSource {
    /// Samples in `[-1, 1]` covering `[time - window/2, time + window/2)`, clipped to the track.
    ///
    /// Returns `None` when the window falls outside the track or no audio is loaded.
    fn segment(&self, time: f64, window: f64) -> Option<&[f32]>;

    /// `true` when a detected beat lies within `threshold` seconds of `time`.
    fn is_beat_at_time(&self, time: f64, threshold: f64) -> bool;

    /// Track duration in seconds.
    fn duration(&self) -> f64;

    /// Sample rate in Hz.
    fn sample_rate(&self) -> u32;
}

/// Mono `f32` PCM held in memory together with a sorted list of beat times.
#[derive(Clone, Debug, Default)]
pub struct PcmAudio {
    samples: Vec<f32>,
    sample_rate: u32,
    beats: Vec<f64>,
}

impl PcmAudio {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> VizResult<Self> {
        if sample_rate == 0 {
            return Err(VizError::validation("audio sample_rate must be > 0"));
        }
        Ok(Self {
            samples,
            sample_rate,
            beats: Vec::new(),
        })
    }

    /// `duration_secs` of digital silence.
    pub fn silent(duration_secs: f64, sample_rate: u32) -> VizResult<Self> {
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            return Err(VizError::validation("silence duration must be finite and >= 0"));
        }
        let len = (duration_secs * f64::from(sample_rate)).round() as usize;
        Self::new(vec![0.0; len], sample_rate)
    }

    /// Attach beat times in seconds. Non-finite entries are dropped; the rest are sorted.
    pub fn with_beats(mut self, beats: impl IntoIterator<Item = f64>) -> Self {
        let mut beats: Vec<f64> = beats.into_iter().filter(|b| b.is_finite()).collect();
        beats.sort_by(f64::total_cmp);
        self.beats = beats;
        self
    }

    /// Scale the track so its largest absolute sample is 1.0. Silent tracks are left alone.
    pub fn normalize_peak(&mut self) {
        let peak = self.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        if peak > 0.0 && peak.is_finite() {
            for s in &mut self.samples {
                *s /= peak;
            }
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn beats(&self) -> &[f64] {
        &self.beats
    }
}

impl AudioSource for PcmAudio {
    fn segment(&self, time: f64, window: f64) -> Option<&[f32]> {
        if self.samples.is_empty() || self.sample_rate == 0 || !time.is_finite() {
            return None;
        }
        let sr = f64::from(self.sample_rate);
        let half = window.max(0.0) / 2.0;
        let start = ((time - half) * sr).max(0.0) as usize;
        let end = ((time + half) * sr).min(self.samples.len() as f64).max(0.0) as usize;
        if start >= end {
            return None;
        }
        Some(&self.samples[start..end])
    }

    fn is_beat_at_time(&self, time: f64, threshold: f64) -> bool {
        if self.beats.is_empty() {
            return false;
        }
        // Only the beats on either side of `time` can be the nearest one.
        let idx = self.beats.partition_point(|&b| b < time);
        let after = self.beats.get(idx).map(|b| (b - time).abs());
        let before = idx
            .checked_sub(1)
            .and_then(|i| self.beats.get(i))
            .map(|b| (time - b).abs());
        after.into_iter().chain(before).any(|d| d < threshold)
    }

    fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/source.rs"]
mod tests;
