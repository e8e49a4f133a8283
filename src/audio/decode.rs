use crate::audio::onsets::{energy_onsets, estimate_tempo};
use crate::audio::source::{AudioSource, PcmAudio};
use crate::config::AudioConfig;
use crate::foundation::error::{VizError, VizResult};
use std::path::Path;

/// Decode any ffmpeg-readable file to mono `f32` PCM at `sample_rate`.
pub fn decode_audio_mono(path: &Path, sample_rate: u32) -> VizResult<PcmAudio> {
    if sample_rate == 0 {
        return Err(VizError::validation("audio sample_rate must be > 0"));
    }
    if !path.exists() {
        return Err(VizError::validation(format!(
            "audio file not found: '{}'",
            path.display()
        )));
    }
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "1",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| VizError::evaluation(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        return Err(VizError::evaluation(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    PcmAudio::new(f32le_to_samples(&out.stdout)?, sample_rate)
}

/// Decode, optionally peak-normalize, and attach detected beats.
#[tracing::instrument(skip(cfg), fields(sample_rate = cfg.sample_rate))]
pub fn load_track(path: &Path, cfg: &AudioConfig) -> VizResult<PcmAudio> {
    let mut audio = decode_audio_mono(path, cfg.sample_rate)?;
    if cfg.normalize {
        audio.normalize_peak();
    }
    let beats = energy_onsets(audio.samples(), audio.sample_rate());
    let tempo = estimate_tempo(&beats);
    tracing::info!(
        duration_s = audio.duration(),
        beats = beats.len(),
        tempo_bpm = tempo.unwrap_or(0.0),
        "audio loaded"
    );
    Ok(audio.with_beats(beats))
}

fn f32le_to_samples(bytes: &[u8]) -> VizResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(VizError::evaluation(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/decode.rs"]
mod tests;
