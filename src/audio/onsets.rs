const FRAME: usize = 1024;
const HOP: usize = 512;
const HISTORY_FRAMES: usize = 43;
const SENSITIVITY: f32 = 1.5;
const ENERGY_FLOOR: f32 = 1e-4;
const MIN_GAP_SECS: f64 = 0.1;

/// Beat times in seconds picked from short-time energy peaks.
///
/// A frame is an onset when its energy is a local maximum, clears a small absolute floor, exceeds
/// the running mean of the preceding second or so by a fixed factor, and lies at least 100 ms after
/// the previous onset. Times refer to the frame center.
pub fn energy_onsets(samples: &[f32], sample_rate: u32) -> Vec<f64> {
    if sample_rate == 0 || samples.len() < FRAME {
        return Vec::new();
    }
    let sr = f64::from(sample_rate);
    let energies: Vec<f32> = (0..=(samples.len() - FRAME) / HOP)
        .map(|i| {
            let frame = &samples[i * HOP..i * HOP + FRAME];
            frame.iter().map(|s| s * s).sum::<f32>() / FRAME as f32
        })
        .collect();

    let mut onsets = Vec::new();
    let mut last: Option<f64> = None;
    for (i, &e) in energies.iter().enumerate() {
        if e < ENERGY_FLOOR {
            continue;
        }
        let prev = i.checked_sub(1).map_or(0.0, |p| energies[p]);
        let next = energies.get(i + 1).copied().unwrap_or(0.0);
        if e < prev || e < next {
            continue;
        }
        let history = &energies[i.saturating_sub(HISTORY_FRAMES)..i];
        let avg = crate::foundation::math::mean(history);
        if e <= avg * SENSITIVITY {
            continue;
        }
        let t = (i * HOP + FRAME / 2) as f64 / sr;
        if last.is_some_and(|l| t - l < MIN_GAP_SECS) {
            continue;
        }
        onsets.push(t);
        last = Some(t);
    }
    onsets
}

/// Tempo in beats per minute from the median inter-onset interval, when at least two onsets exist.
pub fn estimate_tempo(onsets: &[f64]) -> Option<f64> {
    let mut gaps: Vec<f64> = onsets
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|g| *g > 0.0)
        .collect();
    if gaps.is_empty() {
        return None;
    }
    gaps.sort_by(f64::total_cmp);
    let median = gaps[gaps.len() / 2];
    Some(60.0 / median)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/onsets.rs"]
mod tests;
