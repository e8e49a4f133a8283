use crate::foundation::error::{VizError, VizResult};
use realfft::RealFftPlanner;
use realfft::num_complex::Complex;

/// Single-sided FFT magnitude spectrum with cached plans and reusable buffers.
pub(crate) struct MagnitudeSpectrum {
    planner: RealFftPlanner<f32>,
    input: Vec<f32>,
    output: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl MagnitudeSpectrum {
    pub(crate) fn new() -> Self {
        Self {
            planner: RealFftPlanner::new(),
            input: Vec::new(),
            output: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// `|rfft(samples)|`, `samples.len() / 2 + 1` values. Empty input yields an empty spectrum.
    pub(crate) fn magnitudes(&mut self, samples: &[f32]) -> VizResult<Vec<f32>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }
        let fft = self.planner.plan_fft_forward(samples.len());
        self.input.clear();
        self.input.extend_from_slice(samples);
        self.output.resize(fft.complex_len(), Complex::new(0.0, 0.0));
        self.scratch.resize(fft.get_scratch_len(), Complex::new(0.0, 0.0));
        fft.process_with_scratch(&mut self.input, &mut self.output, &mut self.scratch)
            .map_err(|e| VizError::evaluation(format!("fft failed: {e:?}")))?;
        Ok(self.output.iter().map(|c| c.norm()).collect())
    }
}

/// `x <- ln(1 + x)` in place.
pub(crate) fn log_compress(xs: &mut [f32]) {
    for x in xs {
        *x = x.ln_1p();
    }
}

/// `n` evenly spaced values from `lo` to `hi` inclusive.
pub(crate) fn linspace(lo: f32, hi: f32, n: usize) -> impl Iterator<Item = f32> {
    let step = if n > 1 { (hi - lo) / (n - 1) as f32 } else { 0.0 };
    (0..n).map(move |i| lo + step * i as f32)
}

/// Multiply by a linear ramp from `lo` (first bin) to `hi` (last bin).
pub(crate) fn apply_linear_weights(xs: &mut [f32], lo: f32, hi: f32) {
    let n = xs.len();
    for (x, w) in xs.iter_mut().zip(linspace(lo, hi, n)) {
        *x *= w;
    }
}

/// Divide by the maximum. A non-positive maximum leaves the values untouched.
pub(crate) fn normalize_by_max(xs: &mut [f32]) {
    let max = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() || max <= 0.0 {
        return;
    }
    for x in xs {
        *x /= max;
    }
}

/// Contiguous equal-width averaging down to `k` bins.
///
/// Bin `i` is the mean of `xs[i*step .. (i+1)*step]` with `step = len / k`. Inputs that already have
/// `k` or fewer values are returned as is.
pub(crate) fn resample_linear(xs: &[f32], k: usize) -> Vec<f32> {
    if k == 0 {
        return Vec::new();
    }
    if xs.len() <= k {
        return xs.to_vec();
    }
    let step = xs.len() / k;
    xs.chunks_exact(step)
        .take(k)
        .map(|chunk| chunk.iter().sum::<f32>() / step as f32)
        .collect()
}

/// Averaging over logarithmically spaced bin boundaries, giving low frequencies finer resolution.
///
/// Boundaries are `floor(10^(i * log10(len - 1) / k))` for `i in 0..=k`; a bin whose range is empty
/// is zero.
pub(crate) fn resample_log(xs: &[f32], k: usize) -> Vec<f32> {
    if k == 0 {
        return Vec::new();
    }
    if xs.len() <= k {
        return xs.to_vec();
    }
    let top = ((xs.len() - 1) as f64).log10();
    let bounds: Vec<usize> = (0..=k)
        .map(|i| 10f64.powf(top * i as f64 / k as f64) as usize)
        .map(|b| b.min(xs.len()))
        .collect();
    bounds
        .windows(2)
        .map(|w| {
            let (start, end) = (w[0], w[1]);
            if end > start {
                xs[start..end].iter().sum::<f32>() / (end - start) as f32
            } else {
                0.0
            }
        })
        .collect()
}

/// Coarse low/mid/high band energies of a magnitude spectrum: means over the first tenth, the
/// span from one tenth to one half, and the last tenth (rounded up).
pub(crate) fn band_means(mags: &[f32]) -> Option<(f32, f32, f32)> {
    let n = mags.len();
    if n <= 10 {
        return None;
    }
    let tenth = n / 10;
    let half = n / 2;
    let bass = crate::foundation::math::mean(&mags[..tenth]);
    let mid = if half > tenth {
        crate::foundation::math::mean(&mags[tenth..half])
    } else {
        1.0
    };
    let high = crate::foundation::math::mean(&mags[n - n.div_ceil(10)..]);
    Some((bass, mid, high))
}

/// Per-element exponential smoothing against the previous frame.
///
/// `out = cur + (prev - cur) * retain`. The first frame, and any frame whose length differs from
/// the previous one, passes through unchanged. Identical consecutive inputs are a fixed point.
#[derive(Clone, Debug)]
pub(crate) struct ExpSmoother {
    retain: f32,
    history: Option<Vec<f32>>,
}

impl ExpSmoother {
    /// `retain` is the weight of the previous frame, clamped to `[0, 1]`.
    pub(crate) fn new(retain: f32) -> Self {
        let retain = if retain.is_finite() {
            retain.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            retain,
            history: None,
        }
    }

    pub(crate) fn smooth(&mut self, mut current: Vec<f32>) -> Vec<f32> {
        if let Some(prev) = self.history.as_ref()
            && prev.len() == current.len()
            && self.retain > 0.0
        {
            for (c, &p) in current.iter_mut().zip(prev) {
                *c += (p - *c) * self.retain;
            }
        }
        self.history = Some(current.clone());
        current
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/spectrum.rs"]
mod tests;
