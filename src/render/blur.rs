use crate::foundation::error::{VizError, VizResult};
use crate::render::frame::Frame;
use rayon::prelude::*;

const CH: usize = Frame::CHANNELS;

/// Gaussian blur with an odd `ksize × ksize` kernel and the sigma OpenCV derives for that size.
///
/// Even sizes are bumped to the next odd value; sizes below 3 return the frame unchanged.
/// The radius is capped at the longer frame side, past which extra taps only re-read edges.
pub fn gaussian_blur(frame: &Frame, ksize: u32) -> VizResult<Frame> {
    let ksize = ksize | 1;
    if ksize < 3 {
        return Ok(frame.clone());
    }
    let sigma = 0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let radius = (ksize / 2).min(frame.width.max(frame.height).max(1));
    let data = blur_rgb8(&frame.data, frame.width, frame.height, radius, sigma)?;
    Frame::from_raw(frame.width, frame.height, data)
}

/// Kernel size for a background blur amount: `2·amount + 1`, forced odd and at least 3.
pub fn kernel_for_amount(amount: f32) -> u32 {
    let k = ((amount * 2.0) as u32).saturating_add(1);
    (k | 1).max(3)
}

/// Separable Q16 Gaussian over packed RGB8 with clamped edges.
pub fn blur_rgb8(src: &[u8], width: u32, height: u32, radius: u32, sigma: f32) -> VizResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(CH))
        .ok_or_else(|| VizError::evaluation("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(VizError::evaluation(
            "blur_rgb8 expects src matching width*height*3",
        ));
    }
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width as usize, &kernel);
    vertical_pass(&tmp, &mut out, width as usize, height as usize, &kernel);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> VizResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(VizError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(VizError::evaluation("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    // Push the rounding residue into the center tap so the taps sum to exactly 1.0 in Q16.
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: usize, k: &[u32]) {
    let radius = (k.len() / 2) as isize;
    let last = width as isize - 1;
    dst.par_chunks_mut(width * CH)
        .zip(src.par_chunks(width * CH))
        .for_each(|(out_row, in_row)| {
            for x in 0..width {
                let mut acc = [0u64; CH];
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = (x as isize + ki as isize - radius).clamp(0, last) as usize;
                    for c in 0..CH {
                        acc[c] += u64::from(kw) * u64::from(in_row[sx * CH + c]);
                    }
                }
                for c in 0..CH {
                    out_row[x * CH + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: usize, height: usize, k: &[u32]) {
    let radius = (k.len() / 2) as isize;
    let last = height as isize - 1;
    let stride = width * CH;
    dst.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, out_row)| {
            for x in 0..width {
                let mut acc = [0u64; CH];
                for (ki, &kw) in k.iter().enumerate() {
                    let sy = (y as isize + ki as isize - radius).clamp(0, last) as usize;
                    let idx = sy * stride + x * CH;
                    for c in 0..CH {
                        acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                    }
                }
                for c in 0..CH {
                    out_row[x * CH + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
