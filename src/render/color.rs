use crate::foundation::core::Rgb8;
use crate::foundation::math::to_channel;

/// `a * (1 - ratio) + b * ratio` per channel, with `ratio` clamped to `[0, 1]` and rounded to the
/// nearest channel value. The endpoints return `a` and `b` exactly.
pub fn gradient(a: Rgb8, b: Rgb8, ratio: f32) -> Rgb8 {
    let t = if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    };
    let mix = |x: u8, y: u8| to_channel(f32::from(x) * (1.0 - t) + f32::from(y) * t);
    Rgb8::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}

#[cfg(test)]
#[path = "../../tests/unit/render/color.rs"]
mod tests;
