use crate::foundation::error::{VizError, VizResult};
use crate::foundation::math::to_channel;
use crate::render::frame::Frame;

/// How a layer's isolated output is combined with the frame accumulated so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Replace the background.
    #[default]
    Overwrite,
    /// `B·(1−a) + F·a`
    Normal,
    /// `clamp(B + F·a)`
    Add,
    /// `B·(F·a + 1 − a)` on normalized channels.
    Multiply,
    /// `1 − (B′·F′·a + B′·(1−a))` with `X′ = 1 − X` on normalized channels.
    Screen,
}

impl BlendMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "overwrite" => Some(Self::Overwrite),
            "normal" => Some(Self::Normal),
            "add" => Some(Self::Add),
            "multiply" => Some(Self::Multiply),
            "screen" => Some(Self::Screen),
            _ => None,
        }
    }

    /// Like [`BlendMode::parse`], falling back to [`BlendMode::Overwrite`] with a warning.
    pub fn parse_or_overwrite(name: &str, layer: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            tracing::warn!(layer, blend_mode = name, "unknown blend mode, using overwrite");
            Self::Overwrite
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Normal => "normal",
            Self::Add => "add",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
        }
    }
}

/// Combine one channel. `opacity` is clamped to `[0, 1]`.
pub fn blend_channel(mode: BlendMode, bg: u8, fg: u8, opacity: f32) -> u8 {
    let a = opacity.clamp(0.0, 1.0);
    let (b, f) = (f32::from(bg), f32::from(fg));
    match mode {
        BlendMode::Overwrite => fg,
        BlendMode::Normal => to_channel(b * (1.0 - a) + f * a),
        BlendMode::Add => to_channel(b + f * a),
        BlendMode::Multiply => {
            let (bn, fn_) = (b / 255.0, f / 255.0);
            to_channel(bn * (fn_ * a + (1.0 - a)) * 255.0)
        }
        BlendMode::Screen => {
            let (bi, fi) = (1.0 - b / 255.0, 1.0 - f / 255.0);
            to_channel((1.0 - (bi * fi * a + bi * (1.0 - a))) * 255.0)
        }
    }
}

/// Blend `fg` into `bg` in place.
pub fn blend_in_place(mode: BlendMode, bg: &mut Frame, fg: &Frame, opacity: f32) -> VizResult<()> {
    if bg.width != fg.width || bg.height != fg.height || bg.data.len() != fg.data.len() {
        return Err(VizError::evaluation(format!(
            "blend expects equal frame sizes, got {}x{} and {}x{}",
            bg.width, bg.height, fg.width, fg.height
        )));
    }
    if mode == BlendMode::Overwrite {
        bg.data.copy_from_slice(&fg.data);
        return Ok(());
    }
    for (d, &s) in bg.data.iter_mut().zip(&fg.data) {
        *d = blend_channel(mode, *d, s, opacity);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
