//! Pixel-level building blocks shared by the layers.

pub(crate) mod blend;
pub(crate) mod blur;
pub(crate) mod color;
pub(crate) mod frame;
pub(crate) mod painter;
