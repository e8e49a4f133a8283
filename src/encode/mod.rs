//! Frame sinks.
//!
//! Sinks consume rendered frames in timeline order and are driven by
//! [`RenderSession::render_range`](crate::RenderSession::render_range).

pub(crate) mod ffmpeg;
pub(crate) mod sink;
