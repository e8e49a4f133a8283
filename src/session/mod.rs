//! Render sessions: time mapping, range rendering and the encoder hand-off.

pub(crate) mod render_session;
