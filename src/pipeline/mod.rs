//! Layer registry and the orchestrator that folds a frame through the configured layers.

pub(crate) mod registry;
pub(crate) mod renderer;
