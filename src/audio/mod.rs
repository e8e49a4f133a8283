//! Audio collaborator: the [`AudioSource`] capability consumed by layers, an in-memory PCM
//! implementation, and the frequency-domain helpers the spectrum and particle layers share.

pub(crate) mod decode;
pub(crate) mod onsets;
pub(crate) mod source;
pub(crate) mod spectrum;
