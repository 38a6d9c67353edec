//! Neutrino oscillation spectrum tooling: flat-table codec, flavor naming,
//! oscillation-probability tables and the flux to reconstructed-spectrum
//! pipeline.

pub mod codec;
pub mod common;
pub mod domain;
pub mod modules;
pub mod numerics;
