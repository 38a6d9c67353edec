//! Oscillation-probability lookup tables: a pluggable physics engine, a
//! built-in constant-density matter engine, and a generator that tabulates
//! probabilities over energy bins with an on-disk skip cache.

mod engine;
mod generator;

pub use engine::{DmpEngine, OscillationEngine, ProbabilityMatrix, PropagationRequest};
pub use generator::{
    GenerationOutcome, GenerationStatus, OscillationTableGenerator, compute_probability,
    flavor_pairs,
};
