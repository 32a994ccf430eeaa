//! Dataset Module - Synthetic Training Data
//!
//! The model trains on a seeded synthetic corpus generated at process start;
//! nothing is persisted or collected at runtime.

pub mod synthetic;

pub use synthetic::{generate, SyntheticConfig};
