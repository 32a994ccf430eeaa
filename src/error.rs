//! Error taxonomy for the scoring core.
//!
//! Validation failures name the offending field and surface to the caller.
//! Model/scaler misuse before fit is a programming-contract violation, fatal
//! to the call but not the process. Attribution faults are recovered inside
//! [`crate::explain`] and never appear here.

use thiserror::Error;

/// Malformed or incomplete input payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("payload must be a JSON object")]
    NotAnObject,

    /// One or more schema fields still missing after derivation fallbacks.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A present field could not be coerced to its numeric type.
    #[error("field `{field}` is not numeric (got {value})")]
    NotNumeric { field: String, value: String },
}

/// Scaler or model used outside its lifecycle contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("scaler used before fit")]
    ScalerNotFitted,

    #[error("model used before fit")]
    NotFitted,

    #[error("training matrix is empty")]
    EmptyTrainingSet,
}

/// Top-level error for a single scoring call.
#[derive(Debug, Clone, Error)]
pub enum ScoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Model(#[from] ModelError),
}
