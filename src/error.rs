// Error Types - fatal numerical and input conditions
// Every fatal condition propagates to the caller as a distinct variant;
// none of them is retried (a deterministic numerical failure would only
// fail again).

use thiserror::Error;

/// Main error type for simulation construction and stepping
#[derive(Error, Debug)]
pub enum SimError {
    /// Newton iteration on Kepler's equation failed to converge within the
    /// iteration cap; the produced orbit would be garbage
    #[error("Kepler's equation did not converge for {body} after {iterations} iterations (e = {eccentricity})")]
    KeplerNonConvergence {
        body: String,
        iterations: u32,
        eccentricity: f64,
    },

    /// Zero separation between two bodies during force evaluation
    #[error("zero separation between {body_a} and {body_b} during force evaluation")]
    DegenerateGeometry { body_a: String, body_b: String },

    /// A seed-state record is missing a field or has the wrong vector arity
    #[error("malformed seed record: {0}")]
    MalformedSeedRecord(String),

    /// A start-date string could not be parsed as [-]Y-MM-DD
    #[error("invalid date string {input:?}: {reason}")]
    InvalidDate { input: String, reason: String },
}

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;
