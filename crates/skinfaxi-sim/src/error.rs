//! Error types for the simulation crate.

use thiserror::Error;

/// Errors raised by the reference evaluators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// The classical interpreter met a gate with no classical semantics.
    #[error("gate '{0}' has no classical interpretation")]
    NonClassicalGate(&'static str),

    /// Input bit count does not match the function's arguments.
    #[error("function takes {expected} input bit(s), got {got}")]
    InputCountMismatch {
        /// Argument lane count.
        expected: usize,
        /// Provided bit count.
        got: usize,
    },

    /// The circuit is too wide for the requested evaluation.
    #[error("circuit uses {qubits} qubit(s), limit for this evaluation is {limit}")]
    TooManyQubits {
        /// Lines in the circuit.
        qubits: usize,
        /// Supported maximum.
        limit: usize,
    },

    /// Two circuits compared for equivalence disagree on input arity.
    #[error("cannot compare functions with {left} and {right} input bit(s)")]
    ArityMismatch {
        /// Inputs of the left function.
        left: usize,
        /// Inputs of the right function.
        right: usize,
    },
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
