//! Error types for the IR crate.

use thiserror::Error;

use crate::op::OpId;
use crate::value::ValueId;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Tried to erase an operation whose result still has uses.
    #[error("cannot erase {op}: its result {value} still has {uses} use(s)")]
    EraseWithUses {
        /// The operation that could not be erased.
        op: OpId,
        /// Its still-used result.
        value: ValueId,
        /// Remaining use count.
        uses: usize,
    },

    /// Operand count does not match the operation kind.
    #[error("operation '{kind}' takes {expected} operand(s), got {got}")]
    OperandCountMismatch {
        /// Gate name.
        kind: &'static str,
        /// Required arity.
        expected: usize,
        /// Provided arity.
        got: usize,
    },

    /// A structural or naming invariant does not hold.
    ///
    /// This is a compiler bug, not a user error: a pass left the module in a
    /// state the naming discipline forbids. The message carries the rendered
    /// offending operation.
    #[error("IR invariant violated: {0}")]
    InvariantViolation(String),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
