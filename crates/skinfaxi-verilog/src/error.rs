//! Error types for the frontend crate.

use thiserror::Error;

/// Errors raised while decoding or lowering the frontend AST.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LowerError {
    /// The JSON does not decode into the known node shapes.
    #[error("malformed AST: {0}")]
    AstJson(#[from] serde_json::Error),

    /// A node combination the lowering does not accept.
    #[error("malformed AST: {0}")]
    MalformedAst(String),

    /// An operator outside the combinational subset.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// A referenced symbol with no live binding.
    #[error("unbound symbol '{0}'")]
    UnboundSymbol(String),

    /// Operand widths disagree across an operator.
    #[error("width mismatch: {left} vs {right} lanes in '{context}'")]
    WidthMismatch {
        /// Lane count of the left operand.
        left: usize,
        /// Lane count of the right operand.
        right: usize,
        /// Operator or construct involved.
        context: String,
    },

    /// A literal that does not parse as an unsigned integer.
    #[error("bad literal '{0}'")]
    BadLiteral(String),

    /// A lane index outside the declared range.
    #[error("lane index {index} out of range for '{symbol}'")]
    IndexOutOfRange {
        /// Selected symbol.
        symbol: String,
        /// Requested lane.
        index: u32,
    },

    /// IR construction failed.
    #[error(transparent)]
    Ir(#[from] skinfaxi_ir::IrError),
}

/// Result type for frontend operations.
pub type LowerResult<T> = Result<T, LowerError>;
