//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during compilation passes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// An IR mutation failed or an invariant check tripped.
    #[error(transparent)]
    Ir(#[from] skinfaxi_ir::IrError),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
