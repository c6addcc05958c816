//! Built-in transformation passes.

mod cse;
mod dce;
mod hge;
mod inplace;
mod renumber;
mod toffoli;

pub use cse::CommonSubexprElimination;
pub use dce::DeadOpElimination;
pub use hge::HermitianPairElimination;
pub use inplace::CnotInPlacing;
pub use renumber::QubitRenumber;
pub use toffoli::ToffoliDecomposition;
