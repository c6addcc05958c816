//! Reference evaluation for Skinfaxi circuits.
//!
//! Two evaluators back the compiler's correctness checks:
//!
//! - [`classical`]: executes the reversible gate set {Init, Not, CNot, CCNot,
//!   Measure} directly on bit environments, builds truth tables and decides
//!   semantic equivalence of two functions (exhaustively for small input
//!   spaces, by fixed-seed sampling beyond).
//! - [`statevector`]: a small dense simulator covering the full gate set
//!   including H/T/T†, used to check that the Clifford+T expansion of a
//!   Toffoli permutes basis states exactly like the original gate.

pub mod classical;
pub mod error;
pub mod statevector;

pub use classical::{EXHAUSTIVE_LIMIT, equivalent, run, truth_table};
pub use error::{SimError, SimResult};
pub use statevector::{STATEVECTOR_LIMIT, Statevector, run_statevector};
