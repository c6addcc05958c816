//! Skinfaxi quantum circuit intermediate representation.
//!
//! This crate provides the SSA IR the whole compilation stack operates on:
//! a module of functions whose bodies are ordered lists of reversible gate
//! operations over the set {Init, Not, CNot, CCNot, Measure} plus the
//! Clifford+T gates {H, T, T†} that appear after Toffoli decomposition.
//!
//! # Qubit-state naming
//!
//! Every SSA value carries a [`QubitRef`]: a qubit line number N and a state
//! index S, printed as `q<N>_<S>`. A gate reads the latest state of each
//! operand line and bumps the state of its last operand (the *target*);
//! earlier operands are read-only controls. [`OpKind::Init`] allocates a
//! fresh line at state 0. At any point of a body there is exactly one live
//! state per line, and state indices grow monotonically in document order —
//! the optimization passes rely on (and re-establish) these invariants.
//!
//! # Example
//!
//! ```rust
//! use skinfaxi_ir::{Module, OpKind, Type};
//!
//! let mut module = Module::new();
//! let func = module.add_func("xor");
//! let a = module.add_argument(func, Type::Bit);
//! let b = module.add_argument(func, Type::Bit);
//!
//! // XOR gadget: two CNOTs into a fresh ancilla.
//! let init = module.append(func, OpKind::Init { value: false }, &[]).unwrap();
//! let anc = module.op(init).result;
//! let first = module.append(func, OpKind::CNot, &[a, anc]).unwrap();
//! let partial = module.op(first).result;
//! let second = module.append(func, OpKind::CNot, &[b, partial]).unwrap();
//! let result = module.op(second).result;
//! module.append(func, OpKind::Measure, &[result]).unwrap();
//!
//! assert_eq!(module.num_ops(), 4);
//! module.verify().unwrap();
//! ```

pub mod error;
pub mod module;
pub mod op;
pub mod printer;
pub mod qubit;
pub mod value;

pub use error::{IrError, IrResult};
pub use module::{FuncData, Module, OpIter};
pub use op::{FuncId, OpData, OpId, OpKind};
pub use qubit::{QubitRef, Type};
pub use value::{Use, ValueData, ValueId, ValueOwner};
