//! Skinfaxi optimization pipeline.
//!
//! Transforms lowered quantum modules to reduce qubit count, gate count and
//! T-cost. The pipeline is a fixed round of passes iterated to a fixpoint:
//!
//! 1. **Dead-op elimination** — erase unobserved gates (`Measure` is always
//!    live).
//! 2. **Qubit renumber** — compact line numbers by first appearance.
//! 3. **CSE** — merge gates whose operands share a value *history*, gated on
//!    the non-idempotence hazards reversible gates introduce.
//! 4. **Hermitian-pair elimination** — cancel adjacent self-inverse pairs
//!    and T·T† pairs.
//! 5. **In-placing** — rewrite `Init` + CNOT chains onto a dead control
//!    line, saving the ancilla.
//!
//! A separate [`passes::ToffoliDecomposition`] expands each Toffoli into the
//! seven-T Clifford+T gadget for metric evaluation; running the fixpoint
//! again afterwards lets HGE cancel the T·T† chatter between adjacent
//! gadgets.
//!
//! # Example
//!
//! ```rust
//! use skinfaxi_compile::{FixpointDriver, TransformStats};
//! use skinfaxi_ir::{Module, OpKind, Type};
//!
//! // y = a ^ a, which optimizes to a constant |0⟩.
//! let mut module = Module::new();
//! let func = module.add_func("xor_self");
//! let a = module.add_argument(func, Type::Bit);
//! let init = module.append(func, OpKind::Init { value: false }, &[]).unwrap();
//! let anc = module.op(init).result;
//! let c1 = module.append(func, OpKind::CNot, &[a, anc]).unwrap();
//! let r1 = module.op(c1).result;
//! let c2 = module.append(func, OpKind::CNot, &[a, r1]).unwrap();
//! let r2 = module.op(c2).result;
//! module.append(func, OpKind::Measure, &[r2]).unwrap();
//!
//! let mut stats = TransformStats::default();
//! FixpointDriver::new().run(&mut module, &mut stats).unwrap();
//! assert_eq!(module.num_ops(), 2); // init + measure
//! ```

pub mod driver;
pub mod error;
pub mod metrics;
pub mod pass;
pub mod passes;
pub mod stats;

pub use driver::FixpointDriver;
pub use error::{CompileError, CompileResult};
pub use metrics::CircuitMetrics;
pub use pass::Pass;
pub use stats::TransformStats;
