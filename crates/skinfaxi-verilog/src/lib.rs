//! SystemVerilog frontend handoff for Skinfaxi.
//!
//! The external parser elaborates the design and serializes its AST as JSON;
//! this crate decodes that JSON ([`ast`]) and lowers the combinational
//! subset into the quantum IR ([`lower`]), one reversible gadget per logical
//! operator:
//!
//! | HDL construct | emission |
//! |---|---|
//! | literal | `Init` per lane |
//! | copy | `CNot` into a fresh ancilla |
//! | `~x` | in-place `Not` |
//! | `a ^ b` | CNOT pair into an ancilla, in place onto a fresh operand when legal |
//! | `a & b` | Toffoli into an ancilla |
//! | `a \| b` | De Morgan: negate, Toffoli, restore, negate |
//!
//! ```rust
//! use skinfaxi_verilog::{lower, parse_ast};
//!
//! let json = r#"{"kind": "Root", "members": [{
//!     "kind": "Instance",
//!     "body": {
//!         "kind": "InstanceBody", "name": "passthrough", "definition": "passthrough",
//!         "members": [
//!             {"kind": "Port", "direction": "In", "internalSymbol": "a", "type": "logic"},
//!             {"kind": "Port", "direction": "Out", "internalSymbol": "y", "type": "logic"},
//!             {"kind": "ContinuousAssign", "assignment": {
//!                 "kind": "Assignment", "isNonBlocking": false,
//!                 "left": {"kind": "NamedValue", "symbol": "y", "type": "logic"},
//!                 "right": {"kind": "NamedValue", "symbol": "a", "type": "logic"}
//!             }}
//!         ]
//!     },
//!     "connections": []
//! }]}"#;
//!
//! let module = lower(&parse_ast(json).unwrap()).unwrap();
//! assert_eq!(module.num_ops(), 3); // init, cnot, measure
//! ```

pub mod ast;
pub mod error;
pub mod lower;

pub use ast::{Root, parse_bit_range};
pub use error::{LowerError, LowerResult};
pub use lower::{lower, parse_ast};
