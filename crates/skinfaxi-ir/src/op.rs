//! Operation kinds and arena records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::ValueId;

/// Stable identifier of an operation in its module's arena.
///
/// Ids are never reused; an erased operation leaves a tombstone slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpId(pub u32);

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}

/// Stable identifier of a function in its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FuncId(pub u32);

/// The closed set of gate-level operations.
///
/// `Init` allocates a fresh qubit line holding a literal. All other kinds
/// read their operands and bump the state of the last operand (the target);
/// earlier operands are read-only controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpKind {
    /// Allocate a fresh qubit line prepared in the given classical state.
    Init {
        /// Literal initial value.
        value: bool,
    },
    /// Pauli-X on the target.
    Not,
    /// Controlled-X: one control, one target.
    CNot,
    /// Toffoli: two controls, one target.
    CCNot,
    /// Read out the target line. Program-observable: never dead.
    Measure,
    /// Hadamard on the target (appears after Toffoli decomposition).
    H,
    /// T phase gate.
    T,
    /// T-dagger phase gate.
    TDagger,
}

impl OpKind {
    /// Dialect name used by the printer.
    pub fn name(self) -> &'static str {
        match self {
            OpKind::Init { .. } => "init",
            OpKind::Not => "not",
            OpKind::CNot => "cnot",
            OpKind::CCNot => "ccnot",
            OpKind::Measure => "measure",
            OpKind::H => "h",
            OpKind::T => "t",
            OpKind::TDagger => "tdagger",
        }
    }

    /// Number of operands this kind takes.
    pub fn num_operands(self) -> usize {
        match self {
            OpKind::Init { .. } => 0,
            OpKind::Not | OpKind::Measure | OpKind::H | OpKind::T | OpKind::TDagger => 1,
            OpKind::CNot => 2,
            OpKind::CCNot => 3,
        }
    }

    /// Number of read-only control operands (the rest is the target).
    pub fn num_controls(self) -> usize {
        self.num_operands().saturating_sub(1)
    }

    /// Whether this operation advances its target line to a new state.
    ///
    /// `Init` allocates instead of advancing, and `Measure` only reads: its
    /// result is the classical observation, so the line's live state is
    /// still the measured value.
    pub fn bumps_line(self) -> bool {
        !matches!(self, OpKind::Init { .. } | OpKind::Measure)
    }

    /// Whether this gate is its own inverse.
    pub fn is_self_inverse(self) -> bool {
        matches!(
            self,
            OpKind::Not | OpKind::CNot | OpKind::CCNot | OpKind::H
        )
    }

    /// The inverse gate, if it is in the gate set.
    pub fn inverse(self) -> Option<OpKind> {
        match self {
            k if k.is_self_inverse() => Some(k),
            OpKind::T => Some(OpKind::TDagger),
            OpKind::TDagger => Some(OpKind::T),
            _ => None,
        }
    }

    /// Discriminant tag ignoring payloads, used for hashing histories.
    pub fn tag(self) -> u8 {
        match self {
            OpKind::Init { .. } => 0,
            OpKind::Not => 1,
            OpKind::CNot => 2,
            OpKind::CCNot => 3,
            OpKind::Measure => 4,
            OpKind::H => 5,
            OpKind::T => 6,
            OpKind::TDagger => 7,
        }
    }
}

/// Arena record of a single operation.
///
/// Operations form an intrusive doubly-linked list per function body. The
/// target operand is the last one by convention; `Init` has no operands.
#[derive(Debug, Clone)]
pub struct OpData {
    /// What the operation does.
    pub kind: OpKind,
    /// Ordered operands, target last.
    pub operands: Vec<ValueId>,
    /// The single result value.
    pub result: ValueId,
    /// Owning function body.
    pub func: FuncId,
    /// Previous operation in the body.
    pub prev: Option<OpId>,
    /// Next operation in the body.
    pub next: Option<OpId>,
}

impl OpData {
    /// The state-bumping operand, if any.
    pub fn target(&self) -> Option<ValueId> {
        self.operands.last().copied()
    }

    /// The read-only control operands.
    pub fn controls(&self) -> &[ValueId] {
        match self.kind {
            // Measure's single operand is its target, not a control.
            OpKind::Measure => &[],
            _ => {
                let n = self.operands.len();
                &self.operands[..n.saturating_sub(1)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity() {
        assert_eq!(OpKind::Init { value: false }.num_operands(), 0);
        assert_eq!(OpKind::Not.num_operands(), 1);
        assert_eq!(OpKind::CNot.num_operands(), 2);
        assert_eq!(OpKind::CCNot.num_operands(), 3);
        assert_eq!(OpKind::CCNot.num_controls(), 2);
        assert_eq!(OpKind::Measure.num_controls(), 0);
    }

    #[test]
    fn test_inverse() {
        assert!(OpKind::Not.is_self_inverse());
        assert!(OpKind::H.is_self_inverse());
        assert_eq!(OpKind::T.inverse(), Some(OpKind::TDagger));
        assert_eq!(OpKind::TDagger.inverse(), Some(OpKind::T));
        assert_eq!(OpKind::Measure.inverse(), None);
        assert_eq!(OpKind::Init { value: true }.inverse(), None);
    }

    #[test]
    fn test_bumps_line() {
        assert!(OpKind::Not.bumps_line());
        assert!(OpKind::CCNot.bumps_line());
        assert!(OpKind::T.bumps_line());
        assert!(!OpKind::Measure.bumps_line());
        assert!(!OpKind::Init { value: false }.bumps_line());
    }

    #[test]
    fn test_names() {
        assert_eq!(OpKind::CCNot.name(), "ccnot");
        assert_eq!(OpKind::TDagger.name(), "tdagger");
        assert_eq!(OpKind::Init { value: true }.name(), "init");
    }
}
