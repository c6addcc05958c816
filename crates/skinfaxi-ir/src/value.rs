//! SSA values and their use lists.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::op::{FuncId, OpId};
use crate::qubit::{QubitRef, Type};

/// Stable identifier of an SSA value in its module's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A single use of a value: which operation reads it, and at which slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Use {
    /// The operation holding the operand.
    pub op: OpId,
    /// Operand index within that operation.
    pub index: usize,
}

/// What defines a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOwner {
    /// Result of an operation.
    Result(OpId),
    /// Block argument (function input lane).
    Argument {
        /// Owning function.
        func: FuncId,
        /// Argument position.
        index: usize,
    },
}

/// Arena record of an SSA value.
#[derive(Debug, Clone)]
pub struct ValueData {
    /// Value type (always `Bit` for gate operands and results).
    pub ty: Type,
    /// Position on a qubit line.
    pub qubit: QubitRef,
    /// Defining operation or block argument.
    pub owner: ValueOwner,
    /// All operand slots reading this value.
    pub uses: FxHashSet<Use>,
}

impl ValueData {
    /// Whether any operation reads this value.
    pub fn is_used(&self) -> bool {
        !self.uses.is_empty()
    }

    /// Whether this value is a block argument.
    pub fn is_argument(&self) -> bool {
        matches!(self.owner, ValueOwner::Argument { .. })
    }
}
