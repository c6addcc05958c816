//! Aggregated transformation counters.

use serde::Serialize;
use std::fmt;

/// What the optimization pipeline eliminated and rewrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    /// Operations erased by dead-op elimination.
    pub dead_ops_removed: usize,
    /// Second occurrences merged by common-subexpression elimination.
    pub cse_merged: usize,
    /// Algebraic rewrites folded into the CSE pass.
    pub algebraic_rewrites: usize,
    /// Inverse pairs removed by Hermitian-gate elimination.
    pub hge_pairs: usize,
    /// CNOT chains rewritten in place onto a dead control.
    pub chains_inplaced: usize,
    /// Toffolis expanded into the Clifford+T gadget.
    pub toffolis_decomposed: usize,
    /// Full pass rounds the fixpoint driver executed.
    pub rounds: usize,
}

impl fmt::Display for TransformStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fixpoint rounds:        {}", self.rounds)?;
        writeln!(f, "dead ops removed:       {}", self.dead_ops_removed)?;
        writeln!(f, "CSE merges:             {}", self.cse_merged)?;
        writeln!(f, "algebraic rewrites:     {}", self.algebraic_rewrites)?;
        writeln!(f, "Hermitian pairs:        {}", self.hge_pairs)?;
        writeln!(f, "chains written in place: {}", self.chains_inplaced)?;
        write!(f, "Toffolis decomposed:    {}", self.toffolis_decomposed)
    }
}
