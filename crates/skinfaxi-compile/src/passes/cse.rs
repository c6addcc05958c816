//! Common-subexpression elimination under reversible-gate semantics.
//!
//! Textbook CSE is unsound here: two syntactically equal gates compute the
//! same output only if their operand qubits still hold the values they held
//! at the first occurrence. Equality is therefore taken over value
//! *histories* — the structural recipe producing a value, rooted at block
//! arguments and `Init`s — and a match may only be merged when nothing later
//! bumps the first result's line and no read-after-write hazard exists
//! between the two occurrences.
//!
//! Matching is restricted to the classical gates {Not, CNot, CCNot}: phase
//! gates are not value producers in the classical sense, and merging them
//! would drop phases.

use rustc_hash::FxHashMap;
use skinfaxi_ir::{FuncId, Module, OpId, OpKind, Type, ValueId, ValueOwner};
use tracing::trace;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::stats::TransformStats;

/// Interned history of a value.
type HistoryId = u32;

/// Structural recipe of a value: how it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum HistoryKey {
    /// A block argument, identified by position.
    Arg(u32),
    /// An `Init` result.
    Init(bool),
    /// A gate result over operand histories (canonicalized).
    Op(OpKind, Vec<HistoryId>),
}

/// Hash-consing table for histories, scoped to one function.
#[derive(Default)]
struct HistoryTable {
    interned: FxHashMap<HistoryKey, HistoryId>,
    memo: FxHashMap<ValueId, HistoryId>,
}

impl HistoryTable {
    fn intern(&mut self, key: HistoryKey) -> HistoryId {
        let next = self.interned.len() as HistoryId;
        *self.interned.entry(key).or_insert(next)
    }

    /// History of a value, memoized per pass.
    fn history(&mut self, module: &Module, value: ValueId) -> HistoryId {
        if let Some(&id) = self.memo.get(&value) {
            return id;
        }
        let key = match module.value(value).owner {
            ValueOwner::Argument { index, .. } => HistoryKey::Arg(index as u32),
            ValueOwner::Result(op) => {
                let data = module.op(op);
                match data.kind {
                    OpKind::Init { value } => HistoryKey::Init(value),
                    kind => {
                        let operands = canonical_operands(module, op);
                        let histories = operands
                            .iter()
                            .map(|&v| self.history(module, v))
                            .collect();
                        HistoryKey::Op(kind, histories)
                    }
                }
            }
        };
        let id = self.intern(key);
        self.memo.insert(value, id);
        id
    }
}

/// Operand list with commutative controls in canonical order.
///
/// Toffoli controls commute; sorting them by line number before hashing lets
/// `CCNot(a, b, t)` and `CCNot(b, a, t)` collide.
fn canonical_operands(module: &Module, op: OpId) -> Vec<ValueId> {
    let data = module.op(op);
    let mut operands = data.operands.clone();
    if matches!(data.kind, OpKind::CCNot) {
        let lines = |v: ValueId| module.value(v).qubit.qubit;
        if lines(operands[0]) > lines(operands[1]) {
            operands.swap(0, 1);
        }
    }
    operands
}

/// Key identifying CSE-equivalent operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct OpKey {
    kind: OpKind,
    result_ty: Type,
    operands: Vec<HistoryId>,
}

/// Common-subexpression elimination with qubit-history hashing.
pub struct CommonSubexprElimination;

impl CommonSubexprElimination {
    /// Whether anything after `existing` bumps its result's line.
    ///
    /// If so, merged readers rewired onto that result could observe a stale
    /// state, so the match is rejected.
    fn has_later_modification(module: &Module, existing: OpId) -> bool {
        let result = module.op(existing).result;
        let mut cur = module.op(existing).next;
        while let Some(id) = cur {
            let data = module.op(id);
            if data.kind.bumps_line() && data.target() == Some(result) {
                return true;
            }
            cur = data.next;
        }
        false
    }

    /// Read-after-write hazard between the occurrences: if something bumps
    /// the second's target line later, the first's result must not be read
    /// after that point.
    fn has_read_after_write(module: &Module, existing: OpId, second: OpId) -> bool {
        let second_result = module.op(second).result;
        let existing_result = module.op(existing).result;

        let mut cur = module.op(second).next;
        while let Some(id) = cur {
            let data = module.op(id);
            if data.kind.bumps_line() && data.target() == Some(second_result) {
                break;
            }
            cur = data.next;
        }
        let Some(write) = cur else {
            return false;
        };

        let mut cur = module.op(write).next;
        while let Some(id) = cur {
            let data = module.op(id);
            if data.operands.contains(&existing_result) {
                return true;
            }
            cur = data.next;
        }
        false
    }

    fn simplify_function(
        &self,
        module: &mut Module,
        func: FuncId,
        stats: &mut TransformStats,
    ) -> CompileResult<()> {
        let mut table = HistoryTable::default();
        let mut known: FxHashMap<OpKey, OpId> = FxHashMap::default();

        let ops: Vec<OpId> = module.ops(func).collect();
        for op in ops {
            let kind = module.op(op).kind;
            if !matches!(kind, OpKind::Not | OpKind::CNot | OpKind::CCNot) {
                continue;
            }

            // Algebraic folds.
            match kind {
                OpKind::CCNot if module.op(op).operands[0] == module.op(op).operands[1] => {
                    // Equal controls: CCNot(x, x, t) = CNot(x, t).
                    let x = module.op(op).operands[0];
                    let t = module.op(op).operands[2];
                    let cnot = module.insert_before(op, OpKind::CNot, &[x, t])?;
                    let new = module.op(cnot).result;
                    let old = module.op(op).result;
                    module.replace_all_uses(old, new);
                    module.erase(op)?;
                    stats.algebraic_rewrites += 1;
                    continue;
                }
                OpKind::CNot if module.op(op).operands[0] == module.op(op).operands[1] => {
                    // Self-CNOT zeroes the value: replace by a fresh |0⟩.
                    let init = module.insert_before(op, OpKind::Init { value: false }, &[])?;
                    let new = module.op(init).result;
                    let old = module.op(op).result;
                    module.replace_all_uses(old, new);
                    module.erase(op)?;
                    stats.algebraic_rewrites += 1;
                    continue;
                }
                _ => {}
            }

            let operands = canonical_operands(module, op);
            let key = OpKey {
                kind,
                result_ty: module.value(module.op(op).result).ty,
                operands: operands
                    .iter()
                    .map(|&v| table.history(module, v))
                    .collect(),
            };

            if let Some(&existing) = known.get(&key) {
                if !Self::has_later_modification(module, existing)
                    && !Self::has_read_after_write(module, existing, op)
                {
                    trace!(
                        second = %module.render_op(op),
                        first = %module.render_op(existing),
                        "merging common subexpression"
                    );
                    let kept = module.op(existing).result;
                    let old = module.op(op).result;
                    module.replace_all_uses(old, kept);
                    module.erase(op)?;
                    stats.cse_merged += 1;
                    continue;
                }
            }
            known.insert(key, op);
        }
        Ok(())
    }
}

impl Pass for CommonSubexprElimination {
    fn name(&self) -> &'static str {
        "cse"
    }

    fn run(&self, module: &mut Module, stats: &mut TransformStats) -> CompileResult<()> {
        for func in module.func_ids().collect::<Vec<_>>() {
            self.simplify_function(module, func, stats)?;
        }
        // Merged lineages changed line ownership downstream; re-derive labels.
        module.relabel_states();
        Ok(())
    }
}
