//! Qubit line renumbering.

use rustc_hash::FxHashMap;
use skinfaxi_ir::{Module, QubitRef, ValueId};

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::stats::TransformStats;

/// Compact qubit line numbers into `{0, 1, …, K-1}`.
///
/// Lines are numbered by first appearance in document order (arguments, then
/// operation results, function by function); state indices are untouched.
/// Idempotent: a module already in first-appearance order is left unchanged.
pub struct QubitRenumber;

impl Pass for QubitRenumber {
    fn name(&self) -> &'static str {
        "renumber"
    }

    fn run(&self, module: &mut Module, _stats: &mut TransformStats) -> CompileResult<()> {
        let mut map: FxHashMap<u32, u32> = FxHashMap::default();
        let mut values: Vec<ValueId> = vec![];

        for func in module.func_ids().collect::<Vec<_>>() {
            for &arg in &module.func(func).args {
                values.push(arg);
            }
            for op in module.ops(func) {
                values.push(module.op(op).result);
            }
        }

        for &value in &values {
            let line = module.value(value).qubit.qubit;
            let next = map.len() as u32;
            map.entry(line).or_insert(next);
        }
        for value in values {
            let q = module.value(value).qubit;
            module.set_qubit(
                value,
                QubitRef {
                    qubit: map[&q.qubit],
                    state: q.state,
                },
            );
        }
        module.set_num_qubits(map.len() as u32);
        Ok(())
    }
}
