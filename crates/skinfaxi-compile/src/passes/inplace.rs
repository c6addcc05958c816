//! In-placing of CNOT chains onto a dead control line.
//!
//! An `Init(0)` followed by a contiguous CNOT chain (Xs on the same line
//! permitted) accumulates the XOR of the chain controls into a fresh
//! ancilla. When one control line is never referenced again after its CNOT,
//! the chain can write into that line instead: the `Init` and the CNOT that
//! consumed the chosen control disappear and the ancilla is never allocated.
//!
//! The chosen control must appear exactly once among the chain controls and
//! intermediate chain states must have no reader outside the chain; both
//! checks are exact, not approximate.

use skinfaxi_ir::{Module, OpId, OpKind};
use tracing::trace;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::stats::TransformStats;

/// Rewrite XOR-accumulator chains in place.
pub struct CnotInPlacing;

impl CnotInPlacing {
    /// Collect the contiguous chain of CNot/Not ops extending `init`'s line.
    fn collect_chain(module: &Module, init: OpId) -> Vec<OpId> {
        let line = module.value(module.op(init).result).qubit.qubit;
        let mut chain = vec![];
        let mut cur = module.op(init).next;
        while let Some(id) = cur {
            let data = module.op(id);
            let on_line = matches!(data.kind, OpKind::CNot | OpKind::Not)
                && module.value(data.result).qubit.qubit == line;
            if !on_line {
                break;
            }
            chain.push(id);
            cur = data.next;
        }
        chain
    }

    /// Whether any operation after `from` references line `line`.
    fn line_used_after(module: &Module, from: OpId, line: u32) -> bool {
        let mut cur = module.op(from).next;
        while let Some(id) = cur {
            let data = module.op(id);
            if data
                .operands
                .iter()
                .any(|&v| module.value(v).qubit.qubit == line)
            {
                return true;
            }
            cur = data.next;
        }
        false
    }

    /// Pick a chain CNOT whose control line is dead after it.
    fn choose_control(module: &Module, chain: &[OpId]) -> Option<OpId> {
        let control_line = |op: OpId| -> Option<u32> {
            let data = module.op(op);
            match data.kind {
                OpKind::CNot => Some(module.value(data.operands[0]).qubit.qubit),
                _ => None,
            }
        };

        for &candidate in chain {
            let Some(line) = control_line(candidate) else {
                continue;
            };
            let occurrences = chain
                .iter()
                .filter(|&&op| control_line(op) == Some(line))
                .count();
            if occurrences == 1 && !Self::line_used_after(module, candidate, line) {
                return Some(candidate);
            }
        }
        None
    }

    fn rewrite(
        &self,
        module: &mut Module,
        init: OpId,
        chain: &[OpId],
        chosen: OpId,
    ) -> CompileResult<()> {
        let mut current = module.op(chosen).operands[0];
        let chosen_result = module.op(chosen).result;

        for &op in chain {
            if op == chosen {
                continue;
            }
            let target_index = module.op(op).operands.len() - 1;
            module.set_operand(op, target_index, current);
            current = module.op(op).result;
        }

        // If the chosen CNOT was the tail, downstream readers move to the new
        // final state of the chain.
        module.replace_all_uses(chosen_result, current);
        module.erase(chosen)?;
        module.erase(init)?;
        Ok(())
    }
}

impl Pass for CnotInPlacing {
    fn name(&self) -> &'static str {
        "inplace"
    }

    fn run(&self, module: &mut Module, stats: &mut TransformStats) -> CompileResult<()> {
        for func in module.func_ids().collect::<Vec<_>>() {
            let ops: Vec<OpId> = module.ops(func).collect();
            for op in ops {
                if !module.is_live(op) {
                    continue;
                }
                if !matches!(module.op(op).kind, OpKind::Init { value: false }) {
                    continue;
                }

                let chain = Self::collect_chain(module, op);
                let starts_with_cnot = chain
                    .first()
                    .is_some_and(|&c| matches!(module.op(c).kind, OpKind::CNot));
                if !starts_with_cnot {
                    continue;
                }
                // Intermediate chain states must be private to the chain.
                let intermediates_private = chain[..chain.len() - 1]
                    .iter()
                    .all(|&c| module.value(module.op(c).result).uses.len() == 1);
                if !intermediates_private {
                    continue;
                }

                let Some(chosen) = Self::choose_control(module, &chain) else {
                    continue;
                };
                trace!(
                    init = %module.render_op(op),
                    chosen = %module.render_op(chosen),
                    "writing chain in place"
                );
                self.rewrite(module, op, &chain, chosen)?;
                stats.chains_inplaced += 1;
            }
        }
        module.relabel_states();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinfaxi_ir::Type;

    /// init; cnot(a, anc); cnot(b, anc'); measure — XOR accumulator.
    fn xor_accumulator() -> Module {
        let mut m = Module::new();
        let f = m.add_func("f");
        let a = m.add_argument(f, Type::Bit);
        let b = m.add_argument(f, Type::Bit);
        let init = m.append(f, OpKind::Init { value: false }, &[]).unwrap();
        let anc = m.op(init).result;
        let c1 = m.append(f, OpKind::CNot, &[a, anc]).unwrap();
        let r1 = m.op(c1).result;
        let c2 = m.append(f, OpKind::CNot, &[b, r1]).unwrap();
        let r2 = m.op(c2).result;
        m.append(f, OpKind::Measure, &[r2]).unwrap();
        m
    }

    #[test]
    fn test_chain_written_onto_dead_control() {
        let mut m = xor_accumulator();
        let mut stats = TransformStats::default();
        CnotInPlacing.run(&mut m, &mut stats).unwrap();
        assert_eq!(stats.chains_inplaced, 1);
        // init and one cnot gone; remaining cnot targets a dead input line.
        let kinds: Vec<_> = m.walk().map(|(_, op)| m.op(op).kind.name()).collect();
        assert_eq!(kinds, vec!["cnot", "measure"]);
        m.verify().unwrap();
    }

    #[test]
    fn test_live_controls_block_inplacing() {
        let mut m = Module::new();
        let f = m.add_func("f");
        let a = m.add_argument(f, Type::Bit);
        let b = m.add_argument(f, Type::Bit);
        let init = m.append(f, OpKind::Init { value: false }, &[]).unwrap();
        let anc = m.op(init).result;
        let c1 = m.append(f, OpKind::CNot, &[a, anc]).unwrap();
        let r1 = m.op(c1).result;
        let c2 = m.append(f, OpKind::CNot, &[b, r1]).unwrap();
        let r2 = m.op(c2).result;
        m.append(f, OpKind::Measure, &[r2]).unwrap();
        // Both inputs are observed afterwards.
        m.append(f, OpKind::Measure, &[a]).unwrap();
        m.append(f, OpKind::Measure, &[b]).unwrap();

        let mut stats = TransformStats::default();
        CnotInPlacing.run(&mut m, &mut stats).unwrap();
        assert_eq!(stats.chains_inplaced, 0);
        assert_eq!(m.num_ops(), 6);
    }

    #[test]
    fn test_duplicated_control_is_not_chosen() {
        // init; cnot(a, ·); cnot(b, ·); cnot(a, ·): a appears twice, so only
        // b is a legal destination.
        let mut m = Module::new();
        let f = m.add_func("f");
        let a = m.add_argument(f, Type::Bit);
        let b = m.add_argument(f, Type::Bit);
        let init = m.append(f, OpKind::Init { value: false }, &[]).unwrap();
        let anc = m.op(init).result;
        let c1 = m.append(f, OpKind::CNot, &[a, anc]).unwrap();
        let r1 = m.op(c1).result;
        let c2 = m.append(f, OpKind::CNot, &[b, r1]).unwrap();
        let r2 = m.op(c2).result;
        let c3 = m.append(f, OpKind::CNot, &[a, r2]).unwrap();
        let r3 = m.op(c3).result;
        m.append(f, OpKind::Measure, &[r3]).unwrap();

        let mut stats = TransformStats::default();
        CnotInPlacing.run(&mut m, &mut stats).unwrap();
        assert_eq!(stats.chains_inplaced, 1);
        // The b-CNOT was removed; both remaining CNOTs are controlled by a
        // and write into b's line.
        let cnot_controls: Vec<u32> = m
            .walk()
            .filter(|&(_, op)| matches!(m.op(op).kind, OpKind::CNot))
            .map(|(_, op)| m.value(m.op(op).operands[0]).qubit.qubit)
            .collect();
        assert_eq!(cnot_controls, vec![0, 0]);
        let measure_line = m
            .walk()
            .find(|&(_, op)| matches!(m.op(op).kind, OpKind::Measure))
            .map(|(_, op)| m.value(m.op(op).operands[0]).qubit.qubit)
            .unwrap();
        assert_eq!(measure_line, 1);
        m.verify().unwrap();
    }

    #[test]
    fn test_chain_with_interspersed_not() {
        // init; cnot(a, ·); not(·); cnot(b, ·) — the Not rides the chain.
        let mut m = Module::new();
        let f = m.add_func("f");
        let a = m.add_argument(f, Type::Bit);
        let b = m.add_argument(f, Type::Bit);
        let init = m.append(f, OpKind::Init { value: false }, &[]).unwrap();
        let anc = m.op(init).result;
        let c1 = m.append(f, OpKind::CNot, &[a, anc]).unwrap();
        let r1 = m.op(c1).result;
        let n = m.append(f, OpKind::Not, &[r1]).unwrap();
        let rn = m.op(n).result;
        let c2 = m.append(f, OpKind::CNot, &[b, rn]).unwrap();
        let r2 = m.op(c2).result;
        m.append(f, OpKind::Measure, &[r2]).unwrap();

        let mut stats = TransformStats::default();
        CnotInPlacing.run(&mut m, &mut stats).unwrap();
        assert_eq!(stats.chains_inplaced, 1);
        let kinds: Vec<_> = m.walk().map(|(_, op)| m.op(op).kind.name()).collect();
        assert_eq!(kinds, vec!["not", "cnot", "measure"]);
        m.verify().unwrap();
    }

    #[test]
    fn test_observed_intermediate_blocks_inplacing() {
        // The partial XOR a^b is measured, so the chain cannot move.
        let mut m = Module::new();
        let f = m.add_func("f");
        let a = m.add_argument(f, Type::Bit);
        let b = m.add_argument(f, Type::Bit);
        let init = m.append(f, OpKind::Init { value: false }, &[]).unwrap();
        let anc = m.op(init).result;
        let c1 = m.append(f, OpKind::CNot, &[a, anc]).unwrap();
        let r1 = m.op(c1).result;
        let c2 = m.append(f, OpKind::CNot, &[b, r1]).unwrap();
        let r2 = m.op(c2).result;
        m.append(f, OpKind::Measure, &[r2]).unwrap();
        m.append(f, OpKind::Measure, &[r1]).unwrap();

        let mut stats = TransformStats::default();
        CnotInPlacing.run(&mut m, &mut stats).unwrap();
        assert_eq!(stats.chains_inplaced, 0);
    }
}
