//! Hermitian-pair elimination.
//!
//! {Not, CNot, CCNot, H} are their own inverses and T/T† invert each other;
//! two such gates forming a state chain on one line with identical controls
//! compose to the identity. Candidates are hashed on (inverse class,
//! controls, target line); the equality check then requires the bottom op's
//! target to be the top op's result and that result to have no other reader,
//! which is exactly "nothing observed the line in between".

use rustc_hash::FxHashMap;
use skinfaxi_ir::{Module, OpId, OpKind, ValueId};
use tracing::trace;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::stats::TransformStats;

/// Inverse class of a gate: gates only cancel within their class.
fn inverse_class(kind: OpKind) -> Option<u8> {
    match kind {
        OpKind::Not => Some(0),
        OpKind::CNot => Some(1),
        OpKind::CCNot => Some(2),
        OpKind::H => Some(3),
        OpKind::T | OpKind::TDagger => Some(4),
        OpKind::Init { .. } | OpKind::Measure => None,
    }
}

/// Hash key for cancellation candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PairKey {
    class: u8,
    /// Control values, sorted so commuted Toffoli controls still collide.
    controls: Vec<ValueId>,
    /// Target line number.
    line: u32,
}

/// Remove adjacent inverse pairs.
pub struct HermitianPairElimination;

impl Pass for HermitianPairElimination {
    fn name(&self) -> &'static str {
        "hge"
    }

    fn run(&self, module: &mut Module, stats: &mut TransformStats) -> CompileResult<()> {
        for func in module.func_ids().collect::<Vec<_>>() {
            let mut known: FxHashMap<PairKey, OpId> = FxHashMap::default();

            let ops: Vec<OpId> = module.ops(func).collect();
            for op in ops {
                let data = module.op(op);
                let Some(class) = inverse_class(data.kind) else {
                    continue;
                };
                let target = data.target().expect("gate has a target");
                let mut controls = data.controls().to_vec();
                controls.sort_unstable_by_key(|v| v.0);
                let key = PairKey {
                    class,
                    controls,
                    line: module.value(target).qubit.qubit,
                };

                if let Some(&top) = known.get(&key) {
                    let chained = module.op(top).result == target;
                    let inverse = module.op(top).kind.inverse() == Some(data.kind);
                    let unobserved = module.value(module.op(top).result).uses.len() == 1;
                    if chained && inverse && unobserved {
                        trace!(
                            top = %module.render_op(top),
                            bottom = %module.render_op(op),
                            "cancelling inverse pair"
                        );
                        let reverted = module.op(top).target().expect("gate has a target");
                        let bottom_result = module.op(op).result;
                        module.replace_all_uses(bottom_result, reverted);
                        module.erase(op)?;
                        module.erase(top)?;
                        known.remove(&key);
                        stats.hge_pairs += 1;
                        continue;
                    }
                }
                known.insert(key, op);
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

    #[test]
    fn test_not_pair_cancels() {
        let mut m = Module::new();
        let f = m.add_func("f");
        let a = m.add_argument(f, Type::Bit);
        let n1 = m.append(f, OpKind::Not, &[a]).unwrap();
        let r1 = m.op(n1).result;
        let n2 = m.append(f, OpKind::Not, &[r1]).unwrap();
        let r2 = m.op(n2).result;
        m.append(f, OpKind::Measure, &[r2]).unwrap();

        let mut stats = TransformStats::default();
        HermitianPairElimination.run(&mut m, &mut stats).unwrap();
        assert_eq!(stats.hge_pairs, 1);
        assert_eq!(m.num_ops(), 1);
        // The measure reads the argument directly now.
        let (_, measure) = m.walk().next().unwrap();
        assert_eq!(m.op(measure).operands[0], a);
        m.verify().unwrap();
    }

    #[test]
    fn test_cnot_pair_with_same_control_cancels() {
        let mut m = Module::new();
        let f = m.add_func("f");
        let a = m.add_argument(f, Type::Bit);
        let b = m.add_argument(f, Type::Bit);
        let c1 = m.append(f, OpKind::CNot, &[a, b]).unwrap();
        let r1 = m.op(c1).result;
        let c2 = m.append(f, OpKind::CNot, &[a, r1]).unwrap();
        let r2 = m.op(c2).result;
        m.append(f, OpKind::Measure, &[r2]).unwrap();

        let mut stats = TransformStats::default();
        HermitianPairElimination.run(&mut m, &mut stats).unwrap();
        assert_eq!(stats.hge_pairs, 1);
        assert_eq!(m.num_ops(), 1);
    }

    #[test]
    fn test_different_controls_do_not_cancel() {
        let mut m = Module::new();
        let f = m.add_func("f");
        let a = m.add_argument(f, Type::Bit);
        let b = m.add_argument(f, Type::Bit);
        let t = m.add_argument(f, Type::Bit);
        let c1 = m.append(f, OpKind::CNot, &[a, t]).unwrap();
        let r1 = m.op(c1).result;
        let c2 = m.append(f, OpKind::CNot, &[b, r1]).unwrap();
        let r2 = m.op(c2).result;
        m.append(f, OpKind::Measure, &[r2]).unwrap();

        let mut stats = TransformStats::default();
        HermitianPairElimination.run(&mut m, &mut stats).unwrap();
        assert_eq!(stats.hge_pairs, 0);
        assert_eq!(m.num_ops(), 3);
    }

    #[test]
    fn test_intervening_reader_blocks_cancellation() {
        // not(a); cnot(a', x); not(a') — the middle gate reads the top
        // result, so removing the pair would change what it sees.
        let mut m = Module::new();
        let f = m.add_func("f");
        let a = m.add_argument(f, Type::Bit);
        let x = m.add_argument(f, Type::Bit);
        let n1 = m.append(f, OpKind::Not, &[a]).unwrap();
        let r1 = m.op(n1).result;
        let mid = m.append(f, OpKind::CNot, &[r1, x]).unwrap();
        let xr = m.op(mid).result;
        let n2 = m.append(f, OpKind::Not, &[r1]).unwrap();
        let r2 = m.op(n2).result;
        m.append(f, OpKind::Measure, &[r2]).unwrap();
        m.append(f, OpKind::Measure, &[xr]).unwrap();

        let mut stats = TransformStats::default();
        HermitianPairElimination.run(&mut m, &mut stats).unwrap();
        assert_eq!(stats.hge_pairs, 0);
        m.verify().unwrap();
    }

    #[test]
    fn test_control_read_between_pair_is_harmless() {
        // not(t); cnot(c, x); not(t') — the middle gate touches other lines
        // only, so the X pair still cancels.
        let mut m = Module::new();
        let f = m.add_func("f");
        let t = m.add_argument(f, Type::Bit);
        let c = m.add_argument(f, Type::Bit);
        let x = m.add_argument(f, Type::Bit);
        let n1 = m.append(f, OpKind::Not, &[t]).unwrap();
        let r1 = m.op(n1).result;
        let mid = m.append(f, OpKind::CNot, &[c, x]).unwrap();
        let xr = m.op(mid).result;
        let n2 = m.append(f, OpKind::Not, &[r1]).unwrap();
        let r2 = m.op(n2).result;
        m.append(f, OpKind::Measure, &[r2]).unwrap();
        m.append(f, OpKind::Measure, &[xr]).unwrap();

        let mut stats = TransformStats::default();
        HermitianPairElimination.run(&mut m, &mut stats).unwrap();
        assert_eq!(stats.hge_pairs, 1);
        m.verify().unwrap();
    }

    #[test]
    fn test_t_tdagger_pair_cancels() {
        let mut m = Module::new();
        let f = m.add_func("f");
        let a = m.add_argument(f, Type::Bit);
        let t = m.append(f, OpKind::T, &[a]).unwrap();
        let r1 = m.op(t).result;
        let td = m.append(f, OpKind::TDagger, &[r1]).unwrap();
        let r2 = m.op(td).result;
        m.append(f, OpKind::Measure, &[r2]).unwrap();

        let mut stats = TransformStats::default();
        HermitianPairElimination.run(&mut m, &mut stats).unwrap();
        assert_eq!(stats.hge_pairs, 1);
        assert_eq!(m.num_ops(), 1);
    }

    #[test]
    fn test_t_t_pair_does_not_cancel() {
        let mut m = Module::new();
        let f = m.add_func("f");
        let a = m.add_argument(f, Type::Bit);
        let t1 = m.append(f, OpKind::T, &[a]).unwrap();
        let r1 = m.op(t1).result;
        let t2 = m.append(f, OpKind::T, &[r1]).unwrap();
        let r2 = m.op(t2).result;
        m.append(f, OpKind::Measure, &[r2]).unwrap();

        let mut stats = TransformStats::default();
        HermitianPairElimination.run(&mut m, &mut stats).unwrap();
        assert_eq!(stats.hge_pairs, 0);
        assert_eq!(m.num_ops(), 3);
    }

    #[test]
    fn test_idempotent_on_normalized_module() {
        let mut m = Module::new();
        let f = m.add_func("f");
        let a = m.add_argument(f, Type::Bit);
        for _ in 0..4 {
            let latest = m
                .ops(f)
                .last()
                .map(|op| m.op(op).result)
                .unwrap_or(a);
            m.append(f, OpKind::Not, &[latest]).unwrap();
        }
        let latest = m.ops(f).last().map(|op| m.op(op).result).unwrap();
        m.append(f, OpKind::Measure, &[latest]).unwrap();

        let mut stats = TransformStats::default();
        HermitianPairElimination.run(&mut m, &mut stats).unwrap();
        let after_first = m.to_string();
        HermitianPairElimination.run(&mut m, &mut stats).unwrap();
        assert_eq!(m.to_string(), after_first);
    }
}
