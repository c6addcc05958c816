//! Dead-op elimination.

use skinfaxi_ir::{Module, OpKind};
use tracing::trace;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::stats::TransformStats;

/// Erase operations whose results nothing reads.
///
/// `Measure` is program-observable and never dead, even with an unused
/// result. H/T/T† are also kept: an unread result only means no later gate
/// consumes that state, and dropping phase gates from a decomposed Toffoli
/// would change the circuit away from basis-state inputs. Only the classical
/// gates {Init, Not, CNot, CCNot} are erased. A single backward sweep per
/// body catches chains: erasing a dead op frees its operands, which the
/// sweep visits next.
pub struct DeadOpElimination;

impl Pass for DeadOpElimination {
    fn name(&self) -> &'static str {
        "dce"
    }

    fn run(&self, module: &mut Module, stats: &mut TransformStats) -> CompileResult<()> {
        for func in module.func_ids().collect::<Vec<_>>() {
            let ops: Vec<_> = module.ops(func).collect();
            for &op in ops.iter().rev() {
                let data = module.op(op);
                if !matches!(
                    data.kind,
                    OpKind::Init { .. } | OpKind::Not | OpKind::CNot | OpKind::CCNot
                ) {
                    continue;
                }
                if !module.value(data.result).is_used() {
                    trace!(op = %module.render_op(op), "erasing dead op");
                    module.erase(op)?;
                    stats.dead_ops_removed += 1;
                }
            }
        }
        Ok(())
    }
}
