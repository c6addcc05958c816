//! Toffoli decomposition into Clifford+T.
//!
//! Each `CCNot(c1, c2, t)` becomes the standard seven-T gadget:
//!
//! ```text
//! H(t); CX(c2,t); T†(t); CX(c1,t); T(t); CX(c2,t); T†(t); CX(c1,t);
//! CX(c1,c2); T†(c2); CX(c1,c2); T(c1); T(c2); T(t); H(t)
//! ```
//!
//! The gadget bumps all three lines, so readers *after* the gadget are
//! redirected to its final states; references before it are untouched. The
//! driver re-runs the optimization fixpoint afterwards — adjacent gadgets
//! leave many T·T† pairs for HGE.

use skinfaxi_ir::{Module, OpId, OpKind, ValueId};
use tracing::debug;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::stats::TransformStats;

/// Expand every Toffoli into the Clifford+T gate set.
pub struct ToffoliDecomposition;

impl Pass for ToffoliDecomposition {
    fn name(&self) -> &'static str {
        "toffoli-decomposition"
    }

    fn run(&self, module: &mut Module, stats: &mut TransformStats) -> CompileResult<()> {
        for func in module.func_ids().collect::<Vec<_>>() {
            let ccnots: Vec<OpId> = module
                .ops(func)
                .filter(|&op| matches!(module.op(op).kind, OpKind::CCNot))
                .collect();
            for cc in ccnots {
                self.expand(module, cc)?;
                stats.toffolis_decomposed += 1;
            }
        }
        module.relabel_states();
        Ok(())
    }
}

impl ToffoliDecomposition {
    fn expand(&self, module: &mut Module, cc: OpId) -> CompileResult<()> {
        let c1 = module.op(cc).operands[0];
        let c2 = module.op(cc).operands[1];
        let t = module.op(cc).operands[2];
        let old_result = module.op(cc).result;
        debug!(op = %module.render_op(cc), "expanding toffoli");

        let mut emit = |module: &mut Module,
                        kind: OpKind,
                        operands: &[ValueId]|
         -> CompileResult<(OpId, ValueId)> {
            let op = module.insert_before(cc, kind, operands)?;
            Ok((op, module.op(op).result))
        };

        let (_, t1) = emit(module, OpKind::H, &[t])?;
        let (_, t2) = emit(module, OpKind::CNot, &[c2, t1])?;
        let (_, t3) = emit(module, OpKind::TDagger, &[t2])?;
        let (_, t4) = emit(module, OpKind::CNot, &[c1, t3])?;
        let (_, t5) = emit(module, OpKind::T, &[t4])?;
        let (_, t6) = emit(module, OpKind::CNot, &[c2, t5])?;
        let (_, t7) = emit(module, OpKind::TDagger, &[t6])?;
        let (_, t8) = emit(module, OpKind::CNot, &[c1, t7])?;
        let (_, c2_1) = emit(module, OpKind::CNot, &[c1, c2])?;
        let (_, c2_2) = emit(module, OpKind::TDagger, &[c2_1])?;
        let (_, c2_3) = emit(module, OpKind::CNot, &[c1, c2_2])?;
        let (_, c1_final) = emit(module, OpKind::T, &[c1])?;
        let (_, c2_final) = emit(module, OpKind::T, &[c2_3])?;
        let (_, t9) = emit(module, OpKind::T, &[t8])?;
        let (last, t_final) = emit(module, OpKind::H, &[t9])?;

        // All readers of the old result sit after the gadget by construction;
        // pre-gadget control states are rewritten for downstream readers only.
        module.replace_all_uses(old_result, t_final);
        module.erase(cc)?;
        module.replace_uses_after(c1, c1_final, last);
        module.replace_uses_after(c2, c2_final, last);
        Ok(())
    }
}
