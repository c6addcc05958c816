//! Fixpoint driver for the optimization pipeline.

use skinfaxi_ir::Module;
use tracing::{debug, info, instrument};

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{
    CnotInPlacing, CommonSubexprElimination, DeadOpElimination, HermitianPairElimination,
    QubitRenumber, ToffoliDecomposition,
};
use crate::stats::TransformStats;

/// Runs the optimization round to a fixpoint.
///
/// One round is DCE → renumber → CSE → HGE → in-placing → renumber; rounds
/// repeat until the module op count survives a whole round unchanged. With
/// verification enabled the IR invariants are checked after every pass and a
/// violation aborts the run.
pub struct FixpointDriver {
    verify: bool,
}

impl FixpointDriver {
    /// Create a driver with verification disabled.
    pub fn new() -> Self {
        Self { verify: false }
    }

    /// Enable or disable invariant checking between passes.
    #[must_use]
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    fn round_passes() -> Vec<Box<dyn Pass>> {
        vec![
            Box::new(DeadOpElimination),
            Box::new(QubitRenumber),
            Box::new(CommonSubexprElimination),
            Box::new(HermitianPairElimination),
            Box::new(CnotInPlacing),
            Box::new(QubitRenumber),
        ]
    }

    fn run_pass(
        &self,
        pass: &dyn Pass,
        module: &mut Module,
        stats: &mut TransformStats,
    ) -> CompileResult<()> {
        debug!("running pass: {}", pass.name());
        pass.run(module, stats)?;
        debug!("pass {} completed, ops: {}", pass.name(), module.num_ops());
        if self.verify {
            module.verify()?;
        }
        Ok(())
    }

    /// Iterate the optimization round until the op count is stable.
    #[instrument(skip(self, module, stats))]
    pub fn run(&self, module: &mut Module, stats: &mut TransformStats) -> CompileResult<()> {
        let passes = Self::round_passes();
        loop {
            let before = module.num_ops();
            stats.rounds += 1;
            for pass in &passes {
                self.run_pass(pass.as_ref(), module, stats)?;
            }
            if module.num_ops() == before {
                break;
            }
        }
        info!(
            rounds = stats.rounds,
            ops = module.num_ops(),
            qubits = module.num_qubits(),
            "optimization reached fixpoint"
        );
        Ok(())
    }

    /// Expand Toffolis into Clifford+T, then re-run the fixpoint.
    ///
    /// The second fixpoint is where adjacent gadgets shed their T·T† pairs.
    pub fn decompose_toffoli(
        &self,
        module: &mut Module,
        stats: &mut TransformStats,
    ) -> CompileResult<()> {
        self.run_pass(&ToffoliDecomposition, module, stats)?;
        self.run(module, stats)
    }
}

impl Default for FixpointDriver {
    fn default() -> Self {
        Self::new()
    }
}
