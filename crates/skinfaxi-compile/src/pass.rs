//! Pass trait for IR transformations.

use skinfaxi_ir::Module;

use crate::error::CompileResult;
use crate::stats::TransformStats;

/// A transformation over a module.
///
/// Passes are the unit of work the fixpoint driver schedules. Each pass
/// mutates the module in place and accounts for what it removed or rewrote
/// in the shared [`TransformStats`].
pub trait Pass: Send + Sync {
    /// Name of this pass.
    fn name(&self) -> &'static str;

    /// Run the pass.
    fn run(&self, module: &mut Module, stats: &mut TransformStats) -> CompileResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopPass;

    impl Pass for NoopPass {
        fn name(&self) -> &'static str {
            "noop"
        }

        fn run(&self, _module: &mut Module, _stats: &mut TransformStats) -> CompileResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_pass_object_safety() {
        let passes: Vec<Box<dyn Pass>> = vec![Box::new(NoopPass)];
        let mut module = Module::new();
        let mut stats = TransformStats::default();
        for pass in &passes {
            assert_eq!(pass.name(), "noop");
            pass.run(&mut module, &mut stats).unwrap();
        }
    }
}
