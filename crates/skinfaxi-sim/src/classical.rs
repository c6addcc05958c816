//! Classical reversible interpretation of the IR.
//!
//! Before Toffoli decomposition every gate in a lowered module is a
//! permutation of classical bit states, so a function can be executed
//! directly on a bit environment. This is the reference the optimization
//! pipeline is checked against: the optimized module must compute the same
//! outputs for every input assignment.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use skinfaxi_ir::{FuncId, Module, OpKind, ValueId};
use tracing::debug;

use crate::error::{SimError, SimResult};

/// Widest input space enumerated exhaustively.
pub const EXHAUSTIVE_LIMIT: usize = 16;

/// Number of random assignments tried above [`EXHAUSTIVE_LIMIT`].
const SAMPLE_COUNT: usize = 1024;

/// Execute one function on an input assignment; returns the measured bits in
/// measure order.
pub fn run(module: &Module, func: FuncId, inputs: &[bool]) -> SimResult<Vec<bool>> {
    let args = &module.func(func).args;
    if args.len() != inputs.len() {
        return Err(SimError::InputCountMismatch {
            expected: args.len(),
            got: inputs.len(),
        });
    }

    let mut env: FxHashMap<ValueId, bool> = FxHashMap::default();
    for (&arg, &bit) in args.iter().zip(inputs) {
        env.insert(arg, bit);
    }

    let mut outputs = vec![];
    for op in module.ops(func) {
        let data = module.op(op);
        let read = |v: ValueId| -> bool { env[&v] };
        let out = match data.kind {
            OpKind::Init { value } => value,
            OpKind::Not => !read(data.operands[0]),
            OpKind::CNot => read(data.operands[0]) ^ read(data.operands[1]),
            OpKind::CCNot => {
                (read(data.operands[0]) && read(data.operands[1])) ^ read(data.operands[2])
            }
            OpKind::Measure => {
                let bit = read(data.operands[0]);
                outputs.push(bit);
                bit
            }
            OpKind::H | OpKind::T | OpKind::TDagger => {
                return Err(SimError::NonClassicalGate(data.kind.name()));
            }
        };
        env.insert(data.result, out);
    }
    Ok(outputs)
}

/// Full truth table of a function: one output row per input assignment, in
/// ascending binary order (argument lane 0 is the least significant bit).
pub fn truth_table(module: &Module, func: FuncId) -> SimResult<Vec<Vec<bool>>> {
    let n = module.func(func).args.len();
    if n > EXHAUSTIVE_LIMIT {
        return Err(SimError::TooManyQubits {
            qubits: n,
            limit: EXHAUSTIVE_LIMIT,
        });
    }
    let mut rows = Vec::with_capacity(1 << n);
    for row in 0u64..(1 << n) {
        let inputs: Vec<bool> = (0..n).map(|i| (row >> i) & 1 == 1).collect();
        rows.push(run(module, func, &inputs)?);
    }
    Ok(rows)
}

/// Whether two functions compute the same outputs on every input.
///
/// Exhaustive up to [`EXHAUSTIVE_LIMIT`] input bits; beyond that a fixed-seed
/// random sample is compared instead.
pub fn equivalent(
    left_module: &Module,
    left: FuncId,
    right_module: &Module,
    right: FuncId,
) -> SimResult<bool> {
    let n = left_module.func(left).args.len();
    let m = right_module.func(right).args.len();
    if n != m {
        return Err(SimError::ArityMismatch { left: n, right: m });
    }

    if n <= EXHAUSTIVE_LIMIT {
        return Ok(truth_table(left_module, left)? == truth_table(right_module, right)?);
    }

    debug!(inputs = n, samples = SAMPLE_COUNT, "sampling equivalence check");
    let mut rng = StdRng::seed_from_u64(0x5eed_c1bc);
    for _ in 0..SAMPLE_COUNT {
        let inputs: Vec<bool> = (0..n).map(|_| rng.r#gen::<bool>()).collect();
        if run(left_module, left, &inputs)? != run(right_module, right, &inputs)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinfaxi_ir::Type;

    /// init 0; cnot a; cnot b; measure  — computes a ^ b.
    fn xor_module() -> (Module, FuncId) {
        let mut m = Module::new();
        let f = m.add_func("xor");
        let a = m.add_argument(f, Type::Bit);
        let b = m.add_argument(f, Type::Bit);
        let init = m.append(f, OpKind::Init { value: false }, &[]).unwrap();
        let anc = m.op(init).result;
        let c1 = m.append(f, OpKind::CNot, &[a, anc]).unwrap();
        let r1 = m.op(c1).result;
        let c2 = m.append(f, OpKind::CNot, &[b, r1]).unwrap();
        let r2 = m.op(c2).result;
        m.append(f, OpKind::Measure, &[r2]).unwrap();
        (m, f)
    }

    #[test]
    fn test_xor_truth_table() {
        let (m, f) = xor_module();
        let table = truth_table(&m, f).unwrap();
        assert_eq!(
            table,
            vec![vec![false], vec![true], vec![true], vec![false]]
        );
    }

    #[test]
    fn test_ccnot_semantics() {
        let mut m = Module::new();
        let f = m.add_func("and");
        let a = m.add_argument(f, Type::Bit);
        let b = m.add_argument(f, Type::Bit);
        let init = m.append(f, OpKind::Init { value: false }, &[]).unwrap();
        let anc = m.op(init).result;
        let cc = m.append(f, OpKind::CCNot, &[a, b, anc]).unwrap();
        let r = m.op(cc).result;
        m.append(f, OpKind::Measure, &[r]).unwrap();

        let table = truth_table(&m, f).unwrap();
        assert_eq!(
            table,
            vec![vec![false], vec![false], vec![false], vec![true]]
        );
    }

    #[test]
    fn test_equivalent_to_itself() {
        let (m, f) = xor_module();
        assert!(equivalent(&m, f, &m, f).unwrap());
    }

    #[test]
    fn test_inequivalent_modules() {
        let (m, f) = xor_module();
        let mut other = Module::new();
        let g = other.add_func("and");
        let a = other.add_argument(g, Type::Bit);
        let b = other.add_argument(g, Type::Bit);
        let init = other.append(g, OpKind::Init { value: false }, &[]).unwrap();
        let anc = other.op(init).result;
        let cc = other.append(g, OpKind::CCNot, &[a, b, anc]).unwrap();
        let r = other.op(cc).result;
        other.append(g, OpKind::Measure, &[r]).unwrap();

        assert!(!equivalent(&m, f, &other, g).unwrap());
    }

    #[test]
    fn test_nonclassical_gate_is_rejected() {
        let mut m = Module::new();
        let f = m.add_func("h");
        let a = m.add_argument(f, Type::Bit);
        m.append(f, OpKind::H, &[a]).unwrap();
        assert!(matches!(
            run(&m, f, &[false]),
            Err(SimError::NonClassicalGate("h"))
        ));
    }

    #[test]
    fn test_input_count_checked() {
        let (m, f) = xor_module();
        assert!(matches!(
            run(&m, f, &[true]),
            Err(SimError::InputCountMismatch { expected: 2, got: 1 })
        ));
    }

    proptest::proptest! {
        /// A CNOT accumulator over n inputs computes their parity.
        #[test]
        fn prop_xor_chain_is_parity(inputs in proptest::collection::vec(proptest::bool::ANY, 1..10)) {
            let mut m = Module::new();
            let f = m.add_func("parity");
            let args: Vec<_> = inputs.iter().map(|_| m.add_argument(f, Type::Bit)).collect();
            let init = m.append(f, OpKind::Init { value: false }, &[]).unwrap();
            let mut acc = m.op(init).result;
            for &arg in &args {
                let op = m.append(f, OpKind::CNot, &[arg, acc]).unwrap();
                acc = m.op(op).result;
            }
            m.append(f, OpKind::Measure, &[acc]).unwrap();

            let expected = inputs.iter().fold(false, |p, &b| p ^ b);
            let outputs = run(&m, f, &inputs).unwrap();
            proptest::prop_assert_eq!(outputs, vec![expected]);
        }
    }
}
