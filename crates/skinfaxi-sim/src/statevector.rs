//! Dense statevector evaluation for small circuits.
//!
//! Used to check gate-set rewrites that leave the classical subset — in
//! particular that the Clifford+T expansion of a Toffoli implements the same
//! permutation of basis states. Amplitudes are indexed with qubit line 0 as
//! the least significant bit.

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use skinfaxi_ir::{FuncId, Module, OpKind};
use std::f64::consts::FRAC_1_SQRT_2;

use crate::error::{SimError, SimResult};

/// Widest circuit the dense simulator accepts.
pub const STATEVECTOR_LIMIT: usize = 14;

/// Amplitude tolerance when snapping to a basis state.
const EPSILON: f64 = 1e-9;

/// A dense state over `n` qubit lines.
#[derive(Debug, Clone)]
pub struct Statevector {
    amps: Vec<Complex64>,
    n: usize,
}

impl Statevector {
    /// The all-zeros state over `n` lines.
    pub fn zero(n: usize) -> SimResult<Self> {
        if n > STATEVECTOR_LIMIT {
            return Err(SimError::TooManyQubits {
                qubits: n,
                limit: STATEVECTOR_LIMIT,
            });
        }
        let mut amps = vec![Complex64::new(0.0, 0.0); 1 << n];
        amps[0] = Complex64::new(1.0, 0.0);
        Ok(Self { amps, n })
    }

    /// Number of qubit lines.
    pub fn num_qubits(&self) -> usize {
        self.n
    }

    /// Apply X on line `q`.
    pub fn apply_x(&mut self, q: usize) {
        let mask = 1usize << q;
        for i in 0..self.amps.len() {
            if i & mask == 0 {
                self.amps.swap(i, i | mask);
            }
        }
    }

    /// Apply H on line `q`.
    pub fn apply_h(&mut self, q: usize) {
        let mask = 1usize << q;
        for i in 0..self.amps.len() {
            if i & mask == 0 {
                let a = self.amps[i];
                let b = self.amps[i | mask];
                self.amps[i] = (a + b) * FRAC_1_SQRT_2;
                self.amps[i | mask] = (a - b) * FRAC_1_SQRT_2;
            }
        }
    }

    /// Apply a phase of `angle` radians to the |1⟩ component of line `q`.
    fn apply_phase(&mut self, q: usize, angle: f64) {
        let mask = 1usize << q;
        let phase = Complex64::from_polar(1.0, angle);
        for (i, amp) in self.amps.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp *= phase;
            }
        }
    }

    /// Apply T on line `q`.
    pub fn apply_t(&mut self, q: usize) {
        self.apply_phase(q, std::f64::consts::FRAC_PI_4);
    }

    /// Apply T† on line `q`.
    pub fn apply_tdg(&mut self, q: usize) {
        self.apply_phase(q, -std::f64::consts::FRAC_PI_4);
    }

    /// Apply CX with control `c` and target `t`.
    pub fn apply_cx(&mut self, c: usize, t: usize) {
        let cmask = 1usize << c;
        let tmask = 1usize << t;
        for i in 0..self.amps.len() {
            if i & cmask != 0 && i & tmask == 0 {
                self.amps.swap(i, i | tmask);
            }
        }
    }

    /// Apply CCX with controls `c1`, `c2` and target `t`.
    pub fn apply_ccx(&mut self, c1: usize, c2: usize, t: usize) {
        let c1mask = 1usize << c1;
        let c2mask = 1usize << c2;
        let tmask = 1usize << t;
        for i in 0..self.amps.len() {
            if i & c1mask != 0 && i & c2mask != 0 && i & tmask == 0 {
                self.amps.swap(i, i | tmask);
            }
        }
    }

    /// If the state is a computational basis state (up to global phase),
    /// return its bits, line 0 first.
    pub fn basis_state(&self) -> Option<Vec<bool>> {
        let mut found = None;
        for (i, amp) in self.amps.iter().enumerate() {
            if amp.norm_sqr() > EPSILON {
                if found.is_some() {
                    return None;
                }
                if (amp.norm_sqr() - 1.0).abs() > EPSILON {
                    return None;
                }
                found = Some(i);
            }
        }
        found.map(|i| (0..self.n).map(|q| (i >> q) & 1 == 1).collect())
    }
}

/// Run a function on a basis-state input under the dense simulator.
///
/// Qubit lines are indexed by their line numbers, which must be dense (run
/// the renumber pass first). `Measure` is treated as the identity; the
/// returned state is the pre-measurement state.
pub fn run_statevector(
    module: &Module,
    func: FuncId,
    inputs: &[bool],
) -> SimResult<Statevector> {
    let args = &module.func(func).args;
    if args.len() != inputs.len() {
        return Err(SimError::InputCountMismatch {
            expected: args.len(),
            got: inputs.len(),
        });
    }

    // Map lines to dense indices by first appearance, arguments first.
    let mut lines: FxHashMap<u32, usize> = FxHashMap::default();
    for &arg in args {
        let line = module.value(arg).qubit.qubit;
        let next = lines.len();
        lines.entry(line).or_insert(next);
    }
    for op in module.ops(func) {
        let line = module.value(module.op(op).result).qubit.qubit;
        let next = lines.len();
        lines.entry(line).or_insert(next);
    }

    let mut state = Statevector::zero(lines.len())?;
    for (&arg, &bit) in args.iter().zip(inputs) {
        if bit {
            state.apply_x(lines[&module.value(arg).qubit.qubit]);
        }
    }

    for op in module.ops(func) {
        let data = module.op(op);
        let line = |v: skinfaxi_ir::ValueId| lines[&module.value(v).qubit.qubit];
        match data.kind {
            OpKind::Init { value } => {
                if value {
                    state.apply_x(line(data.result));
                }
            }
            OpKind::Not => state.apply_x(line(data.operands[0])),
            OpKind::H => state.apply_h(line(data.operands[0])),
            OpKind::T => state.apply_t(line(data.operands[0])),
            OpKind::TDagger => state.apply_tdg(line(data.operands[0])),
            OpKind::CNot => state.apply_cx(line(data.operands[0]), line(data.operands[1])),
            OpKind::CCNot => state.apply_ccx(
                line(data.operands[0]),
                line(data.operands[1]),
                line(data.operands[2]),
            ),
            OpKind::Measure => {}
        }
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinfaxi_ir::Type;

    #[test]
    fn test_h_squared_is_identity() {
        let mut state = Statevector::zero(1).unwrap();
        state.apply_h(0);
        assert!(state.basis_state().is_none());
        state.apply_h(0);
        assert_eq!(state.basis_state(), Some(vec![false]));
    }

    #[test]
    fn test_t_pairs_cancel() {
        let mut state = Statevector::zero(1).unwrap();
        state.apply_x(0);
        state.apply_t(0);
        state.apply_tdg(0);
        assert_eq!(state.basis_state(), Some(vec![true]));
    }

    #[test]
    fn test_ccx_truth_table() {
        for bits in 0u8..8 {
            let mut state = Statevector::zero(3).unwrap();
            for q in 0..3 {
                if (bits >> q) & 1 == 1 {
                    state.apply_x(q);
                }
            }
            state.apply_ccx(0, 1, 2);
            let expected_t = ((bits & 1 != 0) && (bits & 2 != 0)) ^ (bits & 4 != 0);
            assert_eq!(
                state.basis_state(),
                Some(vec![bits & 1 != 0, bits & 2 != 0, expected_t])
            );
        }
    }

    #[test]
    fn test_run_statevector_matches_classical() {
        let mut m = Module::new();
        let f = m.add_func("and");
        let a = m.add_argument(f, Type::Bit);
        let b = m.add_argument(f, Type::Bit);
        let init = m.append(f, OpKind::Init { value: false }, &[]).unwrap();
        let anc = m.op(init).result;
        let cc = m.append(f, OpKind::CCNot, &[a, b, anc]).unwrap();
        let r = m.op(cc).result;
        m.append(f, OpKind::Measure, &[r]).unwrap();

        for bits in 0u8..4 {
            let inputs = vec![bits & 1 != 0, bits & 2 != 0];
            let state = run_statevector(&m, f, &inputs).unwrap();
            let basis = state.basis_state().unwrap();
            assert_eq!(basis[2], inputs[0] && inputs[1]);
        }
    }
}
