//! Circuit metrics computed on the IR.
//!
//! Gate counts, qubit usage, circuit depth and the T-cost figures used to
//! judge the pipeline. Depth is the length of the longest gate chain over
//! the per-line front levels; T-depth counts only T/T† layers.

use serde::Serialize;
use skinfaxi_ir::{Module, OpKind};
use std::fmt;

use rustc_hash::FxHashMap;

/// Size and cost figures for one module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CircuitMetrics {
    /// X gates.
    pub not_count: usize,
    /// CX gates.
    pub cnot_count: usize,
    /// Toffoli gates.
    pub ccnot_count: usize,
    /// Hadamard gates.
    pub h_count: usize,
    /// T and T† gates.
    pub t_gate_count: usize,
    /// Measurements.
    pub measure_count: usize,
    /// Input qubit lines (block arguments).
    pub input_qubits: usize,
    /// Ancilla lines allocated by `Init`.
    pub ancilla_qubits: usize,
    /// Total gate count (excluding `Init` and `Measure`).
    pub gate_count: usize,
    /// Circuit depth.
    pub depth: usize,
    /// T-gate depth.
    pub t_depth: usize,
}

impl CircuitMetrics {
    /// All qubit lines the circuit touches.
    pub fn total_qubits(&self) -> usize {
        self.input_qubits + self.ancilla_qubits
    }

    /// Collect metrics over every function in a module.
    pub fn collect(module: &Module) -> Self {
        let mut metrics = Self::default();
        let mut levels: FxHashMap<u32, usize> = FxHashMap::default();
        let mut t_levels: FxHashMap<u32, usize> = FxHashMap::default();

        for func in module.func_ids() {
            metrics.input_qubits += module.func(func).args.len();
        }

        for (_, op) in module.walk() {
            let data = module.op(op);
            match data.kind {
                OpKind::Init { .. } => {
                    metrics.ancilla_qubits += 1;
                    continue;
                }
                OpKind::Not => metrics.not_count += 1,
                OpKind::CNot => metrics.cnot_count += 1,
                OpKind::CCNot => metrics.ccnot_count += 1,
                OpKind::H => metrics.h_count += 1,
                OpKind::T | OpKind::TDagger => metrics.t_gate_count += 1,
                OpKind::Measure => {
                    metrics.measure_count += 1;
                    continue;
                }
            }

            let lines: Vec<u32> = data
                .operands
                .iter()
                .map(|&v| module.value(v).qubit.qubit)
                .collect();
            let level = 1 + lines
                .iter()
                .map(|line| levels.get(line).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            for &line in &lines {
                levels.insert(line, level);
            }
            metrics.depth = metrics.depth.max(level);

            let is_t = matches!(data.kind, OpKind::T | OpKind::TDagger);
            let t_level = usize::from(is_t)
                + lines
                    .iter()
                    .map(|line| t_levels.get(line).copied().unwrap_or(0))
                    .max()
                    .unwrap_or(0);
            for &line in &lines {
                t_levels.insert(line, t_level);
            }
            metrics.t_depth = metrics.t_depth.max(t_level);
        }

        metrics.gate_count = metrics.not_count
            + metrics.cnot_count
            + metrics.ccnot_count
            + metrics.h_count
            + metrics.t_gate_count;
        metrics
    }
}

impl fmt::Display for CircuitMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "gates:        {}", self.gate_count)?;
        writeln!(
            f,
            "  X {}  CX {}  CCX {}  H {}  T/T† {}",
            self.not_count, self.cnot_count, self.ccnot_count, self.h_count, self.t_gate_count
        )?;
        writeln!(f, "measures:     {}", self.measure_count)?;
        writeln!(
            f,
            "qubits:       {} ({} inputs + {} ancillas)",
            self.total_qubits(),
            self.input_qubits,
            self.ancilla_qubits
        )?;
        writeln!(f, "depth:        {}", self.depth)?;
        write!(f, "T depth:      {}", self.t_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinfaxi_ir::Type;

    #[test]
    fn test_counts_and_depth() {
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

        let metrics = CircuitMetrics::collect(&m);
        assert_eq!(metrics.cnot_count, 2);
        assert_eq!(metrics.gate_count, 2);
        assert_eq!(metrics.measure_count, 1);
        assert_eq!(metrics.input_qubits, 2);
        assert_eq!(metrics.ancilla_qubits, 1);
        assert_eq!(metrics.total_qubits(), 3);
        // The two CNOTs share the ancilla line: depth 2.
        assert_eq!(metrics.depth, 2);
        assert_eq!(metrics.t_depth, 0);
    }

    #[test]
    fn test_parallel_gates_share_a_level() {
        let mut m = Module::new();
        let f = m.add_func("f");
        let a = m.add_argument(f, Type::Bit);
        let b = m.add_argument(f, Type::Bit);
        m.append(f, OpKind::Not, &[a]).unwrap();
        m.append(f, OpKind::Not, &[b]).unwrap();
        let metrics = CircuitMetrics::collect(&m);
        assert_eq!(metrics.depth, 1);
    }

    #[test]
    fn test_t_depth_counts_only_phase_gates() {
        let mut m = Module::new();
        let f = m.add_func("f");
        let a = m.add_argument(f, Type::Bit);
        let t1 = m.append(f, OpKind::T, &[a]).unwrap();
        let r1 = m.op(t1).result;
        let h = m.append(f, OpKind::H, &[r1]).unwrap();
        let r2 = m.op(h).result;
        let t2 = m.append(f, OpKind::T, &[r2]).unwrap();
        let r3 = m.op(t2).result;
        m.append(f, OpKind::Measure, &[r3]).unwrap();

        let metrics = CircuitMetrics::collect(&m);
        assert_eq!(metrics.t_gate_count, 2);
        assert_eq!(metrics.depth, 3);
        assert_eq!(metrics.t_depth, 2);
    }
}
