//! One-way textual form of the IR.
//!
//! Functions print as `quantum.func @name { ... }`; operations as
//! `%q<N>_<S> = quantum.<kind> %operand, ...` with the target last. The
//! printed names are derived from the value records; nothing ever parses
//! them back.

use std::fmt;
use std::fmt::Write as _;

use crate::module::Module;
use crate::op::{OpId, OpKind};

impl Module {
    /// Render a single operation, for diagnostics and the module printer.
    pub fn render_op(&self, op: OpId) -> String {
        let data = self.op(op);
        let mut out = String::new();
        let _ = write!(out, "%{} = quantum.{}", self.value(data.result).qubit, data.kind.name());
        if let OpKind::Init { value } = data.kind {
            let _ = write!(out, " {{value = {} : i1}}", u8::from(value));
        }
        for (i, &operand) in data.operands.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            let _ = write!(out, "{sep}%{}", self.value(operand).qubit);
        }
        out
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for func in self.func_ids() {
            let data = self.func(func);
            writeln!(f, "quantum.func @{} {{", data.name)?;
            if !data.args.is_empty() {
                write!(f, "^bb0(")?;
                for (i, &arg) in data.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    let v = self.value(arg);
                    write!(f, "%{}: {}", v.qubit, v.ty)?;
                }
                writeln!(f, "):")?;
            }
            for op in self.ops(func) {
                writeln!(f, "  {}", self.render_op(op))?;
            }
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qubit::Type;

    #[test]
    fn test_print_xor_gadget() {
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

        let text = m.to_string();
        assert_eq!(
            text,
            "quantum.func @xor {\n\
             ^bb0(%q0_0: !quantum.bit, %q1_0: !quantum.bit):\n\
             \x20 %q2_0 = quantum.init {value = 0 : i1}\n\
             \x20 %q2_1 = quantum.cnot %q0_0, %q2_0\n\
             \x20 %q2_2 = quantum.cnot %q1_0, %q2_1\n\
             \x20 %q2_3 = quantum.measure %q2_2\n\
             }\n"
        );
    }

    #[test]
    fn test_render_init_literal() {
        let mut m = Module::new();
        let f = m.add_func("f");
        let op = m.append(f, OpKind::Init { value: true }, &[]).unwrap();
        assert_eq!(m.render_op(op), "%q0_0 = quantum.init {value = 1 : i1}");
    }
}
