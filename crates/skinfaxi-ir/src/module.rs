//! Arena-backed module, function bodies and mutation primitives.
//!
//! The module owns every operation and value in id-indexed arenas. Function
//! bodies are intrusive doubly-linked lists of operations, so insertion and
//! erasure are O(1) and each body keeps an exact op count (the fixpoint
//! driver compares counts between rounds). Use lists are sets of
//! `(operation, operand index)` pairs, which makes replace-all-uses a set
//! rewrite instead of a pointer chase.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{IrError, IrResult};
use crate::op::{FuncId, OpData, OpId, OpKind};
use crate::qubit::{QubitRef, Type};
use crate::value::{Use, ValueData, ValueId, ValueOwner};

/// A function body: ordered arguments plus a linked list of operations.
#[derive(Debug, Clone)]
pub struct FuncData {
    /// Function name (the HDL module definition name).
    pub name: String,
    /// Block arguments, one per input qubit lane.
    pub args: Vec<ValueId>,
    /// First operation in the body.
    pub first: Option<OpId>,
    /// Last operation in the body.
    pub last: Option<OpId>,
    /// Exact number of operations in the body.
    pub num_ops: usize,
}

/// A module: the root of the IR, owning all functions, operations and values.
#[derive(Debug, Clone, Default)]
pub struct Module {
    funcs: Vec<FuncData>,
    ops: Vec<Option<OpData>>,
    values: Vec<Option<ValueData>>,
    next_qubit: u32,
}

impl Module {
    /// Create an empty module.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Add an empty function.
    pub fn add_func(&mut self, name: impl Into<String>) -> FuncId {
        let id = FuncId(u32::try_from(self.funcs.len()).expect("function count overflow"));
        self.funcs.push(FuncData {
            name: name.into(),
            args: vec![],
            first: None,
            last: None,
            num_ops: 0,
        });
        id
    }

    /// Add a block argument to a function, on a fresh qubit line at state 0.
    pub fn add_argument(&mut self, func: FuncId, ty: Type) -> ValueId {
        let qubit = QubitRef::initial(self.fresh_qubit());
        let index = self.funcs[func.0 as usize].args.len();
        let value = self.new_value(ty, qubit, ValueOwner::Argument { func, index });
        self.funcs[func.0 as usize].args.push(value);
        value
    }

    /// Allocate the next unused qubit line number.
    pub fn fresh_qubit(&mut self) -> u32 {
        let n = self.next_qubit;
        self.next_qubit += 1;
        n
    }

    /// The number of qubit lines allocated so far.
    pub fn num_qubits(&self) -> u32 {
        self.next_qubit
    }

    /// Reset the qubit line counter (used by renumbering).
    pub fn set_num_qubits(&mut self, n: u32) {
        self.next_qubit = n;
    }

    fn new_value(&mut self, ty: Type, qubit: QubitRef, owner: ValueOwner) -> ValueId {
        let id = ValueId(u32::try_from(self.values.len()).expect("value count overflow"));
        self.values.push(Some(ValueData {
            ty,
            qubit,
            owner,
            uses: FxHashSet::default(),
        }));
        id
    }

    fn new_op(&mut self, func: FuncId, kind: OpKind, operands: &[ValueId]) -> IrResult<OpId> {
        if operands.len() != kind.num_operands() {
            return Err(IrError::OperandCountMismatch {
                kind: kind.name(),
                expected: kind.num_operands(),
                got: operands.len(),
            });
        }

        let id = OpId(u32::try_from(self.ops.len()).expect("op count overflow"));

        // Init allocates a fresh line; every other kind bumps its target.
        let (ty, qubit) = match kind {
            OpKind::Init { .. } => (Type::Bit, QubitRef::initial(self.fresh_qubit())),
            _ => {
                let target = *operands.last().expect("non-init op has a target");
                let t = self.value(target);
                (t.ty, t.qubit.bump())
            }
        };
        let result = self.new_value(ty, qubit, ValueOwner::Result(id));

        for (index, &operand) in operands.iter().enumerate() {
            self.value_mut(operand).uses.insert(Use { op: id, index });
        }

        self.ops.push(Some(OpData {
            kind,
            operands: operands.to_vec(),
            result,
            func,
            prev: None,
            next: None,
        }));
        Ok(id)
    }

    /// Append an operation at the end of a function body.
    pub fn append(&mut self, func: FuncId, kind: OpKind, operands: &[ValueId]) -> IrResult<OpId> {
        let id = self.new_op(func, kind, operands)?;
        let f = &mut self.funcs[func.0 as usize];
        let prev = f.last;
        f.last = Some(id);
        if f.first.is_none() {
            f.first = Some(id);
        }
        f.num_ops += 1;
        self.op_mut(id).prev = prev;
        if let Some(p) = prev {
            self.op_mut(p).next = Some(id);
        }
        Ok(id)
    }

    /// Insert an operation immediately before an existing one.
    pub fn insert_before(
        &mut self,
        before: OpId,
        kind: OpKind,
        operands: &[ValueId],
    ) -> IrResult<OpId> {
        let func = self.op(before).func;
        let id = self.new_op(func, kind, operands)?;
        let prev = self.op(before).prev;
        self.op_mut(id).prev = prev;
        self.op_mut(id).next = Some(before);
        self.op_mut(before).prev = Some(id);
        match prev {
            Some(p) => self.op_mut(p).next = Some(id),
            None => self.funcs[func.0 as usize].first = Some(id),
        }
        self.funcs[func.0 as usize].num_ops += 1;
        Ok(id)
    }

    /// Insert an operation immediately after an existing one.
    pub fn insert_after(
        &mut self,
        after: OpId,
        kind: OpKind,
        operands: &[ValueId],
    ) -> IrResult<OpId> {
        let func = self.op(after).func;
        let id = self.new_op(func, kind, operands)?;
        let next = self.op(after).next;
        self.op_mut(id).prev = Some(after);
        self.op_mut(id).next = next;
        self.op_mut(after).next = Some(id);
        match next {
            Some(n) => self.op_mut(n).prev = Some(id),
            None => self.funcs[func.0 as usize].last = Some(id),
        }
        self.funcs[func.0 as usize].num_ops += 1;
        Ok(id)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Erase an operation.
    ///
    /// Fails if the operation's result still has uses. On success the
    /// operation and its result value are destroyed and the op is unlinked
    /// from its body.
    pub fn erase(&mut self, op: OpId) -> IrResult<()> {
        let result = self.op(op).result;
        let uses = self.value(result).uses.len();
        if uses > 0 {
            return Err(IrError::EraseWithUses {
                op,
                value: result,
                uses,
            });
        }

        let data = self.ops[op.0 as usize].take().expect("op already erased");
        for (index, operand) in data.operands.iter().enumerate() {
            self.value_mut(*operand).uses.remove(&Use { op, index });
        }
        self.values[data.result.0 as usize] = None;

        match data.prev {
            Some(p) => {
                if let Some(prev) = self.ops[p.0 as usize].as_mut() {
                    prev.next = data.next;
                }
            }
            None => self.funcs[data.func.0 as usize].first = data.next,
        }
        match data.next {
            Some(n) => {
                if let Some(next) = self.ops[n.0 as usize].as_mut() {
                    next.prev = data.prev;
                }
            }
            None => self.funcs[data.func.0 as usize].last = data.prev,
        }
        self.funcs[data.func.0 as usize].num_ops -= 1;
        Ok(())
    }

    /// Rewire every use of `old` to read `new` instead.
    ///
    /// The defining operation of `old` is left in place; a following erase
    /// removes it once dead.
    pub fn replace_all_uses(&mut self, old: ValueId, new: ValueId) {
        if old == new {
            return;
        }
        let uses: Vec<Use> = self.value(old).uses.iter().copied().collect();
        for u in &uses {
            self.op_mut(u.op).operands[u.index] = new;
        }
        self.value_mut(old).uses.clear();
        self.value_mut(new).uses.extend(uses);
    }

    /// Rewire uses of `old` held by operations strictly after `pivot`.
    ///
    /// Uses at or before `pivot` (in body order) are left untouched.
    pub fn replace_uses_after(&mut self, old: ValueId, new: ValueId, pivot: OpId) {
        if old == new {
            return;
        }
        let mut after: FxHashSet<OpId> = FxHashSet::default();
        let mut cur = self.op(pivot).next;
        while let Some(id) = cur {
            after.insert(id);
            cur = self.op(id).next;
        }
        let uses: Vec<Use> = self
            .value(old)
            .uses
            .iter()
            .copied()
            .filter(|u| after.contains(&u.op))
            .collect();
        for u in &uses {
            self.op_mut(u.op).operands[u.index] = new;
            self.value_mut(old).uses.remove(u);
        }
        self.value_mut(new).uses.extend(uses);
    }

    /// Replace a single operand slot.
    pub fn set_operand(&mut self, op: OpId, index: usize, new: ValueId) {
        let old = self.op(op).operands[index];
        if old == new {
            return;
        }
        self.value_mut(old).uses.remove(&Use { op, index });
        self.op_mut(op).operands[index] = new;
        self.value_mut(new).uses.insert(Use { op, index });
    }

    /// Move a value onto a different qubit-line point (renumbering/relabel).
    pub fn set_qubit(&mut self, value: ValueId, qubit: QubitRef) {
        self.value_mut(value).qubit = qubit;
    }

    /// Re-derive every result's (line, state) label from its target operand.
    ///
    /// A single forward sweep restores the naming invariants after a pass
    /// rewired operands: each result sits one state after its target, on the
    /// target's line. `Init` results and block arguments keep their labels.
    pub fn relabel_states(&mut self) {
        for func in self.func_ids() {
            let ops: Vec<OpId> = self.ops(func).collect();
            for op in ops {
                if matches!(self.op(op).kind, OpKind::Init { .. }) {
                    continue;
                }
                let target = self.op(op).target().expect("non-init op has a target");
                let label = self.value(target).qubit.bump();
                let result = self.op(op).result;
                self.value_mut(result).qubit = label;
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Shared access to an operation record.
    pub fn op(&self, id: OpId) -> &OpData {
        self.ops[id.0 as usize].as_ref().expect("op was erased")
    }

    fn op_mut(&mut self, id: OpId) -> &mut OpData {
        self.ops[id.0 as usize].as_mut().expect("op was erased")
    }

    /// Whether an operation id still refers to a live operation.
    pub fn is_live(&self, id: OpId) -> bool {
        self.ops[id.0 as usize].is_some()
    }

    /// Shared access to a value record.
    pub fn value(&self, id: ValueId) -> &ValueData {
        self.values[id.0 as usize]
            .as_ref()
            .expect("value was destroyed")
    }

    fn value_mut(&mut self, id: ValueId) -> &mut ValueData {
        self.values[id.0 as usize]
            .as_mut()
            .expect("value was destroyed")
    }

    /// Shared access to a function record.
    pub fn func(&self, id: FuncId) -> &FuncData {
        &self.funcs[id.0 as usize]
    }

    /// Function ids in document order.
    pub fn func_ids(&self) -> impl Iterator<Item = FuncId> + use<> {
        let count = self.funcs.len();
        (0..count).map(|i| FuncId(i as u32))
    }

    /// Operations of one function body in document order.
    ///
    /// The iterator borrows the module: passes that mutate while walking must
    /// collect the ids into a scratch buffer first.
    pub fn ops(&self, func: FuncId) -> OpIter<'_> {
        OpIter {
            module: self,
            cur: self.func(func).first,
        }
    }

    /// Every operation in the module, document order, functions first-to-last.
    pub fn walk(&self) -> impl Iterator<Item = (FuncId, OpId)> + '_ {
        self.func_ids()
            .flat_map(|f| self.ops(f).map(move |op| (f, op)))
    }

    /// Total operation count across all function bodies.
    pub fn num_ops(&self) -> usize {
        self.funcs.iter().map(|f| f.num_ops).sum()
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Check the structural and naming invariants.
    ///
    /// Verifies per function body: operand arity, defs-before-uses, use-list
    /// symmetry, latest-state uniqueness (every operand reads the most recent
    /// state of its line) and state monotonicity (each result sits exactly
    /// one state after its target).
    pub fn verify(&self) -> IrResult<()> {
        for func in self.func_ids() {
            let mut latest: FxHashMap<u32, ValueId> = FxHashMap::default();
            let mut defined: FxHashSet<ValueId> = FxHashSet::default();

            for &arg in &self.func(func).args {
                let q = self.value(arg).qubit;
                if latest.insert(q.qubit, arg).is_some() {
                    return Err(IrError::InvariantViolation(format!(
                        "function @{}: duplicate argument line q{}",
                        self.func(func).name,
                        q.qubit
                    )));
                }
                defined.insert(arg);
            }

            for op in self.ops(func) {
                let data = self.op(op);
                if data.operands.len() != data.kind.num_operands() {
                    return Err(IrError::InvariantViolation(format!(
                        "{}: arity mismatch",
                        self.render_op(op)
                    )));
                }
                for (index, &operand) in data.operands.iter().enumerate() {
                    if !defined.contains(&operand) {
                        return Err(IrError::InvariantViolation(format!(
                            "{}: operand {} used before definition",
                            self.render_op(op),
                            self.value(operand).qubit
                        )));
                    }
                    if !self.value(operand).uses.contains(&Use { op, index }) {
                        return Err(IrError::InvariantViolation(format!(
                            "{}: operand {} missing from use list",
                            self.render_op(op),
                            self.value(operand).qubit
                        )));
                    }
                    let q = self.value(operand).qubit;
                    if latest.get(&q.qubit) != Some(&operand) {
                        return Err(IrError::InvariantViolation(format!(
                            "{}: reads stale state {} of line q{}",
                            self.render_op(op),
                            q,
                            q.qubit
                        )));
                    }
                }

                let result = self.value(data.result);
                match data.kind {
                    OpKind::Init { .. } => {
                        if latest.contains_key(&result.qubit.qubit) {
                            return Err(IrError::InvariantViolation(format!(
                                "{}: re-initializes live line q{}",
                                self.render_op(op),
                                result.qubit.qubit
                            )));
                        }
                        latest.insert(result.qubit.qubit, data.result);
                    }
                    _ => {
                        let target = self.value(data.target().expect("target"));
                        if result.qubit != target.qubit.bump() {
                            return Err(IrError::InvariantViolation(format!(
                                "{}: result {} does not follow target {}",
                                self.render_op(op),
                                result.qubit,
                                target.qubit
                            )));
                        }
                        // A measure only reads; the measured state stays live.
                        if data.kind.bumps_line() {
                            latest.insert(result.qubit.qubit, data.result);
                        }
                    }
                }
                defined.insert(data.result);
            }
        }
        Ok(())
    }
}

/// Forward iterator over one function body.
pub struct OpIter<'a> {
    module: &'a Module,
    cur: Option<OpId>,
}

impl Iterator for OpIter<'_> {
    type Item = OpId;

    fn next(&mut self) -> Option<OpId> {
        let id = self.cur?;
        self.cur = self.module.op(id).next;
        Some(id)
    }
}
