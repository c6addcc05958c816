//! AST-to-IR lowering.
//!
//! Each HDL operator becomes one reversible gadget: XOR is a CNOT pair into
//! an ancilla (written in place onto a freshly produced operand when
//! possible), AND is a Toffoli into an ancilla, OR goes through De Morgan,
//! NOT is an in-place X. The symbol table binds each HDL wire to its current
//! qubit lanes; a lane carries a `negated` flag instead of re-deriving
//! negation from state parity, so renumbering can never confuse it.
//!
//! Negation bookkeeping: a gadget that negates an operand internally (the OR
//! gadget) restores it with a trailing X unless the operand lane is an input
//! argument; argument lanes stay negated with the flag set and are restored
//! lazily by the next gadget (or output measure) that consumes the symbol.
//!
//! While a gadget's earlier operand lanes wait for the rest of the gadget,
//! their lines are *pinned*: an in-place X on a pinned line would leave the
//! waiting lane one state behind, so negation and lazy restoration on pinned
//! lines go through a fresh ancilla instead (`a & ~a` is the smallest
//! offender).

use rustc_hash::{FxHashMap, FxHashSet};
use skinfaxi_ir::{FuncId, Module, OpKind, Type, ValueId};

use crate::ast::{
    Assignment, Direction, Expr, InstanceBody, Member, Root, RootMember, parse_bit_range,
};
use crate::error::{LowerError, LowerResult};

/// Decode the frontend's JSON into the AST data model.
pub fn parse_ast(json: &str) -> LowerResult<Root> {
    Ok(serde_json::from_str(json)?)
}

/// Lower a design to a fresh module, one function per instance.
pub fn lower(root: &Root) -> LowerResult<Module> {
    let mut module = Module::new();
    for member in &root.members {
        if let RootMember::Instance(instance) = member {
            Lowerer::run(&mut module, &instance.body)?;
        }
    }
    Ok(module)
}

/// One qubit lane bound to a symbol.
#[derive(Debug, Clone, Copy)]
struct Lane {
    /// Latest state of the lane's line.
    value: ValueId,
    /// Whether the line currently holds the negation of the symbol's value.
    negated: bool,
}

/// The current lanes of one HDL symbol.
#[derive(Debug, Clone)]
struct Binding {
    lanes: Vec<Lane>,
    lsb: u32,
}

/// Lines an in-progress gadget holds operand lanes on.
type Pinned = FxHashSet<u32>;

/// Lowers one instance body into one IR function.
struct Lowerer<'m> {
    module: &'m mut Module,
    func: FuncId,
    symbols: FxHashMap<String, Binding>,
    arg_lines: FxHashSet<u32>,
}

impl<'m> Lowerer<'m> {
    fn run(module: &'m mut Module, body: &InstanceBody) -> LowerResult<FuncId> {
        let name = body
            .name
            .clone()
            .unwrap_or_else(|| body.definition.clone());
        let func = module.add_func(name);
        let mut lowerer = Self {
            module,
            func,
            symbols: FxHashMap::default(),
            arg_lines: FxHashSet::default(),
        };
        lowerer.lower_body(body)?;
        Ok(func)
    }

    fn lower_body(&mut self, body: &InstanceBody) -> LowerResult<()> {
        // Input ports become block arguments, one qubit per lane.
        for member in &body.members {
            if let Member::Port(port) = member {
                if port.direction == Direction::In {
                    let range = parse_bit_range(&port.ty).ok_or_else(|| {
                        LowerError::MalformedAst(format!("bad port type '{}'", port.ty))
                    })?;
                    let mut lanes = Vec::with_capacity(range.width as usize);
                    for _ in 0..range.width {
                        let value = self.module.add_argument(self.func, Type::Bit);
                        self.arg_lines
                            .insert(self.module.value(value).qubit.qubit);
                        lanes.push(Lane {
                            value,
                            negated: false,
                        });
                    }
                    self.symbols.insert(
                        port.internal_symbol.clone(),
                        Binding {
                            lanes,
                            lsb: range.lsb,
                        },
                    );
                }
            }
        }

        self.lower_members(&body.members)?;

        // Every declared output measures its symbol's latest lanes.
        for member in &body.members {
            if let Member::Port(port) = member {
                if port.direction == Direction::Out {
                    let lanes = self.consume_symbol(&port.internal_symbol, &Pinned::default())?;
                    for value in lanes {
                        self.module.append(self.func, OpKind::Measure, &[value])?;
                    }
                }
            }
        }
        Ok(())
    }

    fn lower_members(&mut self, members: &[Member]) -> LowerResult<()> {
        for member in members {
            match member {
                Member::ContinuousAssign(assign) => self.lower_assign(&assign.assignment)?,
                Member::ProceduralBlock(block) => {
                    for stmt in block.body.body.iter() {
                        self.lower_assign(&stmt.expr)?;
                    }
                }
                Member::GenerateBlock { members } | Member::GenerateBlockArray { members } => {
                    self.lower_members(members)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn lower_assign(&mut self, assignment: &Assignment) -> LowerResult<()> {
        let Expr::NamedValue { symbol, ty } = &assignment.left else {
            return Err(LowerError::MalformedAst(
                "assignment target must be a named wire".into(),
            ));
        };
        let range = parse_bit_range(ty)
            .ok_or_else(|| LowerError::MalformedAst(format!("bad target type '{ty}'")))?;

        let pinned = Pinned::default();
        let lanes = match &assignment.right {
            Expr::Conversion { operand } => self.lower_literal(operand, range.width)?,
            Expr::IntegerLiteral { .. } => self.lower_literal(&assignment.right, range.width)?,
            Expr::BinaryOp {
                op, left, right, ..
            } => self.lower_binary(op, left, right, &pinned)?,
            Expr::UnaryOp { op, operand } => self.lower_unary(op, operand, &pinned)?,
            Expr::NamedValue { .. } | Expr::ElementSelect { .. } => {
                self.lower_copy(&assignment.right, &pinned)?
            }
            Expr::EmptyArgument {} => {
                return Err(LowerError::MalformedAst(
                    "empty argument on assignment right-hand side".into(),
                ));
            }
        };

        if lanes.len() != range.width as usize {
            return Err(LowerError::WidthMismatch {
                left: range.width as usize,
                right: lanes.len(),
                context: format!("assignment to '{symbol}'"),
            });
        }
        self.symbols.insert(
            symbol.clone(),
            Binding {
                lanes: lanes
                    .into_iter()
                    .map(|value| Lane {
                        value,
                        negated: false,
                    })
                    .collect(),
                lsb: range.lsb,
            },
        );
        Ok(())
    }

    // =========================================================================
    // Gadgets
    // =========================================================================

    /// `y = <literal>`: one Init per lane carrying the lane's bit.
    fn lower_literal(&mut self, literal: &Expr, width: u32) -> LowerResult<Vec<ValueId>> {
        let Expr::IntegerLiteral { value } = literal else {
            return Err(LowerError::MalformedAst(
                "conversion marker without a literal".into(),
            ));
        };
        let bits: u64 = value
            .trim()
            .parse()
            .map_err(|_| LowerError::BadLiteral(value.clone()))?;
        let mut lanes = Vec::with_capacity(width as usize);
        for i in 0..width {
            let op = self.module.append(
                self.func,
                OpKind::Init {
                    value: (bits >> i) & 1 == 1,
                },
                &[],
            )?;
            lanes.push(self.module.op(op).result);
        }
        Ok(lanes)
    }

    /// `y = x`: CNOT each source lane onto a fresh zeroed ancilla.
    fn lower_copy(&mut self, source: &Expr, pinned: &Pinned) -> LowerResult<Vec<ValueId>> {
        let src = self.lower_operand(source, pinned)?;
        src.into_iter().map(|value| self.copy_lane(value)).collect()
    }

    fn lower_binary(
        &mut self,
        op: &str,
        left: &Expr,
        right: &Expr,
        pinned: &Pinned,
    ) -> LowerResult<Vec<ValueId>> {
        match op {
            "BinaryXor" => self.lower_xor(left, right, pinned),
            "BinaryAnd" => self.lower_and(left, right, pinned),
            "BinaryOr" => self.lower_or(left, right, pinned),
            other => Err(LowerError::UnknownOperator(other.into())),
        }
    }

    fn lower_unary(
        &mut self,
        op: &str,
        operand: &Expr,
        pinned: &Pinned,
    ) -> LowerResult<Vec<ValueId>> {
        if op != "BitwiseNot" {
            return Err(LowerError::UnknownOperator(op.into()));
        }
        let lanes = self.lower_operand(operand, pinned)?;
        lanes
            .into_iter()
            .map(|value| self.negate_lane(value, pinned))
            .collect()
    }

    /// Lower both operands of a binary gadget; the left lanes' lines are
    /// pinned while the right side lowers.
    fn lower_operand_pair(
        &mut self,
        left: &Expr,
        right: &Expr,
        pinned: &Pinned,
        context: &str,
    ) -> LowerResult<(Vec<ValueId>, Vec<ValueId>)> {
        let l = self.lower_operand(left, pinned)?;
        let mut inner = pinned.clone();
        inner.extend(l.iter().map(|&v| self.line_of(v)));
        let r = self.lower_operand(right, &inner)?;
        if l.len() != r.len() {
            return Err(LowerError::WidthMismatch {
                left: l.len(),
                right: r.len(),
                context: context.into(),
            });
        }
        Ok((l, r))
    }

    /// `a ^ b`: CNOT pair into an ancilla, or a single CNOT written onto a
    /// freshly produced XOR/NOT operand whose lines nothing else can see.
    fn lower_xor(&mut self, left: &Expr, right: &Expr, pinned: &Pinned) -> LowerResult<Vec<ValueId>> {
        let (l, r) = self.lower_operand_pair(left, right, pinned, "^")?;

        if self.reusable_destination(left, &l, pinned) {
            return l
                .iter()
                .zip(&r)
                .map(|(&dest, &other)| self.append_result(OpKind::CNot, &[other, dest]))
                .collect();
        }
        if self.reusable_destination(right, &r, pinned) {
            return r
                .iter()
                .zip(&l)
                .map(|(&dest, &other)| self.append_result(OpKind::CNot, &[other, dest]))
                .collect();
        }

        let mut lanes = Vec::with_capacity(l.len());
        for (&li, &ri) in l.iter().zip(&r) {
            let anc = self.fresh_zero()?;
            let partial = self.append_result(OpKind::CNot, &[li, anc])?;
            lanes.push(self.append_result(OpKind::CNot, &[ri, partial])?);
        }
        Ok(lanes)
    }

    /// `a & b`: Toffoli into a zeroed ancilla.
    fn lower_and(&mut self, left: &Expr, right: &Expr, pinned: &Pinned) -> LowerResult<Vec<ValueId>> {
        let (l, r) = self.lower_operand_pair(left, right, pinned, "&")?;

        let mut lanes = Vec::with_capacity(l.len());
        for (&li, &ri) in l.iter().zip(&r) {
            let anc = self.fresh_zero()?;
            lanes.push(self.append_result(OpKind::CCNot, &[li, ri, anc])?);
        }
        Ok(lanes)
    }

    /// `a | b` by De Morgan: negate both operands in place, Toffoli into a
    /// fresh ancilla, restore non-argument operands, negate the ancilla.
    fn lower_or(&mut self, left: &Expr, right: &Expr, pinned: &Pinned) -> LowerResult<Vec<ValueId>> {
        let (l, r) = self.lower_operand_pair(left, right, pinned, "|")?;

        let mut lanes = Vec::with_capacity(l.len());
        for (&li, &ri) in l.iter().zip(&r) {
            if li == ri {
                // a | a is a: copy the lane.
                lanes.push(self.copy_lane(li)?);
                continue;
            }
            let anc = self.fresh_zero()?;
            let (ln, restore_l) = self.demorgan_negate(li, pinned)?;
            let (rn, restore_r) = self.demorgan_negate(ri, pinned)?;
            let conj = self.append_result(OpKind::CCNot, &[ln, rn, anc])?;
            if restore_l {
                self.inplace_not(ln)?;
            }
            if restore_r {
                self.inplace_not(rn)?;
            }
            lanes.push(self.append_result(OpKind::Not, &[conj])?);
        }
        Ok(lanes)
    }

    // =========================================================================
    // Operand resolution
    // =========================================================================

    /// Lower an operand expression to its lanes, restoring lazily negated
    /// symbol lanes on the way.
    fn lower_operand(&mut self, expr: &Expr, pinned: &Pinned) -> LowerResult<Vec<ValueId>> {
        match expr {
            Expr::NamedValue { symbol, .. } => self.consume_symbol(symbol, pinned),
            Expr::ElementSelect { value, selector } => {
                let Expr::NamedValue { symbol, .. } = value.as_ref() else {
                    return Err(LowerError::MalformedAst(
                        "element select base must be a named wire".into(),
                    ));
                };
                let Expr::IntegerLiteral { value: index } = selector.as_ref() else {
                    return Err(LowerError::MalformedAst(
                        "element select index must be a literal".into(),
                    ));
                };
                let index: u32 = index
                    .trim()
                    .parse()
                    .map_err(|_| LowerError::BadLiteral(index.clone()))?;
                self.consume_symbol_lane(symbol, index, pinned)
            }
            Expr::BinaryOp {
                op, left, right, ..
            } => self.lower_binary(op, left, right, pinned),
            Expr::UnaryOp { op, operand } => self.lower_unary(op, operand, pinned),
            Expr::Conversion { .. } | Expr::IntegerLiteral { .. } => Err(
                LowerError::MalformedAst("literal operand outside an assignment".into()),
            ),
            Expr::EmptyArgument {} => {
                Err(LowerError::MalformedAst("empty argument operand".into()))
            }
        }
    }

    /// Current lanes of a symbol, restoring any lazily negated lane first.
    fn consume_symbol(&mut self, symbol: &str, pinned: &Pinned) -> LowerResult<Vec<ValueId>> {
        let lanes = self
            .symbols
            .get(symbol)
            .ok_or_else(|| LowerError::UnboundSymbol(symbol.into()))?
            .lanes
            .clone();
        let mut out = Vec::with_capacity(lanes.len());
        for (index, lane) in lanes.iter().enumerate() {
            out.push(self.settled_lane(symbol, index, *lane, pinned)?);
        }
        Ok(out)
    }

    /// One lane of a symbol by declared index.
    fn consume_symbol_lane(
        &mut self,
        symbol: &str,
        index: u32,
        pinned: &Pinned,
    ) -> LowerResult<Vec<ValueId>> {
        let binding = self
            .symbols
            .get(symbol)
            .ok_or_else(|| LowerError::UnboundSymbol(symbol.into()))?;
        let lsb = binding.lsb;
        let count = binding.lanes.len();
        let offset = index
            .checked_sub(lsb)
            .filter(|&o| (o as usize) < count)
            .ok_or(LowerError::IndexOutOfRange {
                symbol: symbol.into(),
                index,
            })? as usize;
        let lane = binding.lanes[offset];
        Ok(vec![self.settled_lane(symbol, offset, lane, pinned)?])
    }

    /// The value a consumer should read for one symbol lane.
    ///
    /// A lazily negated lane on a free line is restored in place; on a
    /// pinned line the restored value materializes on a fresh ancilla and
    /// the binding keeps its negated state.
    fn settled_lane(
        &mut self,
        symbol: &str,
        index: usize,
        lane: Lane,
        pinned: &Pinned,
    ) -> LowerResult<ValueId> {
        if !lane.negated {
            return Ok(lane.value);
        }
        if pinned.contains(&self.line_of(lane.value)) {
            return self.copy_negate(lane.value);
        }
        self.inplace_not(lane.value)?;
        Ok(self.symbols[symbol].lanes[index].value)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn append_result(&mut self, kind: OpKind, operands: &[ValueId]) -> LowerResult<ValueId> {
        let op = self.module.append(self.func, kind, operands)?;
        Ok(self.module.op(op).result)
    }

    fn fresh_zero(&mut self) -> LowerResult<ValueId> {
        self.append_result(OpKind::Init { value: false }, &[])
    }

    fn line_of(&self, value: ValueId) -> u32 {
        self.module.value(value).qubit.qubit
    }

    /// Copy a lane onto a fresh zeroed ancilla.
    fn copy_lane(&mut self, value: ValueId) -> LowerResult<ValueId> {
        let anc = self.fresh_zero()?;
        self.append_result(OpKind::CNot, &[value, anc])
    }

    /// Produce the negation of a lane on a fresh ancilla, leaving its line
    /// untouched.
    fn copy_negate(&mut self, value: ValueId) -> LowerResult<ValueId> {
        let copy = self.copy_lane(value)?;
        self.append_result(OpKind::Not, &[copy])
    }

    /// The negation of a lane: in place on a free line, on a fresh ancilla
    /// on a pinned one.
    fn negate_lane(&mut self, value: ValueId, pinned: &Pinned) -> LowerResult<ValueId> {
        if pinned.contains(&self.line_of(value)) {
            self.copy_negate(value)
        } else {
            self.inplace_not(value)
        }
    }

    /// The ¬operand a De Morgan gadget feeds its Toffoli, plus whether a
    /// trailing restore X is owed afterwards.
    fn demorgan_negate(&mut self, value: ValueId, pinned: &Pinned) -> LowerResult<(ValueId, bool)> {
        if pinned.contains(&self.line_of(value)) {
            // Fresh-line negation needs no restore.
            return Ok((self.copy_negate(value)?, false));
        }
        let negated = self.inplace_not(value)?;
        Ok((negated, !self.is_arg_line(negated)))
    }

    /// Emit an X on a line and flip every symbol lane bound to it.
    fn inplace_not(&mut self, value: ValueId) -> LowerResult<ValueId> {
        let line = self.line_of(value);
        let result = self.append_result(OpKind::Not, &[value])?;
        for binding in self.symbols.values_mut() {
            for lane in &mut binding.lanes {
                if self.module.value(lane.value).qubit.qubit == line {
                    lane.value = result;
                    lane.negated = !lane.negated;
                }
            }
        }
        Ok(result)
    }

    fn is_arg_line(&self, value: ValueId) -> bool {
        self.arg_lines.contains(&self.line_of(value))
    }

    /// Whether an XOR may write its result onto this operand in place: the
    /// operand is a freshly emitted XOR or NOT gadget and its lines are
    /// internal ancillas no symbol, argument or pinned sibling can observe.
    fn reusable_destination(&self, expr: &Expr, lanes: &[ValueId], pinned: &Pinned) -> bool {
        let fresh_gadget = matches!(
            expr,
            Expr::BinaryOp { op, .. } if op == "BinaryXor"
        ) || matches!(
            expr,
            Expr::UnaryOp { op, .. } if op == "BitwiseNot"
        );
        fresh_gadget
            && lanes.iter().all(|&v| {
                let line = self.line_of(v);
                !self.arg_lines.contains(&line)
                    && !pinned.contains(&line)
                    && !self.symbols.values().any(|b| {
                        b.lanes
                            .iter()
                            .any(|l| self.module.value(l.value).qubit.qubit == line)
                    })
            })
    }
}
