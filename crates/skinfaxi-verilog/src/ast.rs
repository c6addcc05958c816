//! Data model for the JSON AST handed over by the SystemVerilog frontend.
//!
//! The external parser (a slang-style elaborator) serializes the elaborated
//! design as JSON; this module mirrors exactly the node shapes the lowering
//! consumes. Node kinds are closed: an unrecognized `kind` is a malformed
//! AST and fails deserialization.

use serde::Deserialize;

/// Root of the serialized design.
#[derive(Debug, Clone, Deserialize)]
pub struct Root {
    /// Top-level members: compilation units and instances.
    pub members: Vec<RootMember>,
}

/// A top-level member.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum RootMember {
    /// Source-text bookkeeping node; carries nothing we lower.
    CompilationUnit {},
    /// An elaborated module instance.
    Instance(Instance),
}

/// An elaborated module instance.
#[derive(Debug, Clone, Deserialize)]
pub struct Instance {
    /// The instantiated body.
    pub body: InstanceBody,
    /// Port connections at the instantiation site.
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// The body of an instance: ports, nets and processes.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceBody {
    /// Instance name.
    #[serde(default)]
    pub name: Option<String>,
    /// Name of the module definition.
    pub definition: String,
    /// Ordered members.
    pub members: Vec<Member>,
}

/// A member of an instance body.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum Member {
    /// A port declaration.
    Port(Port),
    /// A net declaration (no IR footprint; wires materialize on assignment).
    Net {},
    /// A variable declaration.
    Variable {},
    /// An elaboration-time parameter.
    Parameter {},
    /// A generate variable.
    Genvar {},
    /// An elaborated generate block.
    GenerateBlock {
        /// Members of the block.
        #[serde(default)]
        members: Vec<Member>,
    },
    /// An array of generate blocks.
    GenerateBlockArray {
        /// The expanded blocks.
        #[serde(default)]
        members: Vec<Member>,
    },
    /// `assign lhs = rhs;`
    ContinuousAssign(ContinuousAssign),
    /// An `always_comb`-style process.
    ProceduralBlock(ProceduralBlock),
}

/// A port declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    /// Port direction.
    pub direction: Direction,
    /// Name of the symbol the port binds inside the body.
    pub internal_symbol: String,
    /// Type string, `"<kw>"` or `"<kw>[<hi>:<lo>]"`.
    #[serde(rename = "type")]
    pub ty: String,
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Direction {
    /// Input port.
    In,
    /// Output port.
    Out,
}

/// A continuous assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct ContinuousAssign {
    /// The contained assignment.
    pub assignment: Assignment,
}

/// A procedural block (combinational process).
#[derive(Debug, Clone, Deserialize)]
pub struct ProceduralBlock {
    /// The statement body.
    pub body: StmtBlock,
}

/// A block of statements inside a procedural block.
#[derive(Debug, Clone, Deserialize)]
pub struct StmtBlock {
    /// One statement or a list of them.
    pub body: StmtList,
}

/// One-or-many statements, as the frontend serializes them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StmtList {
    /// A single statement.
    One(Stmt),
    /// Several statements.
    Many(Vec<Stmt>),
}

impl StmtList {
    /// Iterate the statements regardless of the serialized shape.
    pub fn iter(&self) -> impl Iterator<Item = &Stmt> {
        match self {
            StmtList::One(s) => std::slice::from_ref(s).iter(),
            StmtList::Many(v) => v.iter(),
        }
    }
}

/// An expression statement wrapping an assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct Stmt {
    /// The assignment expression.
    pub expr: Assignment,
}

/// An assignment, `left = right`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Assignment target.
    pub left: Expr,
    /// Assigned expression.
    pub right: Expr,
    /// Whether the HDL used `<=`. Combinational lowering treats both alike.
    #[serde(default)]
    pub is_non_blocking: bool,
}

/// An expression node.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum Expr {
    /// Reference to a named wire or port.
    NamedValue {
        /// Referenced symbol.
        symbol: String,
        /// Type string.
        #[serde(rename = "type")]
        ty: String,
    },
    /// A binary bit-wise operator.
    BinaryOp {
        /// Operator name: `BinaryAnd`, `BinaryOr`, `BinaryXor`.
        op: String,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
        /// Result type string.
        #[serde(rename = "type")]
        ty: String,
    },
    /// A unary bit-wise operator.
    UnaryOp {
        /// Operator name: `BitwiseNot`.
        op: String,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Marker the frontend wraps around literal right-hand sides.
    Conversion {
        /// The wrapped literal.
        operand: Box<Expr>,
    },
    /// An integer literal.
    IntegerLiteral {
        /// Decimal rendering of the value.
        value: String,
    },
    /// A single-lane select, `value[selector]`.
    ElementSelect {
        /// The selected register.
        value: Box<Expr>,
        /// The lane index expression.
        selector: Box<Expr>,
    },
    /// An unconnected argument.
    EmptyArgument {},
}

/// A port connection at an instantiation site.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection {
    /// Connected port name.
    pub port: String,
}

/// Parsed form of a `"<kw>[<hi>:<lo>]"` type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRange {
    /// Number of lanes.
    pub width: u32,
    /// Least significant lane index.
    pub lsb: u32,
}

impl BitRange {
    /// A scalar (single-bit) range.
    pub fn scalar() -> Self {
        Self { width: 1, lsb: 0 }
    }
}

/// Parse the lane range out of a type string.
///
/// `"logic"` is a scalar; `"logic[3:0]"` has width 4 with lsb 0. Returns
/// `None` when the bracket contents do not parse.
pub fn parse_bit_range(ty: &str) -> Option<BitRange> {
    let Some(open) = ty.find('[') else {
        return Some(BitRange::scalar());
    };
    let close = ty.rfind(']')?;
    let inner = ty.get(open + 1..close)?;
    let (hi, lo) = inner.split_once(':')?;
    let hi: u32 = hi.trim().parse().ok()?;
    let lo: u32 = lo.trim().parse().ok()?;
    if hi < lo {
        return None;
    }
    Some(BitRange {
        width: hi - lo + 1,
        lsb: lo,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bit_range() {
        assert_eq!(parse_bit_range("logic"), Some(BitRange::scalar()));
        assert_eq!(
            parse_bit_range("logic[3:0]"),
            Some(BitRange { width: 4, lsb: 0 })
        );
        assert_eq!(
            parse_bit_range("wire[7:4]"),
            Some(BitRange { width: 4, lsb: 4 })
        );
        assert_eq!(parse_bit_range("logic[0:3]"), None);
        assert_eq!(parse_bit_range("logic[x:0]"), None);
    }

    #[test]
    fn test_deserialize_continuous_assign() {
        let json = r#"{
            "kind": "ContinuousAssign",
            "assignment": {
                "kind": "Assignment",
                "left": {"kind": "NamedValue", "symbol": "y", "type": "logic"},
                "right": {
                    "kind": "BinaryOp",
                    "op": "BinaryXor",
                    "type": "logic",
                    "left": {"kind": "NamedValue", "symbol": "a", "type": "logic"},
                    "right": {"kind": "NamedValue", "symbol": "b", "type": "logic"}
                },
                "isNonBlocking": false
            }
        }"#;
        let member: Member = serde_json::from_str(json).unwrap();
        let Member::ContinuousAssign(ca) = member else {
            panic!("expected ContinuousAssign");
        };
        let Expr::BinaryOp { op, .. } = &ca.assignment.right else {
            panic!("expected BinaryOp");
        };
        assert_eq!(op, "BinaryXor");
    }

    #[test]
    fn test_deserialize_procedural_block_single_stmt() {
        let json = r#"{
            "kind": "ProceduralBlock",
            "body": {
                "kind": "Block",
                "body": {
                    "kind": "ExpressionStatement",
                    "expr": {
                        "kind": "Assignment",
                        "left": {"kind": "NamedValue", "symbol": "y", "type": "logic"},
                        "right": {"kind": "UnaryOp", "op": "BitwiseNot",
                                  "operand": {"kind": "NamedValue", "symbol": "a", "type": "logic"}},
                        "isNonBlocking": true
                    }
                }
            }
        }"#;
        let member: Member = serde_json::from_str(json).unwrap();
        let Member::ProceduralBlock(pb) = member else {
            panic!("expected ProceduralBlock");
        };
        assert_eq!(pb.body.body.iter().count(), 1);
    }

    #[test]
    fn test_unknown_member_kind_is_malformed() {
        let json = r#"{"kind": "ClockingBlock"}"#;
        assert!(serde_json::from_str::<Member>(json).is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_bit_range_width(lo in 0u32..64, extra in 0u32..64) {
            let hi = lo + extra;
            let parsed = parse_bit_range(&format!("logic[{hi}:{lo}]")).unwrap();
            proptest::prop_assert_eq!(parsed.width, extra + 1);
            proptest::prop_assert_eq!(parsed.lsb, lo);
        }
    }
}
