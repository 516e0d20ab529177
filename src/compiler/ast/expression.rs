use serde::{Deserialize, Serialize};

use super::{statement::Block, ty::Type, Declaration};

/// An expression node.  `ty` starts out empty and is filled in by the type
/// checker the first time the node is visited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub line: u32,
    #[serde(default)]
    pub ty: Option<Type>,
    pub kind: ExpressionKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    Integer(i32),
    Double(f64),
    Str(String),
    Null,
    Read,
    Unary(UnaryOperator, Box<Expression>),
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),
    /// The value stored at a location.
    RValue(LValue),
    Assignment(LValue, Box<Expression>),
    AddressOf(LValue),
    /// Reserves `count` objects on the stack and yields their address.
    StackAlloc(Box<Expression>),
    SizeOf(Box<Expression>),
    /// A call with no callee refers to the innermost enclosing function.
    Call(Option<Box<Expression>>, Vec<Expression>),
    Function(FunctionDef),
}

/// A storage location: either a named variable or an element of a pointer
/// indexed by an integer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LValue {
    pub line: u32,
    #[serde(default)]
    pub ty: Option<Type>,
    pub kind: LValueKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LValueKind {
    Variable(String),
    Index(Box<Expression>, Box<Expression>),
}

/// The body of a function literal.  The signature lives in the type of the
/// [`Expression`] which owns this definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub args: Vec<Declaration>,
    pub body: Block,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum UnaryOperator {
    Minus,
    Plus,
    Not,
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use UnaryOperator::*;
        match self {
            Minus => f.write_str("-"),
            Plus => f.write_str("+"),
            Not => f.write_str("~"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOperator {
    pub fn is_comparison(&self) -> bool {
        use BinaryOperator::*;
        matches!(self, Lt | Le | Gt | Ge | Eq | Ne)
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use BinaryOperator::*;
        match self {
            Add => f.write_str("+"),
            Sub => f.write_str("-"),
            Mul => f.write_str("*"),
            Div => f.write_str("/"),
            Mod => f.write_str("%"),
            Lt => f.write_str("<"),
            Le => f.write_str("<="),
            Gt => f.write_str(">"),
            Ge => f.write_str(">="),
            Eq => f.write_str("=="),
            Ne => f.write_str("!="),
            And => f.write_str("&&"),
            Or => f.write_str("||"),
        }
    }
}

impl Expression {
    pub fn new(line: u32, kind: ExpressionKind) -> Expression {
        Expression {
            line,
            ty: None,
            kind,
        }
    }

    /// Returns `true` once the node carries a type that is neither missing
    /// nor the bare wildcard.  Such nodes are skipped on later visits.
    pub fn is_resolved(&self) -> bool {
        match &self.ty {
            None | Some(Type::Unspecified) => false,
            Some(_) => true,
        }
    }

    /// Assigns a type to this node.  A type that is already concrete is never
    /// overwritten; only missing or wildcard types can be narrowed.
    pub fn set_type(&mut self, ty: Type) {
        match &self.ty {
            Some(current) if current.is_concrete() => (),
            _ => self.ty = Some(ty),
        }
    }

    pub fn get_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    pub fn int(line: u32, v: i32) -> Expression {
        Expression::new(line, ExpressionKind::Integer(v))
    }

    pub fn double(line: u32, v: f64) -> Expression {
        Expression::new(line, ExpressionKind::Double(v))
    }

    pub fn string(line: u32, s: &str) -> Expression {
        Expression::new(line, ExpressionKind::Str(s.into()))
    }

    pub fn null(line: u32) -> Expression {
        Expression::new(line, ExpressionKind::Null)
    }

    pub fn read(line: u32) -> Expression {
        Expression::new(line, ExpressionKind::Read)
    }

    pub fn unary(line: u32, op: UnaryOperator, operand: Expression) -> Expression {
        Expression::new(line, ExpressionKind::Unary(op, Box::new(operand)))
    }

    pub fn binary(line: u32, op: BinaryOperator, l: Expression, r: Expression) -> Expression {
        Expression::new(line, ExpressionKind::Binary(op, Box::new(l), Box::new(r)))
    }

    /// Reads the value of the variable `name`.
    pub fn var(line: u32, name: &str) -> Expression {
        Expression::new(line, ExpressionKind::RValue(LValue::var(line, name)))
    }

    pub fn rvalue(line: u32, lvalue: LValue) -> Expression {
        Expression::new(line, ExpressionKind::RValue(lvalue))
    }

    pub fn assign(line: u32, lvalue: LValue, value: Expression) -> Expression {
        Expression::new(line, ExpressionKind::Assignment(lvalue, Box::new(value)))
    }

    pub fn address_of(line: u32, lvalue: LValue) -> Expression {
        Expression::new(line, ExpressionKind::AddressOf(lvalue))
    }

    pub fn stack_alloc(line: u32, count: Expression) -> Expression {
        Expression::new(line, ExpressionKind::StackAlloc(Box::new(count)))
    }

    pub fn size_of(line: u32, operand: Expression) -> Expression {
        Expression::new(line, ExpressionKind::SizeOf(Box::new(operand)))
    }

    pub fn call(line: u32, callee: Expression, args: Vec<Expression>) -> Expression {
        Expression::new(line, ExpressionKind::Call(Some(Box::new(callee)), args))
    }

    /// A call to the innermost enclosing function.
    pub fn recurse(line: u32, args: Vec<Expression>) -> Expression {
        Expression::new(line, ExpressionKind::Call(None, args))
    }

    /// A function literal.  Every argument declaration must carry a type; the
    /// function type of the node is built from them and `output`.
    pub fn function(line: u32, output: Type, args: Vec<Declaration>, body: Block) -> Expression {
        let inputs = args
            .iter()
            .map(|a| a.ty.clone().unwrap_or(Type::Unspecified))
            .collect();
        Expression {
            line,
            ty: Some(Type::function(inputs, output)),
            kind: ExpressionKind::Function(FunctionDef { args, body }),
        }
    }
}

impl LValue {
    pub fn new(line: u32, kind: LValueKind) -> LValue {
        LValue {
            line,
            ty: None,
            kind,
        }
    }

    pub fn var(line: u32, name: &str) -> LValue {
        LValue::new(line, LValueKind::Variable(name.into()))
    }

    pub fn index(line: u32, base: Expression, index: Expression) -> LValue {
        LValue::new(line, LValueKind::Index(Box::new(base), Box::new(index)))
    }

    pub fn is_resolved(&self) -> bool {
        match &self.ty {
            None | Some(Type::Unspecified) => false,
            Some(_) => true,
        }
    }

    /// The name of the variable if this location is a plain variable.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            LValueKind::Variable(name) => Some(name),
            LValueKind::Index(..) => None,
        }
    }
}
