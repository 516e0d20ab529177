mod expression;
mod statement;
mod ty;

pub use self::expression::{
    BinaryOperator, Expression, ExpressionKind, FunctionDef, LValue, LValueKind, UnaryOperator,
};
pub use self::statement::{Block, Declaration, Program, Statement, StatementKind, Unit};
pub use self::ty::{Qualifier, Type};

#[cfg(test)]
mod tests;
