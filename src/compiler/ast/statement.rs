use serde::{Deserialize, Serialize};

use super::{expression::Expression, ty::Type, Qualifier};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub line: u32,
    pub kind: StatementKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    /// Evaluates an expression and discards its value.
    Evaluation(Expression),
    /// Prints each argument in order, optionally followed by a newline.
    Print(Vec<Expression>, bool),
    Block(Block),
    Loop(Expression, Box<Statement>),
    /// Leaves the n-th enclosing loop.
    Stop(i32),
    /// Restarts the n-th enclosing loop.
    Next(i32),
    If(Expression, Box<Statement>),
    IfElse(Expression, Box<Statement>, Box<Statement>),
    Return(Option<Expression>),
}

/// A sequence of declarations followed by a sequence of statements.  Every
/// block opens a new lexical scope.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

/// Introduces a variable.  A missing `ty` is inferred from the initializer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub line: u32,
    #[serde(default)]
    pub qualifier: Qualifier,
    #[serde(default)]
    pub ty: Option<Type>,
    pub name: String,
    #[serde(default)]
    pub init: Option<Expression>,
}

/// The body of the program's entry point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub line: u32,
    pub block: Block,
}

/// A compilation unit: global declarations and an optional main program.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub program: Option<Program>,
}

impl Statement {
    pub fn new(line: u32, kind: StatementKind) -> Statement {
        Statement { line, kind }
    }

    pub fn eval(line: u32, e: Expression) -> Statement {
        Statement::new(line, StatementKind::Evaluation(e))
    }

    pub fn print(line: u32, args: Vec<Expression>) -> Statement {
        Statement::new(line, StatementKind::Print(args, false))
    }

    pub fn println(line: u32, args: Vec<Expression>) -> Statement {
        Statement::new(line, StatementKind::Print(args, true))
    }

    pub fn block(line: u32, block: Block) -> Statement {
        Statement::new(line, StatementKind::Block(block))
    }

    pub fn while_loop(line: u32, cond: Expression, body: Statement) -> Statement {
        Statement::new(line, StatementKind::Loop(cond, Box::new(body)))
    }

    pub fn stop(line: u32, level: i32) -> Statement {
        Statement::new(line, StatementKind::Stop(level))
    }

    pub fn next(line: u32, level: i32) -> Statement {
        Statement::new(line, StatementKind::Next(level))
    }

    pub fn if_then(line: u32, cond: Expression, then: Statement) -> Statement {
        Statement::new(line, StatementKind::If(cond, Box::new(then)))
    }

    pub fn if_else(line: u32, cond: Expression, then: Statement, otherwise: Statement) -> Statement {
        Statement::new(
            line,
            StatementKind::IfElse(cond, Box::new(then), Box::new(otherwise)),
        )
    }

    pub fn ret(line: u32, value: Option<Expression>) -> Statement {
        Statement::new(line, StatementKind::Return(value))
    }
}

impl Block {
    pub fn new(line: u32, declarations: Vec<Declaration>, statements: Vec<Statement>) -> Block {
        Block {
            line,
            declarations,
            statements,
        }
    }
}

impl Declaration {
    pub fn new(
        line: u32,
        qualifier: Qualifier,
        ty: Option<Type>,
        name: &str,
        init: Option<Expression>,
    ) -> Declaration {
        Declaration {
            line,
            qualifier,
            ty,
            name: name.into(),
            init,
        }
    }

    /// A private declaration with an explicit type and no initializer.
    pub fn local(line: u32, ty: Type, name: &str) -> Declaration {
        Declaration::new(line, Qualifier::Private, Some(ty), name, None)
    }
}

impl Program {
    pub fn new(line: u32, block: Block) -> Program {
        Program { line, block }
    }
}

impl Unit {
    pub fn new(declarations: Vec<Declaration>, program: Option<Program>) -> Unit {
        Unit {
            declarations,
            program,
        }
    }
}
