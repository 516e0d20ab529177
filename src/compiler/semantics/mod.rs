/*
 * Handles semantic analysis of a syntax tree.  This includes:
 * 1. Type checking: determing the type of every expression and making sure that the types match
 *    any type restrictions.
 * 2. Checking that every variable exists before it is used.
 * 3. Constructing the symbol table for the code.
 *
 * The checker works node by node and annotates the tree in place.  The code generator drives it
 * lazily as it walks the tree, so each scope is populated right before its code is emitted.
 */
mod error;
mod stack;
mod tests;

pub mod compatibility;
pub mod symbol_table;
pub mod type_checker;

pub use error::SemanticError;
pub use stack::SymbolTableScopeStack;
pub use symbol_table::{Symbol, SymbolTable};
pub use type_checker::TypeChecker;

use super::{ast::Type, CompilerError};

/// Captures the Failure state of any Semantic Analysis operation.
/// Which will, if it fails, result in a [`SemanticError`] wrapped
/// in a [`CompilerError`]
pub type SemanticResult<T> = Result<T, CompilerError<SemanticError>>;

/// A function whose body is currently being checked or emitted.  The
/// innermost one is the target of `return` and of recursive calls.
#[derive(Clone, Debug, PartialEq)]
pub struct EnclosingFunction {
    pub ty: Type,
    pub label: String,
    pub is_entry: bool,
}

impl EnclosingFunction {
    pub fn new(ty: Type, label: &str) -> EnclosingFunction {
        EnclosingFunction {
            ty,
            label: label.into(),
            is_entry: false,
        }
    }

    /// The program's entry point: takes nothing and returns an int.
    pub fn entry(label: &str) -> EnclosingFunction {
        EnclosingFunction {
            ty: Type::function(vec![], Type::Int),
            label: label.into(),
            is_entry: true,
        }
    }

    pub fn output(&self) -> &Type {
        match &self.ty {
            Type::Function(_, output) => output,
            _ => &Type::Void,
        }
    }
}
