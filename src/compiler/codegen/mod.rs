/*!
Generates stack machine code from a syntax tree.

The generator walks the tree once.  Every declaration, statement and
expression is type checked right before its code is emitted, frame sizes are
computed on entry to every function body, and all three steps share one
scoped symbol table.
*/
mod error;
mod expression;
mod generator;
mod statement;
mod tests;

pub use error::GeneratorError;
pub use generator::{Generator, ENTRY_POINT, RUNTIME};

use super::{ast::Unit, postfix::Listing, CompilerError};

pub type GeneratorResult<T> = Result<T, CompilerError<GeneratorError>>;

/// Type checks `unit` and translates it into a [`Listing`].  Returns every
/// error found if the unit is not well typed.
pub fn compile(unit: &mut Unit) -> Result<Listing, Vec<CompilerError<GeneratorError>>> {
    let mut generator = Generator::new(Listing::new());
    let result = generator.generate(unit);
    generator.finish(result)
}
