/*!
The back end of the TIL compiler.

A [`Unit`](ast::Unit) arrives from the front end as a syntax tree with no
type annotations.  The [`codegen`] module walks it once, driving the
[`semantics`] type checker and the [`memory`] frame size calculator as it
goes, and writes [`postfix`] stack machine instructions.
*/
pub mod ast;
pub mod codegen;
pub mod memory;
pub mod postfix;
pub mod semantics;

mod error;

pub use error::CompilerError;
