/*!
The instruction set of the stack machine targeted by the code generator, and
the buffer the generator writes instructions into.
*/
mod inst;
mod listing;
mod tests;

pub use inst::{Inst, SymbolKind};
pub use listing::{Emitter, Listing};

/// Writes a sequence of instructions into an [`Emitter`].
///
/// ``` ignore
/// postfix!((self.out) {
///     Inst::Int(0);
///     Inst::Ne;
/// });
/// ```
#[macro_export]
macro_rules! postfix {
    (($out:expr) { $($inst:expr;)* }) => {{
        $( $crate::compiler::postfix::Emitter::emit(&mut $out, $inst); )*
    }};
}
