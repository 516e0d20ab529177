/*!
A reference interpreter for the postfix instruction stream.

The [`Machine`] loads a listing, lays its static data out in a flat byte
addressed memory, resolves labels per section and runs the program from its
entry point.  The runtime library routines (`printi`, `printd`, `prints`,
`println`, `readi` and `readd`) are built in; output is collected in a buffer
and input is supplied up front.
*/
mod error;
mod image;
mod machine;
mod runtime;

pub use error::VmError;
pub use image::{CODE_BASE, DATA_BASE, MEMORY_SIZE};
pub use machine::Machine;

pub type VmResult<T> = Result<T, VmError>;
