pub mod cli;
pub mod compiler;
pub mod vm;

pub use cli::*;
