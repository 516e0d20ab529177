/**
 * Stack frame layout.
 *
 * Arguments sit above the saved frame pointer and return address, at
 * increasing offsets starting at 8.  Locals sit below the frame pointer at
 * decreasing offsets, each taking exactly the size of its type.  The frame
 * size of a function is computed ahead of its code by walking its body with
 * the same layout rules the code generator uses.
 */
mod frame;
mod frame_size;
mod tests;

pub use frame::{slot_size, FrameCursor, ARGUMENTS_START};
pub use frame_size::FrameSizeCalculator;
