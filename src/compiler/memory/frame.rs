use crate::compiler::ast::Declaration;

/// Offset of the first argument relative to the frame pointer.  The saved
/// frame pointer and the return address occupy the bytes below it.
pub const ARGUMENTS_START: i32 = 8;

/// Hands out frame offsets and remembers how far below the frame pointer
/// locals have reached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameCursor {
    offset: i32,
    extent: i32,
}

impl FrameCursor {
    /// A cursor for the locals of a function body.
    pub fn locals() -> FrameCursor {
        FrameCursor {
            offset: 0,
            extent: 0,
        }
    }

    /// A cursor for the arguments of a function.
    pub fn arguments() -> FrameCursor {
        FrameCursor {
            offset: ARGUMENTS_START,
            extent: 0,
        }
    }

    /// Reserves `size` bytes below the last local and returns their offset.
    pub fn reserve_local(&mut self, size: i32) -> i32 {
        self.offset -= size;
        self.extent = self.extent.max(-self.offset);
        self.offset
    }

    /// Reserves `size` bytes above the last argument and returns their offset.
    pub fn reserve_argument(&mut self, size: i32) -> i32 {
        let offset = self.offset;
        self.offset += size;
        offset
    }

    /// Number of bytes reserved for locals so far.
    pub fn extent(&self) -> i32 {
        self.extent
    }
}

impl Default for FrameCursor {
    fn default() -> Self {
        FrameCursor::locals()
    }
}

/// Bytes reserved in the frame for a declaration.  Both the frame size
/// calculation and the code generator use this, so the two always agree.
pub fn slot_size(d: &Declaration) -> i32 {
    d.ty.as_ref().map(|ty| ty.size()).unwrap_or(0)
}
