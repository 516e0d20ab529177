/// Faults raised while loading or running a program.
#[derive(Clone, Debug, PartialEq)]
pub enum VmError {
    DuplicateLabel(String),
    UndefinedSymbol(String),
    UnknownExternal(String),
    NotCode(String),
    BadAddress(i32),
    BadCodeAddress(i32),
    StackOverflow,
    StackUnderflow,
    DivisionByZero,
    MissingInput,
    BadInput(String),
    StepLimit(u64),
    PcOutOfBounds(usize),
    DataInText,
}

impl std::fmt::Display for VmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use VmError::*;
        match self {
            DuplicateLabel(l) => write!(f, "Label {} is defined more than once", l),
            UndefinedSymbol(l) => write!(f, "Symbol {} is not defined", l),
            UnknownExternal(l) => write!(f, "External routine {} is not provided", l),
            NotCode(l) => write!(f, "Symbol {} does not name code", l),
            BadAddress(a) => write!(f, "Invalid memory access at {:#x}", a),
            BadCodeAddress(a) => write!(f, "Branch to invalid code address {:#x}", a),
            StackOverflow => f.write_str("Stack overflow"),
            StackUnderflow => f.write_str("Stack underflow"),
            DivisionByZero => f.write_str("Division by zero"),
            MissingInput => f.write_str("Read past the end of the input"),
            BadInput(v) => write!(f, "Cannot read {:?} as a number", v),
            StepLimit(n) => write!(f, "Program did not finish within {} steps", n),
            PcOutOfBounds(pc) => write!(f, "Program counter {} is past the end of the code", pc),
            DataInText => f.write_str("Static data in the text section"),
        }
    }
}
