use std::collections::VecDeque;
use std::convert::TryFrom;

/// The routines of the runtime library.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Native {
    ReadI,
    ReadD,
    PrintI,
    PrintD,
    PrintS,
    PrintLn,
}

impl Native {
    pub const ALL: [Native; 6] = [
        Native::ReadI,
        Native::ReadD,
        Native::PrintI,
        Native::PrintD,
        Native::PrintS,
        Native::PrintLn,
    ];

    pub fn from_address(index: i32) -> Option<Native> {
        Native::ALL.get(usize::try_from(index).ok()?).copied()
    }

    pub fn from_name(name: &str) -> Option<Native> {
        match name {
            "readi" => Some(Native::ReadI),
            "readd" => Some(Native::ReadD),
            "printi" => Some(Native::PrintI),
            "printd" => Some(Native::PrintD),
            "prints" => Some(Native::PrintS),
            "println" => Some(Native::PrintLn),
            _ => None,
        }
    }
}

/// Input consumed by `readi`/`readd` and the text written by the print
/// routines.
#[derive(Debug, Default)]
pub struct Console {
    input: VecDeque<String>,
    output: String,
}

impl Console {
    pub fn new<S: Into<String>>(input: Vec<S>) -> Console {
        Console {
            input: input.into_iter().map(|s| s.into()).collect(),
            output: String::new(),
        }
    }

    pub fn next_input(&mut self) -> Option<String> {
        self.input.pop_front()
    }

    pub fn write(&mut self, s: &str) {
        self.output.push_str(s)
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}
