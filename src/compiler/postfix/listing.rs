use std::fmt::{Display, Formatter};

use super::Inst;

/// Receives the instructions produced by the code generator, in order.
pub trait Emitter {
    fn emit(&mut self, inst: Inst);
}

impl Emitter for Vec<Inst> {
    fn emit(&mut self, inst: Inst) {
        self.push(inst)
    }
}

/// A complete, ordered list of instructions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Listing {
    code: Vec<Inst>,
}

impl Listing {
    pub fn new() -> Listing {
        Listing { code: vec![] }
    }

    pub fn instructions(&self) -> &[Inst] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

impl Emitter for Listing {
    fn emit(&mut self, inst: Inst) {
        self.code.push(inst)
    }
}

impl From<Listing> for Vec<Inst> {
    fn from(listing: Listing) -> Self {
        listing.code
    }
}

impl Display for Listing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for inst in &self.code {
            writeln!(f, "{}", inst)?;
        }
        Ok(())
    }
}
