use std::collections::HashMap;

use log::*;

use crate::compiler::postfix::Inst;

use super::{runtime::Native, VmError, VmResult};

/// Size in bytes of the machine's memory.  Static data sits at the bottom and
/// the stack grows down from the top.
pub const MEMORY_SIZE: usize = 1 << 20;

/// Address of the first byte of static data.  Address 0 stays unused so that
/// a null pointer never refers to an object.
pub const DATA_BASE: usize = 16;

/// Code addresses are the index of an instruction offset by this value.
pub const CODE_BASE: i32 = 0x4000_0000;

/// Runtime routines are addressed by their index offset by this value.
pub const NATIVE_BASE: i32 = 0x6000_0000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Symbol {
    Code(usize),
    Data(usize),
    Native(Native),
}

impl Symbol {
    /// The word pushed by `ADDR` for this symbol.
    pub fn address(&self) -> i32 {
        match self {
            Symbol::Code(pc) => CODE_BASE + *pc as i32,
            Symbol::Data(addr) => *addr as i32,
            Symbol::Native(n) => NATIVE_BASE + *n as i32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Section {
    Text,
    Data,
}

/// A loaded program: the executable instructions of the text section, the
/// initial memory and the address of every label.
#[derive(Debug)]
pub struct Image {
    pub code: Vec<Inst>,
    pub memory: Vec<u8>,
    pub data_end: usize,
    symbols: HashMap<String, Symbol>,
}

impl Image {
    pub fn load(listing: &[Inst]) -> VmResult<Image> {
        let mut image = Image {
            code: vec![],
            memory: vec![0; MEMORY_SIZE],
            data_end: DATA_BASE,
            symbols: HashMap::new(),
        };
        let mut section = Section::Text;
        let mut fixups = vec![];

        for inst in listing {
            match inst {
                Inst::Text => section = Section::Text,
                Inst::Data | Inst::Rodata | Inst::Bss => section = Section::Data,
                Inst::Align => {
                    if section == Section::Data {
                        image.data_end = (image.data_end + 3) & !3;
                    }
                }
                Inst::Label(name) => {
                    let symbol = match section {
                        Section::Text => Symbol::Code(image.code.len()),
                        Section::Data => Symbol::Data(image.data_end),
                    };
                    image.define(name, symbol)?;
                }
                Inst::Global(..) => (),
                Inst::Extern(name) if image.symbols.contains_key(name) => (),
                Inst::Extern(name) => match Native::from_name(name) {
                    Some(native) => image.define(name, Symbol::Native(native))?,
                    None => debug!("Unresolved external {}", name),
                },
                Inst::SInt(v) => image.place(section, &v.to_le_bytes())?,
                Inst::SDouble(v) => image.place(section, &v.to_le_bytes())?,
                Inst::SString(s) => {
                    image.place(section, s.as_bytes())?;
                    image.place(section, &[0])?;
                }
                Inst::SAddr(name) => {
                    fixups.push((image.data_end, name.clone()));
                    image.place(section, &[0; 4])?;
                }
                Inst::SAlloc(n) => image.place(section, &vec![0; (*n).max(0) as usize])?,
                _ => image.code.push(inst.clone()),
            }
        }

        for (addr, name) in fixups {
            let value = image.symbol(&name)?.address();
            image.memory[addr..addr + 4].copy_from_slice(&value.to_le_bytes());
        }

        debug!(
            "Loaded {} instructions and {} bytes of data",
            image.code.len(),
            image.data_end - DATA_BASE
        );
        Ok(image)
    }

    pub fn symbol(&self, name: &str) -> VmResult<Symbol> {
        self.symbols
            .get(name)
            .copied()
            .ok_or_else(|| VmError::UndefinedSymbol(name.into()))
    }

    /// The instruction index of a label in the text section.
    pub fn code_label(&self, name: &str) -> VmResult<usize> {
        match self.symbol(name)? {
            Symbol::Code(pc) => Ok(pc),
            _ => Err(VmError::NotCode(name.into())),
        }
    }

    fn define(&mut self, name: &str, symbol: Symbol) -> VmResult<()> {
        if self.symbols.insert(name.into(), symbol).is_some() {
            return Err(VmError::DuplicateLabel(name.into()));
        }
        Ok(())
    }

    fn place(&mut self, section: Section, bytes: &[u8]) -> VmResult<()> {
        if section == Section::Text {
            return Err(VmError::DataInText);
        }
        let end = self.data_end + bytes.len();
        if end > self.memory.len() {
            return Err(VmError::BadAddress(self.data_end as i32));
        }
        self.memory[self.data_end..end].copy_from_slice(bytes);
        self.data_end = end;
        Ok(())
    }
}
