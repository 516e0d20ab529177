use std::fmt::{Display, Formatter, Result};

/// Linkage kind given to a symbol exported with [`Inst::Global`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SymbolKind {
    Func,
    Obj,
}

/**
One stack machine instruction.

Values on the stack are 32 bit words, except doubles which take two words.
Addresses are 32 bit words.  Instructions are grouped by the section they
are meant for: directives place labels and static data; everything else is
code and belongs in the text section.
 */
#[derive(Clone, Debug, PartialEq)]
pub enum Inst {
    Text,
    Data,
    Rodata,
    Bss,
    Align,
    Label(String),
    Global(String, SymbolKind),
    Extern(String),
    SInt(i32),
    SDouble(f64),
    SString(String),
    SAddr(String),
    SAlloc(i32),

    Int(i32),
    Double(f64),
    Addr(String),
    Local(i32),
    LdInt,
    LdDouble,
    StInt,
    StDouble,
    Dup32,
    Dup64,
    Trash(i32),

    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    DAdd,
    DSub,
    DMul,
    DDiv,
    DNeg,
    I2D,
    D2I,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    DCmp,
    And,
    Or,

    Jmp(String),
    Jz(String),
    Jnz(String),
    Enter(i32),
    Leave,
    Ret,
    Call(String),
    Branch,
    StFval32,
    StFval64,
    LdFval32,
    LdFval64,
    Alloc,
    Sp,
}

impl Inst {
    /// Returns `true` for instructions that only shape the layout of the
    /// program and are never executed.
    pub fn is_directive(&self) -> bool {
        use Inst::*;
        matches!(
            self,
            Text | Data
                | Rodata
                | Bss
                | Align
                | Label(_)
                | Global(..)
                | Extern(_)
                | SInt(_)
                | SDouble(_)
                | SString(_)
                | SAddr(_)
                | SAlloc(_)
        )
    }
}

impl Display for Inst {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        use Inst::*;

        // Indent instruction?
        match self {
            Label(_) | Text | Data | Rodata | Bss => (),
            _ => f.write_str("    ")?,
        };

        match self {
            Text => f.write_str("TEXT"),
            Data => f.write_str("DATA"),
            Rodata => f.write_str("RODATA"),
            Bss => f.write_str("BSS"),
            Align => f.write_str("ALIGN"),
            Label(lbl) => f.write_fmt(format_args!("{}:", lbl)),
            Global(name, SymbolKind::Func) => f.write_fmt(format_args!("GLOBAL {}, FUNC", name)),
            Global(name, SymbolKind::Obj) => f.write_fmt(format_args!("GLOBAL {}, OBJ", name)),
            Extern(name) => f.write_fmt(format_args!("EXTERN {}", name)),
            SInt(v) => f.write_fmt(format_args!("SINT {}", v)),
            SDouble(v) => f.write_fmt(format_args!("SDOUBLE {:?}", v)),
            SString(s) => f.write_fmt(format_args!("SSTRING {:?}", s)),
            SAddr(lbl) => f.write_fmt(format_args!("SADDR {}", lbl)),
            SAlloc(n) => f.write_fmt(format_args!("SALLOC {}", n)),

            Int(v) => f.write_fmt(format_args!("INT {}", v)),
            Double(v) => f.write_fmt(format_args!("DOUBLE {:?}", v)),
            Addr(lbl) => f.write_fmt(format_args!("ADDR {}", lbl)),
            Local(offset) => f.write_fmt(format_args!("LOCAL {}", offset)),
            LdInt => f.write_str("LDINT"),
            LdDouble => f.write_str("LDDOUBLE"),
            StInt => f.write_str("STINT"),
            StDouble => f.write_str("STDOUBLE"),
            Dup32 => f.write_str("DUP32"),
            Dup64 => f.write_str("DUP64"),
            Trash(n) => f.write_fmt(format_args!("TRASH {}", n)),

            Add => f.write_str("ADD"),
            Sub => f.write_str("SUB"),
            Mul => f.write_str("MUL"),
            Div => f.write_str("DIV"),
            Mod => f.write_str("MOD"),
            Neg => f.write_str("NEG"),
            DAdd => f.write_str("DADD"),
            DSub => f.write_str("DSUB"),
            DMul => f.write_str("DMUL"),
            DDiv => f.write_str("DDIV"),
            DNeg => f.write_str("DNEG"),
            I2D => f.write_str("I2D"),
            D2I => f.write_str("D2I"),
            Lt => f.write_str("LT"),
            Le => f.write_str("LE"),
            Gt => f.write_str("GT"),
            Ge => f.write_str("GE"),
            Eq => f.write_str("EQ"),
            Ne => f.write_str("NE"),
            DCmp => f.write_str("DCMP"),
            And => f.write_str("AND"),
            Or => f.write_str("OR"),

            Jmp(lbl) => f.write_fmt(format_args!("JMP {}", lbl)),
            Jz(lbl) => f.write_fmt(format_args!("JZ {}", lbl)),
            Jnz(lbl) => f.write_fmt(format_args!("JNZ {}", lbl)),
            Enter(n) => f.write_fmt(format_args!("ENTER {}", n)),
            Leave => f.write_str("LEAVE"),
            Ret => f.write_str("RET"),
            Call(lbl) => f.write_fmt(format_args!("CALL {}", lbl)),
            Branch => f.write_str("BRANCH"),
            StFval32 => f.write_str("STFVAL32"),
            StFval64 => f.write_str("STFVAL64"),
            LdFval32 => f.write_str("LDFVAL32"),
            LdFval64 => f.write_str("LDFVAL64"),
            Alloc => f.write_str("ALLOC"),
            Sp => f.write_str("SP"),
        }
    }
}
