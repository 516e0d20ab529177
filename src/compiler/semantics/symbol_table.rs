use crate::compiler::ast::{Qualifier, Type};

use super::SemanticError;

/**
 `SymbolTable` holds the symbols declared directly inside one lexical scope.
 Nested scopes get their own table; the [`super::stack::SymbolTableScopeStack`]
 chains them together so lookups can proceed from the innermost scope outward.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolTable {
    sym: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable { sym: vec![] }
    }

    pub fn table(&self) -> &Vec<Symbol> {
        &self.sym
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.sym.iter().find(|s| s.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.sym.iter_mut().find(|s| s.name == name)
    }

    /// Inserts a new symbol.  Fails if the name is already taken in this scope.
    pub fn add(&mut self, symbol: Symbol) -> Result<(), SemanticError> {
        if self.get(&symbol.name).is_some() {
            Err(SemanticError::AlreadyDeclared(symbol.name))
        } else {
            self.sym.push(symbol);
            Ok(())
        }
    }

    /// Replaces the symbol with the same name, or inserts it if absent.
    pub fn replace(&mut self, symbol: Symbol) {
        match self.get_mut(&symbol.name) {
            Some(existing) => *existing = symbol,
            None => self.sym.push(symbol),
        }
    }
}

impl std::fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for s in &self.sym {
            f.write_fmt(format_args!(
                "{} | {} | {} | {}\n",
                s.name, s.ty, s.qualifier, s.offset
            ))?;
        }
        Ok(())
    }
}

/// A named, typed entity.  `offset` is the frame offset of locals and
/// arguments; it stays zero for globals.  `code` is the label of the function
/// literal a global was initialized with.
#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub qualifier: Qualifier,
    pub offset: i32,
    pub code: Option<String>,
}

impl Symbol {
    pub fn new(name: &str, ty: Type, qualifier: Qualifier) -> Symbol {
        Symbol {
            name: name.into(),
            ty,
            qualifier,
            offset: 0,
            code: None,
        }
    }

    pub fn is_global(&self) -> bool {
        self.offset == 0
    }

    pub fn is_external(&self) -> bool {
        self.qualifier == Qualifier::External
    }
}
