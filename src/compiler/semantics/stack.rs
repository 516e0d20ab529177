use log::*;

use super::{
    symbol_table::{Symbol, SymbolTable},
    SemanticError,
};

/// The chain of scopes visible at a point of the traversal.  The global scope
/// is entered on construction and can never be left; `head` is always the
/// innermost scope.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolTableScopeStack {
    stack: Vec<SymbolTable>,
    head: SymbolTable,
}

impl std::fmt::Display for SymbolTableScopeStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("0: {}\n", self.head))?;
        for (i, scope) in self.stack.iter().rev().enumerate() {
            f.write_fmt(format_args!("{}: {}\n", i + 1, scope))?;
        }
        Ok(())
    }
}

impl SymbolTableScopeStack {
    pub fn new() -> SymbolTableScopeStack {
        SymbolTableScopeStack {
            stack: vec![],
            head: SymbolTable::new(),
        }
    }

    /// The number of scopes above the global scope.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_global_scope(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn enter_scope(&mut self) {
        trace!("Enter scope {}", self.stack.len() + 1);
        let old = std::mem::replace(&mut self.head, SymbolTable::new());
        self.stack.push(old);
    }

    /// Leaves the innermost scope and returns its table.  Returns `None`,
    /// without changing anything, when only the global scope is left.
    pub fn leave_scope(&mut self) -> Option<SymbolTable> {
        let new_head = self.stack.pop()?;
        trace!("Leave scope {}", self.stack.len() + 1);
        Some(std::mem::replace(&mut self.head, new_head))
    }

    /// The outermost scope, which holds the unit's global declarations.
    pub fn globals(&self) -> &SymbolTable {
        self.stack.first().unwrap_or(&self.head)
    }

    /// Searches for `name` starting at the innermost scope and moving outward.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.head
            .get(name)
            .or_else(|| self.stack.iter().rev().find_map(|scope| scope.get(name)))
    }

    /// Searches for `name` in the innermost scope only.
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.head.get(name)
    }

    pub fn lookup_local_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.head.get_mut(name)
    }

    /// Add a new symbol to the innermost scope.
    pub fn add(&mut self, symbol: Symbol) -> Result<(), SemanticError> {
        debug!("Declare {}: {}", symbol.name, symbol.ty);
        self.head.add(symbol)
    }

    /// Replace a symbol already present in the innermost scope.
    pub fn replace(&mut self, symbol: Symbol) {
        debug!("Redeclare {}: {}", symbol.name, symbol.ty);
        self.head.replace(symbol)
    }
}

impl Default for SymbolTableScopeStack {
    fn default() -> Self {
        SymbolTableScopeStack::new()
    }
}
