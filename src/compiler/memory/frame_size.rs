use log::*;

use crate::compiler::{
    ast::{Block, Declaration, Statement, StatementKind},
    semantics::{EnclosingFunction, SymbolTableScopeStack, TypeChecker},
};

use super::frame::{slot_size, FrameCursor};

/**
Computes how many bytes of locals a function body needs.

The calculator walks the body in the same order the code generator does:
the declarations of a block, then its statements, descending into nested
blocks, conditionals and loops but never into expressions, so the locals of
a nested function literal belong to that function alone.  Every declaration
is type checked against a private copy of the scopes and, when the check
succeeds, reserves exactly the slot the generator will later give it.

A calculator is consumed by [`FrameSizeCalculator::calculate`].
 */
pub struct FrameSizeCalculator<'a> {
    symbols: SymbolTableScopeStack,
    functions: &'a [EnclosingFunction],
    cursor: FrameCursor,
}

impl<'a> FrameSizeCalculator<'a> {
    pub fn new(
        symbols: &SymbolTableScopeStack,
        functions: &'a [EnclosingFunction],
    ) -> FrameSizeCalculator<'a> {
        FrameSizeCalculator {
            symbols: symbols.clone(),
            functions,
            cursor: FrameCursor::locals(),
        }
    }

    pub fn calculate(mut self, body: &mut Block) -> i32 {
        self.visit_block(body);
        let size = self.cursor.extent();
        debug!("Frame size: {}", size);
        size
    }

    fn visit_block(&mut self, block: &mut Block) {
        self.symbols.enter_scope();
        for d in block.declarations.iter_mut() {
            self.visit_declaration(d);
        }
        for s in block.statements.iter_mut() {
            self.visit_statement(s);
        }
        self.symbols.leave_scope();
    }

    fn visit_declaration(&mut self, d: &mut Declaration) {
        let mut checker = TypeChecker::new(&mut self.symbols, self.functions);
        match checker.check_declaration(d) {
            Ok(()) => {
                let offset = self.cursor.reserve_local(slot_size(d));
                trace!("{} at {}", d.name, offset);
            }
            // The generator reports the error when it reaches the declaration.
            Err(e) => trace!("{} takes no space: {}", d.name, e),
        }
    }

    fn visit_statement(&mut self, s: &mut Statement) {
        match &mut s.kind {
            StatementKind::Block(block) => self.visit_block(block),
            StatementKind::If(_, then) => self.visit_statement(then),
            StatementKind::IfElse(_, then, otherwise) => {
                self.visit_statement(then);
                self.visit_statement(otherwise);
            }
            StatementKind::Loop(_, body) => self.visit_statement(body),
            StatementKind::Evaluation(_)
            | StatementKind::Print(..)
            | StatementKind::Stop(_)
            | StatementKind::Next(_)
            | StatementKind::Return(_) => (),
        }
    }
}
