use log::*;

use crate::compiler::{
    ast::*,
    postfix::{Emitter, Inst},
    semantics::SemanticError,
    CompilerError,
};
use crate::postfix;

use super::{
    generator::{type_of, Generator},
    GeneratorError, GeneratorResult,
};

impl<E: Emitter> Generator<E> {
    pub(super) fn emit_statement(&mut self, s: &mut Statement) -> GeneratorResult<()> {
        self.checker().check_statement(s)?;

        let line = s.line;
        match &mut s.kind {
            StatementKind::Evaluation(e) => {
                self.emit_expression(e)?;
                let size = type_of(e)?.size();
                if size > 0 {
                    postfix!((self.out) {
                        Inst::Trash(size);
                    });
                }
                Ok(())
            }
            StatementKind::Print(args, newline) => self.emit_print(args, *newline),
            StatementKind::Block(block) => self.emit_block(block),
            StatementKind::Loop(cond, body) => self.emit_loop(cond, body),
            StatementKind::Stop(level) => {
                self.emit_loop_jump(line, "stop", *level);
                Ok(())
            }
            StatementKind::Next(level) => {
                self.emit_loop_jump(line, "next", *level);
                Ok(())
            }
            StatementKind::If(cond, then) => {
                let end = self.new_label();
                self.emit_expression(cond)?;
                postfix!((self.out) {
                    Inst::Jz(end.clone());
                });
                self.emit_statement(then)?;
                postfix!((self.out) {
                    Inst::Label(end);
                });
                Ok(())
            }
            StatementKind::IfElse(cond, then, otherwise) => {
                let other = self.new_label();
                let end = self.new_label();
                self.emit_expression(cond)?;
                postfix!((self.out) {
                    Inst::Jz(other.clone());
                });
                self.emit_statement(then)?;
                postfix!((self.out) {
                    Inst::Jmp(end.clone());
                    Inst::Label(other);
                });
                self.emit_statement(otherwise)?;
                postfix!((self.out) {
                    Inst::Label(end);
                });
                Ok(())
            }
            StatementKind::Return(value) => self.emit_return(line, value.as_mut()),
        }
    }

    fn emit_print(&mut self, args: &mut [Expression], newline: bool) -> GeneratorResult<()> {
        for arg in args.iter_mut() {
            self.emit_expression(arg)?;
            let (routine, size) = match type_of(arg)? {
                Type::Int => ("printi", 4),
                Type::Double => ("printd", 8),
                Type::String => ("prints", 4),
                ty => {
                    return Err(CompilerError::new(
                        arg.line,
                        GeneratorError::UnsupportedType(ty),
                    ))
                }
            };
            postfix!((self.out) {
                Inst::Call(routine.into());
                Inst::Trash(size);
            });
        }

        if newline {
            postfix!((self.out) {
                Inst::Call("println".into());
            });
        }
        Ok(())
    }

    fn emit_loop(&mut self, cond: &mut Expression, body: &mut Statement) -> GeneratorResult<()> {
        let test = self.new_label();
        let end = self.new_label();

        postfix!((self.out) {
            Inst::Label(test.clone());
        });
        self.emit_expression(cond)?;
        postfix!((self.out) {
            Inst::Jz(end.clone());
        });

        self.loop_labels.push((test.clone(), end.clone()));
        let result = self.emit_statement(body);
        self.loop_labels.pop();
        result?;

        postfix!((self.out) {
            Inst::Jmp(test);
            Inst::Label(end);
        });
        Ok(())
    }

    /// `stop n` jumps to the end of the n-th enclosing loop and `next n` to
    /// its test.  An invalid level is reported and nothing is emitted.
    fn emit_loop_jump(&mut self, line: u32, keyword: &'static str, level: i32) {
        let depth = self.loop_labels.len();
        if level <= 0 {
            self.report(line, SemanticError::InvalidLoopLevel(keyword, level));
            return;
        }
        if level as usize > depth {
            self.report(line, SemanticError::LoopLevelOutsideLoop(keyword, level));
            return;
        }

        let (test, end) = &self.loop_labels[depth - level as usize];
        let target = if keyword == "next" {
            test.clone()
        } else {
            end.clone()
        };
        trace!("L{}: {} {} -> {}", line, keyword, level, target);
        postfix!((self.out) {
            Inst::Jmp(target);
        });
    }

    fn emit_return(&mut self, line: u32, value: Option<&mut Expression>) -> GeneratorResult<()> {
        let function = self
            .functions
            .last()
            .cloned()
            .ok_or_else(|| CompilerError::new(line, GeneratorError::NoEnclosingFunction))?;
        let ret = self
            .return_labels
            .last()
            .cloned()
            .ok_or_else(|| CompilerError::new(line, GeneratorError::NoEnclosingFunction))?;

        if let Some(value) = value {
            let output = function.output();
            self.emit_expression(value)?;
            self.emit_widening(&type_of(value)?, output);
            self.store_result(output, function.is_entry);
        }

        postfix!((self.out) {
            Inst::Jmp(ret);
        });
        Ok(())
    }

    /// Moves the value on top of the stack into the result slot.  Functions
    /// defined in this unit return ints through the double width slot; the
    /// entry point and external routines use the slot of their natural width.
    pub(super) fn store_result(&mut self, output: &Type, native: bool) {
        match output {
            Type::Void => (),
            Type::Double => postfix!((self.out) {
                Inst::StFval64;
            }),
            Type::Int if !native => postfix!((self.out) {
                Inst::I2D;
                Inst::StFval64;
            }),
            _ => postfix!((self.out) {
                Inst::StFval32;
            }),
        }
    }

    /// Pushes the value left in the result slot by a call.
    pub(super) fn load_result(&mut self, output: &Type, native: bool) {
        match output {
            Type::Void => (),
            Type::Double => postfix!((self.out) {
                Inst::LdFval64;
            }),
            Type::Int if !native => postfix!((self.out) {
                Inst::LdFval64;
                Inst::D2I;
            }),
            _ => postfix!((self.out) {
                Inst::LdFval32;
            }),
        }
    }
}
