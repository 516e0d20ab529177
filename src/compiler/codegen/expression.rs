use crate::compiler::{
    ast::*,
    postfix::{Emitter, Inst},
    semantics::EnclosingFunction,
    CompilerError,
};
use crate::postfix;

use super::{
    generator::{dup, load, store, type_of, FunctionValue, Generator},
    GeneratorError, GeneratorResult,
};

impl<E: Emitter> Generator<E> {
    /// Emits the code which leaves the value of `e` on top of the stack.
    pub(super) fn emit_expression(&mut self, e: &mut Expression) -> GeneratorResult<()> {
        self.checker().check_expression(e)?;
        let ty = type_of(e)?;
        let line = e.line;

        match &mut e.kind {
            ExpressionKind::Integer(v) => postfix!((self.out) {
                Inst::Int(*v);
            }),
            ExpressionKind::Double(v) => postfix!((self.out) {
                Inst::Double(*v);
            }),
            ExpressionKind::Str(s) => {
                let label = self.emit_string_literal(s);
                postfix!((self.out) {
                    Inst::Text;
                    Inst::Addr(label);
                });
            }
            ExpressionKind::Null => postfix!((self.out) {
                Inst::Int(0);
            }),
            ExpressionKind::Read => match ty {
                Type::Double => postfix!((self.out) {
                    Inst::Call("readd".into());
                    Inst::LdFval64;
                }),
                _ => postfix!((self.out) {
                    Inst::Call("readi".into());
                    Inst::LdFval32;
                }),
            },
            ExpressionKind::Unary(op, operand) => {
                self.emit_expression(operand)?;
                match op {
                    UnaryOperator::Minus if ty == Type::Double => postfix!((self.out) {
                        Inst::DNeg;
                    }),
                    UnaryOperator::Minus => postfix!((self.out) {
                        Inst::Neg;
                    }),
                    UnaryOperator::Plus => (),
                    UnaryOperator::Not => postfix!((self.out) {
                        Inst::Int(0);
                        Inst::Eq;
                    }),
                }
            }
            ExpressionKind::Binary(op, l, r) => self.emit_binary(*op, &ty, l, r)?,
            ExpressionKind::RValue(lv) => self.emit_rvalue(lv)?,
            ExpressionKind::Assignment(lv, value) => self.emit_assignment(lv, value)?,
            ExpressionKind::AddressOf(lv) => self.emit_lvalue(lv)?,
            ExpressionKind::StackAlloc(count) => {
                self.emit_expression(count)?;
                postfix!((self.out) {
                    Inst::Int(element_size(&ty));
                    Inst::Mul;
                    Inst::Alloc;
                    Inst::Sp;
                });
            }
            ExpressionKind::SizeOf(operand) => {
                let size = type_of(operand)?.size();
                postfix!((self.out) {
                    Inst::Int(size);
                });
            }
            ExpressionKind::Call(callee, args) => {
                self.emit_call(line, callee.as_deref_mut(), args, &ty)?
            }
            ExpressionKind::Function(def) => {
                let label = self.emit_function(line, &ty, def)?;
                self.pending_function = Some(FunctionValue::Label(label));
                self.materialize_function(line)?;
            }
        }
        Ok(())
    }

    fn emit_binary(
        &mut self,
        op: BinaryOperator,
        ty: &Type,
        l: &mut Expression,
        r: &mut Expression,
    ) -> GeneratorResult<()> {
        let (lt, rt) = (type_of(l)?, type_of(r)?);

        match op {
            BinaryOperator::And | BinaryOperator::Or => self.emit_short_circuit(op, l, r),
            BinaryOperator::Add | BinaryOperator::Sub if lt.is_pointer() || rt.is_pointer() => {
                self.emit_pointer_arithmetic(op, &lt, &rt, l, r)
            }
            _ if op.is_comparison() => {
                if lt == Type::Double || rt == Type::Double {
                    self.emit_operand(l, &Type::Double)?;
                    self.emit_operand(r, &Type::Double)?;
                    postfix!((self.out) {
                        Inst::DCmp;
                        Inst::Int(0);
                    });
                } else {
                    self.emit_expression(l)?;
                    self.emit_expression(r)?;
                }
                postfix!((self.out) {
                    comparison(op);
                });
                Ok(())
            }
            _ => {
                self.emit_operand(l, ty)?;
                self.emit_operand(r, ty)?;
                postfix!((self.out) {
                    arithmetic(op, ty);
                });
                Ok(())
            }
        }
    }

    /// Evaluates `e` and widens it to `target` when needed.
    fn emit_operand(&mut self, e: &mut Expression, target: &Type) -> GeneratorResult<()> {
        self.emit_expression(e)?;
        self.emit_widening(&type_of(e)?, target);
        Ok(())
    }

    fn emit_short_circuit(
        &mut self,
        op: BinaryOperator,
        l: &mut Expression,
        r: &mut Expression,
    ) -> GeneratorResult<()> {
        let end = self.new_label();

        self.emit_expression(l)?;
        postfix!((self.out) {
            Inst::Int(0);
            Inst::Ne;
            Inst::Dup32;
            if op == BinaryOperator::And { Inst::Jz(end.clone()) } else { Inst::Jnz(end.clone()) };
        });

        self.emit_expression(r)?;
        postfix!((self.out) {
            Inst::Int(0);
            Inst::Ne;
            if op == BinaryOperator::And { Inst::And } else { Inst::Or };
            Inst::Align;
            Inst::Label(end);
        });
        Ok(())
    }

    fn emit_pointer_arithmetic(
        &mut self,
        op: BinaryOperator,
        lt: &Type,
        rt: &Type,
        l: &mut Expression,
        r: &mut Expression,
    ) -> GeneratorResult<()> {
        let op = if op == BinaryOperator::Add {
            Inst::Add
        } else {
            Inst::Sub
        };

        match (lt, rt) {
            (Type::Pointer(_), Type::Pointer(_)) => {
                self.emit_expression(l)?;
                self.emit_expression(r)?;
                postfix!((self.out) {
                    Inst::Sub;
                    Inst::Int(element_size(lt));
                    Inst::Div;
                });
            }
            (Type::Pointer(_), _) => {
                self.emit_expression(l)?;
                self.emit_expression(r)?;
                postfix!((self.out) {
                    Inst::Int(element_size(lt));
                    Inst::Mul;
                    op;
                });
            }
            _ => {
                self.emit_expression(l)?;
                postfix!((self.out) {
                    Inst::Int(element_size(rt));
                    Inst::Mul;
                });
                self.emit_expression(r)?;
                postfix!((self.out) {
                    op;
                });
            }
        }
        Ok(())
    }

    fn emit_rvalue(&mut self, lv: &mut LValue) -> GeneratorResult<()> {
        let ty = lvalue_type(lv)?;

        if ty.is_function() {
            if let Some(name) = lv.name() {
                let value = self.function_value(lv.line, name)?;
                self.pending_function = Some(value);
                return self.materialize_function(lv.line);
            }
        }

        self.emit_lvalue(lv)?;
        postfix!((self.out) {
            load(&ty);
        });
        Ok(())
    }

    /// Emits the address of a location.
    pub(super) fn emit_lvalue(&mut self, lv: &mut LValue) -> GeneratorResult<()> {
        self.checker().check_lvalue(lv)?;
        lvalue_type(lv)?;
        let line = lv.line;

        match &mut lv.kind {
            LValueKind::Variable(name) => {
                let symbol = self.symbols.lookup(name).ok_or_else(|| {
                    CompilerError::new(line, GeneratorError::UnresolvedSymbol(name.clone()))
                })?;
                let inst = if symbol.is_global() {
                    Inst::Addr(name.clone())
                } else {
                    Inst::Local(symbol.offset)
                };
                postfix!((self.out) {
                    inst;
                });
            }
            LValueKind::Index(base, index) => {
                self.emit_expression(base)?;
                self.emit_expression(index)?;
                postfix!((self.out) {
                    Inst::Int(element_size(&type_of(base)?));
                    Inst::Mul;
                    Inst::Add;
                });
            }
        }
        Ok(())
    }

    fn emit_assignment(&mut self, lv: &mut LValue, value: &mut Expression) -> GeneratorResult<()> {
        let ty = lvalue_type(lv)?;
        self.emit_operand(value, &ty)?;
        postfix!((self.out) {
            dup(&ty);
        });
        self.emit_lvalue(lv)?;
        postfix!((self.out) {
            store(&ty);
        });
        Ok(())
    }

    fn emit_call(
        &mut self,
        line: u32,
        callee: Option<&mut Expression>,
        args: &mut [Expression],
        output: &Type,
    ) -> GeneratorResult<()> {
        let fty = match &callee {
            Some(callee) => type_of(callee)?,
            None => self.enclosing_function(line)?.ty,
        };
        let inputs = match fty.signature() {
            Some((inputs, _)) => inputs.to_vec(),
            None => {
                return Err(CompilerError::new(
                    line,
                    GeneratorError::ExpectedFunction(fty.clone()),
                ))
            }
        };

        let mut bytes = 0;
        for (arg, input) in args.iter_mut().zip(inputs.iter()).rev() {
            self.emit_operand(arg, input)?;
            bytes += input.size();
        }

        let native = match callee {
            None => {
                let label = self.enclosing_function(line)?.label;
                postfix!((self.out) {
                    Inst::Addr(label);
                    Inst::Branch;
                });
                false
            }
            Some(callee) => match self.external_name(callee) {
                Some(name) => {
                    postfix!((self.out) {
                        Inst::Call(name);
                    });
                    true
                }
                None => {
                    self.emit_expression(callee)?;
                    postfix!((self.out) {
                        Inst::Branch;
                    });
                    false
                }
            },
        };

        if bytes > 0 {
            postfix!((self.out) {
                Inst::Trash(bytes);
            });
        }
        self.load_result(output, native);
        Ok(())
    }

    /// The name of `callee` if it names an external routine.
    fn external_name(&self, callee: &Expression) -> Option<String> {
        match &callee.kind {
            ExpressionKind::RValue(lv) => {
                let name = lv.name()?;
                let symbol = self.symbols.lookup(name)?;
                if symbol.is_external() && symbol.is_global() {
                    Some(name.into())
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn enclosing_function(&self, line: u32) -> GeneratorResult<EnclosingFunction> {
        self.functions
            .last()
            .cloned()
            .ok_or_else(|| CompilerError::new(line, GeneratorError::NoEnclosingFunction))
    }

    fn function_value(&self, line: u32, name: &str) -> GeneratorResult<FunctionValue> {
        let symbol = self.symbols.lookup(name).ok_or_else(|| {
            CompilerError::new(line, GeneratorError::UnresolvedSymbol(name.into()))
        })?;
        Ok(if symbol.is_global() {
            FunctionValue::Global {
                name: name.into(),
                external: symbol.is_external(),
            }
        } else {
            FunctionValue::Local(symbol.offset)
        })
    }

    /// Pushes the address of the code of the pending function value.
    fn materialize_function(&mut self, line: u32) -> GeneratorResult<()> {
        match self.pending_function.take() {
            Some(FunctionValue::Label(label)) => postfix!((self.out) {
                Inst::Addr(label);
            }),
            Some(FunctionValue::Global {
                name,
                external: true,
            }) => postfix!((self.out) {
                Inst::Addr(name);
            }),
            Some(FunctionValue::Global {
                name,
                external: false,
            }) => postfix!((self.out) {
                Inst::Addr(name);
                Inst::LdInt;
            }),
            Some(FunctionValue::Local(offset)) => postfix!((self.out) {
                Inst::Local(offset);
                Inst::LdInt;
            }),
            None => {
                return Err(CompilerError::new(
                    line,
                    GeneratorError::NoPendingFunction,
                ))
            }
        }
        Ok(())
    }
}

fn lvalue_type(lv: &LValue) -> GeneratorResult<Type> {
    lv.ty
        .clone()
        .ok_or_else(|| CompilerError::new(lv.line, GeneratorError::Untyped))
}

/// The size of the objects a pointer refers to.  A pointer whose referenced
/// type is still unknown steps one byte at a time.
fn element_size(ty: &Type) -> i32 {
    ty.referenced().map(|r| r.size()).unwrap_or(0).max(1)
}

fn comparison(op: BinaryOperator) -> Inst {
    match op {
        BinaryOperator::Lt => Inst::Lt,
        BinaryOperator::Le => Inst::Le,
        BinaryOperator::Gt => Inst::Gt,
        BinaryOperator::Ge => Inst::Ge,
        BinaryOperator::Eq => Inst::Eq,
        _ => Inst::Ne,
    }
}

fn arithmetic(op: BinaryOperator, ty: &Type) -> Inst {
    let double = *ty == Type::Double;
    match op {
        BinaryOperator::Add if double => Inst::DAdd,
        BinaryOperator::Sub if double => Inst::DSub,
        BinaryOperator::Mul if double => Inst::DMul,
        BinaryOperator::Div if double => Inst::DDiv,
        BinaryOperator::Add => Inst::Add,
        BinaryOperator::Sub => Inst::Sub,
        BinaryOperator::Mul => Inst::Mul,
        BinaryOperator::Div => Inst::Div,
        _ => Inst::Mod,
    }
}
