use log::*;

use crate::compiler::{ast::*, CompilerError};

use super::{
    compatibility::{assignable, pointer_compatible},
    EnclosingFunction, SemanticError, SemanticResult, Symbol, SymbolTableScopeStack,
};

/**
Resolves and verifies the types of syntax tree nodes, one node at a time.

The checker does not walk into nested statements, blocks, or function bodies:
its caller drives the traversal and opens the scopes.  Checking a node checks
its child expressions, annotates the node with its type, and, for
declarations, records the new symbol in the innermost scope.

Nodes which already carry a concrete type are skipped, so checking the same
node more than once is harmless.
 */
pub struct TypeChecker<'a> {
    symbols: &'a mut SymbolTableScopeStack,
    functions: &'a [EnclosingFunction],
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        symbols: &'a mut SymbolTableScopeStack,
        functions: &'a [EnclosingFunction],
    ) -> TypeChecker<'a> {
        TypeChecker { symbols, functions }
    }

    pub fn check_expression(&mut self, e: &mut Expression) -> SemanticResult<()> {
        if e.is_resolved() {
            return Ok(());
        }

        let ty = self.resolve_expression(e)?;
        trace!("L{}: expression has type {}", e.line, ty);
        e.set_type(ty);
        Ok(())
    }

    pub fn check_lvalue(&mut self, lv: &mut LValue) -> SemanticResult<()> {
        if lv.is_resolved() {
            return Ok(());
        }

        let line = lv.line;
        let ty = match &mut lv.kind {
            LValueKind::Variable(name) => match self.symbols.lookup(name) {
                Some(symbol) => symbol.ty.clone(),
                None => return fail(line, SemanticError::NotDefined(name.clone())),
            },
            LValueKind::Index(base, index) => {
                self.check_expression(base)?;
                self.check_expression(index)?;

                let base_ty = type_of(base);
                let referenced = match base_ty.referenced() {
                    Some(r) => r.clone(),
                    None => return fail(line, SemanticError::IndexNotPointer(base_ty.clone())),
                };
                if referenced.is_function() {
                    return fail(line, SemanticError::IndexFunctionPointer(base_ty));
                }
                if !conform(&Type::Int, index) {
                    return fail(line, SemanticError::IndexExpectedInt(type_of(index)));
                }
                referenced
            }
        };

        lv.ty = Some(ty);
        Ok(())
    }

    /// Checks the expressions which belong directly to `s`.  Nested
    /// statements are checked when the caller visits them.
    pub fn check_statement(&mut self, s: &mut Statement) -> SemanticResult<()> {
        let line = s.line;
        match &mut s.kind {
            StatementKind::Evaluation(e) => {
                self.check_expression(e)?;
                conform(&Type::Int, e);
                Ok(())
            }
            StatementKind::Print(args, _) => {
                for arg in args {
                    self.check_expression(arg)?;
                    conform(&Type::Int, arg);
                    match type_of(arg) {
                        Type::Int | Type::Double | Type::String => (),
                        ty => return fail(arg.line, SemanticError::PrintInvalidType(ty)),
                    }
                }
                Ok(())
            }
            StatementKind::Loop(cond, _)
            | StatementKind::If(cond, _)
            | StatementKind::IfElse(cond, ..) => {
                self.check_expression(cond)?;
                if conform(&Type::Int, cond) {
                    Ok(())
                } else {
                    fail(line, SemanticError::CondExpectedInt(type_of(cond)))
                }
            }
            StatementKind::Return(value) => self.check_return(line, value.as_mut()),
            StatementKind::Block(_) | StatementKind::Stop(_) | StatementKind::Next(_) => Ok(()),
        }
    }

    /// Checks the initializer of `d`, infers its type if none was given, and
    /// declares it in the innermost scope.
    pub fn check_declaration(&mut self, d: &mut Declaration) -> SemanticResult<()> {
        let line = d.line;

        if let Some(init) = &mut d.init {
            self.check_expression(init)?;
            match d.ty.clone() {
                None => {
                    let ty = type_of(init);
                    if !ty.is_concrete() {
                        return fail(line, SemanticError::UnknownInitializerType(d.name.clone()));
                    }
                    d.ty = Some(ty);
                }
                Some(declared) => {
                    if !conform(&declared, init) {
                        return fail(
                            line,
                            SemanticError::InitializerMismatch(
                                d.name.clone(),
                                declared,
                                type_of(init),
                            ),
                        );
                    }
                }
            }
        }

        let ty = match &d.ty {
            Some(ty) => ty.clone(),
            None => return fail(line, SemanticError::MissingType(d.name.clone())),
        };

        if d.qualifier == Qualifier::External && !ty.is_function() {
            return fail(
                line,
                SemanticError::ExternalNotFunction(d.name.clone(), ty),
            );
        }

        self.declare(line, Symbol::new(&d.name, ty, d.qualifier))
    }

    fn declare(&mut self, line: u32, symbol: Symbol) -> SemanticResult<()> {
        let previous = self
            .symbols
            .lookup_local(&symbol.name)
            .map(|prev| (prev.qualifier, prev.ty.clone()));

        match previous {
            Some((Qualifier::Forward, forward_ty)) => {
                if !assignable(&forward_ty, &symbol.ty) {
                    return fail(
                        line,
                        SemanticError::ForwardMismatch(symbol.name, forward_ty, symbol.ty),
                    );
                }
                let qualifier = match symbol.qualifier {
                    Qualifier::External | Qualifier::Forward => symbol.qualifier,
                    _ => Qualifier::Public,
                };
                self.symbols.replace(Symbol {
                    qualifier,
                    ..symbol
                });
                Ok(())
            }
            _ => self
                .symbols
                .add(symbol)
                .map_err(|e| CompilerError::new(line, e)),
        }
    }

    fn check_return(&mut self, line: u32, value: Option<&mut Expression>) -> SemanticResult<()> {
        let function = match self.functions.last() {
            Some(f) => f,
            None => return fail(line, SemanticError::ReturnOutsideFunction),
        };
        let output = function.output().clone();

        match value {
            Some(_) if output == Type::Void => fail(line, SemanticError::ReturnValueInVoid),
            None if output != Type::Void => fail(line, SemanticError::ReturnValueMissing(output)),
            None => Ok(()),
            Some(value) => {
                self.check_expression(value)?;
                if conform(&output, value) {
                    Ok(())
                } else {
                    fail(line, SemanticError::ReturnMismatch(output, type_of(value)))
                }
            }
        }
    }

    fn resolve_expression(&mut self, e: &mut Expression) -> SemanticResult<Type> {
        let line = e.line;
        match &mut e.kind {
            ExpressionKind::Integer(_) => Ok(Type::Int),
            ExpressionKind::Double(_) => Ok(Type::Double),
            ExpressionKind::Str(_) => Ok(Type::String),
            ExpressionKind::Null => Ok(Type::pointer(Type::Unspecified)),
            ExpressionKind::Read => Ok(Type::Unspecified),
            ExpressionKind::Unary(op, operand) => self.unary(line, *op, operand),
            ExpressionKind::Binary(op, l, r) => self.binary(line, *op, l, r),
            ExpressionKind::RValue(lv) => {
                self.check_lvalue(lv)?;
                Ok(lvalue_type(lv))
            }
            ExpressionKind::Assignment(lv, value) => {
                self.check_lvalue(lv)?;
                self.check_expression(value)?;
                let target = lvalue_type(lv);
                if conform(&target, value) {
                    Ok(target)
                } else {
                    fail(line, SemanticError::AssignmentMismatch(target, type_of(value)))
                }
            }
            ExpressionKind::AddressOf(lv) => {
                self.check_lvalue(lv)?;
                Ok(Type::pointer(lvalue_type(lv)))
            }
            ExpressionKind::StackAlloc(count) => {
                self.check_expression(count)?;
                if conform(&Type::Int, count) {
                    Ok(Type::pointer(Type::Unspecified))
                } else {
                    fail(line, SemanticError::AllocExpectedInt(type_of(count)))
                }
            }
            ExpressionKind::SizeOf(operand) => {
                self.check_expression(operand)?;
                conform(&Type::Int, operand);
                Ok(Type::Int)
            }
            ExpressionKind::Call(callee, args) => self.call(line, callee.as_deref_mut(), args),
            // A function literal is built with its signature, so reaching
            // here means the signature was lost.
            ExpressionKind::Function(_) => fail(line, SemanticError::UntypedFunction),
        }
    }

    fn unary(
        &mut self,
        line: u32,
        op: UnaryOperator,
        operand: &mut Expression,
    ) -> SemanticResult<Type> {
        self.check_expression(operand)?;
        conform(&Type::Int, operand);

        let ty = type_of(operand);
        match (op, &ty) {
            (UnaryOperator::Not, Type::Int) => Ok(Type::Int),
            (UnaryOperator::Minus, t) | (UnaryOperator::Plus, t) if t.is_numeric() => Ok(t.clone()),
            _ => fail(line, SemanticError::UnaryExpected(op, ty.clone())),
        }
    }

    fn binary(
        &mut self,
        line: u32,
        op: BinaryOperator,
        l: &mut Expression,
        r: &mut Expression,
    ) -> SemanticResult<Type> {
        use BinaryOperator::*;

        self.check_expression(l)?;
        self.check_expression(r)?;
        unify_wildcards(l, r);

        let (lt, rt) = (type_of(l), type_of(r));
        let both_numeric = lt.is_numeric() && rt.is_numeric();
        let result = match op {
            Add | Sub | Mul | Div => arithmetic(op, &lt, &rt),
            Mod | And | Or if lt == Type::Int && rt == Type::Int => Some(Type::Int),
            Lt | Le | Gt | Ge if both_numeric => Some(Type::Int),
            Eq | Ne if both_numeric || (lt.is_pointer() && pointer_compatible(&lt, &rt)) => {
                Some(Type::Int)
            }
            _ => None,
        };

        result.ok_or_else(|| CompilerError::new(line, SemanticError::BinaryMismatch(op, lt, rt)))
    }

    fn call(
        &mut self,
        line: u32,
        callee: Option<&mut Expression>,
        args: &mut [Expression],
    ) -> SemanticResult<Type> {
        let fty = match callee {
            Some(callee) => {
                self.check_expression(callee)?;
                type_of(callee)
            }
            None => match self.functions.last() {
                None => return fail(line, SemanticError::SelfCallOutsideFunction),
                Some(f) if f.is_entry => return fail(line, SemanticError::SelfCallInEntryPoint),
                Some(f) => f.ty.clone(),
            },
        };

        let (inputs, output) = match fty.signature() {
            Some((inputs, output)) => (inputs.to_vec(), output.clone()),
            None => return fail(line, SemanticError::NotCallable(fty.clone())),
        };

        if inputs.len() != args.len() {
            return fail(
                line,
                SemanticError::WrongArgumentCount(inputs.len(), args.len()),
            );
        }

        for (idx, (arg, input)) in args.iter_mut().zip(&inputs).enumerate() {
            self.check_expression(arg)?;
            if !conform(input, arg) {
                return fail(
                    arg.line,
                    SemanticError::ArgumentMismatch(idx + 1, input.clone(), type_of(arg)),
                );
            }
        }

        Ok(output)
    }
}

fn fail<T>(line: u32, err: SemanticError) -> SemanticResult<T> {
    Err(CompilerError::new(line, err))
}

fn type_of(e: &Expression) -> Type {
    e.ty.clone().unwrap_or(Type::Unspecified)
}

fn lvalue_type(lv: &LValue) -> Type {
    lv.ty.clone().unwrap_or(Type::Unspecified)
}

/// Tests whether `value` can be used where `target` is expected.  A value
/// whose type still contains the wildcard adopts `target` when they fit.
fn conform(target: &Type, value: &mut Expression) -> bool {
    let ty = type_of(value);
    match (target, &ty) {
        (Type::Int, Type::Unspecified) | (Type::Double, Type::Unspecified) => {
            value.set_type(target.clone());
            true
        }
        (Type::Pointer(_), Type::Pointer(_)) if !ty.is_concrete() => {
            if pointer_compatible(target, &ty) {
                value.set_type(target.clone());
                true
            } else {
                false
            }
        }
        _ => assignable(target, &ty),
    }
}

/// Operands whose type is still the wildcard become ints, or doubles when the
/// other operand is a double.
fn unify_wildcards(l: &mut Expression, r: &mut Expression) {
    let (lt, rt) = (type_of(l), type_of(r));
    if lt == Type::Unspecified {
        l.set_type(if rt == Type::Double { Type::Double } else { Type::Int });
    }
    if rt == Type::Unspecified {
        r.set_type(if lt == Type::Double { Type::Double } else { Type::Int });
    }
}

fn arithmetic(op: BinaryOperator, lt: &Type, rt: &Type) -> Option<Type> {
    use BinaryOperator::*;
    match (lt, rt) {
        (Type::Double, r) | (r, Type::Double) if r.is_numeric() => Some(Type::Double),
        (Type::Int, Type::Int) => Some(Type::Int),
        (Type::Pointer(_), Type::Int) if op == Add || op == Sub => Some(lt.clone()),
        (Type::Int, Type::Pointer(_)) if op == Add => Some(rt.clone()),
        (Type::Pointer(_), Type::Pointer(_)) if op == Sub && pointer_compatible(lt, rt) => {
            Some(Type::Int)
        }
        _ => None,
    }
}
