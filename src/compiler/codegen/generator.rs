use log::*;

use crate::compiler::{
    ast::*,
    memory::{slot_size, FrameCursor, FrameSizeCalculator},
    postfix::{Emitter, Inst, SymbolKind},
    semantics::{EnclosingFunction, SemanticError, SymbolTableScopeStack, TypeChecker},
    CompilerError,
};
use crate::postfix;

use super::{GeneratorError, GeneratorResult};

/// Label of the program's entry point.
pub const ENTRY_POINT: &str = "_main";

/// Routines provided by the runtime library.
pub const RUNTIME: [&str; 6] = ["readi", "readd", "printi", "printd", "prints", "println"];

/// A function value on its way from the node which produced it to the node
/// which consumes it.
#[derive(Clone, Debug, PartialEq)]
pub(super) enum FunctionValue {
    /// Code defined in this unit.
    Label(String),
    /// A global variable.  External globals name the code itself; all others
    /// hold the address of the code.
    Global { name: String, external: bool },
    /// A local variable or argument holding the address of the code.
    Local(i32),
}

/**
Translates a type checked syntax tree into stack machine instructions.

The generator drives the [`TypeChecker`] as it walks the tree, so a node is
checked immediately before its code is emitted and with exactly the symbols
that are in scope at that point.  Semantic errors are recorded and the
generator moves on to the next declaration or statement; internal errors
abandon the whole unit.
 */
pub struct Generator<E: Emitter> {
    pub(super) out: E,
    pub(super) symbols: SymbolTableScopeStack,
    pub(super) functions: Vec<EnclosingFunction>,
    pub(super) return_labels: Vec<String>,
    /// (test, end) labels of the enclosing loops, innermost last.
    pub(super) loop_labels: Vec<(String, String)>,
    label_count: u32,
    pub(super) cursor: FrameCursor,
    pub(super) in_arguments: bool,
    pub(super) in_body: bool,
    pub(super) pending_function: Option<FunctionValue>,
    diagnostics: Vec<CompilerError<GeneratorError>>,
}

impl<E: Emitter> Generator<E> {
    pub fn new(out: E) -> Generator<E> {
        Generator {
            out,
            symbols: SymbolTableScopeStack::new(),
            functions: vec![],
            return_labels: vec![],
            loop_labels: vec![],
            label_count: 0,
            cursor: FrameCursor::locals(),
            in_arguments: false,
            in_body: false,
            pending_function: None,
            diagnostics: vec![],
        }
    }

    /// Emits the global declarations of `unit`, then its program, then the
    /// linkage of forward declarations left undefined and of the runtime
    /// routines.
    pub fn generate(&mut self, unit: &mut Unit) -> GeneratorResult<()> {
        for d in unit.declarations.iter_mut() {
            let result = self.emit_declaration(d);
            self.recover(result)?;
        }

        if let Some(program) = &mut unit.program {
            let result = self.emit_program(program);
            self.recover(result)?;
        }

        let undefined: Vec<String> = self
            .symbols
            .globals()
            .table()
            .iter()
            .filter(|s| s.qualifier == Qualifier::Forward)
            .map(|s| s.name.clone())
            .collect();
        for name in undefined {
            debug!("Forward declaration {} is never defined", name);
            postfix!((self.out) {
                Inst::Extern(name);
            });
        }

        for routine in RUNTIME.iter() {
            postfix!((self.out) {
                Inst::Extern(routine.to_string());
            });
        }
        Ok(())
    }

    /// Errors reported so far.
    pub fn diagnostics(&self) -> &[CompilerError<GeneratorError>] {
        &self.diagnostics
    }

    /// Returns the emitted code if the unit compiled without any error.
    pub fn finish(mut self, result: GeneratorResult<()>) -> Result<E, Vec<CompilerError<GeneratorError>>> {
        if let Err(e) = result {
            error!("{}", e);
            self.diagnostics.push(e);
        }

        if self.diagnostics.is_empty() {
            Ok(self.out)
        } else {
            Err(self.diagnostics)
        }
    }

    pub(super) fn new_label(&mut self) -> String {
        self.label_count += 1;
        format!("_L{}", self.label_count)
    }

    pub(super) fn checker(&mut self) -> TypeChecker<'_> {
        TypeChecker::new(&mut self.symbols, &self.functions)
    }

    /// Records a semantic error and lets the traversal continue.  Internal
    /// errors are passed on.
    pub(super) fn recover(&mut self, result: GeneratorResult<()>) -> GeneratorResult<()> {
        match result {
            Err(e) if !e.kind().is_internal() => {
                error!("{}", e);
                self.diagnostics.push(e);
                Ok(())
            }
            other => other,
        }
    }

    pub(super) fn report(&mut self, line: u32, e: SemanticError) {
        let e = CompilerError::new(line, GeneratorError::Semantic(e));
        error!("{}", e);
        self.diagnostics.push(e);
    }

    pub(super) fn leave_scope(&mut self, line: u32) -> GeneratorResult<()> {
        self.symbols
            .leave_scope()
            .map(|_| ())
            .ok_or_else(|| CompilerError::new(line, GeneratorError::UnbalancedScopes))
    }

    pub(super) fn emit_program(&mut self, p: &mut Program) -> GeneratorResult<()> {
        debug!("Program");
        postfix!((self.out) {
            Inst::Text;
            Inst::Align;
            Inst::Global(ENTRY_POINT.into(), SymbolKind::Func);
            Inst::Label(ENTRY_POINT.into());
        });

        self.functions.push(EnclosingFunction::entry(ENTRY_POINT));
        self.symbols.enter_scope();

        let size = FrameSizeCalculator::new(&self.symbols, &self.functions).calculate(&mut p.block);
        let ret = self.new_label();
        postfix!((self.out) {
            Inst::Enter(size);
        });

        self.return_labels.push(ret.clone());
        self.cursor = FrameCursor::locals();
        self.in_body = true;
        let result = self.emit_block(&mut p.block);
        self.in_body = false;
        self.return_labels.pop();

        postfix!((self.out) {
            Inst::Int(0);
            Inst::StFval32;
            Inst::Label(ret);
            Inst::Leave;
            Inst::Ret;
        });

        self.functions.pop();
        self.leave_scope(p.line)?;
        result
    }

    pub(super) fn emit_block(&mut self, b: &mut Block) -> GeneratorResult<()> {
        self.symbols.enter_scope();
        let result = self.emit_block_contents(b);
        self.leave_scope(b.line)?;
        result
    }

    fn emit_block_contents(&mut self, b: &mut Block) -> GeneratorResult<()> {
        for d in b.declarations.iter_mut() {
            let result = self.emit_declaration(d);
            self.recover(result)?;
        }
        for s in b.statements.iter_mut() {
            let result = self.emit_statement(s);
            self.recover(result)?;
        }
        Ok(())
    }

    /// Declares `d`, gives it its storage and emits its initialization.
    pub(super) fn emit_declaration(&mut self, d: &mut Declaration) -> GeneratorResult<()> {
        self.checker().check_declaration(d)?;
        let ty = d
            .ty
            .clone()
            .ok_or_else(|| CompilerError::new(d.line, GeneratorError::Untyped))?;

        let offset = if self.in_body {
            self.cursor.reserve_local(slot_size(d))
        } else if self.in_arguments {
            self.cursor.reserve_argument(ty.size())
        } else {
            0
        };
        if let Some(symbol) = self.symbols.lookup_local_mut(&d.name) {
            symbol.offset = offset;
        }
        debug!("L{}: {} {} at {}", d.line, d.name, ty, offset);

        if self.in_body {
            if let Some(init) = &mut d.init {
                self.emit_expression(init)?;
                self.emit_widening(&type_of(init)?, &ty);
                postfix!((self.out) {
                    Inst::Local(offset);
                    store(&ty);
                });
            }
            Ok(())
        } else if self.in_arguments {
            Ok(())
        } else {
            self.emit_global(d, &ty)
        }
    }

    fn emit_global(&mut self, d: &mut Declaration, ty: &Type) -> GeneratorResult<()> {
        // A definition which resolves a forward declaration becomes public.
        let qualifier = self
            .symbols
            .lookup_local(&d.name)
            .map(|s| s.qualifier)
            .unwrap_or(d.qualifier);

        match qualifier {
            Qualifier::External => {
                postfix!((self.out) {
                    Inst::Extern(d.name.clone());
                });
                Ok(())
            }
            Qualifier::Forward => Ok(()),
            Qualifier::Public | Qualifier::Private => {
                let value = match &mut d.init {
                    Some(init) => Some(self.static_value(&d.name, ty, init)?),
                    None => None,
                };

                postfix!((self.out) {
                    if value.is_some() { Inst::Data } else { Inst::Bss };
                    Inst::Align;
                });
                if qualifier == Qualifier::Public {
                    postfix!((self.out) {
                        Inst::Global(d.name.clone(), SymbolKind::Obj);
                    });
                }
                postfix!((self.out) {
                    Inst::Label(d.name.clone());
                    value.unwrap_or(Inst::SAlloc(ty.size()));
                });
                Ok(())
            }
        }
    }

    /// The static data directive that initializes a global.  Strings and
    /// function literals are emitted first, in their own sections.
    fn static_value(
        &mut self,
        name: &str,
        ty: &Type,
        init: &mut Expression,
    ) -> GeneratorResult<Inst> {
        let line = init.line;
        let init_ty = type_of(init)?;

        if let Some(c) = constant(init) {
            return Ok(match (c, ty) {
                (Constant::Int(v), Type::Double) => Inst::SDouble(v as f64),
                (Constant::Int(v), _) => Inst::SInt(v),
                (Constant::Double(v), _) => Inst::SDouble(v),
            });
        }

        match &mut init.kind {
            ExpressionKind::Null => Ok(Inst::SInt(0)),
            ExpressionKind::Str(s) => {
                let label = self.emit_string_literal(s);
                Ok(Inst::SAddr(label))
            }
            ExpressionKind::Function(def) => {
                let label = self.emit_function(line, &init_ty, def)?;
                self.bind_code(name, &label);
                Ok(Inst::SAddr(label))
            }
            ExpressionKind::RValue(LValue {
                kind: LValueKind::Variable(function),
                ..
            }) if init_ty.is_function() => {
                let target = self.symbols.lookup(function).and_then(|symbol| {
                    if symbol.is_external() {
                        Some(function.clone())
                    } else {
                        symbol.code.clone()
                    }
                });
                match target {
                    Some(label) => {
                        self.bind_code(name, &label);
                        Ok(Inst::SAddr(label))
                    }
                    None => Err(CompilerError::new(
                        line,
                        SemanticError::NonConstantInitializer(name.into()).into(),
                    )),
                }
            }
            _ => Err(CompilerError::new(
                line,
                SemanticError::NonConstantInitializer(name.into()).into(),
            )),
        }
    }

    /// Remembers that the global `name` holds the address of the code at
    /// `label`, so later globals may be initialized from it.
    fn bind_code(&mut self, name: &str, label: &str) {
        if let Some(symbol) = self.symbols.lookup_local_mut(name) {
            symbol.code = Some(label.into());
        }
    }

    /// Emits a function literal out of line and returns its label.
    pub(super) fn emit_function(
        &mut self,
        line: u32,
        ty: &Type,
        def: &mut FunctionDef,
    ) -> GeneratorResult<String> {
        let label = self.new_label();
        let skip = self.new_label();
        debug!("L{}: Function {}", line, label);

        postfix!((self.out) {
            Inst::Text;
            Inst::Jmp(skip.clone());
            Inst::Align;
            Inst::Label(label.clone());
        });

        let cursor = self.cursor;
        let in_body = self.in_body;
        let in_arguments = self.in_arguments;
        let loop_labels = std::mem::take(&mut self.loop_labels);

        self.functions.push(EnclosingFunction::new(ty.clone(), &label));
        self.symbols.enter_scope();
        let result = self.emit_function_body(def);
        let left = self.leave_scope(line);
        self.functions.pop();

        self.cursor = cursor;
        self.in_body = in_body;
        self.in_arguments = in_arguments;
        self.loop_labels = loop_labels;
        result?;
        left?;

        postfix!((self.out) {
            Inst::Label(skip);
        });
        Ok(label)
    }

    fn emit_function_body(&mut self, def: &mut FunctionDef) -> GeneratorResult<()> {
        self.in_body = false;
        self.in_arguments = true;
        self.cursor = FrameCursor::arguments();
        for arg in def.args.iter_mut() {
            self.emit_declaration(arg)?;
        }
        self.in_arguments = false;

        let size =
            FrameSizeCalculator::new(&self.symbols, &self.functions).calculate(&mut def.body);
        let ret = self.new_label();
        postfix!((self.out) {
            Inst::Enter(size);
        });

        self.return_labels.push(ret.clone());
        self.cursor = FrameCursor::locals();
        self.in_body = true;
        let result = self.emit_block(&mut def.body);
        self.return_labels.pop();

        postfix!((self.out) {
            Inst::Label(ret);
            Inst::Leave;
            Inst::Ret;
        });
        result
    }

    /// Places a string in read only data and returns its label.
    pub(super) fn emit_string_literal(&mut self, s: &str) -> String {
        let label = self.new_label();
        postfix!((self.out) {
            Inst::Rodata;
            Inst::Align;
            Inst::Label(label.clone());
            Inst::SString(s.into());
        });
        label
    }

    pub(super) fn emit_widening(&mut self, from: &Type, to: &Type) {
        if *from == Type::Int && *to == Type::Double {
            postfix!((self.out) {
                Inst::I2D;
            });
        }
    }
}

pub(super) fn type_of(e: &Expression) -> GeneratorResult<Type> {
    e.ty
        .clone()
        .ok_or_else(|| CompilerError::new(e.line, GeneratorError::Untyped))
}

pub(super) fn load(ty: &Type) -> Inst {
    match ty {
        Type::Double => Inst::LdDouble,
        _ => Inst::LdInt,
    }
}

pub(super) fn store(ty: &Type) -> Inst {
    match ty {
        Type::Double => Inst::StDouble,
        _ => Inst::StInt,
    }
}

pub(super) fn dup(ty: &Type) -> Inst {
    match ty {
        Type::Double => Inst::Dup64,
        _ => Inst::Dup32,
    }
}

enum Constant {
    Int(i32),
    Double(f64),
}

/// The value of a numeric literal, possibly signed.
fn constant(e: &Expression) -> Option<Constant> {
    match &e.kind {
        ExpressionKind::Integer(v) => Some(Constant::Int(*v)),
        ExpressionKind::Double(v) => Some(Constant::Double(*v)),
        ExpressionKind::Unary(UnaryOperator::Plus, operand) => constant(operand),
        ExpressionKind::Unary(UnaryOperator::Minus, operand) => match constant(operand)? {
            Constant::Int(v) => Some(Constant::Int(v.wrapping_neg())),
            Constant::Double(v) => Some(Constant::Double(-v)),
        },
        _ => None,
    }
}
