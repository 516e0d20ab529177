use crate::compiler::ast::{BinaryOperator, Type, UnaryOperator};

/// Errors generated during semantic analysis of a compilation unit.
#[derive(Clone, Debug, PartialEq)]
pub enum SemanticError {
    NotDefined(String),
    AlreadyDeclared(String),
    ForwardMismatch(String, Type, Type),
    ExternalNotFunction(String, Type),
    MissingType(String),
    UnknownInitializerType(String),
    InitializerMismatch(String, Type, Type),
    NonConstantInitializer(String),
    UntypedFunction,
    UnaryExpected(UnaryOperator, Type),
    BinaryMismatch(BinaryOperator, Type, Type),
    AssignmentMismatch(Type, Type),
    CondExpectedInt(Type),
    NotCallable(Type),
    SelfCallOutsideFunction,
    SelfCallInEntryPoint,
    WrongArgumentCount(usize, usize),
    ArgumentMismatch(usize, Type, Type),
    ReturnOutsideFunction,
    ReturnValueInVoid,
    ReturnValueMissing(Type),
    ReturnMismatch(Type, Type),
    IndexNotPointer(Type),
    IndexFunctionPointer(Type),
    IndexExpectedInt(Type),
    AllocExpectedInt(Type),
    PrintInvalidType(Type),
    InvalidLoopLevel(&'static str, i32),
    LoopLevelOutsideLoop(&'static str, i32),
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use SemanticError::*;
        match self {
            NotDefined(name) => write!(f, "undeclared variable '{}'", name),
            AlreadyDeclared(name) => write!(f, "'{}' is already declared in this scope", name),
            ForwardMismatch(name, forward, actual) => write!(
                f,
                "'{}' was forward declared as {} but declared as {}",
                name, forward, actual
            ),
            ExternalNotFunction(name, ty) => write!(
                f,
                "external '{}' has type {} but external declarations must be functions",
                name, ty
            ),
            MissingType(name) => {
                write!(f, "'{}' has neither a declared type nor an initializer", name)
            }
            UnknownInitializerType(name) => write!(
                f,
                "cannot infer the type of '{}' from its initializer",
                name
            ),
            InitializerMismatch(name, declared, init) => write!(
                f,
                "'{}' is declared {} but initialized with {}",
                name, declared, init
            ),
            NonConstantInitializer(name) => {
                write!(f, "global '{}' requires a constant initializer", name)
            }
            UntypedFunction => f.write_str("function literal has no signature"),
            UnaryExpected(op, ty) => write!(f, "{} expected int or double but found {}", op, ty),
            BinaryMismatch(op, l, r) => write!(f, "{} cannot be applied to {} and {}", op, l, r),
            AssignmentMismatch(target, value) => {
                write!(f, "cannot assign {} to a location of type {}", value, target)
            }
            CondExpectedInt(ty) => write!(f, "condition expected int but found {}", ty),
            NotCallable(ty) => write!(f, "{} is not a function", ty),
            SelfCallOutsideFunction => f.write_str("recursive call outside of a function"),
            SelfCallInEntryPoint => f.write_str("recursive call in the main program"),
            WrongArgumentCount(expected, got) => write!(
                f,
                "function expects {} arguments but was given {}",
                expected, got
            ),
            ArgumentMismatch(idx, expected, got) => write!(
                f,
                "argument {} expected {} but found {}",
                idx, expected, got
            ),
            ReturnOutsideFunction => f.write_str("return outside of a function"),
            ReturnValueInVoid => f.write_str("void function cannot return a value"),
            ReturnValueMissing(ty) => write!(f, "return requires a value of type {}", ty),
            ReturnMismatch(expected, got) => {
                write!(f, "return expected {} but found {}", expected, got)
            }
            IndexNotPointer(ty) => write!(f, "cannot index into {}", ty),
            IndexFunctionPointer(ty) => write!(f, "cannot index into function pointer {}", ty),
            IndexExpectedInt(ty) => write!(f, "index expected int but found {}", ty),
            AllocExpectedInt(ty) => write!(f, "allocation size expected int but found {}", ty),
            PrintInvalidType(ty) => write!(f, "cannot print a value of type {}", ty),
            InvalidLoopLevel(keyword, level) => {
                write!(f, "invalid {} level {}", keyword, level)
            }
            LoopLevelOutsideLoop(keyword, level) => write!(
                f,
                "{} {} is not inside {} nested loops",
                keyword, level, level
            ),
        }
    }
}
