use crate::compiler::{ast::Type, semantics::SemanticError, CompilerError};

/// Errors raised while generating code.
///
/// Semantic errors come from the user's program and are reported without
/// stopping the generator.  Every other variant is an internal fault: a
/// node that should have been resolved by an earlier step was not, and the
/// compilation unit is abandoned.
#[derive(Clone, Debug, PartialEq)]
pub enum GeneratorError {
    Semantic(SemanticError),
    Untyped,
    UnresolvedSymbol(String),
    ExpectedFunction(Type),
    UnsupportedType(Type),
    NoEnclosingFunction,
    NoPendingFunction,
    UnbalancedScopes,
}

impl GeneratorError {
    pub fn is_internal(&self) -> bool {
        !matches!(self, GeneratorError::Semantic(_))
    }
}

impl std::fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use GeneratorError::*;
        match self {
            Semantic(e) => write!(f, "{}", e),
            Untyped => f.write_str("Internal: node reached the generator without a type"),
            UnresolvedSymbol(name) => write!(f, "Internal: '{}' has no symbol", name),
            ExpectedFunction(ty) => write!(f, "Internal: expected a function type but found {}", ty),
            UnsupportedType(ty) => write!(f, "Internal: cannot generate a value of type {}", ty),
            NoEnclosingFunction => f.write_str("Internal: no enclosing function"),
            NoPendingFunction => f.write_str("Internal: no function value to consume"),
            UnbalancedScopes => f.write_str("Internal: left more scopes than were entered"),
        }
    }
}

impl From<SemanticError> for GeneratorError {
    fn from(e: SemanticError) -> Self {
        GeneratorError::Semantic(e)
    }
}

impl From<CompilerError<SemanticError>> for CompilerError<GeneratorError> {
    fn from(e: CompilerError<SemanticError>) -> Self {
        e.map(GeneratorError::Semantic)
    }
}
