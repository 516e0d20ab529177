use serde::{Deserialize, Serialize};

/**
The types a TIL value can have.  `Unspecified` is the wildcard used for values
whose type is decided by context (the result of `read`) and, as the referenced
type of a pointer, for the null pointer and the result of a stack allocation.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Void,
    Int,
    Double,
    String,
    Unspecified,
    Pointer(Box<Type>),
    Function(Vec<Type>, Box<Type>),
}

impl Type {
    pub fn pointer(to: Type) -> Type {
        Type::Pointer(Box::new(to))
    }

    pub fn function(inputs: Vec<Type>, output: Type) -> Type {
        Type::Function(inputs, Box::new(output))
    }

    /// The number of bytes a value of this type occupies in memory.
    pub fn size(&self) -> i32 {
        match self {
            Type::Void | Type::Unspecified => 0,
            Type::Double => 8,
            Type::Int | Type::String | Type::Pointer(_) | Type::Function(..) => 4,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Double)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function(..))
    }

    /// The type a pointer refers to.
    pub fn referenced(&self) -> Option<&Type> {
        match self {
            Type::Pointer(r) => Some(r),
            _ => None,
        }
    }

    /// The input and output types of a function type.
    pub fn signature(&self) -> Option<(&[Type], &Type)> {
        match self {
            Type::Function(inputs, output) => Some((inputs, output)),
            _ => None,
        }
    }

    /// Returns `true` if no part of this type still waits on context to be
    /// decided: neither the type itself nor, through any number of pointer
    /// levels, the type it refers to is [`Type::Unspecified`].
    pub fn is_concrete(&self) -> bool {
        match self {
            Type::Unspecified => false,
            Type::Pointer(r) => r.is_concrete(),
            _ => true,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Void => f.write_str("void"),
            Type::Int => f.write_str("int"),
            Type::Double => f.write_str("double"),
            Type::String => f.write_str("string"),
            Type::Unspecified => f.write_str("unspecified"),
            Type::Pointer(r) => write!(f, "{}!", r),
            Type::Function(inputs, output) => {
                let inputs = inputs
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                write!(f, "({} ({}))", output, inputs)
            }
        }
    }
}

/// The visibility attached to a declaration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Qualifier {
    Public,
    Private,
    External,
    Forward,
}

impl Default for Qualifier {
    fn default() -> Self {
        Qualifier::Private
    }
}

impl std::fmt::Display for Qualifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Qualifier::Public => f.write_str("public"),
            Qualifier::Private => f.write_str("private"),
            Qualifier::External => f.write_str("external"),
            Qualifier::Forward => f.write_str("forward"),
        }
    }
}
