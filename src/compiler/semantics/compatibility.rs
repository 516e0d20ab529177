/*!
Structural compatibility between TIL types.

A value of the candidate type may be used where the target type is expected
when the two are compatible.  For numeric values an int may always widen to a
double.  Functions follow the usual variance rules adapted to that widening:
an output may widen from int to double, while an input declared int accepts a
function whose input is double.
*/
use crate::compiler::ast::Type;

/// Returns `true` if a value of type `candidate` can be stored in a location of
/// type `target`.  Wildcards are not resolved here; see the type checker.
pub fn assignable(target: &Type, candidate: &Type) -> bool {
    match target {
        Type::Int => candidate == &Type::Int,
        Type::Double => candidate.is_numeric(),
        Type::String => candidate == &Type::String,
        Type::Pointer(_) => pointer_compatible(target, candidate),
        Type::Function(..) => function_compatible(target, candidate),
        Type::Void | Type::Unspecified => false,
    }
}

/// Function `candidate` can stand in for function `target`.
pub fn function_compatible(target: &Type, candidate: &Type) -> bool {
    match (target.signature(), candidate.signature()) {
        (Some((t_inputs, t_output)), Some((c_inputs, c_output))) => {
            t_inputs.len() == c_inputs.len()
                && output_compatible(t_output, c_output)
                && t_inputs
                    .iter()
                    .zip(c_inputs)
                    .all(|(t, c)| input_compatible(t, c))
        }
        _ => false,
    }
}

/// Pointer `candidate` can stand in for pointer `target`.  A pointer to the
/// wildcard type (the null pointer) is compatible with every pointer.
pub fn pointer_compatible(target: &Type, candidate: &Type) -> bool {
    match (target, candidate) {
        (Type::Pointer(t), Type::Pointer(c)) => match (t.as_ref(), c.as_ref()) {
            (Type::Unspecified, _) | (_, Type::Unspecified) => true,
            (Type::Pointer(_), Type::Pointer(_)) => pointer_compatible(t, c),
            (Type::Function(..), Type::Function(..)) => function_compatible(t, c),
            (t, c) => t == c,
        },
        _ => false,
    }
}

fn output_compatible(target: &Type, candidate: &Type) -> bool {
    match target {
        Type::Double => candidate.is_numeric(),
        Type::Function(..) => function_compatible(target, candidate),
        Type::Pointer(_) => pointer_compatible(target, candidate),
        _ => target == candidate,
    }
}

fn input_compatible(target: &Type, candidate: &Type) -> bool {
    match target {
        Type::Int => candidate.is_numeric(),
        Type::Function(..) => function_compatible(target, candidate),
        Type::Pointer(_) => pointer_compatible(target, candidate),
        _ => target == candidate,
    }
}
