#[cfg(test)]
mod diagnostics_tests {
    use crate::compiler::{
        ast::*,
        codegen::{compile, GeneratorError},
        semantics::SemanticError,
    };

    fn errors(mut unit: Unit) -> Vec<(u32, SemanticError)> {
        compile(&mut unit)
            .unwrap_err()
            .into_iter()
            .map(|e| match e.kind() {
                GeneratorError::Semantic(inner) => (e.line(), inner.clone()),
                internal => panic!("unexpected internal error: {}", internal),
            })
            .collect()
    }

    fn main(declarations: Vec<Declaration>, statements: Vec<Statement>) -> Unit {
        Unit::new(
            vec![],
            Some(Program::new(1, Block::new(1, declarations, statements))),
        )
    }

    fn assign(line: u32, name: &str, value: Expression) -> Statement {
        Statement::eval(
            line,
            Expression::assign(line, LValue::var(line, name), value),
        )
    }

    #[test]
    fn every_independent_error_is_reported() {
        let unit = main(
            vec![Declaration::new(
                2,
                Qualifier::Private,
                Some(Type::Int),
                "x",
                Some(Expression::string(2, "s")),
            )],
            vec![
                assign(3, "y", Expression::int(3, 1)),
                Statement::stop(4, 1),
                Statement::print(5, vec![Expression::int(5, 1)]),
            ],
        );
        assert_eq!(
            errors(unit),
            vec![
                (
                    2,
                    SemanticError::InitializerMismatch("x".into(), Type::Int, Type::String)
                ),
                (3, SemanticError::NotDefined("y".into())),
                (4, SemanticError::LoopLevelOutsideLoop("stop", 1)),
            ]
        );
    }

    #[test]
    fn scopes_stay_balanced_after_an_error() {
        let unit = main(
            vec![Declaration::local(1, Type::Int, "a")],
            vec![
                Statement::block(
                    2,
                    Block::new(
                        2,
                        vec![Declaration::local(2, Type::Int, "b")],
                        vec![Statement::eval(2, Expression::var(2, "u"))],
                    ),
                ),
                Statement::eval(3, Expression::var(3, "a")),
                Statement::eval(4, Expression::var(4, "b")),
            ],
        );
        assert_eq!(
            errors(unit),
            vec![
                (2, SemanticError::NotDefined("u".into())),
                (4, SemanticError::NotDefined("b".into())),
            ]
        );
    }

    #[test]
    fn global_declarations() {
        let unit = Unit::new(
            vec![
                Declaration::new(1, Qualifier::Private, Some(Type::Int), "i", Some(Expression::int(1, 1))),
                Declaration::new(2, Qualifier::Private, Some(Type::Int), "g", Some(Expression::var(2, "i"))),
                Declaration::new(3, Qualifier::External, Some(Type::Int), "ext", None),
                Declaration::local(4, Type::Int, "i"),
                Declaration::new(5, Qualifier::Forward, Some(Type::Int), "fwd", None),
                Declaration::local(6, Type::Double, "fwd"),
            ],
            None,
        );
        assert_eq!(
            errors(unit),
            vec![
                (2, SemanticError::NonConstantInitializer("g".into())),
                (3, SemanticError::ExternalNotFunction("ext".into(), Type::Int)),
                (4, SemanticError::AlreadyDeclared("i".into())),
                (
                    6,
                    SemanticError::ForwardMismatch("fwd".into(), Type::Int, Type::Double)
                ),
            ]
        );
    }

    #[test]
    fn functions_and_returns() {
        let returns_value = Expression::function(
            1,
            Type::Void,
            vec![],
            Block::new(1, vec![], vec![Statement::ret(2, Some(Expression::int(2, 1)))]),
        );
        let returns_nothing = Expression::function(
            3,
            Type::Int,
            vec![],
            Block::new(3, vec![], vec![Statement::ret(4, None)]),
        );
        let unit = Unit::new(
            vec![
                Declaration::new(1, Qualifier::Private, None, "v", Some(returns_value)),
                Declaration::new(3, Qualifier::Private, None, "n", Some(returns_nothing)),
            ],
            Some(Program::new(
                5,
                Block::new(
                    5,
                    vec![],
                    vec![
                        Statement::eval(6, Expression::recurse(6, vec![])),
                        Statement::eval(7, Expression::call(7, Expression::var(7, "n"), vec![Expression::int(7, 1)])),
                        Statement::ret(8, Some(Expression::string(8, "s"))),
                    ],
                ),
            )),
        );
        assert_eq!(
            errors(unit),
            vec![
                (2, SemanticError::ReturnValueInVoid),
                (4, SemanticError::ReturnValueMissing(Type::Int)),
                (6, SemanticError::SelfCallInEntryPoint),
                (7, SemanticError::WrongArgumentCount(0, 1)),
                (8, SemanticError::ReturnMismatch(Type::Int, Type::String)),
            ]
        );
    }

    #[test]
    fn loop_levels() {
        // a function body does not see the loops around its definition
        let inner = Expression::function(
            3,
            Type::Void,
            vec![],
            Block::new(3, vec![], vec![Statement::stop(4, 1)]),
        );
        let unit = main(
            vec![],
            vec![Statement::while_loop(
                1,
                Expression::int(1, 1),
                Statement::block(
                    1,
                    Block::new(
                        1,
                        vec![],
                        vec![
                            Statement::stop(2, 0),
                            Statement::eval(3, inner),
                            Statement::next(5, 2),
                            Statement::next(6, -1),
                            Statement::stop(7, 1),
                        ],
                    ),
                ),
            )],
        );
        assert_eq!(
            errors(unit),
            vec![
                (2, SemanticError::InvalidLoopLevel("stop", 0)),
                (4, SemanticError::LoopLevelOutsideLoop("stop", 1)),
                (5, SemanticError::LoopLevelOutsideLoop("next", 2)),
                (6, SemanticError::InvalidLoopLevel("next", -1)),
            ]
        );
    }

    #[test]
    fn messages_carry_the_line() {
        let mut unit = main(vec![], vec![assign(3, "y", Expression::int(3, 1))]);
        let errors = compile(&mut unit).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "L3: undeclared variable 'y'");
        assert!(!errors[0].kind().is_internal());
    }

    #[test]
    fn internal_errors() {
        for (e, internal) in vec![
            (GeneratorError::Semantic(SemanticError::ReturnOutsideFunction), false),
            (GeneratorError::Untyped, true),
            (GeneratorError::UnbalancedScopes, true),
            (GeneratorError::NoPendingFunction, true),
        ] {
            assert_eq!(e.is_internal(), internal);
            assert_eq!(e.to_string().starts_with("Internal: "), internal);
        }
    }
}
