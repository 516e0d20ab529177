#[cfg(test)]
mod frame_size_tests {
    use crate::compiler::{
        ast::*,
        memory::{FrameCursor, FrameSizeCalculator},
        semantics::{EnclosingFunction, SymbolTableScopeStack},
    };

    fn calculate(mut body: Block) -> i32 {
        let symbols = SymbolTableScopeStack::new();
        let functions = vec![EnclosingFunction::entry("_main")];
        FrameSizeCalculator::new(&symbols, &functions).calculate(&mut body)
    }

    #[test]
    fn cursor_offsets() {
        let mut locals = FrameCursor::locals();
        assert_eq!(locals.reserve_local(4), -4);
        assert_eq!(locals.reserve_local(8), -12);
        assert_eq!(locals.reserve_local(4), -16);
        assert_eq!(locals.extent(), 16);

        let mut args = FrameCursor::arguments();
        assert_eq!(args.reserve_argument(8), 8);
        assert_eq!(args.reserve_argument(4), 16);
        assert_eq!(args.reserve_argument(4), 20);
        assert_eq!(args.extent(), 0);
    }

    #[test]
    fn sums_the_locals_of_every_nested_statement() {
        let body = Block::new(
            1,
            vec![
                Declaration::local(1, Type::Int, "a"),
                Declaration::local(2, Type::Double, "b"),
            ],
            vec![
                Statement::block(
                    3,
                    Block::new(3, vec![Declaration::local(3, Type::Double, "c")], vec![]),
                ),
                Statement::if_else(
                    4,
                    Expression::var(4, "a"),
                    Statement::block(
                        4,
                        Block::new(4, vec![Declaration::local(4, Type::String, "d")], vec![]),
                    ),
                    Statement::while_loop(
                        5,
                        Expression::int(5, 1),
                        Statement::block(
                            5,
                            Block::new(
                                5,
                                vec![Declaration::local(5, Type::pointer(Type::Int), "e")],
                                vec![],
                            ),
                        ),
                    ),
                ),
            ],
        );
        assert_eq!(calculate(body), 4 + 8 + 8 + 4 + 4);
    }

    #[test]
    fn nested_functions_keep_their_own_locals() {
        let inner = Expression::function(
            2,
            Type::Int,
            vec![Declaration::local(2, Type::Double, "arg")],
            Block::new(
                2,
                vec![Declaration::local(3, Type::Double, "z")],
                vec![Statement::ret(4, Some(Expression::int(4, 0)))],
            ),
        );
        let body = Block::new(
            1,
            vec![Declaration::new(1, Qualifier::Private, None, "f", Some(inner))],
            vec![],
        );
        assert_eq!(calculate(body), 4);
    }

    #[test]
    fn inferred_and_failing_declarations() {
        let body = Block::new(
            1,
            vec![
                Declaration::new(1, Qualifier::Private, None, "x", Some(Expression::double(1, 1.0))),
                Declaration::new(2, Qualifier::Private, None, "y", Some(Expression::var(2, "nope"))),
                Declaration::new(3, Qualifier::Private, None, "w", Some(Expression::var(3, "x"))),
            ],
            vec![],
        );
        assert_eq!(calculate(body), 16);
    }
}
