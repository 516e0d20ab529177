#[cfg(test)]
mod type_checker_tests {
    use crate::compiler::{
        ast::*,
        semantics::{
            EnclosingFunction, SemanticError, Symbol, SymbolTableScopeStack, TypeChecker,
        },
    };
    use BinaryOperator::*;

    fn environment() -> SymbolTableScopeStack {
        let mut stack = SymbolTableScopeStack::new();
        for (name, ty) in vec![
            ("i", Type::Int),
            ("d", Type::Double),
            ("s", Type::String),
            ("p", Type::pointer(Type::Double)),
            ("q", Type::pointer(Type::Double)),
            ("r", Type::pointer(Type::Int)),
            ("f", Type::function(vec![Type::Double], Type::Int)),
            ("g", Type::pointer(Type::function(vec![], Type::Int))),
        ] {
            stack
                .add(Symbol::new(name, ty, Qualifier::Private))
                .unwrap();
        }
        stack
    }

    fn check(mut e: Expression) -> Result<Type, SemanticError> {
        let mut stack = environment();
        let functions: Vec<EnclosingFunction> = vec![];
        let mut checker = TypeChecker::new(&mut stack, &functions);
        checker.check_expression(&mut e).map_err(|e| e.inner())?;
        Ok(e.ty.unwrap())
    }

    fn bin(op: BinaryOperator, l: Expression, r: Expression) -> Expression {
        Expression::binary(1, op, l, r)
    }

    fn var(name: &str) -> Expression {
        Expression::var(1, name)
    }

    fn int(v: i32) -> Expression {
        Expression::int(1, v)
    }

    #[test]
    fn binary_operators() {
        let double_ptr = Type::pointer(Type::Double);
        for (e, expected) in vec![
            (bin(Add, int(1), int(2)), Ok(Type::Int)),
            (bin(Mul, int(1), Expression::double(1, 2.0)), Ok(Type::Double)),
            (bin(Div, var("d"), var("i")), Ok(Type::Double)),
            (bin(Add, Expression::read(1), var("d")), Ok(Type::Double)),
            (bin(Add, Expression::read(1), Expression::read(1)), Ok(Type::Int)),
            (bin(Add, var("p"), int(3)), Ok(double_ptr.clone())),
            (bin(Add, int(3), var("p")), Ok(double_ptr.clone())),
            (bin(Sub, var("p"), int(3)), Ok(double_ptr.clone())),
            (bin(Sub, var("q"), var("p")), Ok(Type::Int)),
            (
                bin(Sub, int(3), var("p")),
                Err(SemanticError::BinaryMismatch(Sub, Type::Int, double_ptr.clone())),
            ),
            (
                bin(Sub, var("p"), var("r")),
                Err(SemanticError::BinaryMismatch(
                    Sub,
                    double_ptr.clone(),
                    Type::pointer(Type::Int),
                )),
            ),
            (
                bin(Mul, var("p"), int(2)),
                Err(SemanticError::BinaryMismatch(Mul, double_ptr.clone(), Type::Int)),
            ),
            (
                bin(Mod, int(5), Expression::double(1, 2.0)),
                Err(SemanticError::BinaryMismatch(Mod, Type::Int, Type::Double)),
            ),
            (
                bin(Add, var("s"), int(1)),
                Err(SemanticError::BinaryMismatch(Add, Type::String, Type::Int)),
            ),
            (bin(Lt, var("d"), var("i")), Ok(Type::Int)),
            (bin(Eq, var("p"), Expression::null(1)), Ok(Type::Int)),
            (
                bin(Eq, var("p"), var("r")),
                Err(SemanticError::BinaryMismatch(
                    Eq,
                    double_ptr.clone(),
                    Type::pointer(Type::Int),
                )),
            ),
            (bin(And, var("i"), int(0)), Ok(Type::Int)),
            (
                bin(Or, var("d"), int(0)),
                Err(SemanticError::BinaryMismatch(Or, Type::Double, Type::Int)),
            ),
        ] {
            assert_eq!(check(e.clone()), expected, "{:?}", e);
        }
    }

    #[test]
    fn unary_operators() {
        for (e, expected) in vec![
            (
                Expression::unary(1, UnaryOperator::Minus, var("d")),
                Ok(Type::Double),
            ),
            (
                Expression::unary(1, UnaryOperator::Plus, Expression::read(1)),
                Ok(Type::Int),
            ),
            (Expression::unary(1, UnaryOperator::Not, var("i")), Ok(Type::Int)),
            (
                Expression::unary(1, UnaryOperator::Not, var("d")),
                Err(SemanticError::UnaryExpected(UnaryOperator::Not, Type::Double)),
            ),
            (
                Expression::unary(1, UnaryOperator::Minus, var("s")),
                Err(SemanticError::UnaryExpected(UnaryOperator::Minus, Type::String)),
            ),
        ] {
            assert_eq!(check(e.clone()), expected, "{:?}", e);
        }
    }

    #[test]
    fn locations() {
        for (e, expected) in vec![
            (var("x"), Err(SemanticError::NotDefined("x".into()))),
            (
                Expression::rvalue(1, LValue::index(1, var("p"), int(2))),
                Ok(Type::Double),
            ),
            (
                Expression::rvalue(1, LValue::index(1, var("i"), int(2))),
                Err(SemanticError::IndexNotPointer(Type::Int)),
            ),
            (
                Expression::rvalue(1, LValue::index(1, var("p"), Expression::double(1, 1.5))),
                Err(SemanticError::IndexExpectedInt(Type::Double)),
            ),
            (
                Expression::rvalue(1, LValue::index(1, var("g"), int(0))),
                Err(SemanticError::IndexFunctionPointer(Type::pointer(
                    Type::function(vec![], Type::Int),
                ))),
            ),
            (
                Expression::address_of(1, LValue::var(1, "i")),
                Ok(Type::pointer(Type::Int)),
            ),
            (
                Expression::assign(1, LValue::var(1, "d"), int(3)),
                Ok(Type::Double),
            ),
            (
                Expression::assign(1, LValue::var(1, "i"), Expression::double(1, 2.5)),
                Err(SemanticError::AssignmentMismatch(Type::Int, Type::Double)),
            ),
            (
                Expression::assign(1, LValue::var(1, "p"), Expression::stack_alloc(1, int(4))),
                Ok(Type::pointer(Type::Double)),
            ),
            (
                Expression::stack_alloc(1, var("d")),
                Err(SemanticError::AllocExpectedInt(Type::Double)),
            ),
            (Expression::size_of(1, var("p")), Ok(Type::Int)),
        ] {
            assert_eq!(check(e.clone()), expected, "{:?}", e);
        }
    }

    #[test]
    fn calls() {
        for (e, expected) in vec![
            (Expression::call(1, var("f"), vec![int(1)]), Ok(Type::Int)),
            (
                Expression::call(1, var("f"), vec![var("d")]),
                Ok(Type::Int),
            ),
            (
                Expression::call(1, var("f"), vec![int(1), int(2)]),
                Err(SemanticError::WrongArgumentCount(1, 2)),
            ),
            (
                Expression::call(1, var("f"), vec![var("s")]),
                Err(SemanticError::ArgumentMismatch(1, Type::Double, Type::String)),
            ),
            (
                Expression::call(1, var("i"), vec![]),
                Err(SemanticError::NotCallable(Type::Int)),
            ),
            (
                Expression::recurse(1, vec![]),
                Err(SemanticError::SelfCallOutsideFunction),
            ),
        ] {
            assert_eq!(check(e.clone()), expected, "{:?}", e);
        }
    }

    #[test]
    fn every_node_is_typed() {
        let mut stack = environment();
        let functions: Vec<EnclosingFunction> = vec![];
        let mut checker = TypeChecker::new(&mut stack, &functions);

        let mut e = Expression::call(
            1,
            var("f"),
            vec![bin(Add, Expression::read(1), var("d"))],
        );
        checker.check_expression(&mut e).unwrap();

        let args = match &e.kind {
            ExpressionKind::Call(_, args) => args,
            _ => panic!("Expected a call"),
        };
        match &args[0].kind {
            ExpressionKind::Binary(_, l, r) => {
                assert_eq!(l.ty, Some(Type::Double));
                assert_eq!(r.ty, Some(Type::Double));
            }
            _ => panic!("Expected a binary operation"),
        }
        assert_eq!(args[0].ty, Some(Type::Double));
    }

    #[test]
    fn size_of_read_is_an_int() {
        let mut e = Expression::size_of(1, Expression::read(1));
        let mut stack = environment();
        let functions: Vec<EnclosingFunction> = vec![];
        TypeChecker::new(&mut stack, &functions)
            .check_expression(&mut e)
            .unwrap();

        assert_eq!(e.ty, Some(Type::Int));
        match &e.kind {
            ExpressionKind::SizeOf(operand) => assert_eq!(operand.ty, Some(Type::Int)),
            _ => panic!("Expected sizeof"),
        }
    }

    #[test]
    fn checking_is_idempotent() {
        let mut e = bin(Add, var("i"), int(1));
        {
            let mut stack = environment();
            let functions: Vec<EnclosingFunction> = vec![];
            TypeChecker::new(&mut stack, &functions)
                .check_expression(&mut e)
                .unwrap();
        }
        let before = e.clone();

        // `i` no longer exists, but a typed node is not visited again.
        let mut empty = SymbolTableScopeStack::new();
        let functions: Vec<EnclosingFunction> = vec![];
        TypeChecker::new(&mut empty, &functions)
            .check_expression(&mut e)
            .unwrap();
        assert_eq!(e, before);
    }

    fn declare(stack: &mut SymbolTableScopeStack, d: &mut Declaration) -> Result<(), SemanticError> {
        let functions: Vec<EnclosingFunction> = vec![];
        TypeChecker::new(stack, &functions)
            .check_declaration(d)
            .map_err(|e| e.inner())
    }

    #[test]
    fn null_adopts_the_declared_pointer_type() {
        let mut stack = SymbolTableScopeStack::new();
        let mut d = Declaration::new(
            1,
            Qualifier::Private,
            Some(Type::pointer(Type::Int)),
            "p",
            Some(Expression::null(1)),
        );
        declare(&mut stack, &mut d).unwrap();
        assert_eq!(
            d.init.unwrap().ty,
            Some(Type::pointer(Type::Int))
        );
        assert_eq!(
            stack.lookup("p").map(|s| &s.ty),
            Some(&Type::pointer(Type::Int))
        );
    }

    #[test]
    fn declarations() {
        let fn_int = Type::function(vec![Type::Int], Type::Int);
        for (mut d, expected) in vec![
            (
                Declaration::new(1, Qualifier::Private, None, "x", Some(Expression::double(1, 2.5))),
                Ok(Type::Double),
            ),
            (
                Declaration::new(1, Qualifier::Private, Some(Type::Double), "x", Some(int(2))),
                Ok(Type::Double),
            ),
            (
                Declaration::new(1, Qualifier::Private, Some(Type::Double), "x", Some(Expression::read(1))),
                Ok(Type::Double),
            ),
            (
                Declaration::new(1, Qualifier::Private, None, "x", Some(Expression::read(1))),
                Err(SemanticError::UnknownInitializerType("x".into())),
            ),
            (
                Declaration::new(1, Qualifier::Private, None, "x", Some(Expression::null(1))),
                Err(SemanticError::UnknownInitializerType("x".into())),
            ),
            (
                Declaration::new(1, Qualifier::Private, None, "x", None),
                Err(SemanticError::MissingType("x".into())),
            ),
            (
                Declaration::new(1, Qualifier::Private, Some(Type::Int), "x", Some(Expression::string(1, "a"))),
                Err(SemanticError::InitializerMismatch("x".into(), Type::Int, Type::String)),
            ),
            (
                Declaration::new(1, Qualifier::External, Some(Type::Int), "x", None),
                Err(SemanticError::ExternalNotFunction("x".into(), Type::Int)),
            ),
            (
                Declaration::new(1, Qualifier::External, Some(fn_int.clone()), "x", None),
                Ok(fn_int.clone()),
            ),
        ] {
            let mut stack = SymbolTableScopeStack::new();
            let result = declare(&mut stack, &mut d).map(|_| d.ty.clone().unwrap());
            assert_eq!(result, expected, "{:?}", d);
        }
    }

    #[test]
    fn redeclaration() {
        let mut stack = SymbolTableScopeStack::new();
        declare(&mut stack, &mut Declaration::local(1, Type::Int, "x")).unwrap();
        assert_eq!(
            declare(&mut stack, &mut Declaration::local(2, Type::Int, "x")),
            Err(SemanticError::AlreadyDeclared("x".into()))
        );

        stack.enter_scope();
        declare(&mut stack, &mut Declaration::local(3, Type::Double, "x")).unwrap();
        assert_eq!(stack.lookup("x").map(|s| &s.ty), Some(&Type::Double));
    }

    #[test]
    fn forward_declarations_are_replaced() {
        let signature = Type::function(vec![Type::Int], Type::Double);
        let mut stack = SymbolTableScopeStack::new();
        declare(
            &mut stack,
            &mut Declaration::new(1, Qualifier::Forward, Some(signature.clone()), "f", None),
        )
        .unwrap();

        let body = Block::new(2, vec![], vec![Statement::ret(2, Some(int(1)))]);
        let mut definition = Declaration::new(
            2,
            Qualifier::Private,
            None,
            "f",
            Some(Expression::function(
                2,
                Type::Int,
                vec![Declaration::local(2, Type::Double, "a")],
                body,
            )),
        );
        declare(&mut stack, &mut definition).unwrap();

        let symbol = stack.lookup("f").unwrap();
        assert_eq!(symbol.qualifier, Qualifier::Public);
        assert_eq!(
            symbol.ty,
            Type::function(vec![Type::Double], Type::Int)
        );
    }

    #[test]
    fn incompatible_forward_declarations_fail() {
        let mut stack = SymbolTableScopeStack::new();
        declare(
            &mut stack,
            &mut Declaration::new(
                1,
                Qualifier::Forward,
                Some(Type::function(vec![], Type::Int)),
                "f",
                None,
            ),
        )
        .unwrap();

        let result = declare(
            &mut stack,
            &mut Declaration::new(
                2,
                Qualifier::Public,
                Some(Type::function(vec![], Type::Double)),
                "f",
                None,
            ),
        );
        assert_eq!(
            result,
            Err(SemanticError::ForwardMismatch(
                "f".into(),
                Type::function(vec![], Type::Int),
                Type::function(vec![], Type::Double)
            ))
        );
    }

    fn check_statement(
        functions: &[EnclosingFunction],
        mut s: Statement,
    ) -> Result<(), SemanticError> {
        let mut stack = environment();
        TypeChecker::new(&mut stack, functions)
            .check_statement(&mut s)
            .map_err(|e| e.inner())
    }

    #[test]
    fn statements() {
        let in_double = vec![EnclosingFunction::new(
            Type::function(vec![], Type::Double),
            "_L1",
        )];
        let in_void = vec![EnclosingFunction::new(
            Type::function(vec![], Type::Void),
            "_L1",
        )];
        let in_entry = vec![EnclosingFunction::entry("_main")];

        for (functions, s, expected) in vec![
            (&in_double, Statement::ret(1, Some(int(1))), Ok(())),
            (
                &in_double,
                Statement::ret(1, None),
                Err(SemanticError::ReturnValueMissing(Type::Double)),
            ),
            (
                &in_double,
                Statement::ret(1, Some(var("s"))),
                Err(SemanticError::ReturnMismatch(Type::Double, Type::String)),
            ),
            (&in_void, Statement::ret(1, None), Ok(())),
            (
                &in_void,
                Statement::ret(1, Some(int(1))),
                Err(SemanticError::ReturnValueInVoid),
            ),
            (&in_entry, Statement::ret(1, Some(int(0))), Ok(())),
            (
                &in_entry,
                Statement::eval(1, Expression::recurse(1, vec![])),
                Err(SemanticError::SelfCallInEntryPoint),
            ),
            (
                &in_double,
                Statement::eval(1, Expression::recurse(1, vec![])),
                Ok(()),
            ),
            (
                &in_void,
                Statement::println(1, vec![var("i"), var("d"), var("s"), Expression::read(1)]),
                Ok(()),
            ),
            (
                &in_void,
                Statement::print(1, vec![var("p")]),
                Err(SemanticError::PrintInvalidType(Type::pointer(Type::Double))),
            ),
            (
                &in_void,
                Statement::if_then(1, var("d"), Statement::stop(1, 1)),
                Err(SemanticError::CondExpectedInt(Type::Double)),
            ),
            (
                &in_void,
                Statement::while_loop(1, var("i"), Statement::next(1, 1)),
                Ok(()),
            ),
        ] {
            assert_eq!(check_statement(functions, s.clone()), expected, "{:?}", s);
        }

        assert_eq!(
            check_statement(&[], Statement::ret(1, None)),
            Err(SemanticError::ReturnOutsideFunction)
        );
    }
}
