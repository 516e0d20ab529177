#[cfg(test)]
mod ast_tests {
    use crate::compiler::ast::*;

    #[test]
    fn type_sizes() {
        for (ty, expected) in vec![
            (Type::Void, 0),
            (Type::Unspecified, 0),
            (Type::Int, 4),
            (Type::Double, 8),
            (Type::String, 4),
            (Type::pointer(Type::Double), 4),
            (Type::pointer(Type::Unspecified), 4),
            (Type::function(vec![Type::Double], Type::Double), 4),
        ] {
            assert_eq!(ty.size(), expected, "{}", ty);
        }
    }

    #[test]
    fn concrete_types() {
        for (ty, expected) in vec![
            (Type::Int, true),
            (Type::Unspecified, false),
            (Type::pointer(Type::Unspecified), false),
            (Type::pointer(Type::pointer(Type::Unspecified)), false),
            (Type::pointer(Type::pointer(Type::Int)), true),
            (Type::function(vec![], Type::Int), true),
        ] {
            assert_eq!(ty.is_concrete(), expected, "{}", ty);
        }
    }

    #[test]
    fn set_type_only_narrows_wildcards() {
        let mut e = Expression::read(1);
        e.set_type(Type::Unspecified);
        assert!(!e.is_resolved());
        e.set_type(Type::Int);
        assert_eq!(e.get_type(), Some(&Type::Int));
        e.set_type(Type::Double);
        assert_eq!(e.get_type(), Some(&Type::Int));

        let mut null = Expression::null(1);
        null.set_type(Type::pointer(Type::Unspecified));
        assert!(null.is_resolved());
        null.set_type(Type::pointer(Type::Double));
        assert_eq!(null.get_type(), Some(&Type::pointer(Type::Double)));
    }

    #[test]
    fn function_literal_type_comes_from_arguments() {
        let f = Expression::function(
            3,
            Type::Double,
            vec![
                Declaration::local(3, Type::Int, "a"),
                Declaration::local(3, Type::pointer(Type::Double), "b"),
            ],
            Block::default(),
        );
        assert_eq!(
            f.get_type(),
            Some(&Type::function(
                vec![Type::Int, Type::pointer(Type::Double)],
                Type::Double
            ))
        );
    }

    #[test]
    fn type_display() {
        for (ty, expected) in vec![
            (Type::Int, "int"),
            (Type::pointer(Type::Double), "double!"),
            (
                Type::function(vec![Type::Int, Type::String], Type::Void),
                "(void (int string))",
            ),
        ] {
            assert_eq!(ty.to_string(), expected);
        }
    }

    #[test]
    fn load_unit_from_json() {
        let text = r#"{
            "declarations": [
                { "line": 1, "qualifier": "Public", "ty": "Int", "name": "x",
                  "init": { "line": 1, "kind": { "Integer": 5 } } }
            ],
            "program": {
                "line": 2,
                "block": {
                    "statements": [
                        { "line": 3, "kind": { "Print": [[
                            { "line": 3, "kind": { "RValue": { "line": 3, "kind": { "Variable": "x" } } } }
                        ], true] } }
                    ]
                }
            }
        }"#;
        let unit: Unit = serde_json::from_str(text).unwrap();
        assert_eq!(unit.declarations.len(), 1);
        assert_eq!(unit.declarations[0].ty, Some(Type::Int));
        assert_eq!(unit.declarations[0].qualifier, Qualifier::Public);
        let program = unit.program.unwrap();
        assert_eq!(
            program.block.statements[0],
            Statement::println(3, vec![Expression::var(3, "x")])
        );
    }
}
