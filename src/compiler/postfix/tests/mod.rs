#[cfg(test)]
mod postfix_tests {
    use crate::compiler::postfix::*;
    use crate::postfix;

    #[test]
    fn display() {
        for (inst, expected) in vec![
            (Inst::Label("_L1".into()), "_L1:"),
            (Inst::Int(5), "    INT 5"),
            (Inst::Double(2.0), "    DOUBLE 2.0"),
            (Inst::Local(-8), "    LOCAL -8"),
            (Inst::Jz("_L2".into()), "    JZ _L2"),
            (Inst::Global("_main".into(), SymbolKind::Func), "    GLOBAL _main, FUNC"),
            (Inst::SString("a\nb".into()), "    SSTRING \"a\\nb\""),
            (Inst::Text, "TEXT"),
            (Inst::StFval64, "    STFVAL64"),
        ] {
            assert_eq!(inst.to_string(), expected);
        }
    }

    #[test]
    fn macro_emits_in_order() {
        let mut out = Listing::new();
        let lbl = "_L3".to_string();
        postfix!((out) {
            Inst::Int(1);
            Inst::Dup32;
            Inst::Jz(lbl.clone());
            Inst::Label(lbl);
        });
        assert_eq!(
            out.instructions(),
            &[
                Inst::Int(1),
                Inst::Dup32,
                Inst::Jz("_L3".into()),
                Inst::Label("_L3".into())
            ][..]
        );
        assert_eq!(out.to_string(), "    INT 1\n    DUP32\n    JZ _L3\n_L3:\n");
    }

    #[test]
    fn directives() {
        assert!(Inst::SAlloc(4).is_directive());
        assert!(Inst::Label("x".into()).is_directive());
        assert!(!Inst::Call("printi".into()).is_directive());
        assert!(!Inst::Branch.is_directive());
    }
}
