//! End-to-end tests built by hand-assembling AST trees (as an external parser
//! would) and feeding them through [`lowerc::compile`]/[`lowerc::traverse`].

use bumpalo::Bump;
use lowerc::prelude::*;
use lowerc_ast::alloc_slice;

fn lit<'a>(arena: &'a Bump, line: u32, text: &str, type_name: &str) -> &'a Node<'a> {
    arena.alloc(Node::Literal {
        span: Span::new(line),
        text: text.to_string(),
        type_name: type_name.to_string(),
    })
}

fn ident<'a>(arena: &'a Bump, line: u32, name: &str) -> &'a Node<'a> {
    arena.alloc(Node::Identifier {
        span: Span::new(line),
        name: name.to_string(),
    })
}

// S1: a typedef over an already-known type is accepted.
#[test]
fn typedef_over_known_type_is_accepted() {
    let arena = Bump::new();
    let body = alloc_slice(
        &arena,
        vec![Node::Typedef {
            span: Span::new(1),
            alias: "PlayerId".into(),
            target: Type::basic("int"),
        }],
    );
    let result = compile(body);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.source.unwrap(), "-- typedef PlayerId -> int\n");
}

// S2: a typedef cycle (B -> A -> B) is rejected.
#[test]
fn typedef_cycle_is_rejected() {
    let arena = Bump::new();
    let body = alloc_slice(
        &arena,
        vec![
            Node::Typedef {
                span: Span::new(1),
                alias: "A".into(),
                target: Type::basic("B"),
            },
            Node::Typedef {
                span: Span::new(2),
                alias: "B".into(),
                target: Type::basic("A"),
            },
        ],
    );
    let outcome = traverse(body, true);
    assert!(outcome.diagnostics.has_errors());
    match &outcome.diagnostics.into_errors()[..] {
        [CompilationError::TypeCycle { name, .. }] => assert_eq!(name, "B"),
        other => panic!("expected a single TypeCycle diagnostic, got {other:?}"),
    }
}

// S3: a class that implements every method its interface requires is accepted.
#[test]
fn class_satisfying_interface_has_no_missing_methods() {
    let arena = Bump::new();
    let eq_methods = alloc_slice(
        &arena,
        vec![Node::Function {
            span: Span::new(1),
            name: Some("equals".into()),
            return_type: Type::basic("bool"),
            params: vec![Param::new("other", Type::Any)],
            body: None,
        }],
    );
    let iface = Node::Interface {
        span: Span::new(1),
        name: "Eq".into(),
        parent: None,
        methods: eq_methods,
    };
    let class_methods = alloc_slice(
        &arena,
        vec![Node::Function {
            span: Span::new(3),
            name: Some("equals".into()),
            return_type: Type::basic("bool"),
            params: vec![Param::new("other", Type::Any)],
            body: Some(alloc_slice(&arena, vec![])),
        }],
    );
    let class = Node::Class {
        span: Span::new(2),
        name: "Point".into(),
        parent: None,
        interfaces: vec!["Eq".into()],
        members: class_methods,
    };
    let body = alloc_slice(&arena, vec![iface, class]);
    let result = compile(body);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics.render());
}

// S4: a class missing a required interface method is reported with the method name.
#[test]
fn class_missing_interface_method_is_reported() {
    let arena = Bump::new();
    let eq_methods = alloc_slice(
        &arena,
        vec![Node::Function {
            span: Span::new(1),
            name: Some("equals".into()),
            return_type: Type::basic("bool"),
            params: vec![Param::new("other", Type::Any)],
            body: None,
        }],
    );
    let iface = Node::Interface {
        span: Span::new(1),
        name: "Eq".into(),
        parent: None,
        methods: eq_methods,
    };
    let class = Node::Class {
        span: Span::new(2),
        name: "C".into(),
        parent: None,
        interfaces: vec!["Eq".into()],
        members: alloc_slice(&arena, vec![]),
    };
    let body = alloc_slice(&arena, vec![iface, class]);
    let outcome = traverse(body, true);
    let errors = outcome.diagnostics.into_errors();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        CompilationError::MissingInterfaceMethod { class, method, .. } => {
            assert_eq!(class, "C");
            assert_eq!(method, "equals");
        }
        other => panic!("expected MissingInterfaceMethod, got {other:?}"),
    }
}

// S5: calling a function with the wrong number of arguments is an arity mismatch.
#[test]
fn call_with_wrong_arity_is_reported() {
    let arena = Bump::new();
    let function = Node::Function {
        span: Span::new(1),
        name: Some("add".into()),
        return_type: Type::basic("int"),
        params: vec![Param::new("a", Type::basic("int")), Param::new("b", Type::basic("int"))],
        body: Some(alloc_slice(&arena, vec![])),
    };
    let callee = ident(&arena, 2, "add");
    let single_arg = lit(&arena, 2, "1", "int");
    let call = Node::Call {
        span: Span::new(2),
        callee,
        args: Some(single_arg),
    };
    let body = alloc_slice(&arena, vec![function, call]);
    let outcome = traverse(body, true);
    let errors = outcome.diagnostics.into_errors();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        CompilationError::ArityMismatch {
            name,
            expected,
            actual,
            ..
        } => {
            assert_eq!(name, "add");
            assert_eq!(*expected, 2);
            assert_eq!(*actual, 1);
        }
        other => panic!("expected ArityMismatch, got {other:?}"),
    }
}

// S6: redeclaring a name in the same frame is shadowing; redeclaring it in a
// nested frame is legal shadowing instead.
#[test]
fn same_frame_shadow_is_rejected_but_nested_frame_is_allowed() {
    let arena = Bump::new();
    let one = lit(&arena, 1, "1", "int");
    let two = lit(&arena, 2, "2", "int");
    let same_frame = alloc_slice(
        &arena,
        vec![
            Node::Define {
                span: Span::new(1),
                ty: Type::basic("int"),
                name: "x".into(),
                init: Some(one),
            },
            Node::Define {
                span: Span::new(2),
                ty: Type::basic("int"),
                name: "x".into(),
                init: Some(two),
            },
        ],
    );
    let outcome = traverse(same_frame, true);
    let errors = outcome.diagnostics.into_errors();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], CompilationError::ShadowedDeclaration { name, .. } if name == "x"));

    let three = lit(&arena, 4, "3", "int");
    let nested_body = alloc_slice(
        &arena,
        vec![Node::Define {
            span: Span::new(4),
            ty: Type::basic("int"),
            name: "x".into(),
            init: Some(three),
        }],
    );
    let outer = alloc_slice(
        &arena,
        vec![
            Node::Define {
                span: Span::new(3),
                ty: Type::basic("int"),
                name: "x".into(),
                init: Some(lit(&arena, 3, "0", "int")),
            },
            Node::DoBlock {
                span: Span::new(4),
                stmts: nested_body,
            },
        ],
    );
    let outcome = traverse(outer, true);
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn arithmetic_promotes_to_num_unless_both_operands_are_int() {
    let arena = Bump::new();
    let int_lit = lit(&arena, 1, "1", "int");
    let num_lit = lit(&arena, 1, "1.5", "num");
    let mixed = Node::Binary {
        span: Span::new(1),
        op: "+".into(),
        lhs: int_lit,
        rhs: num_lit,
    };
    let define = Node::Define {
        span: Span::new(1),
        ty: Type::basic("num"),
        name: "total".into(),
        init: Some(&mixed),
    };
    let body = alloc_slice(&arena, vec![define]);
    let result = compile(body);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics.render());
}

#[test]
fn return_type_mismatch_inside_function_body_is_reported() {
    let arena = Bump::new();
    let bad_return_value = lit(&arena, 2, "\"oops\"", "string");
    let ret = Node::Return {
        span: Span::new(2),
        value: Some(bad_return_value),
    };
    let body_stmts = alloc_slice(&arena, vec![ret]);
    let function = Node::Function {
        span: Span::new(1),
        name: Some("count".into()),
        return_type: Type::basic("int"),
        params: vec![],
        body: Some(body_stmts),
    };
    let root = alloc_slice(&arena, vec![function]);
    let outcome = traverse(root, true);
    let errors = outcome.diagnostics.into_errors();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], CompilationError::TypeMismatch { site, .. } if site == "return"));
}

#[test]
fn compile_gates_emission_on_zero_diagnostics() {
    let arena = Bump::new();
    let bad_define = Node::Define {
        span: Span::new(1),
        ty: Type::basic("NoSuchType"),
        name: "x".into(),
        init: None,
    };
    let body = alloc_slice(&arena, vec![bad_define]);
    let result = compile(body);
    assert!(result.diagnostics.has_errors());
    assert!(result.source.is_none());
}
