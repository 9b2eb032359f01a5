use bumpalo::Bump;
use lowerc::prelude::*;
use lowerc_ast::alloc_slice;

fn main() {
    // A parser would build this tree from source; here it's assembled by hand
    // to show the shape the traversal expects.
    //
    //   interface Greeter where
    //       string greeting()
    //   end
    //   class Friend implements Greeter where
    //       string greeting()
    //           return "hi"
    //       end
    //   end
    //   int total = 1 + 2
    let arena = Bump::new();

    let greeting_sig = alloc_slice(
        &arena,
        vec![Node::Function {
            span: Span::new(2),
            name: Some("greeting".into()),
            return_type: Type::basic("string"),
            params: vec![],
            body: None,
        }],
    );
    let greeter = Node::Interface {
        span: Span::new(1),
        name: "Greeter".into(),
        parent: None,
        methods: greeting_sig,
    };

    let greeting_return = arena.alloc(Node::Literal {
        span: Span::new(5),
        text: "\"hi\"".into(),
        type_name: "string".into(),
    });
    let greeting_body = alloc_slice(
        &arena,
        vec![Node::Return {
            span: Span::new(5),
            value: Some(&*greeting_return),
        }],
    );
    let friend_members = alloc_slice(
        &arena,
        vec![Node::Function {
            span: Span::new(4),
            name: Some("greeting".into()),
            return_type: Type::basic("string"),
            params: vec![],
            body: Some(greeting_body),
        }],
    );
    let friend = Node::Class {
        span: Span::new(3),
        name: "Friend".into(),
        parent: None,
        interfaces: vec!["Greeter".into()],
        members: friend_members,
    };

    let one = arena.alloc(Node::Literal {
        span: Span::new(8),
        text: "1".into(),
        type_name: "int".into(),
    });
    let two = arena.alloc(Node::Literal {
        span: Span::new(8),
        text: "2".into(),
        type_name: "int".into(),
    });
    let sum = arena.alloc(Node::Binary {
        span: Span::new(8),
        op: "+".into(),
        lhs: &*one,
        rhs: &*two,
    });
    let total = Node::Define {
        span: Span::new(8),
        ty: Type::basic("int"),
        name: "total".into(),
        init: Some(&*sum),
    };

    let program = alloc_slice(&arena, vec![greeter, friend, total]);

    let result = compile(program);
    if result.diagnostics.has_errors() {
        for line in result.diagnostics.render() {
            eprintln!("{line}");
        }
        std::process::exit(result.exit_code());
    }

    print!("{}", result.source.expect("zero diagnostics implies emitted source"));
}
