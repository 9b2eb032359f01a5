//! The closed set of AST node kinds produced by the (external) parser.
//!
//! Nodes are allocated in a [`bumpalo::Bump`] owned by the parser and borrowed
//! read-only by the traversal; recursive children are arena references rather
//! than `Box`, so the whole tree can be built bottom-up without an owner graph.

use crate::span::Span;
use crate::ty::Type;

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeftTuple {
    pub span: Span,
    pub names: Vec<String>,
}

#[derive(Debug)]
pub enum Node<'ast> {
    Literal {
        span: Span,
        text: String,
        type_name: String,
    },
    Identifier {
        span: Span,
        name: String,
    },
    Label {
        span: Span,
        name: String,
    },
    Goto {
        span: Span,
        name: String,
    },
    Break {
        span: Span,
    },
    StatementList {
        span: Span,
        stmts: &'ast [Node<'ast>],
    },
    DoBlock {
        span: Span,
        stmts: &'ast [Node<'ast>],
    },
    LeftTupleExpr {
        span: Span,
        tuple: LeftTuple,
    },
    Tuple {
        span: Span,
        exprs: &'ast [Node<'ast>],
    },
    Repeat {
        span: Span,
        cond: &'ast Node<'ast>,
        body: &'ast [Node<'ast>],
    },
    While {
        span: Span,
        cond: &'ast Node<'ast>,
        body: &'ast [Node<'ast>],
    },
    If {
        span: Span,
        cond: &'ast Node<'ast>,
        body: &'ast [Node<'ast>],
    },
    ForNumeric {
        span: Span,
        var: String,
        start: &'ast Node<'ast>,
        limit: &'ast Node<'ast>,
        step: Option<&'ast Node<'ast>>,
        body: &'ast [Node<'ast>],
    },
    ForIn {
        span: Span,
        vars: LeftTuple,
        source: &'ast Node<'ast>,
        body: &'ast [Node<'ast>],
    },
    Function {
        span: Span,
        name: Option<String>,
        return_type: Type,
        params: Vec<Param>,
        body: Option<&'ast [Node<'ast>]>,
    },
    Interface {
        span: Span,
        name: String,
        parent: Option<String>,
        methods: &'ast [Node<'ast>],
    },
    Class {
        span: Span,
        name: String,
        parent: Option<String>,
        interfaces: Vec<String>,
        members: &'ast [Node<'ast>],
    },
    Typedef {
        span: Span,
        alias: String,
        target: Type,
    },
    Define {
        span: Span,
        ty: Type,
        name: String,
        init: Option<&'ast Node<'ast>>,
    },
    Local {
        span: Span,
        name: String,
        init: Option<&'ast Node<'ast>>,
    },
    Set {
        span: Span,
        target: &'ast Node<'ast>,
        value: &'ast Node<'ast>,
    },
    Call {
        span: Span,
        callee: &'ast Node<'ast>,
        args: Option<&'ast Node<'ast>>,
    },
    Return {
        span: Span,
        value: Option<&'ast Node<'ast>>,
    },
    Field {
        span: Span,
        base: &'ast Node<'ast>,
        name: String,
    },
    Sub {
        span: Span,
        base: &'ast Node<'ast>,
        index: &'ast Node<'ast>,
    },
    Paren {
        span: Span,
        inner: &'ast Node<'ast>,
    },
    Unary {
        span: Span,
        op: String,
        operand: &'ast Node<'ast>,
    },
    Binary {
        span: Span,
        op: String,
        lhs: &'ast Node<'ast>,
        rhs: &'ast Node<'ast>,
    },
    Table {
        span: Span,
        keys: Vec<String>,
        values: &'ast [Node<'ast>],
    },
}

impl<'ast> Node<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Node::Literal { span, .. }
            | Node::Identifier { span, .. }
            | Node::Label { span, .. }
            | Node::Goto { span, .. }
            | Node::Break { span }
            | Node::StatementList { span, .. }
            | Node::DoBlock { span, .. }
            | Node::LeftTupleExpr { span, .. }
            | Node::Tuple { span, .. }
            | Node::Repeat { span, .. }
            | Node::While { span, .. }
            | Node::If { span, .. }
            | Node::ForNumeric { span, .. }
            | Node::ForIn { span, .. }
            | Node::Function { span, .. }
            | Node::Interface { span, .. }
            | Node::Class { span, .. }
            | Node::Typedef { span, .. }
            | Node::Define { span, .. }
            | Node::Local { span, .. }
            | Node::Set { span, .. }
            | Node::Call { span, .. }
            | Node::Return { span, .. }
            | Node::Field { span, .. }
            | Node::Sub { span, .. }
            | Node::Paren { span, .. }
            | Node::Unary { span, .. }
            | Node::Binary { span, .. }
            | Node::Table { span, .. } => *span,
        }
    }

    /// Function-type signature derived from a `Function` node's declared shape.
    /// Panics if called on a non-`Function` node; only the entity-rules and
    /// traversal modules call this, always behind a prior match arm.
    pub fn function_signature(&self) -> Type {
        match self {
            Node::Function {
                return_type, params, ..
            } => Type::func(
                return_type.clone(),
                params.iter().map(|p| p.ty.clone()).collect(),
            ),
            other => panic!("function_signature called on non-function node: {other:?}"),
        }
    }

    pub fn function_name(&self) -> Option<&str> {
        match self {
            Node::Function { name, .. } => name.as_deref(),
            _ => None,
        }
    }
}

/// Allocate a slice of nodes in the given arena from an iterator, the idiom
/// used throughout the (external) parser to build `&'ast [Node<'ast>]` fields.
pub fn alloc_slice<'ast, I>(arena: &'ast bumpalo::Bump, items: I) -> &'ast [Node<'ast>]
where
    I: IntoIterator<Item = Node<'ast>>,
{
    bumpalo::collections::Vec::from_iter_in(items, arena).into_bump_slice()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    #[test]
    fn span_dispatches_by_variant() {
        let lit = Node::Literal {
            span: Span::new(3),
            text: "3".into(),
            type_name: "int".into(),
        };
        assert_eq!(lit.span(), Span::new(3));
    }

    #[test]
    fn alloc_slice_preserves_order() {
        let arena = Bump::new();
        let slice = alloc_slice(
            &arena,
            vec![
                Node::Break { span: Span::new(1) },
                Node::Break { span: Span::new(2) },
            ],
        );
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[1].span(), Span::new(2));
    }

    #[test]
    fn function_signature_reads_return_and_params() {
        let f = Node::Function {
            span: Span::new(1),
            name: Some("f".into()),
            return_type: Type::basic("int"),
            params: vec![Param::new("x", Type::basic("int"))],
            body: None,
        };
        assert_eq!(
            f.function_signature(),
            Type::func(Type::basic("int"), vec![Type::basic("int")])
        );
    }
}
