//! Semantic core of a transpiler from a typed superset of a dynamically
//! typed scripting language to plain host-language source.
//!
//! An (external) parser builds an arena-allocated [`Node`] tree; this crate
//! owns everything from there: the [`TypeRegistry`] and [`ScopeStack`] that
//! give meaning to names, the [`entity_rules`] that decide whether a class
//! satisfies its interfaces, and the [`traverse`]/[`compile`] entry points
//! that walk the tree once to validate and once to emit.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use lowerc::prelude::*;
//! use lowerc_ast::alloc_slice;
//!
//! let arena = Bump::new();
//! let body = alloc_slice(
//!     &arena,
//!     vec![Node::Define {
//!         span: Span::new(1),
//!         ty: Type::basic("int"),
//!         name: "x".into(),
//!         init: Some(arena.alloc(Node::Literal {
//!             span: Span::new(1),
//!             text: "1".into(),
//!             type_name: "int".into(),
//!         })),
//!     }],
//! );
//!
//! let result = compile(body);
//! assert!(result.diagnostics.is_empty());
//! assert_eq!(result.source.unwrap(), "local x=1\n");
//! ```

pub use lowerc_ast as ast;
pub use lowerc_compile as compile_core;
pub use lowerc_registry as registry;

pub use lowerc_compile::{
    Binding, CompilationError, CompileResult, Ctx, Diagnostics, Emitter, ScopeStack,
    TraversalOutcome, compile, entity_rules, traverse,
};

/// Re-exports the pieces most callers need in one place: the AST shapes, the
/// registry and scope types, and the two traversal entry points.
pub mod prelude {
    pub use lowerc_ast::{LeftTuple, Node, Param, Span, Type};
    pub use lowerc_compile::{
        Binding, CompilationError, CompileResult, Ctx, Diagnostics, ScopeStack, TraversalOutcome,
        compile, traverse,
    };
    pub use lowerc_registry::TypeRegistry;
}
