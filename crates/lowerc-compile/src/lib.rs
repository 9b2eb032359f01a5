//! Scope stack, entity rules, and the AST traversal: the half of the system
//! that actually type-checks and lowers, built on top of [`lowerc_registry`]'s
//! Type Registry and [`lowerc_ast`]'s tree shapes.

pub mod diagnostics;
pub mod emit;
pub mod entity_rules;
pub mod error;
pub mod scope;
pub mod traversal;

pub use diagnostics::Diagnostics;
pub use emit::Emitter;
pub use entity_rules::{methods_equivalent, missing_methods};
pub use error::CompilationError;
pub use scope::{Binding, ScopeStack};
pub use traversal::{CompileResult, Ctx, TraversalOutcome, compile, get_type, traverse};

/// Re-exports the pieces most callers need in one place.
pub mod prelude {
    pub use crate::{
        Binding, CompilationError, CompileResult, Ctx, Diagnostics, Emitter, ScopeStack,
        TraversalOutcome, compile, traverse,
    };
    pub use lowerc_ast::{Node, Span, Type};
    pub use lowerc_registry::TypeRegistry;
}
