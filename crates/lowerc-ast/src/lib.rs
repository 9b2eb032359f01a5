//! AST and type-node shapes shared between the (external) parser and the
//! semantic traversal. This crate defines data only: no parsing, no checking.

pub mod node;
pub mod span;
pub mod ty;

pub use node::{LeftTuple, Node, Param, alloc_slice};
pub use span::Span;
pub use ty::Type;
