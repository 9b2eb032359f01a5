//! The Type Registry: declared types, aliases, and the subtype DAG that
//! together answer existence, equivalence, and compatibility questions for
//! the traversal. See [`TypeRegistry`] for the operation contracts.

pub mod error;
pub mod registry;

pub use error::RegistryError;
pub use registry::TypeRegistry;
