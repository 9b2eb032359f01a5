use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("type '{0}' is already registered")]
    DuplicateType(String),
}
