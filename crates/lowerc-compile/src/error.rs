use lowerc_ast::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompilationError {
    #[error("unknown type '{name}'")]
    UnknownType { name: String, span: Span },

    #[error("'{name}' is already declared")]
    DuplicateType { name: String, span: Span },

    #[error("type mismatch at {site}: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: String,
        actual: String,
        site: String,
        span: Span,
    },

    #[error("'{name}' shadows a declaration already in this scope")]
    ShadowedDeclaration { name: String, span: Span },

    #[error("unknown {kind} '{name}'")]
    UnknownParent {
        kind: String,
        name: String,
        span: Span,
    },

    #[error("'{name}' would introduce a cycle")]
    TypeCycle { name: String, span: Span },

    #[error("'{name}' expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
        span: Span,
    },

    #[error("class '{class}' does not implement method '{method}'")]
    MissingInterfaceMethod {
        class: String,
        method: String,
        span: Span,
    },
}

impl CompilationError {
    pub fn span(&self) -> Span {
        match self {
            CompilationError::UnknownType { span, .. }
            | CompilationError::DuplicateType { span, .. }
            | CompilationError::TypeMismatch { span, .. }
            | CompilationError::ShadowedDeclaration { span, .. }
            | CompilationError::UnknownParent { span, .. }
            | CompilationError::TypeCycle { span, .. }
            | CompilationError::ArityMismatch { span, .. }
            | CompilationError::MissingInterfaceMethod { span, .. } => *span,
        }
    }
}
