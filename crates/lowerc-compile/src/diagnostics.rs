//! Collects [`CompilationError`]s instead of throwing; handlers record and
//! keep going so a single run can report every problem it finds.

use crate::error::CompilationError;

#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<CompilationError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: CompilationError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompilationError> {
        self.errors.iter()
    }

    pub fn into_errors(self) -> Vec<CompilationError> {
        self.errors
    }

    /// Renders every diagnostic as `ERROR <line>: <message>`, the format the
    /// (external) driver writes to standard error.
    pub fn render(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| format!("ERROR {}: {}", e.span(), e))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lowerc_ast::Span;

    #[test]
    fn empty_by_default() {
        let d = Diagnostics::new();
        assert!(d.is_empty());
        assert!(!d.has_errors());
    }

    #[test]
    fn render_prefixes_error_and_line() {
        let mut d = Diagnostics::new();
        d.push(CompilationError::UnknownType {
            name: "Foo".into(),
            span: Span::new(7),
        });
        assert_eq!(d.render(), vec!["ERROR 7: unknown type 'Foo'".to_string()]);
    }
}
