//! The Scope Stack: a non-empty sequence of lexical frames mapping variable
//! names to the binding that introduced them.
//!
//! A binding conceptually comes from "the Define node that introduced it",
//! but two kinds of binding never have a real `Define` node: function
//! parameters and numeric/for-in loop variables are declared inline by their
//! owning construct. Rather than fabricate AST nodes for those, a frame entry
//! carries the extracted type and span directly, the same information a
//! `Define` node would have carried.

use lowerc_ast::{Span, Type};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub ty: Type,
    pub span: Span,
}

impl Binding {
    pub fn new(ty: Type, span: Span) -> Self {
        Self { ty, span }
    }
}

pub struct ScopeStack {
    frames: Vec<FxHashMap<String, Binding>>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// A freshly created stack always has exactly one, the root, frame.
    pub fn new() -> Self {
        Self {
            frames: vec![FxHashMap::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    /// Removes the innermost frame. Fails (returns `false`, stack untouched)
    /// if only the root frame remains.
    pub fn pop_scope(&mut self) -> bool {
        if self.frames.len() <= 1 {
            return false;
        }
        self.frames.pop();
        true
    }

    /// Inserts into the innermost frame. Returns `false` without inserting if
    /// that frame already binds `name`; shadowing an outer frame is fine.
    pub fn add_scoped_var(&mut self, name: &str, binding: Binding) -> bool {
        let frame = self.frames.last_mut().expect("scope stack is never empty");
        if frame.contains_key(name) {
            return false;
        }
        frame.insert(name.to_string(), binding);
        true
    }

    /// Innermost-first lookup.
    pub fn get_scoped_var(&self, name: &str) -> Option<&Binding> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
