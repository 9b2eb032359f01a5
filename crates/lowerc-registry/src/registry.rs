//! The Type Registry: registered type names, aliases, the subtype DAG, and the
//! declaration maps for classes, interfaces, and top-level functions.

use lowerc_ast::{Node, Type};
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::RegistryError;

const PRIMITIVES: &[&str] = &["num", "int", "string", "bool", "nil", "table"];

/// Per-traversal context object, never a module global: a fresh registry is
/// created at traversal entry and dropped at exit (see the traversal crate).
pub struct TypeRegistry<'ast> {
    types: FxHashSet<String>,
    aliases: FxHashMap<String, Type>,
    subtype_graph: DiGraph<String, ()>,
    subtype_nodes: FxHashMap<String, NodeIndex>,
    classes: FxHashMap<String, &'ast Node<'ast>>,
    interfaces: FxHashMap<String, &'ast Node<'ast>>,
    functions: FxHashMap<String, &'ast Node<'ast>>,
}

impl<'ast> Default for TypeRegistry<'ast> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'ast> TypeRegistry<'ast> {
    pub fn new() -> Self {
        let mut reg = Self {
            types: FxHashSet::default(),
            aliases: FxHashMap::default(),
            subtype_graph: DiGraph::new(),
            subtype_nodes: FxHashMap::default(),
            classes: FxHashMap::default(),
            interfaces: FxHashMap::default(),
            functions: FxHashMap::default(),
        };
        for &name in PRIMITIVES {
            reg.types.insert(name.to_string());
        }
        reg
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    pub fn register_type(&mut self, name: &str) -> Result<(), RegistryError> {
        if !self.types.insert(name.to_string()) {
            return Err(RegistryError::DuplicateType(name.to_string()));
        }
        Ok(())
    }

    pub fn type_exists(&self, name: &str) -> bool {
        self.types.contains(name)
    }

    /// True iff every `Basic(name)` reachable inside `node` is registered.
    /// `Any` always passes; `Tuple`/`Func` recurse into their subcomponents.
    pub fn compound_type_exists(&self, node: &Type) -> bool {
        match node {
            Type::Any => true,
            Type::Basic(name) => self.type_exists(name),
            Type::Tuple(types) => types.iter().all(|t| self.compound_type_exists(t)),
            Type::Func(ret, args) => {
                self.compound_type_exists(ret) && args.iter().all(|t| self.compound_type_exists(t))
            }
        }
    }

    // ------------------------------------------------------------------
    // Aliases
    // ------------------------------------------------------------------

    /// Records `alias -> target`, rejecting the edge if `target` names `alias`
    /// directly or through a chain of existing aliases.
    pub fn add_type_equivalence(&mut self, alias: &str, target: Type) -> bool {
        let mut visiting = FxHashSet::default();
        if self.target_reaches(&target, alias, &mut visiting) {
            return false;
        }
        self.aliases.insert(alias.to_string(), target);
        true
    }

    fn target_reaches(&self, ty: &Type, needle: &str, visiting: &mut FxHashSet<String>) -> bool {
        match ty {
            Type::Any => false,
            Type::Basic(name) => {
                if name == needle {
                    return true;
                }
                if !visiting.insert(name.clone()) {
                    return false;
                }
                match self.aliases.get(name) {
                    Some(target) => self.target_reaches(target, needle, visiting),
                    None => false,
                }
            }
            Type::Tuple(types) => types.iter().any(|t| self.target_reaches(t, needle, visiting)),
            Type::Func(ret, args) => {
                self.target_reaches(ret, needle, visiting)
                    || args.iter().any(|t| self.target_reaches(t, needle, visiting))
            }
        }
    }

    /// Resolves a basic type name through the alias chain to its canonical form.
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        let mut current = name;
        let mut seen = FxHashSet::default();
        while let Some(Type::Basic(next)) = self.aliases.get(current) {
            if !seen.insert(current.to_string()) {
                break;
            }
            current = next;
        }
        current
    }

    // ------------------------------------------------------------------
    // Subtype DAG
    // ------------------------------------------------------------------

    fn node_index(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.subtype_nodes.get(name) {
            return idx;
        }
        let idx = self.subtype_graph.add_node(name.to_string());
        self.subtype_nodes.insert(name.to_string(), idx);
        idx
    }

    /// Inserts `child -> parent`. Rejects the edge (returns `false`) if it
    /// would close a cycle, including the degenerate `child == parent` case.
    pub fn add_child_type(&mut self, child: &str, parent: &str) -> bool {
        if child == parent {
            return false;
        }
        let child_idx = self.node_index(child);
        let parent_idx = self.node_index(parent);
        if has_path_connecting(&self.subtype_graph, parent_idx, child_idx, None) {
            return false;
        }
        self.subtype_graph.add_edge(child_idx, parent_idx, ());
        true
    }

    /// Reflexive-transitive closure over `subtypes`.
    pub fn is_subtype(&self, child: &str, parent: &str) -> bool {
        if child == parent {
            return true;
        }
        let (Some(&child_idx), Some(&parent_idx)) =
            (self.subtype_nodes.get(child), self.subtype_nodes.get(parent))
        else {
            return false;
        };
        has_path_connecting(&self.subtype_graph, child_idx, parent_idx, None)
    }

    // ------------------------------------------------------------------
    // typed_match
    // ------------------------------------------------------------------

    pub fn typed_match(&self, expected: &Type, actual: &Type) -> bool {
        match (expected, actual) {
            (Type::Any, _) | (_, Type::Any) => true,
            (Type::Basic(exp), Type::Basic(act)) => {
                let exp = self.resolve_alias(exp);
                let act = self.resolve_alias(act);
                exp == act || self.is_subtype(act, exp)
            }
            (Type::Tuple(exp), Type::Tuple(act)) => {
                exp.len() == act.len()
                    && exp.iter().zip(act).all(|(e, a)| self.typed_match(e, a))
            }
            (Type::Func(exp_ret, exp_args), Type::Func(act_ret, act_args)) => {
                self.typed_match(exp_ret, act_ret)
                    && exp_args.len() == act_args.len()
                    && exp_args
                        .iter()
                        .zip(act_args)
                        .all(|(e, a)| self.typed_match(e, a))
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    pub fn register_interface(
        &mut self,
        name: &str,
        node: &'ast Node<'ast>,
    ) -> Result<(), RegistryError> {
        self.register_type(name)?;
        self.interfaces.insert(name.to_string(), node);
        Ok(())
    }

    pub fn register_class(
        &mut self,
        name: &str,
        node: &'ast Node<'ast>,
    ) -> Result<(), RegistryError> {
        self.register_type(name)?;
        self.classes.insert(name.to_string(), node);
        Ok(())
    }

    pub fn register_function(
        &mut self,
        name: &str,
        node: &'ast Node<'ast>,
    ) -> Result<(), RegistryError> {
        if self.functions.contains_key(name) {
            return Err(RegistryError::DuplicateType(name.to_string()));
        }
        self.functions.insert(name.to_string(), node);
        Ok(())
    }

    pub fn interface_exists(&self, name: &str) -> Option<&'ast Node<'ast>> {
        self.interfaces.get(name).copied()
    }

    pub fn class_exists(&self, name: &str) -> Option<&'ast Node<'ast>> {
        self.classes.get(name).copied()
    }

    pub fn function_exists(&self, name: &str) -> Option<&'ast Node<'ast>> {
        self.functions.get(name).copied()
    }

    pub fn stringify_type(&self, node: &Type) -> String {
        node.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lowerc_ast::Span;

    #[test]
    fn primitives_preregistered() {
        let reg = TypeRegistry::new();
        for name in PRIMITIVES {
            assert!(reg.type_exists(name), "{name} should be preregistered");
        }
    }

    #[test]
    fn register_type_rejects_duplicates() {
        let mut reg = TypeRegistry::new();
        reg.register_type("Widget").unwrap();
        assert_eq!(
            reg.register_type("Widget"),
            Err(RegistryError::DuplicateType("Widget".into()))
        );
    }

    #[test]
    fn compound_type_exists_recurses() {
        let mut reg = TypeRegistry::new();
        reg.register_type("Player").unwrap();
        let tuple = Type::tuple(vec![Type::basic("Player"), Type::Any]);
        assert!(reg.compound_type_exists(&tuple));
        let bad = Type::tuple(vec![Type::basic("Missing")]);
        assert!(!reg.compound_type_exists(&bad));
    }

    #[test]
    fn add_type_equivalence_rejects_direct_cycle() {
        let mut reg = TypeRegistry::new();
        assert!(!reg.add_type_equivalence("A", Type::basic("A")));
    }

    #[test]
    fn add_type_equivalence_rejects_indirect_cycle() {
        let mut reg = TypeRegistry::new();
        assert!(reg.add_type_equivalence("A", Type::basic("B")));
        assert!(!reg.add_type_equivalence("B", Type::basic("A")));
    }

    #[test]
    fn add_type_equivalence_accepts_acyclic_chain() {
        let mut reg = TypeRegistry::new();
        assert!(reg.add_type_equivalence("ID", Type::basic("int")));
        assert_eq!(reg.resolve_alias("ID"), "int");
    }

    #[test]
    fn add_child_type_rejects_cycle() {
        let mut reg = TypeRegistry::new();
        assert!(reg.add_child_type("Dog", "Animal"));
        assert!(reg.add_child_type("Animal", "Thing"));
        assert!(!reg.add_child_type("Thing", "Dog"));
    }

    #[test]
    fn is_subtype_is_reflexive_and_transitive() {
        let mut reg = TypeRegistry::new();
        reg.add_child_type("Dog", "Animal");
        reg.add_child_type("Animal", "Thing");
        assert!(reg.is_subtype("Dog", "Dog"));
        assert!(reg.is_subtype("Dog", "Animal"));
        assert!(reg.is_subtype("Dog", "Thing"));
        assert!(!reg.is_subtype("Thing", "Dog"));
    }

    #[test]
    fn typed_match_any_matches_everything() {
        let reg = TypeRegistry::new();
        assert!(reg.typed_match(&Type::Any, &Type::basic("int")));
        assert!(reg.typed_match(&Type::basic("int"), &Type::Any));
    }

    #[test]
    fn typed_match_basic_through_subtype() {
        let mut reg = TypeRegistry::new();
        reg.register_type("Animal").unwrap();
        reg.register_type("Dog").unwrap();
        reg.add_child_type("Dog", "Animal");
        assert!(reg.typed_match(&Type::basic("Animal"), &Type::basic("Dog")));
        assert!(!reg.typed_match(&Type::basic("Dog"), &Type::basic("Animal")));
    }

    #[test]
    fn typed_match_basic_through_alias() {
        let mut reg = TypeRegistry::new();
        reg.add_type_equivalence("ID", Type::basic("int"));
        assert!(reg.typed_match(&Type::basic("ID"), &Type::basic("int")));
        assert!(reg.typed_match(&Type::basic("int"), &Type::basic("ID")));
    }

    #[test]
    fn typed_match_func_checks_return_and_args_pairwise() {
        let reg = TypeRegistry::new();
        let expected = Type::func(Type::basic("bool"), vec![Type::Any]);
        let actual = Type::func(Type::basic("bool"), vec![Type::basic("int")]);
        assert!(reg.typed_match(&expected, &actual));
        let mismatched = Type::func(Type::basic("bool"), vec![Type::Any, Type::Any]);
        assert!(!reg.typed_match(&expected, &mismatched));
    }

    #[test]
    fn register_class_and_interface_also_register_the_type_name() {
        let mut reg = TypeRegistry::new();
        let node = Node::Break { span: Span::new(1) };
        reg.register_class("C", &node).unwrap();
        assert!(reg.type_exists("C"));
        assert!(reg.class_exists("C").is_some());
        assert_eq!(
            reg.register_interface("C", &node),
            Err(RegistryError::DuplicateType("C".into()))
        );
    }

    #[test]
    fn register_function_does_not_touch_type_names() {
        let mut reg = TypeRegistry::new();
        let node = Node::Break { span: Span::new(1) };
        reg.register_function("f", &node).unwrap();
        assert!(!reg.type_exists("f"));
        assert!(reg.function_exists("f").is_some());
        assert!(reg.register_function("f", &node).is_err());
    }
}
