//! Entity Rules: does a class satisfy every method its declared interfaces,
//! and its ancestors' interfaces, transitively require?

use lowerc_ast::Node;
use lowerc_registry::TypeRegistry;

/// Name equality plus bidirectional `typed_match` of the two functions'
/// signatures (return type and argument types).
pub fn methods_equivalent(registry: &TypeRegistry, m1: &Node, m2: &Node) -> bool {
    let (Some(n1), Some(n2)) = (m1.function_name(), m2.function_name()) else {
        return false;
    };
    if n1 != n2 {
        return false;
    }
    let (sig1, sig2) = (m1.function_signature(), m2.function_signature());
    registry.typed_match(&sig1, &sig2) && registry.typed_match(&sig2, &sig1)
}

fn interface_methods_transitive<'ast>(
    registry: &TypeRegistry<'ast>,
    interface_name: &str,
    out: &mut Vec<&'ast Node<'ast>>,
) {
    let Some(iface) = registry.interface_exists(interface_name) else {
        return;
    };
    let Node::Interface { methods, parent, .. } = iface else {
        return;
    };
    out.extend(methods.iter());
    if let Some(parent_name) = parent {
        interface_methods_transitive(registry, parent_name, out);
    }
}

fn class_ancestor_chain<'ast>(
    registry: &TypeRegistry<'ast>,
    class_name: &str,
) -> Vec<&'ast Node<'ast>> {
    let mut chain = Vec::new();
    let mut current = Some(class_name.to_string());
    while let Some(name) = current {
        let Some(class) = registry.class_exists(&name) else {
            break;
        };
        chain.push(class);
        current = match class {
            Node::Class { parent, .. } => parent.clone(),
            _ => None,
        };
    }
    chain
}

/// Returns the names of interface-imposed methods that no class in the
/// ancestry chain satisfies.
pub fn missing_methods<'ast>(registry: &TypeRegistry<'ast>, class_node: &'ast Node<'ast>) -> Vec<String> {
    let Node::Class { name, .. } = class_node else {
        return Vec::new();
    };
    let ancestry = class_ancestor_chain(registry, name);

    let mut required: Vec<&Node> = Vec::new();
    for class in &ancestry {
        let Node::Class { interfaces, .. } = class else {
            continue;
        };
        for iface_name in interfaces {
            interface_methods_transitive(registry, iface_name, &mut required);
        }
    }

    let mut provided: Vec<&Node> = Vec::new();
    for class in &ancestry {
        let Node::Class { members, .. } = class else {
            continue;
        };
        for member in members.iter() {
            if matches!(member, Node::Function { .. }) {
                provided.push(member);
            }
        }
    }

    required
        .into_iter()
        .filter(|m| !provided.iter().any(|p| methods_equivalent(registry, m, p)))
        .filter_map(|m| m.function_name().map(|s| s.to_string()))
        .collect()
}
