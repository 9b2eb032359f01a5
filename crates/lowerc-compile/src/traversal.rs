//! The AST Traversal: a single pre-order descent that either validates or
//! emits, using the same dispatch table for both passes. See [`traverse`]
//! for the per-pass entry point and [`compile`] for the gated two-pass
//! convenience wrapper.

use lowerc_ast::{LeftTuple, Node, Span, Type};
use lowerc_registry::TypeRegistry;

use crate::diagnostics::Diagnostics;
use crate::emit;
use crate::emit::Emitter;
use crate::entity_rules::missing_methods;
use crate::error::CompilationError;
use crate::scope::{Binding, ScopeStack};

pub struct Ctx<'ast> {
    pub registry: TypeRegistry<'ast>,
    pub scopes: ScopeStack,
    pub diagnostics: Diagnostics,
    pub emitter: Emitter,
    return_type_stack: Vec<Type>,
}

impl<'ast> Ctx<'ast> {
    fn new() -> Self {
        Self {
            registry: TypeRegistry::new(),
            scopes: ScopeStack::new(),
            diagnostics: Diagnostics::new(),
            emitter: Emitter::new(),
            return_type_stack: Vec::new(),
        }
    }
}

pub struct TraversalOutcome {
    pub diagnostics: Diagnostics,
    pub source: Option<String>,
}

impl TraversalOutcome {
    pub fn exit_code(&self) -> i32 {
        if self.diagnostics.is_empty() { 0 } else { 1 }
    }
}

/// One pass over `root`: validates (collecting diagnostics, writing nothing)
/// when `validate` is true, or emits lowered source (assuming validation
/// already passed) when false. Fresh registry and scope state every call,
/// matching the per-traversal lifecycle in the data model.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn traverse<'ast>(root: &'ast [Node<'ast>], validate: bool) -> TraversalOutcome {
    let mut ctx = Ctx::new();
    process_list(&mut ctx, root, validate, true);
    TraversalOutcome {
        source: if validate { None } else { Some(ctx.emitter.into_source()) },
        diagnostics: ctx.diagnostics,
    }
}

pub struct CompileResult {
    pub diagnostics: Diagnostics,
    pub source: Option<String>,
}

impl CompileResult {
    pub fn exit_code(&self) -> i32 {
        if self.diagnostics.is_empty() { 0 } else { 1 }
    }
}

/// Runs the validation pass, and the emission pass only if it recorded no
/// diagnostics. Mirrors the driver-side "no lowered code is written on
/// failure" rule without requiring callers to sequence the two passes.
pub fn compile<'ast>(root: &'ast [Node<'ast>]) -> CompileResult {
    let validation = traverse(root, true);
    if validation.diagnostics.has_errors() {
        return CompileResult {
            diagnostics: validation.diagnostics,
            source: None,
        };
    }
    let emission = traverse(root, false);
    CompileResult {
        diagnostics: emission.diagnostics,
        source: emission.source,
    }
}

// ---------------------------------------------------------------------
// get_type: pure assignment of a type to any expression node
// ---------------------------------------------------------------------

pub fn get_type<'ast>(ctx: &Ctx<'ast>, node: &'ast Node<'ast>) -> Type {
    match node {
        Node::Literal { type_name, .. } => Type::basic(type_name.clone()),
        Node::Identifier { name, .. } => ctx
            .scopes
            .get_scoped_var(name)
            .map(|b| b.ty.clone())
            .or_else(|| ctx.registry.function_exists(name).map(|f| f.function_signature()))
            .unwrap_or_else(Type::error),
        Node::Field { base, name, .. } => match get_type(ctx, base) {
            Type::Basic(base_name) => lookup_member_type(ctx, &base_name, name),
            _ => Type::error(),
        },
        Node::Sub { base, .. } => match get_type(ctx, base) {
            Type::Basic(name) if ctx.registry.resolve_alias(&name) == "table" => Type::Any,
            _ => Type::error(),
        },
        Node::Call { callee, .. } => match get_type(ctx, callee) {
            Type::Func(ret, _) => *ret,
            _ => Type::error(),
        },
        Node::Unary { op, operand, .. } => unary_result_type(op, &get_type(ctx, operand)),
        Node::Binary { op, lhs, rhs, .. } => {
            binary_result_type(op, &get_type(ctx, lhs), &get_type(ctx, rhs))
        }
        Node::Tuple { exprs, .. } => Type::tuple(exprs.iter().map(|e| get_type(ctx, e)).collect()),
        Node::Paren { inner, .. } => get_type(ctx, inner),
        Node::Function { .. } => node.function_signature(),
        Node::Table { .. } => Type::basic("table"),
        _ => Type::Any,
    }
}

fn lookup_member_type<'ast>(ctx: &Ctx<'ast>, base_type_name: &str, member_name: &str) -> Type {
    let canonical = ctx.registry.resolve_alias(base_type_name).to_string();
    if let Some(Node::Class { members, parent, .. }) = ctx.registry.class_exists(&canonical) {
        for m in members.iter() {
            match m {
                Node::Function { name: Some(n), .. } if n == member_name => {
                    return m.function_signature();
                }
                Node::Define { name, ty, .. } if name == member_name => return ty.clone(),
                _ => {}
            }
        }
        if let Some(p) = parent {
            return lookup_member_type(ctx, p, member_name);
        }
        return Type::error();
    }
    if let Some(Node::Interface { methods, parent, .. }) = ctx.registry.interface_exists(&canonical) {
        for m in methods.iter() {
            if let Node::Function { name: Some(n), .. } = m {
                if n == member_name {
                    return m.function_signature();
                }
            }
        }
        if let Some(p) = parent {
            return lookup_member_type(ctx, p, member_name);
        }
    }
    Type::error()
}

fn is_numeric(t: &Type) -> bool {
    matches!(t, Type::Basic(n) if n == "int" || n == "num")
}

fn is_stringy(t: &Type) -> bool {
    matches!(t, Type::Basic(n) if n == "string")
}

/// Host-language operator rules: arithmetic promotes `int,int -> int`, else
/// `num`; `..` concatenates numbers and strings into a string; `==`/`~=` are
/// well-typed for any operands; ordering needs matching numeric or string
/// operands; `and`/`or` return whichever operand truthiness picked, so their
/// static type is `Any`.
fn binary_result_type(op: &str, lhs: &Type, rhs: &Type) -> Type {
    match op {
        "+" | "-" | "*" | "/" | "%" | "^" => {
            if !is_numeric(lhs) || !is_numeric(rhs) {
                Type::error()
            } else if lhs == &Type::basic("int") && rhs == &Type::basic("int") {
                Type::basic("int")
            } else {
                Type::basic("num")
            }
        }
        ".." => {
            if (is_numeric(lhs) || is_stringy(lhs)) && (is_numeric(rhs) || is_stringy(rhs)) {
                Type::basic("string")
            } else {
                Type::error()
            }
        }
        "==" | "~=" => Type::basic("bool"),
        "<" | "<=" | ">" | ">=" => {
            if (is_numeric(lhs) && is_numeric(rhs)) || (is_stringy(lhs) && is_stringy(rhs)) {
                Type::basic("bool")
            } else {
                Type::error()
            }
        }
        "and" | "or" => Type::Any,
        _ => Type::error(),
    }
}

fn unary_result_type(op: &str, operand: &Type) -> Type {
    match op {
        "-" if is_numeric(operand) => operand.clone(),
        "not" => Type::basic("bool"),
        "#" => Type::basic("int"),
        _ => Type::error(),
    }
}

// ---------------------------------------------------------------------
// emission of expression text (unary/binary always parenthesised)
// ---------------------------------------------------------------------

fn emit_expr<'ast>(ctx: &mut Ctx<'ast>, node: &'ast Node<'ast>) {
    match node {
        Node::Literal { text, .. } => ctx.emitter.write(text),
        Node::Identifier { name, .. } => ctx.emitter.write(name),
        Node::LeftTupleExpr { tuple, .. } => emit_left_tuple(ctx, tuple),
        Node::Tuple { exprs, .. } => {
            for (i, e) in exprs.iter().enumerate() {
                if i > 0 {
                    ctx.emitter.write(",");
                }
                emit_expr(ctx, e);
            }
        }
        Node::Field { base, name, .. } => {
            emit_expr(ctx, base);
            ctx.emitter.write(".");
            ctx.emitter.write(name);
        }
        Node::Sub { base, index, .. } => {
            emit_expr(ctx, base);
            ctx.emitter.write("[");
            emit_expr(ctx, index);
            ctx.emitter.write("]");
        }
        Node::Paren { inner, .. } => {
            ctx.emitter.write("(");
            emit_expr(ctx, inner);
            ctx.emitter.write(")");
        }
        Node::Unary { op, operand, .. } => {
            ctx.emitter.write("(");
            ctx.emitter.write(op);
            ctx.emitter.write(" ");
            emit_expr(ctx, operand);
            ctx.emitter.write(")");
        }
        Node::Binary { op, lhs, rhs, .. } => {
            ctx.emitter.write("(");
            emit_expr(ctx, lhs);
            ctx.emitter.write(" ");
            ctx.emitter.write(op);
            ctx.emitter.write(" ");
            emit_expr(ctx, rhs);
            ctx.emitter.write(")");
        }
        Node::Table { keys, values, .. } => {
            ctx.emitter.write("{");
            for (i, (k, v)) in keys.iter().zip(values.iter()).enumerate() {
                if i > 0 {
                    ctx.emitter.write(",");
                }
                ctx.emitter.write(k);
                ctx.emitter.write("=");
                emit_expr(ctx, v);
            }
            ctx.emitter.write("}");
        }
        Node::Call { callee, args, .. } => emit_call_text(ctx, callee, *args),
        other => panic!("emit_expr called on a non-expression node: {other:?}"),
    }
}

fn emit_left_tuple(ctx: &mut Ctx, tuple: &LeftTuple) {
    for (i, n) in tuple.names.iter().enumerate() {
        if i > 0 {
            ctx.emitter.write(",");
        }
        ctx.emitter.write(n);
    }
}

fn emit_call_text<'ast>(ctx: &mut Ctx<'ast>, callee: &'ast Node<'ast>, args: Option<&'ast Node<'ast>>) {
    emit_expr(ctx, callee);
    ctx.emitter.write("(");
    match args {
        Some(Node::Tuple { exprs, .. }) => {
            for (i, e) in exprs.iter().enumerate() {
                if i > 0 {
                    ctx.emitter.write(",");
                }
                emit_expr(ctx, e);
            }
        }
        Some(other) => emit_expr(ctx, other),
        None => {}
    }
    ctx.emitter.write(")");
}

// ---------------------------------------------------------------------
// statement dispatch
// ---------------------------------------------------------------------

fn process_list<'ast>(ctx: &mut Ctx<'ast>, nodes: &'ast [Node<'ast>], validate: bool, top_level: bool) {
    for node in nodes {
        process_node(ctx, node, validate, top_level);
    }
}

fn process_node<'ast>(ctx: &mut Ctx<'ast>, node: &'ast Node<'ast>, validate: bool, top_level: bool) {
    match node {
        Node::Literal { .. }
        | Node::Identifier { .. }
        | Node::LeftTupleExpr { .. }
        | Node::Tuple { .. }
        | Node::Field { .. }
        | Node::Sub { .. }
        | Node::Paren { .. }
        | Node::Unary { .. }
        | Node::Binary { .. }
        | Node::Table { .. } => {
            if !validate {
                emit_expr(ctx, node);
                ctx.emitter.newline();
            }
        }
        Node::Label { name, .. } => {
            if !validate {
                emit!(ctx.emitter, "::{}::", name);
                ctx.emitter.newline();
            }
        }
        Node::Goto { name, .. } => {
            if !validate {
                emit!(ctx.emitter, "goto {}", name);
                ctx.emitter.newline();
            }
        }
        Node::Break { .. } => {
            if !validate {
                ctx.emitter.write("break");
                ctx.emitter.newline();
            }
        }
        Node::StatementList { stmts, .. } => process_list(ctx, stmts, validate, top_level),
        Node::DoBlock { stmts, .. } => {
            if !validate {
                ctx.emitter.write("do\n");
            }
            ctx.scopes.push_scope();
            process_list(ctx, stmts, validate, false);
            ctx.scopes.pop_scope();
            if !validate {
                ctx.emitter.write("end\n");
            }
        }
        Node::Repeat { span, cond, body } => process_repeat(ctx, *span, cond, body, validate),
        Node::While { span, cond, body } => process_while(ctx, *span, cond, body, validate),
        Node::If { span, cond, body } => process_if(ctx, *span, cond, body, validate),
        Node::ForNumeric {
            span,
            var,
            start,
            limit,
            step,
            body,
        } => process_for_numeric(ctx, *span, var, start, limit, *step, body, validate),
        Node::ForIn { span, vars, source, body } => {
            process_for_in(ctx, *span, vars, source, body, validate)
        }
        Node::Function { .. } => process_function(ctx, node, validate, None, top_level),
        Node::Interface { .. } => process_interface(ctx, node, validate),
        Node::Class { .. } => process_class(ctx, node, validate),
        Node::Typedef { span, alias, target } => process_typedef(ctx, *span, alias, target, validate),
        Node::Define { span, ty, name, init } => process_define(ctx, *span, ty, name, *init, validate),
        Node::Local { span, name, init } => process_local(ctx, *span, name, *init, validate),
        Node::Set { span, target, value } => process_set(ctx, *span, target, value, validate),
        Node::Call { span, callee, args } => process_call_stmt(ctx, *span, callee, *args, validate),
        Node::Return { span, value } => process_return(ctx, *span, *value, validate),
    }
}

fn process_define<'ast>(
    ctx: &mut Ctx<'ast>,
    span: Span,
    ty: &Type,
    name: &str,
    init: Option<&'ast Node<'ast>>,
    validate: bool,
) {
    if validate {
        if !ctx.registry.compound_type_exists(ty) {
            ctx.diagnostics.push(CompilationError::UnknownType {
                name: ctx.registry.stringify_type(ty),
                span,
            });
        }
        if let Some(init_expr) = init {
            let actual = get_type(ctx, init_expr);
            if !ctx.registry.typed_match(ty, &actual) {
                ctx.diagnostics.push(CompilationError::TypeMismatch {
                    expected: ctx.registry.stringify_type(ty),
                    actual: ctx.registry.stringify_type(&actual),
                    site: "variable initializer".to_string(),
                    span,
                });
            }
        }
    }
    let inserted = ctx.scopes.add_scoped_var(name, Binding::new(ty.clone(), span));
    if !inserted && validate {
        ctx.diagnostics.push(CompilationError::ShadowedDeclaration {
            name: name.to_string(),
            span,
        });
    }
    if !validate {
        emit!(ctx.emitter, "local {}=", name);
        match init {
            Some(e) => emit_expr(ctx, e),
            None => ctx.emitter.write("nil"),
        }
        ctx.emitter.newline();
    }
}

/// Unlike `Define`, an uninitialised `Local` has no `= nil` appended: the
/// reference implementation's `process_local` only writes `=value` when an
/// initialiser is actually present.
fn process_local<'ast>(
    ctx: &mut Ctx<'ast>,
    span: Span,
    name: &str,
    init: Option<&'ast Node<'ast>>,
    validate: bool,
) {
    let inserted = ctx.scopes.add_scoped_var(name, Binding::new(Type::Any, span));
    if !inserted && validate {
        ctx.diagnostics.push(CompilationError::ShadowedDeclaration {
            name: name.to_string(),
            span,
        });
    }
    if !validate {
        ctx.emitter.write("local ");
        ctx.emitter.write(name);
        if let Some(e) = init {
            ctx.emitter.write("=");
            emit_expr(ctx, e);
        }
        ctx.emitter.newline();
    }
}

fn process_set<'ast>(
    ctx: &mut Ctx<'ast>,
    span: Span,
    target: &'ast Node<'ast>,
    value: &'ast Node<'ast>,
    validate: bool,
) {
    if validate {
        let lhs = get_type(ctx, target);
        let mut rhs = get_type(ctx, value);
        if let Type::Tuple(ts) = &rhs {
            if ts.len() == 1 {
                rhs = ts[0].clone();
            }
        }
        if !ctx.registry.typed_match(&lhs, &rhs) {
            ctx.diagnostics.push(CompilationError::TypeMismatch {
                expected: ctx.registry.stringify_type(&lhs),
                actual: ctx.registry.stringify_type(&rhs),
                site: "assignment".to_string(),
                span,
            });
        }
    }
    if !validate {
        emit_expr(ctx, target);
        ctx.emitter.write("=");
        emit_expr(ctx, value);
        ctx.emitter.newline();
    }
}

/// A typedef target may name a type that does not exist yet (another alias
/// declared later in the same file, for instance): the only thing actually
/// enforced is that the alias name itself is fresh and that the resulting
/// alias graph stays acyclic. This mirrors the reference implementation's
/// `process_typedef`, which emits unconditionally and defers entirely to
/// `add_type_equivalence`'s own cycle check. Requiring `compound_type_exists`
/// up front would reject forward references a cycle check alone correctly
/// allows.
fn process_typedef<'ast>(ctx: &mut Ctx<'ast>, span: Span, alias: &str, target: &Type, validate: bool) {
    let already = ctx.registry.type_exists(alias);
    if already {
        if validate {
            ctx.diagnostics.push(CompilationError::DuplicateType {
                name: alias.to_string(),
                span,
            });
        }
    } else if !ctx.registry.add_type_equivalence(alias, target.clone()) {
        if validate {
            ctx.diagnostics.push(CompilationError::TypeCycle {
                name: alias.to_string(),
                span,
            });
        }
    } else {
        let _ = ctx.registry.register_type(alias);
    }
    if !validate {
        emit!(ctx.emitter, "-- typedef {} -> {}", alias, ctx.registry.stringify_type(target));
        ctx.emitter.newline();
    }
}

fn process_interface<'ast>(ctx: &mut Ctx<'ast>, node: &'ast Node<'ast>, validate: bool) {
    let Node::Interface { span, name, parent, .. } = node else {
        return;
    };
    let is_new = !ctx.registry.type_exists(name);
    if !is_new && validate {
        ctx.diagnostics.push(CompilationError::DuplicateType {
            name: name.clone(),
            span: *span,
        });
    }
    if let Some(parent_name) = parent {
        if ctx.registry.interface_exists(parent_name).is_none() {
            if validate {
                ctx.diagnostics.push(CompilationError::UnknownParent {
                    kind: "interface".to_string(),
                    name: parent_name.clone(),
                    span: *span,
                });
            }
        } else if !ctx.registry.add_child_type(name, parent_name) && validate {
            ctx.diagnostics.push(CompilationError::TypeCycle {
                name: name.clone(),
                span: *span,
            });
        }
    }
    if is_new {
        let _ = ctx.registry.register_interface(name, node);
    }
}

fn process_class<'ast>(ctx: &mut Ctx<'ast>, node: &'ast Node<'ast>, validate: bool) {
    let Node::Class {
        span,
        name,
        parent,
        interfaces,
        members,
    } = node
    else {
        return;
    };
    let is_new = !ctx.registry.type_exists(name);
    if !is_new && validate {
        ctx.diagnostics.push(CompilationError::DuplicateType {
            name: name.clone(),
            span: *span,
        });
    }
    if let Some(parent_name) = parent {
        if ctx.registry.class_exists(parent_name).is_none() {
            if validate {
                ctx.diagnostics.push(CompilationError::UnknownParent {
                    kind: "class".to_string(),
                    name: parent_name.clone(),
                    span: *span,
                });
            }
        } else if !ctx.registry.add_child_type(name, parent_name) && validate {
            ctx.diagnostics.push(CompilationError::TypeCycle {
                name: name.clone(),
                span: *span,
            });
        }
    }
    for iface_name in interfaces {
        if ctx.registry.interface_exists(iface_name).is_none() {
            if validate {
                ctx.diagnostics.push(CompilationError::UnknownParent {
                    kind: "interface".to_string(),
                    name: iface_name.clone(),
                    span: *span,
                });
            }
        } else if !ctx.registry.add_child_type(name, iface_name) && validate {
            ctx.diagnostics.push(CompilationError::TypeCycle {
                name: name.clone(),
                span: *span,
            });
        }
    }
    if is_new {
        let _ = ctx.registry.register_class(name, node);
    }

    // During validation the members are walked generically to type-check each
    // method body. During emission `emit_class` below walks them itself so it
    // can attach the class's own method-dispatch convention; walking them
    // twice here would emit every method body twice.
    if validate {
        ctx.scopes.push_scope();
        process_list(ctx, members, validate, false);
        ctx.scopes.pop_scope();
    }

    if validate && is_new {
        for method in missing_methods(&ctx.registry, node) {
            ctx.diagnostics.push(CompilationError::MissingInterfaceMethod {
                class: name.clone(),
                method,
                span: *span,
            });
        }
    }

    if !validate {
        emit_class(ctx, name, parent.as_deref(), members, validate);
    }
}

/// Lowers a class to a plain table with a prototype chain: a shared method
/// table, `ClassName.new(...)` as the constructor, and each method attached
/// with `:`-call (`self`) convention. This is the one concrete scheme chosen
/// among the open-ended lowering options; it needs no runtime support beyond
/// `setmetatable`, which every host implementation provides.
fn emit_class<'ast>(
    ctx: &mut Ctx<'ast>,
    name: &str,
    parent: Option<&str>,
    members: &'ast [Node<'ast>],
    validate: bool,
) {
    emit!(ctx.emitter, "local {} = {{}}\n", name);
    emit!(ctx.emitter, "{}.__index = {}\n", name, name);
    if let Some(parent_name) = parent {
        emit!(
            ctx.emitter,
            "setmetatable({}, {{__index = {}}})\n",
            name,
            parent_name
        );
    }
    emit!(ctx.emitter, "function {}.new(...)\n", name);
    emit!(ctx.emitter, "local self = setmetatable({{}}, {})\n", name);
    ctx.emitter.write("return self\n");
    ctx.emitter.write("end\n");
    for member in members {
        if matches!(member, Node::Function { .. }) {
            process_function(ctx, member, validate, Some(name), false);
        }
    }
}

fn process_function<'ast>(
    ctx: &mut Ctx<'ast>,
    node: &'ast Node<'ast>,
    validate: bool,
    owner: Option<&str>,
    top_level: bool,
) {
    let Node::Function {
        span,
        name,
        return_type,
        params,
        body,
    } = node
    else {
        return;
    };

    ctx.scopes.push_scope();
    for p in params {
        ctx.scopes.add_scoped_var(&p.name, Binding::new(p.ty.clone(), *span));
    }
    ctx.return_type_stack.push(return_type.clone());

    if !validate {
        match (owner, name) {
            (Some(class), Some(n)) => emit!(ctx.emitter, "function {}:{}(", class, n),
            (Some(class), None) => emit!(ctx.emitter, "function {}:__anon(", class),
            (None, Some(n)) => emit!(ctx.emitter, "function {}(", n),
            (None, None) => ctx.emitter.write("function("),
        }
        for (i, p) in params.iter().enumerate() {
            if i > 0 {
                ctx.emitter.write(",");
            }
            ctx.emitter.write(&p.name);
        }
        ctx.emitter.write(")\n");
    }

    if let Some(stmts) = body {
        process_list(ctx, stmts, validate, false);
    }

    ctx.return_type_stack.pop();
    ctx.scopes.pop_scope();

    if !validate {
        ctx.emitter.write("end\n");
    }

    if owner.is_none() && top_level {
        if let Some(n) = name {
            if validate && ctx.registry.function_exists(n).is_some() {
                ctx.diagnostics.push(CompilationError::DuplicateType {
                    name: n.clone(),
                    span: *span,
                });
            }
            let _ = ctx.registry.register_function(n, node);
        }
    }
}

fn process_repeat<'ast>(
    ctx: &mut Ctx<'ast>,
    _span: Span,
    cond: &'ast Node<'ast>,
    body: &'ast [Node<'ast>],
    validate: bool,
) {
    if !validate {
        ctx.emitter.write("repeat\n");
    }
    ctx.scopes.push_scope();
    process_list(ctx, body, validate, false);
    if !validate {
        ctx.emitter.write("until ");
        emit_expr(ctx, cond);
        ctx.emitter.newline();
    }
    ctx.scopes.pop_scope();
}

fn process_while<'ast>(
    ctx: &mut Ctx<'ast>,
    _span: Span,
    cond: &'ast Node<'ast>,
    body: &'ast [Node<'ast>],
    validate: bool,
) {
    if !validate {
        ctx.emitter.write("while ");
        emit_expr(ctx, cond);
        ctx.emitter.write(" do\n");
    }
    ctx.scopes.push_scope();
    process_list(ctx, body, validate, false);
    ctx.scopes.pop_scope();
    if !validate {
        ctx.emitter.write("end\n");
    }
}

fn process_if<'ast>(
    ctx: &mut Ctx<'ast>,
    _span: Span,
    cond: &'ast Node<'ast>,
    body: &'ast [Node<'ast>],
    validate: bool,
) {
    if !validate {
        ctx.emitter.write("if ");
        emit_expr(ctx, cond);
        ctx.emitter.write(" then\n");
    }
    ctx.scopes.push_scope();
    process_list(ctx, body, validate, false);
    ctx.scopes.pop_scope();
    if !validate {
        ctx.emitter.write("end\n");
    }
}

#[allow(clippy::too_many_arguments)]
fn process_for_numeric<'ast>(
    ctx: &mut Ctx<'ast>,
    span: Span,
    var: &str,
    start: &'ast Node<'ast>,
    limit: &'ast Node<'ast>,
    step: Option<&'ast Node<'ast>>,
    body: &'ast [Node<'ast>],
    validate: bool,
) {
    ctx.scopes.push_scope();
    ctx.scopes.add_scoped_var(var, Binding::new(Type::basic("num"), span));
    if !validate {
        emit!(ctx.emitter, "for {}=", var);
        emit_expr(ctx, start);
        ctx.emitter.write(",");
        emit_expr(ctx, limit);
        if let Some(s) = step {
            ctx.emitter.write(",");
            emit_expr(ctx, s);
        }
        ctx.emitter.write(" do\n");
    }
    process_list(ctx, body, validate, false);
    ctx.scopes.pop_scope();
    if !validate {
        ctx.emitter.write("end\n");
    }
}

fn process_for_in<'ast>(
    ctx: &mut Ctx<'ast>,
    _span: Span,
    vars: &LeftTuple,
    source: &'ast Node<'ast>,
    body: &'ast [Node<'ast>],
    validate: bool,
) {
    ctx.scopes.push_scope();
    for n in &vars.names {
        ctx.scopes.add_scoped_var(n, Binding::new(Type::Any, vars.span));
    }
    if !validate {
        ctx.emitter.write("for ");
        emit_left_tuple(ctx, vars);
        ctx.emitter.write(" in ");
        emit_expr(ctx, source);
        ctx.emitter.write(" do\n");
    }
    process_list(ctx, body, validate, false);
    ctx.scopes.pop_scope();
    if !validate {
        ctx.emitter.write("end\n");
    }
}

fn process_return<'ast>(ctx: &mut Ctx<'ast>, span: Span, value: Option<&'ast Node<'ast>>, validate: bool) {
    if validate {
        let expected = ctx.return_type_stack.last().cloned().unwrap_or(Type::Any);
        let actual = match value {
            Some(e) => get_type(ctx, e),
            None => Type::basic("nil"),
        };
        if !ctx.registry.typed_match(&expected, &actual) {
            ctx.diagnostics.push(CompilationError::TypeMismatch {
                expected: ctx.registry.stringify_type(&expected),
                actual: ctx.registry.stringify_type(&actual),
                site: "return".to_string(),
                span,
            });
        }
    }
    if !validate {
        ctx.emitter.write("return");
        if let Some(e) = value {
            ctx.emitter.write(" ");
            emit_expr(ctx, e);
        }
        ctx.emitter.newline();
    }
}

fn process_call_stmt<'ast>(
    ctx: &mut Ctx<'ast>,
    span: Span,
    callee: &'ast Node<'ast>,
    args: Option<&'ast Node<'ast>>,
    validate: bool,
) {
    if validate {
        check_call(ctx, span, callee, args);
    }
    if !validate {
        emit_call_text(ctx, callee, args);
        ctx.emitter.newline();
    }
}

fn check_call<'ast>(ctx: &mut Ctx<'ast>, span: Span, callee: &'ast Node<'ast>, args: Option<&'ast Node<'ast>>) {
    let callee_ty = get_type(ctx, callee);
    let Type::Func(_, arg_types) = callee_ty else {
        return;
    };
    let actual_args: Vec<&'ast Node<'ast>> = match args {
        Some(Node::Tuple { exprs, .. }) => exprs.iter().collect(),
        Some(other) => vec![other],
        None => Vec::new(),
    };
    if arg_types.len() != actual_args.len() {
        ctx.diagnostics.push(CompilationError::ArityMismatch {
            name: callee_name(callee),
            expected: arg_types.len(),
            actual: actual_args.len(),
            span,
        });
        return;
    }
    for (expected, actual_node) in arg_types.iter().zip(actual_args) {
        let actual_ty = get_type(ctx, actual_node);
        if !ctx.registry.typed_match(expected, &actual_ty) {
            ctx.diagnostics.push(CompilationError::TypeMismatch {
                expected: ctx.registry.stringify_type(expected),
                actual: ctx.registry.stringify_type(&actual_ty),
                site: "call argument".to_string(),
                span,
            });
        }
    }
}

fn callee_name(callee: &Node) -> String {
    match callee {
        Node::Identifier { name, .. } => name.clone(),
        _ => "<expr>".to_string(),
    }
}
