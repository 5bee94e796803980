//! Lexical scope tracking for translation accessor bindings.
//!
//! Tracks bindings such as `const t = useExtracted("ui")` so that later calls
//! to `t(...)` can be recognized. Functions, blocks, loops and `catch`
//! clauses open scopes; any declaration of the same name inside them hides
//! the accessor.

use std::collections::HashMap;

use swc_ecma_ast::{Decl, Pat, Stmt, VarDeclarator};

use super::accessor::{AccessorBinding, AccessorImports, binding_names};

/// A stack of binding scopes (innermost last).
///
/// # Example
/// ```ignore
/// const t = useExtracted("ui");   // scope 0: t -> Accessor("ui")
/// function inner(t) {             // push scope 1: t -> Shadowed
///     t("Hello!");                // not a message site
/// }                               // pop scope 1
/// t("Hello!");                    // message site in namespace "ui"
/// ```
pub struct BindingContext {
    bindings_stack: Vec<HashMap<String, AccessorBinding>>,
}

impl Default for BindingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingContext {
    /// Create a context holding only the module scope.
    pub fn new() -> Self {
        Self {
            bindings_stack: vec![HashMap::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.bindings_stack.push(HashMap::new());
    }

    /// Enter a block scope.
    ///
    /// Names declared anywhere among the block's statements are visible from
    /// its start (functions are hoisted, `let`/`const`/`class` cover the whole
    /// block), so they are shadowed before the statements are visited.
    pub fn enter_block(&mut self, stmts: &[Stmt], imports: &AccessorImports) {
        self.enter_scope();
        for stmt in stmts {
            let Stmt::Decl(decl) = stmt else {
                continue;
            };
            match decl {
                Decl::Fn(function) => self.shadow(function.ident.sym.to_string()),
                Decl::Class(class) => self.shadow(class.ident.sym.to_string()),
                Decl::Var(var) => {
                    for declarator in &var.decls {
                        if imports.binding_for(declarator).is_none() {
                            self.declare_pattern(&declarator.name);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Pop the innermost scope. The module scope is never popped.
    pub fn exit_scope(&mut self) {
        if self.bindings_stack.len() > 1 {
            self.bindings_stack.pop();
        }
    }

    pub fn insert_binding(&mut self, name: String, binding: AccessorBinding) {
        if let Some(scope) = self.bindings_stack.last_mut() {
            scope.insert(name, binding);
        }
    }

    /// Record a variable declarator: accessor factories bind, anything else shadows.
    pub fn declare_var(&mut self, decl: &VarDeclarator, imports: &AccessorImports) {
        match imports.binding_for(decl) {
            Some((name, binding)) => self.insert_binding(name, binding),
            None => self.declare_pattern(&decl.name),
        }
    }

    /// Shadow every name bound by a parameter or declaration pattern.
    pub fn declare_pattern(&mut self, pat: &Pat) {
        for name in binding_names(pat) {
            self.shadow(name);
        }
    }

    /// Look up a binding, innermost scope first.
    pub fn get_binding(&self, name: &str) -> Option<&AccessorBinding> {
        self.bindings_stack
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }

    /// Look up a binding that has not been shadowed.
    pub fn get_accessor(&self, name: &str) -> Option<&AccessorBinding> {
        self.get_binding(name).filter(|b| !b.is_shadowed())
    }

    pub fn is_in_current_scope(&self, name: &str) -> bool {
        self.bindings_stack
            .last()
            .is_some_and(|scope| scope.contains_key(name))
    }

    /// Record that `name` is re-declared in the current scope, hiding any
    /// accessor of the same name from outer scopes.
    pub fn shadow(&mut self, name: String) {
        if !self.is_in_current_scope(&name) && self.get_binding(&name).is_some() {
            self.insert_binding(name, AccessorBinding::Shadowed);
        }
    }
}
