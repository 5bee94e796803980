//! Per-file facts for tree-shaking.
//!
//! A lighter pass than extraction: nothing is rewritten. For each file it
//! records the client/server directives, the import specifiers, whether the
//! translation provider is rendered, and every accessor usage with the id or
//! namespace it needs.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use log::{debug, warn};
use rayon::prelude::*;
use swc_ecma_ast::{
    ArrowExpr, BlockStmt, CallExpr, Callee, CatchClause, ClassDecl, Expr, ExportAll, ExprStmt,
    FnDecl, FnExpr, ForInStmt, ForOfStmt, ForStmt, Function, ImportDecl, JSXElementName,
    JSXOpeningElement, Lit, Module, ModuleItem, NamedExport, Stmt, VarDecl,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::config::{AccessorConfig, AccessorKind};
use crate::core::accessor::{
    AccessorBinding, AccessorImports, NamespaceArg, accessor_call, object_has_spread,
    object_property, static_string,
};
use crate::core::{BindingContext, generate_key, parse_jsx_source, qualify_id};

const USE_CLIENT: &str = "use client";
const USE_SERVER: &str = "use server";

/// What a single accessor call needs from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageKey {
    /// A statically known id, relative to the usage namespace.
    Key(String),
    /// The key is dynamic but the namespace is known: the whole namespace is needed.
    FullNamespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorUsage {
    pub namespace: NamespaceArg,
    pub key: UsageKey,
}

impl AccessorUsage {
    /// Dotted path to mark in the namespace trie.
    pub fn required_path(&self) -> Option<String> {
        match (&self.namespace, &self.key) {
            (NamespaceArg::Dynamic, _) => None,
            (NamespaceArg::Static(ns), UsageKey::FullNamespace) => Some(ns.clone()),
            (NamespaceArg::Absent, UsageKey::FullNamespace) => None,
            (namespace, UsageKey::Key(key)) => Some(qualify_id(namespace.as_static(), key)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFacts {
    /// `"use client"` in the top-level directive prologue.
    pub has_use_client: bool,
    /// `"use server"` anywhere in the file (module or function level).
    pub has_use_server: bool,
    /// Raw specifiers of static imports, re-exports and `import('...')` calls.
    pub imports: Vec<String>,
    pub usages: Vec<AccessorUsage>,
    /// Some usage could be resolved neither to a key nor to a namespace.
    pub requires_all_messages: bool,
    /// The file renders the translation provider component.
    pub renders_provider: bool,
}

/// Analyze one file's content.
pub fn analyze_source(
    file_path: &str,
    source: String,
    accessors: &[AccessorConfig],
    provider: &str,
) -> Result<SourceFacts> {
    let parsed = parse_jsx_source(source, file_path)?;
    let imports = AccessorImports::collect(&parsed.module, accessors);

    let mut visitor = FactsVisitor {
        imports: &imports,
        provider,
        bindings: BindingContext::new(),
        facts: SourceFacts {
            has_use_client: has_top_level_directive(&parsed.module, USE_CLIENT),
            ..Default::default()
        },
    };
    visitor.visit_module(&parsed.module);
    Ok(visitor.facts)
}

fn has_top_level_directive(module: &Module, directive: &str) -> bool {
    module
        .body
        .iter()
        .map_while(|item| match item {
            ModuleItem::Stmt(Stmt::Expr(stmt)) => match &*stmt.expr {
                Expr::Lit(Lit::Str(s)) => Some(s.value.as_str() == Some(directive)),
                _ => None,
            },
            _ => None,
        })
        .any(|is_directive| is_directive)
}

/// The id an argument refers to, if statically known.
fn usage_key(kind: AccessorKind, call: &CallExpr) -> Option<String> {
    let arg = call.args.first()?;
    if arg.spread.is_some() {
        return None;
    }
    match (kind, &*arg.expr) {
        (AccessorKind::Keyed, expr) => static_string(expr),
        (AccessorKind::Extracted, Expr::Object(object)) => {
            if object_has_spread(object) {
                return None;
            }
            match object_property(object, "id") {
                Some(id) => static_string(id),
                None => object_property(object, "message")
                    .and_then(static_string)
                    .map(|message| generate_key(&message)),
            }
        }
        (AccessorKind::Extracted, expr) => static_string(expr).map(|m| generate_key(&m)),
    }
}

struct FactsVisitor<'a> {
    imports: &'a AccessorImports,
    provider: &'a str,
    bindings: BindingContext,
    facts: SourceFacts,
}

impl FactsVisitor<'_> {
    fn record_usage(&mut self, kind: AccessorKind, namespace: NamespaceArg, call: &CallExpr) {
        let key = match (usage_key(kind, call), &namespace) {
            (_, NamespaceArg::Dynamic) => None,
            (Some(key), _) => Some(UsageKey::Key(key)),
            (None, NamespaceArg::Static(_)) => Some(UsageKey::FullNamespace),
            (None, NamespaceArg::Absent) => None,
        };

        match key {
            Some(key) => self.facts.usages.push(AccessorUsage { namespace, key }),
            None => self.facts.requires_all_messages = true,
        }
    }

    fn push_import(&mut self, specifier: Option<&str>) {
        if let Some(specifier) = specifier {
            self.facts.imports.push(specifier.to_string());
        }
    }
}

impl Visit for FactsVisitor<'_> {
    fn visit_import_decl(&mut self, node: &ImportDecl) {
        if !node.type_only {
            self.push_import(node.src.value.as_str());
        }
    }

    fn visit_export_all(&mut self, node: &ExportAll) {
        if !node.type_only {
            self.push_import(node.src.value.as_str());
        }
    }

    fn visit_named_export(&mut self, node: &NamedExport) {
        if !node.type_only
            && let Some(src) = &node.src
        {
            self.push_import(src.value.as_str());
        }
    }

    fn visit_expr_stmt(&mut self, node: &ExprStmt) {
        if let Expr::Lit(Lit::Str(s)) = &*node.expr
            && s.value.as_str() == Some(USE_SERVER)
        {
            self.facts.has_use_server = true;
        }
        node.visit_children_with(self);
    }

    fn visit_jsx_opening_element(&mut self, node: &JSXOpeningElement) {
        if let JSXElementName::Ident(ident) = &node.name
            && ident.sym == self.provider
        {
            self.facts.renders_provider = true;
        }
        node.visit_children_with(self);
    }

    fn visit_function(&mut self, node: &Function) {
        self.bindings.enter_scope();
        for param in &node.params {
            self.bindings.declare_pattern(&param.pat);
        }
        node.visit_children_with(self);
        self.bindings.exit_scope();
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        self.bindings.enter_scope();
        for param in &node.params {
            self.bindings.declare_pattern(param);
        }
        node.visit_children_with(self);
        self.bindings.exit_scope();
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.bindings.shadow(node.ident.sym.to_string());
        node.visit_children_with(self);
    }

    fn visit_fn_expr(&mut self, node: &FnExpr) {
        self.bindings.enter_scope();
        if let Some(ident) = &node.ident {
            self.bindings.shadow(ident.sym.to_string());
        }
        node.visit_children_with(self);
        self.bindings.exit_scope();
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.bindings.shadow(node.ident.sym.to_string());
        node.visit_children_with(self);
    }

    fn visit_block_stmt(&mut self, node: &BlockStmt) {
        self.bindings.enter_block(&node.stmts, self.imports);
        node.visit_children_with(self);
        self.bindings.exit_scope();
    }

    fn visit_catch_clause(&mut self, node: &CatchClause) {
        self.bindings.enter_scope();
        if let Some(param) = &node.param {
            self.bindings.declare_pattern(param);
        }
        node.visit_children_with(self);
        self.bindings.exit_scope();
    }

    fn visit_for_stmt(&mut self, node: &ForStmt) {
        self.bindings.enter_scope();
        node.visit_children_with(self);
        self.bindings.exit_scope();
    }

    fn visit_for_in_stmt(&mut self, node: &ForInStmt) {
        self.bindings.enter_scope();
        node.visit_children_with(self);
        self.bindings.exit_scope();
    }

    fn visit_for_of_stmt(&mut self, node: &ForOfStmt) {
        self.bindings.enter_scope();
        node.visit_children_with(self);
        self.bindings.exit_scope();
    }

    fn visit_var_decl(&mut self, node: &VarDecl) {
        for decl in &node.decls {
            self.bindings.declare_var(decl, self.imports);
            decl.visit_children_with(self);
        }
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Callee::Import(_) = node.callee {
            if let Some(arg) = node.args.first()
                && let Some(specifier) = static_string(&arg.expr)
            {
                self.facts.imports.push(specifier);
            }
        } else if let Some((name, _)) = accessor_call(node)
            && let Some(AccessorBinding::Accessor { kind, namespace }) =
                self.bindings.get_accessor(name).cloned()
        {
            self.record_usage(kind, namespace, node);
        }

        node.visit_children_with(self);
    }
}

/// Per-file facts cache, keyed by absolute path.
///
/// Entries stay valid until [`SourceAnalyzer::invalidate`] is called for the
/// file. Unreadable or unparsable files are cached as empty facts.
pub struct SourceAnalyzer {
    accessors: Vec<AccessorConfig>,
    provider: String,
    cache: HashMap<PathBuf, Arc<SourceFacts>>,
}

impl SourceAnalyzer {
    pub fn new(accessors: &[AccessorConfig], provider: &str) -> Self {
        Self {
            accessors: accessors.to_vec(),
            provider: provider.to_string(),
            cache: HashMap::new(),
        }
    }

    fn analyze_file(&self, path: &Path) -> Arc<SourceFacts> {
        let result = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|source| {
                analyze_source(
                    &path.to_string_lossy(),
                    source,
                    &self.accessors,
                    &self.provider,
                )
            });

        match result {
            Ok(facts) => Arc::new(facts),
            Err(e) => {
                warn!("Skipping {} in tree-shaking analysis: {:#}", path.display(), e);
                Arc::new(SourceFacts::default())
            }
        }
    }

    /// Facts of a file, analyzing it on first access.
    pub fn facts(&mut self, path: &Path) -> Arc<SourceFacts> {
        if let Some(facts) = self.cache.get(path) {
            return facts.clone();
        }
        let facts = self.analyze_file(path);
        self.cache.insert(path.to_path_buf(), facts.clone());
        facts
    }

    /// Analyze all uncached files among `paths` in parallel.
    pub fn prefetch(&mut self, paths: &[PathBuf]) {
        let missing: Vec<&PathBuf> = paths
            .iter()
            .filter(|p| !self.cache.contains_key(*p))
            .collect();
        if missing.is_empty() {
            return;
        }
        debug!("Analyzing {} file(s)", missing.len());

        let analyzed: Vec<(PathBuf, Arc<SourceFacts>)> = missing
            .par_iter()
            .map(|path| ((*path).clone(), self.analyze_file(path)))
            .collect();
        self.cache.extend(analyzed);
    }

    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.cache.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
