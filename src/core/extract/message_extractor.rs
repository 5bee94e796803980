//! Extraction of message literals from one source file.
//!
//! Recognizes accessor factories imported from the configured modules,
//! tracks the local bindings they initialize, and treats calls through those
//! bindings as message sites:
//!
//! ```ignore
//! import {useExtracted} from 'next-intl';
//!
//! function Greeting() {
//!     const t = useExtracted('ui');
//!     return <p>{t('Hello!')}</p>;   // -> t("OpKKos"), id "ui.OpKKos"
//! }
//! ```
//!
//! Every site is rewritten in place to reference the generated id; the rest of
//! the file is left byte-identical.

use std::{collections::HashMap, ops::Range, sync::Mutex};

use anyhow::{Context, Result, anyhow};
use indexmap::IndexMap;
use log::{debug, trace};
use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    ArrowExpr, BlockStmt, CallExpr, CatchClause, ClassDecl, Expr, ExprOrSpread, FnDecl, FnExpr,
    ForInStmt, ForOfStmt, ForStmt, Function, Module, ObjectLit, VarDecl,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::rewrite::{Edit, Piece, apply_edits};
use crate::config::{AccessorConfig, AccessorKind};
use crate::core::accessor::{
    AccessorBinding, AccessorImports, CallShape, NamespaceArg, accessor_call, object_has_spread,
    object_mentions, object_property, object_property_span, static_string,
};
use crate::core::{
    BindingContext, ExtractedMessage, MessageReference, ParsedSource, generate_key, parse_jsx_source, qualify_id,
};

/// Positional arguments before the development fallback: message, values, formats.
const FALLBACK_POSITION: usize = 3;

/// Messages found in one file plus the rewritten file content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionResult {
    pub messages: Vec<ExtractedMessage>,
    pub source: String,
}

/// Extracts messages and rewrites call sites.
///
/// Results are cached per file path and reused while the file content is
/// byte-identical.
pub struct MessageExtractor {
    accessors: Vec<AccessorConfig>,
    development: bool,
    cache: Mutex<HashMap<String, (String, ExtractionResult)>>,
}

impl MessageExtractor {
    /// Only accessors of kind [`AccessorKind::Extracted`] are considered.
    pub fn new(accessors: &[AccessorConfig], development: bool) -> Self {
        Self {
            accessors: accessors
                .iter()
                .filter(|a| a.kind == AccessorKind::Extracted)
                .cloned()
                .collect(),
            development,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Cheap text check before parsing: the file must mention an accessor name.
    fn may_contain_messages(&self, source: &str) -> bool {
        self.accessors.iter().any(|a| source.contains(&a.name))
    }

    /// Extract the messages of `source`. `file_path` is used for references
    /// and diagnostics.
    pub fn extract(&self, file_path: &str, source: &str) -> Result<ExtractionResult> {
        if let Ok(cache) = self.cache.lock()
            && let Some((cached_source, result)) = cache.get(file_path)
            && cached_source == source
        {
            trace!("Extraction cache hit: {}", file_path);
            return Ok(result.clone());
        }

        let result = self.extract_uncached(file_path, source)?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(file_path.to_string(), (source.to_string(), result.clone()));
        }
        Ok(result)
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    fn extract_uncached(&self, file_path: &str, source: &str) -> Result<ExtractionResult> {
        if !self.may_contain_messages(source) {
            return Ok(ExtractionResult {
                messages: Vec::new(),
                source: source.to_string(),
            });
        }

        let parsed = parse_jsx_source(source.to_string(), file_path)?;
        let imports = AccessorImports::collect(&parsed.module, &self.accessors);
        if imports.is_empty() {
            return Ok(ExtractionResult {
                messages: Vec::new(),
                source: source.to_string(),
            });
        }

        let visitor = ExtractionVisitor::new(file_path, &parsed, &imports, self.development);
        let (messages, edits) = visitor.run(&parsed.module)?;

        debug!("Extracted {} message(s) from {}", messages.len(), file_path);
        Ok(ExtractionResult {
            messages,
            source: apply_edits(source, edits)
                .with_context(|| format!("Failed to rewrite {}", file_path))?,
        })
    }
}

/// A statically analyzed message argument.
struct MessageDescriptor {
    id: Option<String>,
    message: String,
    description: Option<String>,
    values: Option<Range<usize>>,
    formats: Option<Range<usize>>,
}

struct ExtractionVisitor<'a> {
    file_path: &'a str,
    parsed: &'a ParsedSource,
    imports: &'a AccessorImports,
    development: bool,
    bindings: BindingContext,
    messages: IndexMap<String, ExtractedMessage>,
    edits: Vec<Edit>,
    error: Option<anyhow::Error>,
}

impl<'a> ExtractionVisitor<'a> {
    fn new(
        file_path: &'a str,
        parsed: &'a ParsedSource,
        imports: &'a AccessorImports,
        development: bool,
    ) -> Self {
        Self {
            file_path,
            parsed,
            imports,
            development,
            bindings: BindingContext::new(),
            messages: IndexMap::new(),
            edits: Vec::new(),
            error: None,
        }
    }

    fn run(mut self, module: &Module) -> Result<(Vec<ExtractedMessage>, Vec<Edit>)> {
        self.visit_module(module);
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok((self.messages.into_values().collect(), self.edits))
    }

    fn unextractable(&self, span: Span) -> anyhow::Error {
        anyhow!(
            "Cannot extract message from {}:{}: the message must be statically analyzable. \
             Pass dynamic values as arguments instead, e.g. t('Hello {{name}}!', {{name}})",
            self.file_path,
            self.parsed.line(span)
        )
    }

    fn fail(&mut self, error: anyhow::Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn describe_object(&self, object: &ObjectLit) -> Result<MessageDescriptor> {
        if object_has_spread(object) {
            return Err(self.unextractable(object.span));
        }

        let message = object_property(object, "message")
            .and_then(static_string)
            .ok_or_else(|| self.unextractable(object.span))?;

        let static_field = |key: &str| -> Result<Option<String>> {
            match object_property(object, key) {
                Some(value) => static_string(value)
                    .map(Some)
                    .ok_or_else(|| self.unextractable(value.span())),
                None if object_mentions(object, key) => Err(self.unextractable(object.span)),
                None => Ok(None),
            }
        };
        let id = static_field("id")?;
        let description = static_field("description")?;

        let runtime_field = |key: &str| -> Option<Range<usize>> {
            object_property_span(object, key).map(|span| self.parsed.byte_range(span))
        };

        Ok(MessageDescriptor {
            id,
            message,
            description,
            values: runtime_field("values"),
            formats: runtime_field("formats"),
        })
    }

    fn describe_argument(&self, arg: &ExprOrSpread) -> Result<MessageDescriptor> {
        if arg.spread.is_some() {
            return Err(self.unextractable(arg.span()));
        }
        match &*arg.expr {
            Expr::Object(object) => self.describe_object(object),
            expr => {
                let message = static_string(expr).ok_or_else(|| self.unextractable(expr.span()))?;
                Ok(MessageDescriptor {
                    id: None,
                    message,
                    description: None,
                    values: None,
                    formats: None,
                })
            }
        }
    }

    fn record_message(
        &mut self,
        namespace: Option<&str>,
        descriptor: &MessageDescriptor,
        span: Span,
    ) -> String {
        let local_id = descriptor
            .id
            .clone()
            .unwrap_or_else(|| generate_key(&descriptor.message));
        let id = qualify_id(namespace, &local_id);

        let extracted = ExtractedMessage::new(id.clone(), descriptor.message.clone())
            .with_description(descriptor.description.clone())
            .with_reference(MessageReference::new(
                self.file_path,
                Some(self.parsed.line(span)),
            ));

        match self.messages.get_mut(&id) {
            Some(existing) => {
                if existing.message != extracted.message {
                    debug!(
                        "Id collision for \"{}\" in {}: keeping {:?}, ignoring {:?}",
                        id, self.file_path, existing.message, extracted.message
                    );
                }
                existing.merge(&extracted);
            }
            None => {
                self.messages.insert(id.clone(), extracted);
            }
        }
        local_id
    }

    /// Rewrite the argument list of a message site.
    ///
    /// `t({message, values, formats})` becomes `t("<id>", values, formats)`;
    /// in development mode the list is padded to three arguments and the
    /// message appended as a fallback.
    fn rewrite_call(
        &mut self,
        call: &CallExpr,
        shape: CallShape,
        local_id: &str,
        descriptor: &MessageDescriptor,
    ) {
        let (Some(first), Some(last)) = (call.args.first(), call.args.last()) else {
            return;
        };
        let range =
            self.parsed.byte_range(first.span()).start..self.parsed.byte_range(last.span()).end;

        let positional =
            |index: usize| call.args.get(index).map(|a| self.parsed.byte_range(a.span()));
        let mut slots: Vec<Option<Range<usize>>> = vec![
            descriptor.values.clone().or_else(|| positional(1)),
            descriptor.formats.clone().or_else(|| positional(2)),
        ];
        let rest: Vec<Range<usize>> = (3..call.args.len()).filter_map(positional).collect();
        while rest.is_empty() && slots.last().is_some_and(Option::is_none) {
            slots.pop();
        }

        let argument_count = 1 + slots.len() + rest.len();
        let mut pieces = vec![Piece::Literal(json_string(local_id))];
        for slot in slots {
            pieces.push(Piece::Literal(", ".to_string()));
            match slot {
                Some(range) => pieces.push(Piece::Original(range)),
                None => pieces.push(Piece::Literal("undefined".to_string())),
            }
        }
        for range in rest.iter().cloned() {
            pieces.push(Piece::Literal(", ".to_string()));
            pieces.push(Piece::Original(range));
        }

        if self.development && shape != CallShape::Has && rest.is_empty() {
            for _ in argument_count..FALLBACK_POSITION {
                pieces.push(Piece::Literal(", undefined".to_string()));
            }
            pieces.push(Piece::Literal(format!(
                ", {}",
                json_string(&descriptor.message)
            )));
        }

        self.edits.push(Edit { range, pieces });
    }

    fn visit_message_site(&mut self, call: &CallExpr, shape: CallShape, namespace: &NamespaceArg) {
        let Some(first) = call.args.first() else {
            self.fail(self.unextractable(call.span));
            return;
        };

        let namespace = match namespace {
            NamespaceArg::Absent => None,
            NamespaceArg::Static(ns) => Some(ns.as_str()),
            NamespaceArg::Dynamic => {
                self.fail(self.unextractable(call.span));
                return;
            }
        };

        match self.describe_argument(first) {
            Ok(descriptor) => {
                let local_id = self.record_message(namespace, &descriptor, call.span);
                self.rewrite_call(call, shape, &local_id, &descriptor);
            }
            Err(error) => self.fail(error),
        }
    }
}

fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

impl<'a> Visit for ExtractionVisitor<'a> {
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
        if let Some((name, shape)) = accessor_call(node)
            && let Some(AccessorBinding::Accessor { kind, namespace }) =
                self.bindings.get_accessor(name).cloned()
            && kind == AccessorKind::Extracted
        {
            self.visit_message_site(node, shape, &namespace);
        }

        node.visit_children_with(self);
    }
}
