//! Recognition of translation accessors shared by the extractor and the
//! tree-shaking analyzer.

use std::collections::HashMap;

use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    CallExpr, Callee, Expr, ImportSpecifier, Lit, MemberProp, Module, ModuleDecl, ModuleExportName,
    ModuleItem, ObjectLit, ObjectPatProp, Pat, Prop, PropName, PropOrSpread, VarDeclarator,
};

use crate::config::{AccessorConfig, AccessorKind};

/// The namespace argument passed to an accessor factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceArg {
    /// No namespace: `useExtracted()` or `getExtracted({locale})`.
    Absent,
    Static(String),
    /// Known to be present but not statically analyzable.
    Dynamic,
}

impl NamespaceArg {
    pub fn as_static(&self) -> Option<&str> {
        match self {
            NamespaceArg::Static(ns) => Some(ns),
            _ => None,
        }
    }
}

/// What a local name is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessorBinding {
    Accessor {
        kind: AccessorKind,
        namespace: NamespaceArg,
    },
    /// Re-declared in an inner scope; calls through it are ignored.
    Shadowed,
}

impl AccessorBinding {
    pub fn is_shadowed(&self) -> bool {
        matches!(self, AccessorBinding::Shadowed)
    }
}

/// Local names under which accessor factories are imported in one module.
#[derive(Debug, Default)]
pub struct AccessorImports {
    factories: HashMap<String, AccessorKind>,
}

impl AccessorImports {
    /// Collect value imports of configured accessors.
    ///
    /// Renamed imports (`import {useExtracted as useT}`) register the local name.
    pub fn collect(module: &Module, accessors: &[AccessorConfig]) -> Self {
        let mut factories = HashMap::new();

        for item in &module.body {
            let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
                continue;
            };
            if import.type_only {
                continue;
            }
            let Some(source) = import.src.value.as_str() else {
                continue;
            };

            for specifier in &import.specifiers {
                let ImportSpecifier::Named(named) = specifier else {
                    continue;
                };
                if named.is_type_only {
                    continue;
                }
                let local_name = named.local.sym.as_str();
                let imported_name = match &named.imported {
                    Some(ModuleExportName::Ident(ident)) => ident.sym.to_string(),
                    Some(ModuleExportName::Str(s)) => s.value.to_string_lossy().to_string(),
                    None => local_name.to_string(),
                };

                if let Some(accessor) = accessors
                    .iter()
                    .find(|a| a.module == source && a.name == imported_name)
                {
                    factories.insert(local_name.to_string(), accessor.kind);
                }
            }
        }

        Self { factories }
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn kind_of(&self, local_name: &str) -> Option<AccessorKind> {
        self.factories.get(local_name).copied()
    }

    /// If `decl` is `const t = factory(...)` (optionally awaited), return the
    /// bound name and binding.
    pub fn binding_for(&self, decl: &VarDeclarator) -> Option<(String, AccessorBinding)> {
        let Pat::Ident(binding_ident) = &decl.name else {
            return None;
        };
        let call = factory_call(decl.init.as_deref()?)?;
        let Callee::Expr(callee) = &call.callee else {
            return None;
        };
        let Expr::Ident(ident) = unwrap_parens(callee) else {
            return None;
        };
        let kind = self.kind_of(ident.sym.as_str())?;

        Some((
            binding_ident.id.sym.to_string(),
            AccessorBinding::Accessor {
                kind,
                namespace: namespace_argument(call),
            },
        ))
    }
}

fn unwrap_parens(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_parens(&paren.expr),
        other => other,
    }
}

/// The call expression of an initializer, looking through `await` and parentheses.
fn factory_call(init: &Expr) -> Option<&CallExpr> {
    match unwrap_parens(init) {
        Expr::Call(call) => Some(call),
        Expr::Await(await_expr) => match unwrap_parens(&await_expr.arg) {
            Expr::Call(call) => Some(call),
            _ => None,
        },
        _ => None,
    }
}

/// Interpret the first argument of a factory call as a namespace.
///
/// Accepts a string literal, or an object literal whose `namespace` property
/// is a string literal (`getExtracted({locale, namespace: 'ui'})`).
pub fn namespace_argument(call: &CallExpr) -> NamespaceArg {
    let Some(arg) = call.args.first() else {
        return NamespaceArg::Absent;
    };
    if arg.spread.is_some() {
        return NamespaceArg::Dynamic;
    }

    match unwrap_parens(&arg.expr) {
        Expr::Object(object) => {
            if object_has_spread(object) {
                return NamespaceArg::Dynamic;
            }
            match object_property(object, "namespace") {
                None => NamespaceArg::Absent,
                Some(value) => static_string(value)
                    .map(NamespaceArg::Static)
                    .unwrap_or(NamespaceArg::Dynamic),
            }
        }
        Expr::Ident(ident) if ident.sym == "undefined" => NamespaceArg::Absent,
        expr => static_string(expr)
            .map(NamespaceArg::Static)
            .unwrap_or(NamespaceArg::Dynamic),
    }
}

/// A string literal, or a template literal without interpolations.
pub fn static_string(expr: &Expr) -> Option<String> {
    match unwrap_parens(expr) {
        Expr::Lit(Lit::Str(s)) => Some(s.value.to_string_lossy().to_string()),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
            let mut value = String::new();
            for quasi in &tpl.quasis {
                value.push_str(quasi.cooked.as_ref()?.as_str()?);
            }
            Some(value)
        }
        _ => None,
    }
}

pub fn object_has_spread(object: &ObjectLit) -> bool {
    object
        .props
        .iter()
        .any(|p| matches!(p, PropOrSpread::Spread(_)))
}

fn prop_name(name: &PropName) -> Option<String> {
    match name {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string_lossy().to_string()),
        _ => None,
    }
}

/// The value of a `key: value` property. Shorthand properties are not returned.
pub fn object_property<'o>(object: &'o ObjectLit, key: &str) -> Option<&'o Expr> {
    object.props.iter().find_map(|prop| {
        let PropOrSpread::Prop(prop) = prop else {
            return None;
        };
        match &**prop {
            Prop::KeyValue(kv) if prop_name(&kv.key).as_deref() == Some(key) => Some(&*kv.value),
            _ => None,
        }
    })
}

/// Span of a property value, including `{key}` shorthands.
pub fn object_property_span(object: &ObjectLit, key: &str) -> Option<Span> {
    object.props.iter().find_map(|prop| {
        let PropOrSpread::Prop(prop) = prop else {
            return None;
        };
        match &**prop {
            Prop::KeyValue(kv) if prop_name(&kv.key).as_deref() == Some(key) => {
                Some(kv.value.span())
            }
            Prop::Shorthand(ident) if ident.sym == key => Some(ident.span),
            _ => None,
        }
    })
}

/// True if the object mentions `key` in any form (including shorthand).
pub fn object_mentions(object: &ObjectLit, key: &str) -> bool {
    object.props.iter().any(|prop| match prop {
        PropOrSpread::Prop(prop) => match &**prop {
            Prop::KeyValue(kv) => prop_name(&kv.key).as_deref() == Some(key),
            Prop::Shorthand(ident) => ident.sym == key,
            _ => false,
        },
        PropOrSpread::Spread(_) => false,
    })
}

/// The call shapes through which an accessor is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    /// `t(...)`
    Direct,
    /// `t.rich(...)`, `t.markup(...)`, `t.raw(...)`
    Method,
    /// `t.has(...)`
    Has,
}

/// Split a call into the accessor local name and call shape, e.g. `t.rich(...)`
/// yields `("t", Method)`.
pub fn accessor_call(call: &CallExpr) -> Option<(&str, CallShape)> {
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    match unwrap_parens(callee) {
        Expr::Ident(ident) => Some((ident.sym.as_str(), CallShape::Direct)),
        Expr::Member(member) => {
            let Expr::Ident(obj) = &*member.obj else {
                return None;
            };
            let MemberProp::Ident(method) = &member.prop else {
                return None;
            };
            let shape = match method.sym.as_str() {
                "rich" | "markup" | "raw" => CallShape::Method,
                "has" => CallShape::Has,
                _ => return None,
            };
            Some((obj.sym.as_str(), shape))
        }
        _ => None,
    }
}

/// All identifiers bound by a pattern.
pub fn binding_names(pat: &Pat) -> Vec<String> {
    match pat {
        Pat::Ident(ident) => vec![ident.id.sym.to_string()],
        Pat::Object(obj) => obj
            .props
            .iter()
            .flat_map(|prop| match prop {
                ObjectPatProp::KeyValue(kv) => binding_names(&kv.value),
                ObjectPatProp::Assign(assign) => vec![assign.key.sym.to_string()],
                ObjectPatProp::Rest(rest) => binding_names(&rest.arg),
            })
            .collect(),
        Pat::Array(arr) => arr.elems.iter().flatten().flat_map(binding_names).collect(),
        Pat::Assign(assign) => binding_names(&assign.left),
        Pat::Rest(rest) => binding_names(&rest.arg),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::parse_jsx_source;
    use pretty_assertions::assert_eq;
    use swc_ecma_ast::{Decl, Stmt};

    fn first_declarator(code: &str) -> (AccessorImports, VarDeclarator) {
        let parsed = parse_jsx_source(code.to_string(), "test.tsx").unwrap();
        let imports = AccessorImports::collect(&parsed.module, &Config::default().accessors);
        let declarator = parsed
            .module
            .body
            .iter()
            .find_map(|item| match item {
                ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => Some(var.decls[0].clone()),
                _ => None,
            })
            .unwrap();
        (imports, declarator)
    }

    #[test]
    fn test_collect_renamed_import() {
        let (imports, decl) = first_declarator(
            "import {useExtracted as useT} from 'next-intl';\nconst t = useT('ui');",
        );
        assert_eq!(imports.kind_of("useT"), Some(AccessorKind::Extracted));
        assert_eq!(imports.kind_of("useExtracted"), None);
        assert_eq!(
            imports.binding_for(&decl),
            Some((
                "t".to_string(),
                AccessorBinding::Accessor {
                    kind: AccessorKind::Extracted,
                    namespace: NamespaceArg::Static("ui".to_string()),
                }
            ))
        );
    }

    #[test]
    fn test_import_from_other_module_is_ignored() {
        let (imports, decl) =
            first_declarator("import {useExtracted} from './local';\nconst t = useExtracted();");
        assert!(imports.is_empty());
        assert_eq!(imports.binding_for(&decl), None);
    }

    #[test]
    fn test_type_only_import_is_ignored() {
        let (imports, _) = first_declarator(
            "import type {useTranslations} from 'next-intl';\nconst x = 1;",
        );
        assert!(imports.is_empty());
    }

    #[test]
    fn test_awaited_factory_with_object_namespace() {
        let (imports, decl) = first_declarator(
            "import {getExtracted} from 'next-intl/server';\nconst t = await getExtracted({locale, namespace: 'ui'});",
        );
        let (_, binding) = imports.binding_for(&decl).unwrap();
        assert_eq!(
            binding,
            AccessorBinding::Accessor {
                kind: AccessorKind::Extracted,
                namespace: NamespaceArg::Static("ui".to_string()),
            }
        );
    }

    #[test]
    fn test_namespace_argument_variants() {
        let cases = [
            ("f()", NamespaceArg::Absent),
            ("f('ui.button')", NamespaceArg::Static("ui.button".to_string())),
            ("f(`ui`)", NamespaceArg::Static("ui".to_string())),
            ("f({locale})", NamespaceArg::Absent),
            ("f(ns)", NamespaceArg::Dynamic),
            ("f(`ui.${x}`)", NamespaceArg::Dynamic),
            ("f({namespace: ns})", NamespaceArg::Dynamic),
        ];
        for (code, expected) in cases {
            let parsed = parse_jsx_source(code.to_string(), "test.ts").unwrap();
            let ModuleItem::Stmt(Stmt::Expr(stmt)) = &parsed.module.body[0] else {
                panic!("expected an expression statement");
            };
            let Expr::Call(call) = &*stmt.expr else {
                panic!("expected a call");
            };
            assert_eq!(namespace_argument(call), expected, "{}", code);
        }
    }

    #[test]
    fn test_binding_names_from_patterns() {
        let parsed =
            parse_jsx_source("const {a, b: [c, ...d], ...e} = x;".to_string(), "test.ts").unwrap();
        let ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) = &parsed.module.body[0] else {
            panic!("expected a declaration");
        };
        assert_eq!(binding_names(&var.decls[0].name), vec!["a", "c", "d", "e"]);
    }
}
