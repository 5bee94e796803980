//! Tests for the tree-shaking manifest.

use std::{fs, path::PathBuf};

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::{TempDir, tempdir};

use super::*;
use crate::config::Config;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: tempdir().unwrap(),
        }
    }

    fn write(&self, file: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn app_dirs(&self) -> Vec<PathBuf> {
        vec![self.dir.path().join("src/app")]
    }

    fn analyzer(&self) -> TreeShakingAnalyzer {
        TreeShakingAnalyzer::from_config(self.dir.path(), &Config::default())
    }
}

const PROVIDER_LAYOUT: &str = "import {NextIntlClientProvider} from 'next-intl';\n\
    export default function Layout({children, modal}) {\n\
      return <NextIntlClientProvider>{children}{modal}</NextIntlClientProvider>;\n\
    }";

fn client_component(message: &str) -> String {
    format!(
        "'use client';\nimport {{useExtracted}} from 'next-intl';\n\
         export default function C() {{ const t = useExtracted(); return <p>{{t('{}')}}</p>; }}",
        message
    )
}

fn to_json(manifest: &crate::core::Manifest) -> serde_json::Value {
    serde_json::to_value(manifest).unwrap()
}

#[test]
fn test_provider_layout_with_slot_and_intercepted_route() {
    let project = Project::new();
    project.write("src/app/layout.tsx", PROVIDER_LAYOUT);
    project.write(
        "src/app/page.tsx",
        "import Greeting from '../components/Greeting';\n\
         export default function Page() { return <Greeting/>; }",
    );
    project.write("src/components/Greeting.tsx", &client_component("Hey!"));
    project.write("src/app/@modal/default.tsx", &client_component("Hello!"));
    project.write("src/app/@modal/(.)photo/layout.tsx", PROVIDER_LAYOUT);
    project.write("src/app/@modal/(.)photo/page.tsx", &client_component("Photo"));

    let manifest = project.analyzer().analyze(&project.app_dirs(), None);

    assert_eq!(
        to_json(&manifest),
        json!({
            "/": {
                "hasLayoutProvider": true,
                "namespaces": {"+YJVTi": true, "OpKKos": true}
            },
            "/(.)photo": {
                "hasLayoutProvider": true,
                "namespaces": {"/b3UL8": true}
            }
        })
    );
}

#[test]
fn test_descendants_merge_into_provider_owner() {
    let project = Project::new();
    project.write("src/app/layout.tsx", PROVIDER_LAYOUT);
    project.write("src/app/page.tsx", &client_component("Hey!"));
    project.write("src/app/settings/page.tsx", &client_component("Save"));
    project.write("src/app/settings/profile/page.tsx", &client_component("Cancel"));

    let manifest = project.analyzer().analyze(&project.app_dirs(), None);

    let ids: Vec<&String> = manifest.keys().collect();
    assert_eq!(ids, vec!["/"]);
    assert_eq!(
        to_json(&manifest)["/"]["namespaces"],
        json!({"+YJVTi": true, "jvo0vs": true, "47FYwb": true})
    );
}

#[test]
fn test_segments_without_provider_get_own_entries() {
    let project = Project::new();
    project.write(
        "src/app/layout.tsx",
        "export default function Layout({children}) { return children; }",
    );
    project.write("src/app/page.tsx", &client_component("Hey!"));
    project.write("src/app/about/page.tsx", &client_component("Bye"));

    let manifest = project.analyzer().analyze(&project.app_dirs(), None);

    assert_eq!(
        to_json(&manifest),
        json!({
            "/": {"hasLayoutProvider": false, "namespaces": {"+YJVTi": true}},
            "/about": {"hasLayoutProvider": false, "namespaces": {"wNBUiv": true}}
        })
    );
}

#[test]
fn test_server_components_do_not_contribute() {
    let project = Project::new();
    project.write("src/app/layout.tsx", PROVIDER_LAYOUT);
    project.write(
        "src/app/page.tsx",
        "import {getExtracted} from 'next-intl/server';\n\
         import Client from './Client';\n\
         export default async function Page() { const t = await getExtracted(); return <h1>{t('Hey!')}<Client/></h1>; }",
    );
    project.write(
        "src/app/Client.tsx",
        "'use client';\nimport {useExtracted} from 'next-intl';\nimport Shared from './Shared';\n\
         export default function Client() { const t = useExtracted('ui'); return <Shared label={t('Hello!')}/>; }",
    );
    project.write(
        "src/app/Shared.tsx",
        "import {useExtracted} from 'next-intl';\n\
         export default function Shared() { const t = useExtracted(); return t('Bye'); }",
    );

    let manifest = project.analyzer().analyze(&project.app_dirs(), None);

    assert_eq!(
        to_json(&manifest)["/"]["namespaces"],
        json!({"ui": {"OpKKos": true}, "wNBUiv": true})
    );
}

#[test]
fn test_use_server_file_leaves_client_boundary() {
    let project = Project::new();
    project.write("src/app/layout.tsx", PROVIDER_LAYOUT);
    project.write(
        "src/app/page.tsx",
        "'use client';\nimport {save} from './actions';\nexport default function P() { return null; }",
    );
    project.write(
        "src/app/actions.ts",
        "import {getTranslations} from 'next-intl/server';\n\
         export async function save() { 'use server'; const t = await getTranslations('Errors'); return t('failed'); }",
    );

    let manifest = project.analyzer().analyze(&project.app_dirs(), None);
    assert_eq!(to_json(&manifest)["/"]["namespaces"], json!({}));
}

#[test]
fn test_dynamic_key_requires_whole_namespace() {
    let project = Project::new();
    project.write("src/app/layout.tsx", PROVIDER_LAYOUT);
    project.write(
        "src/app/page.tsx",
        "'use client';\nimport {useTranslations} from 'next-intl';\n\
         export default function P({k}) { const t = useTranslations('Home'); return t(k); }",
    );

    let manifest = project.analyzer().analyze(&project.app_dirs(), None);
    assert_eq!(to_json(&manifest)["/"]["namespaces"], json!({"Home": true}));
}

#[test]
fn test_dynamic_namespace_requires_all_messages() {
    let project = Project::new();
    project.write("src/app/layout.tsx", PROVIDER_LAYOUT);
    project.write("src/app/page.tsx", &client_component("Hey!"));
    project.write(
        "src/app/other/page.tsx",
        "'use client';\nimport {useTranslations} from 'next-intl';\n\
         export default function P({ns}) { const t = useTranslations(ns); return t('title'); }",
    );

    let manifest = project.analyzer().analyze(&project.app_dirs(), None);
    assert_eq!(to_json(&manifest)["/"]["namespaces"], json!(true));
}

#[test]
fn test_import_cycle_terminates() {
    let project = Project::new();
    project.write("src/app/layout.tsx", PROVIDER_LAYOUT);
    project.write(
        "src/app/page.tsx",
        "'use client';\nimport './a';\nexport default function P() { return null; }",
    );
    project.write("src/app/a.ts", "import './b';");
    project.write(
        "src/app/b.ts",
        "import './a';\nimport {useExtracted} from 'next-intl';\nexport function f() { const t = useExtracted(); return t('Hey!'); }",
    );

    let manifest = project.analyzer().analyze(&project.app_dirs(), None);
    assert_eq!(to_json(&manifest)["/"]["namespaces"], json!({"+YJVTi": true}));
}

#[test]
fn test_incremental_recomputes_affected_segments() {
    let project = Project::new();
    project.write("src/app/layout.tsx", PROVIDER_LAYOUT);
    project.write("src/app/page.tsx", &client_component("Hey!"));
    let about = project.write("src/app/about/layout.tsx", PROVIDER_LAYOUT);
    let about_page = project.write("src/app/about/page.tsx", &client_component("Bye"));

    let mut analyzer = project.analyzer();
    let first = analyzer.analyze(&project.app_dirs(), None);
    assert_eq!(to_json(&first)["/about"]["namespaces"], json!({"wNBUiv": true}));
    assert!(analyzer.segment_files("/about").unwrap().contains(&about));

    fs::write(&about_page, client_component("Save")).unwrap();
    let second = analyzer.analyze(&project.app_dirs(), Some(std::slice::from_ref(&about_page)));

    assert_eq!(
        to_json(&second),
        json!({
            "/": {"hasLayoutProvider": true, "namespaces": {"+YJVTi": true}},
            "/about": {"hasLayoutProvider": true, "namespaces": {"jvo0vs": true}}
        })
    );
}

#[test]
fn test_incremental_follows_new_imports() {
    let project = Project::new();
    project.write("src/app/layout.tsx", PROVIDER_LAYOUT);
    let page = project.write(
        "src/app/page.tsx",
        "'use client';\nexport default function P() { return null; }",
    );
    project.write("src/lib/messages.tsx", &client_component("Hello!"));

    let mut analyzer = project.analyzer();
    let first = analyzer.analyze(&project.app_dirs(), None);
    assert_eq!(to_json(&first)["/"]["namespaces"], json!({}));

    fs::write(
        &page,
        "'use client';\nimport '../lib/messages';\nexport default function P() { return null; }",
    )
    .unwrap();
    let second = analyzer.analyze(&project.app_dirs(), Some(std::slice::from_ref(&page)));
    assert_eq!(to_json(&second)["/"]["namespaces"], json!({"OpKKos": true}));
}

#[test]
fn test_incremental_resolves_newly_created_import_target() {
    let project = Project::new();
    project.write("src/app/layout.tsx", PROVIDER_LAYOUT);
    project.write(
        "src/app/page.tsx",
        "'use client';\nimport '../lib/messages';\nexport default function P() { return null; }",
    );

    let mut analyzer = project.analyzer();
    let first = analyzer.analyze(&project.app_dirs(), None);
    assert_eq!(to_json(&first)["/"]["namespaces"], json!({}));

    let created = project.write("src/lib/messages.tsx", &client_component("Hello!"));
    let second = analyzer.analyze(&project.app_dirs(), Some(std::slice::from_ref(&created)));
    assert_eq!(
        to_json(&second),
        json!({"/": {"hasLayoutProvider": true, "namespaces": {"OpKKos": true}}})
    );
}

#[test]
fn test_incremental_drops_deleted_import_target() {
    let project = Project::new();
    project.write("src/app/layout.tsx", PROVIDER_LAYOUT);
    project.write(
        "src/app/page.tsx",
        "'use client';\nimport '../lib/messages';\nexport default function P() { return null; }",
    );
    let messages = project.write("src/lib/messages.tsx", &client_component("Hello!"));
    project.write("src/lib/messages/index.tsx", &client_component("Bye"));

    let mut analyzer = project.analyzer();
    let first = analyzer.analyze(&project.app_dirs(), None);
    assert_eq!(to_json(&first)["/"]["namespaces"], json!({"OpKKos": true}));

    fs::remove_file(&messages).unwrap();
    let second = analyzer.analyze(&project.app_dirs(), Some(std::slice::from_ref(&messages)));
    assert_eq!(to_json(&second)["/"]["namespaces"], json!({"wNBUiv": true}));
}

#[test]
fn test_unchanged_segments_are_reused() {
    let project = Project::new();
    project.write("src/app/layout.tsx", PROVIDER_LAYOUT);
    project.write("src/app/page.tsx", &client_component("Hey!"));
    let about_page = project.write("src/app/about/page.tsx", &client_component("Bye"));

    let mut analyzer = project.analyzer();
    analyzer.analyze(&project.app_dirs(), None);

    // Edit a file without telling the analyzer: cached results stay in place.
    fs::write(&about_page, client_component("Save")).unwrap();
    let nothing: Vec<PathBuf> = Vec::new();
    let manifest = analyzer.analyze(&project.app_dirs(), Some(nothing.as_slice()));
    assert_eq!(
        to_json(&manifest)["/"]["namespaces"],
        json!({"+YJVTi": true, "wNBUiv": true})
    );
}
