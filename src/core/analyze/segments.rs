//! Route segment discovery.
//!
//! Entry files are `layout`, `template`, `page` and `default` files below an
//! app directory. A segment id is the `/`-joined directory path relative to
//! the app directory, with parallel-route slots (`@modal`) removed; route
//! groups (`(auth)`) and interception markers (`(.)photo`) are kept. Files
//! directly inside a slot therefore share the segment of the layout that
//! renders the slot.

use std::{
    cmp::Ordering,
    collections::BTreeMap,
    path::{Component, Path, PathBuf},
};

use walkdir::WalkDir;

use crate::core::is_source_file;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    Layout,
    Template,
    Page,
    Default,
}

impl EntryKind {
    fn from_stem(stem: &str) -> Option<Self> {
        match stem {
            "layout" => Some(EntryKind::Layout),
            "template" => Some(EntryKind::Template),
            "page" => Some(EntryKind::Page),
            "default" => Some(EntryKind::Default),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub file: PathBuf,
    pub kind: EntryKind,
    /// Name of the slot directory the file sits in directly, without `@`.
    pub slot: Option<String>,
}

/// One routed segment and the entry files rendered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub id: String,
    pub entries: Vec<RouteEntry>,
}

impl Segment {
    /// The segment's own layout (not a slot's).
    pub fn layout(&self) -> Option<&Path> {
        self.entries
            .iter()
            .find(|e| e.kind == EntryKind::Layout && e.slot.is_none())
            .map(|e| e.file.as_path())
    }

    /// Files the segment's graph is rooted at: its entries plus slot siblings.
    pub fn roots(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.file.clone()).collect()
    }
}

fn is_slot(name: &str) -> bool {
    name.starts_with('@')
}

/// Segment id of a directory relative to the app directory.
pub fn segment_id(relative_dir: &Path) -> String {
    let parts: Vec<String> = relative_dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().to_string()),
            _ => None,
        })
        .filter(|name| !is_slot(name))
        .collect();
    format!("/{}", parts.join("/"))
}

fn id_parts(id: &str) -> Vec<&str> {
    id.split('/').filter(|p| !p.is_empty()).collect()
}

/// Order segment ids part by part, so ancestors precede descendants.
pub fn compare_segment_ids(a: &str, b: &str) -> Ordering {
    id_parts(a).cmp(&id_parts(b))
}

/// True if `ancestor` is a strict ancestor of `descendant`.
pub fn is_ancestor(ancestor: &str, descendant: &str) -> bool {
    let ancestor = id_parts(ancestor);
    let descendant = id_parts(descendant);
    ancestor.len() < descendant.len() && descendant.starts_with(&ancestor)
}

/// Discover the segments of all app directories, ancestors first.
pub fn discover_segments(app_dirs: &[PathBuf]) -> Vec<Segment> {
    let mut segments: BTreeMap<String, Vec<RouteEntry>> = BTreeMap::new();

    for app_dir in app_dirs {
        let walker = WalkDir::new(app_dir)
            .into_iter()
            .filter_entry(|e| e.file_name() != "node_modules");

        for entry in walker.flatten() {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_source_file(path) {
                continue;
            }
            let Some(kind) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(EntryKind::from_stem)
            else {
                continue;
            };
            let Some(relative_dir) = path
                .parent()
                .and_then(|dir| dir.strip_prefix(app_dir).ok())
            else {
                continue;
            };

            let slot = relative_dir
                .file_name()
                .and_then(|n| n.to_str())
                .filter(|n| is_slot(n))
                .map(|n| n[1..].to_string());

            segments
                .entry(segment_id(relative_dir))
                .or_default()
                .push(RouteEntry {
                    file: path.to_path_buf(),
                    kind,
                    slot,
                });
        }
    }

    let mut segments: Vec<Segment> = segments
        .into_iter()
        .map(|(id, mut entries)| {
            entries.sort_by(|a, b| {
                (a.slot.is_some(), a.kind, &a.file).cmp(&(b.slot.is_some(), b.kind, &b.file))
            });
            Segment { id, entries }
        })
        .collect();
    segments.sort_by(|a, b| compare_segment_ids(&a.id, &b.id));
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_segment_id() {
        assert_eq!(segment_id(Path::new("")), "/");
        assert_eq!(segment_id(Path::new("dashboard/settings")), "/dashboard/settings");
        assert_eq!(segment_id(Path::new("@modal")), "/");
        assert_eq!(segment_id(Path::new("@modal/(.)photo/[id]")), "/(.)photo/[id]");
        assert_eq!(segment_id(Path::new("(auth)/login")), "/(auth)/login");
    }

    #[test]
    fn test_compare_puts_ancestors_first() {
        let mut ids = vec!["/feed/photo", "/", "/feed", "/(auth)/login", "/feed-x"];
        ids.sort_by(|a, b| compare_segment_ids(a, b));
        assert_eq!(ids, vec!["/", "/(auth)/login", "/feed", "/feed/photo", "/feed-x"]);
    }

    #[test]
    fn test_is_ancestor() {
        assert!(is_ancestor("/", "/feed"));
        assert!(is_ancestor("/feed", "/feed/photo"));
        assert!(!is_ancestor("/feed", "/feed"));
        assert!(!is_ancestor("/feed", "/feed-x"));
    }

    #[test]
    fn test_discover_groups_slots_with_layout() {
        let dir = tempdir().unwrap();
        let app = dir.path().join("app");
        for file in [
            "layout.tsx",
            "page.tsx",
            "@modal/default.tsx",
            "@modal/(.)photo/page.tsx",
            "about/page.tsx",
            "about/Header.tsx",
            "about/page.module.css",
        ] {
            let path = app.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }

        let segments = discover_segments(&[app.clone()]);
        let ids: Vec<&str> = segments.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["/", "/(.)photo", "/about"]);

        let root = &segments[0];
        assert_eq!(root.layout(), Some(app.join("layout.tsx").as_path()));
        assert_eq!(
            root.roots(),
            vec![
                app.join("layout.tsx"),
                app.join("page.tsx"),
                app.join("@modal/default.tsx"),
            ]
        );
        assert_eq!(root.entries[2].slot.as_deref(), Some("modal"));
        assert_eq!(segments[1].entries[0].slot, None);
    }
}
