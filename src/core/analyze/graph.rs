//! File-level import graph.
//!
//! Edges are computed lazily: a file is expanded (its imports resolved) the
//! first time it is reached from a root, and stays expanded until
//! [`DependencyGraph::invalidate`] drops it. Only files resolvable inside the
//! source roots become nodes, so external packages never enter the graph.
//!
//! Creating or deleting a file can change what other files' specifiers
//! resolve to; [`DependencyGraph::refresh_resolutions`] re-resolves the
//! expanded files against the current file system.

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    path::{Path, PathBuf},
};

use log::{debug, trace};

use super::{SourceAnalyzer, SourceFacts};
use crate::core::ModuleResolver;

fn resolve_dependencies(
    file: &Path,
    facts: &SourceFacts,
    resolver: &ModuleResolver,
) -> BTreeSet<PathBuf> {
    facts
        .imports
        .iter()
        .filter_map(|specifier| resolver.resolve(file, specifier))
        .filter(|dependency| dependency != file)
        .collect()
}

#[derive(Debug, Default)]
pub struct DependencyGraph {
    adjacency: HashMap<PathBuf, BTreeSet<PathBuf>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand every file reachable from `roots` that is not expanded yet.
    ///
    /// Files are expanded breadth-first, one level at a time; each level's
    /// facts are computed in parallel before its imports are resolved.
    pub fn expand(
        &mut self,
        roots: &[PathBuf],
        analyzer: &mut SourceAnalyzer,
        resolver: &ModuleResolver,
    ) {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut level: Vec<PathBuf> = roots
            .iter()
            .filter(|r| seen.insert((*r).clone()))
            .cloned()
            .collect();

        while !level.is_empty() {
            let pending: Vec<PathBuf> = level
                .iter()
                .filter(|f| !self.adjacency.contains_key(*f))
                .cloned()
                .collect();
            analyzer.prefetch(&pending);

            for file in &pending {
                let dependencies = resolve_dependencies(file, &analyzer.facts(file), resolver);
                trace!(
                    "{} -> {} dependencies",
                    file.display(),
                    dependencies.len()
                );
                self.adjacency.insert(file.clone(), dependencies);
            }

            let mut next = Vec::new();
            for file in &level {
                for dependency in self.dependencies(file) {
                    if seen.insert(dependency.clone()) {
                        next.push(dependency.clone());
                    }
                }
            }
            level = next;
        }
    }

    /// Direct dependencies of an expanded file.
    pub fn dependencies(&self, file: &Path) -> impl Iterator<Item = &PathBuf> {
        self.adjacency.get(file).into_iter().flatten()
    }

    /// Drop the edges of a file so the next expansion re-reads it.
    pub fn invalidate(&mut self, file: &Path) {
        self.adjacency.remove(file);
    }

    pub fn clear(&mut self) {
        self.adjacency.clear();
    }

    pub fn contains(&self, file: &Path) -> bool {
        self.adjacency.contains_key(file)
    }

    /// Re-resolve the imports of every expanded file.
    ///
    /// Files whose dependencies changed get their new edges; they are returned
    /// so callers can drop results computed from the old ones.
    pub fn refresh_resolutions(
        &mut self,
        analyzer: &mut SourceAnalyzer,
        resolver: &ModuleResolver,
    ) -> Vec<PathBuf> {
        let mut refreshed = Vec::new();
        for (file, dependencies) in self.adjacency.iter_mut() {
            let current = resolve_dependencies(file, &analyzer.facts(file), resolver);
            if current != *dependencies {
                trace!("Resolution changed for {}", file.display());
                *dependencies = current;
                refreshed.push(file.clone());
            }
        }
        debug!("{} file(s) resolve differently", refreshed.len());
        refreshed
    }
}
