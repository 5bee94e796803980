//! Per-segment namespace manifest.
//!
//! For every segment the import graph is walked from its entry files while
//! tracking whether execution is inside a client boundary. Usages in
//! client-side files are collected into the segment's namespace trie. The
//! segments are then folded into the nearest ancestor whose layout renders the
//! translation provider.

use std::{
    collections::{BTreeSet, HashMap, HashSet, VecDeque},
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use super::segments::{Segment, discover_segments, is_ancestor};
use super::{DependencyGraph, SourceAnalyzer};
use crate::config::Config;
use crate::core::{Manifest, ModuleResolver, NamespaceTree, Namespaces, SegmentManifest};

/// Analysis result of one segment, kept between incremental runs.
#[derive(Debug, Clone)]
struct SegmentState {
    roots: Vec<PathBuf>,
    /// Every file visited by the walk.
    files: BTreeSet<PathBuf>,
    has_layout_provider: bool,
    namespaces: Namespaces,
}

pub struct TreeShakingAnalyzer {
    resolver: ModuleResolver,
    analyzer: SourceAnalyzer,
    graph: DependencyGraph,
    states: HashMap<String, SegmentState>,
}

impl TreeShakingAnalyzer {
    pub fn new(resolver: ModuleResolver, analyzer: SourceAnalyzer) -> Self {
        Self {
            resolver,
            analyzer,
            graph: DependencyGraph::new(),
            states: HashMap::new(),
        }
    }

    pub fn from_config(root: &Path, config: &Config) -> Self {
        Self::new(
            ModuleResolver::from_config(root, config),
            SourceAnalyzer::new(&config.accessors, &config.provider),
        )
    }

    /// Compute the manifest for the segments below `app_dirs`.
    ///
    /// Without `changed_files` every cache is dropped and all segments are
    /// recomputed. With it, only segments whose previous walk reached one of
    /// the changed files, or a file whose imports now resolve differently,
    /// are recomputed (as are segments whose entry files changed).
    pub fn analyze(
        &mut self,
        app_dirs: &[PathBuf],
        changed_files: Option<&[PathBuf]>,
    ) -> Manifest {
        let changed: Option<HashSet<PathBuf>> = match changed_files {
            None => {
                self.analyzer.clear();
                self.graph.clear();
                self.states.clear();
                None
            }
            Some(files) => Some(self.invalidate(files)),
        };

        let segments = discover_segments(app_dirs);
        let mut states = HashMap::with_capacity(segments.len());
        let mut recomputed = 0;

        for segment in &segments {
            let roots = segment.roots();
            let reusable = self.states.remove(&segment.id).filter(|state| {
                state.roots == roots
                    && changed
                        .as_ref()
                        .is_some_and(|changed| !state.files.iter().any(|f| changed.contains(f)))
            });

            let state = match reusable {
                Some(state) => state,
                None => {
                    recomputed += 1;
                    self.analyze_segment(segment, roots)
                }
            };
            states.insert(segment.id.clone(), state);
        }
        self.states = states;

        info!(
            "Analyzed {} segment(s), {} recomputed",
            segments.len(),
            recomputed
        );
        self.build_manifest(&segments)
    }

    /// Drop cached facts and edges of `files`. Returns every file whose
    /// cached results are stale.
    ///
    /// A changed file that is missing on disk or not yet in the graph may
    /// have been deleted or created, so every expanded file is re-resolved.
    fn invalidate(&mut self, files: &[PathBuf]) -> HashSet<PathBuf> {
        let files_moved = files
            .iter()
            .any(|file| !file.exists() || !self.graph.contains(file));

        for file in files {
            self.analyzer.invalidate(file);
            self.graph.invalidate(file);
        }

        let mut stale: HashSet<PathBuf> = files.iter().cloned().collect();
        if files_moved {
            stale.extend(
                self.graph
                    .refresh_resolutions(&mut self.analyzer, &self.resolver),
            );
        }
        stale
    }

    fn analyze_segment(&mut self, segment: &Segment, roots: Vec<PathBuf>) -> SegmentState {
        self.graph.expand(&roots, &mut self.analyzer, &self.resolver);

        let has_layout_provider = segment
            .layout()
            .is_some_and(|layout| self.analyzer.facts(layout).renders_provider);

        let mut namespaces = Namespaces::Tree(NamespaceTree::new());
        let mut files = BTreeSet::new();
        let mut visited: HashSet<(PathBuf, bool)> = HashSet::new();
        let mut queue: VecDeque<(PathBuf, bool)> =
            roots.iter().map(|root| (root.clone(), false)).collect();

        while let Some((file, inside_client)) = queue.pop_front() {
            if !visited.insert((file.clone(), inside_client)) {
                continue;
            }
            files.insert(file.clone());

            let facts = self.analyzer.facts(&file);
            let is_client = (inside_client || facts.has_use_client) && !facts.has_use_server;

            if is_client {
                if facts.requires_all_messages {
                    if !namespaces.is_all() {
                        warn!(
                            "Segment {} requires all messages: dynamic translation usage in {}",
                            segment.id,
                            file.display()
                        );
                    }
                    namespaces = Namespaces::All;
                }
                if let Namespaces::Tree(tree) = &mut namespaces {
                    for path in facts.usages.iter().filter_map(|u| u.required_path()) {
                        tree.insert_path(&path);
                    }
                }
            }

            for dependency in self.graph.dependencies(&file) {
                if !visited.contains(&(dependency.clone(), is_client)) {
                    queue.push_back((dependency.clone(), is_client));
                }
            }
        }

        debug!(
            "Segment {}: {} file(s), provider: {}",
            segment.id,
            files.len(),
            has_layout_provider
        );
        SegmentState {
            roots,
            files,
            has_layout_provider,
            namespaces,
        }
    }

    /// Fold segments into their nearest provider-owning ancestor.
    fn build_manifest(&self, segments: &[Segment]) -> Manifest {
        let mut manifest = Manifest::new();
        let mut owners: Vec<&str> = Vec::new();

        for segment in segments {
            let Some(state) = self.states.get(&segment.id) else {
                continue;
            };

            if state.has_layout_provider {
                owners.push(&segment.id);
                manifest.insert(
                    segment.id.clone(),
                    SegmentManifest {
                        has_layout_provider: true,
                        namespaces: state.namespaces.clone(),
                    },
                );
                continue;
            }

            let owner = owners
                .iter()
                .rev()
                .find(|owner| is_ancestor(owner, &segment.id));
            match owner.and_then(|owner| manifest.get_mut(*owner)) {
                Some(entry) => entry.namespaces.merge(&state.namespaces),
                None => {
                    manifest.insert(
                        segment.id.clone(),
                        SegmentManifest {
                            has_layout_provider: false,
                            namespaces: state.namespaces.clone(),
                        },
                    );
                }
            }
        }

        manifest
    }

    /// Files reached by the last analysis of a segment.
    pub fn segment_files(&self, segment_id: &str) -> Option<&BTreeSet<PathBuf>> {
        self.states.get(segment_id).map(|s| &s.files)
    }
}
