use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::debug;

use super::super::args::CommonArgs;
use crate::config::{Config, load_config};

/// Project root plus the effective configuration (CLI > file > defaults).
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
}

/// Absolute project root from `--root`, relative to the current directory.
pub fn project_root(common: &CommonArgs) -> Result<PathBuf> {
    let cwd = env::current_dir().context("Failed to read the current directory")?;
    let root = match &common.root {
        Some(root) if root.is_absolute() => root.clone(),
        Some(root) => cwd.join(root),
        None => cwd,
    };
    root.canonicalize()
        .with_context(|| format!("Project root does not exist: {}", root.display()))
}

impl Project {
    pub fn load(common: &CommonArgs) -> Result<Self> {
        let root = project_root(common)?;
        let loaded = load_config(&root)?;
        if loaded.from_file {
            debug!("Loaded configuration for {}", root.display());
        }

        let mut config = loaded.config;
        apply_overrides(&mut config, common);
        config.validate()?;
        Ok(Self { root, config })
    }

    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

fn apply_overrides(config: &mut Config, common: &CommonArgs) {
    if let Some(messages_path) = &common.messages_path {
        config.messages_path = messages_path.clone();
    }
    if let Some(source_locale) = &common.source_locale {
        config.source_locale = source_locale.clone();
    }
    if let Some(format) = common.format {
        config.format = format;
    }
}
