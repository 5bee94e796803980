use std::{fs, io};

use anyhow::{Context, Result, bail};

use super::super::{args::ManifestCommand, exit_status::ExitStatus, report};
use super::Project;
use crate::config::resolve_against;
use crate::core::TreeShakingAnalyzer;

pub fn manifest(cmd: ManifestCommand) -> Result<ExitStatus> {
    let mut project = Project::load(&cmd.common)?;
    if !cmd.app_dirs.is_empty() {
        project.config.app_dirs = cmd.app_dirs.clone();
    }

    let app_dirs = project.config.existing_app_dirs(&project.root);
    if app_dirs.is_empty() {
        bail!(
            "No app directory found (looked for: {})",
            project.config.app_dirs.join(", ")
        );
    }

    let mut analyzer = TreeShakingAnalyzer::from_config(&project.root, &project.config);
    let manifest = analyzer.analyze(&app_dirs, None);
    let json = serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;

    match &cmd.output {
        Some(output) => {
            let path = resolve_against(&project.root, &output.to_string_lossy());
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
            fs::write(&path, format!("{}\n", json))
                .with_context(|| format!("Failed to write manifest: {}", path.display()))?;
            report::print_manifest_written(
                manifest.len(),
                project.relative(&path),
                &mut io::stdout().lock(),
            );
        }
        None => println!("{}", json),
    }

    Ok(ExitStatus::Success)
}
