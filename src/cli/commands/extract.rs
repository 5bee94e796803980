use std::{io, sync::Arc};

use anyhow::Result;

use super::super::{args::ExtractCommand, exit_status::ExitStatus, report};
use super::Project;
use crate::core::{CatalogManager, SaveScheduler, catalog::ExtractSummary};

pub fn extract(cmd: ExtractCommand) -> Result<ExitStatus> {
    let mut project = Project::load(&cmd.common)?;
    if cmd.development {
        project.config.development = true;
    }

    let manager = Arc::new(CatalogManager::new(&project.root, &project.config));
    let scheduler = SaveScheduler::from_config(Arc::clone(&manager), &project.config);

    let summary = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let load = manager.load_messages()?;
            let message_count = scheduler.save().await?;
            anyhow::Ok(ExtractSummary {
                load,
                message_count,
                locales: manager.locales(),
            })
        })?;

    report::print_extract_summary(&summary, &project.root, &mut io::stdout().lock());

    if summary.load.failures.is_empty() {
        Ok(ExitStatus::Success)
    } else {
        Ok(ExitStatus::Failure)
    }
}
