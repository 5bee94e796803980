//! Human-readable command output.
//!
//! Kept apart from the core so the library never prints.

use std::{io::Write, path::Path};

use colored::Colorize;

use crate::core::catalog::ExtractSummary;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

/// Print extraction failures followed by a one-line summary.
pub fn print_extract_summary<W: Write>(summary: &ExtractSummary, root: &Path, writer: &mut W) {
    for failure in &summary.load.failures {
        let path = failure.path.strip_prefix(root).unwrap_or(&failure.path);
        let _ = writeln!(
            writer,
            "{} {}: {}",
            FAILURE_MARK.red(),
            path.display().to_string().bold(),
            failure.error
        );
    }

    let line = format!(
        "Extracted {} from {} into {}",
        plural(summary.message_count, "message"),
        plural(summary.load.file_count, "file"),
        summary.locales.join(", ")
    );
    if summary.load.failures.is_empty() {
        let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), line.green());
    } else {
        let _ = writeln!(
            writer,
            "{} {} ({} skipped)",
            FAILURE_MARK.red(),
            line,
            plural(summary.load.failures.len(), "file")
        );
    }
}

pub fn print_manifest_written<W: Write>(segment_count: usize, path: &Path, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Wrote manifest for {} to {}",
            plural(segment_count, "segment"),
            path.display()
        )
        .green()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{FileFailure, LoadSummary};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn render(summary: &ExtractSummary) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        print_extract_summary(summary, Path::new("/project"), &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_extract_summary_success() {
        let summary = ExtractSummary {
            load: LoadSummary {
                file_count: 3,
                failures: Vec::new(),
            },
            message_count: 1,
            locales: vec!["en".to_string(), "de".to_string()],
        };
        assert_eq!(
            render(&summary),
            "\u{2713} Extracted 1 message from 3 files into en, de\n"
        );
    }

    #[test]
    fn test_extract_summary_with_failures() {
        let summary = ExtractSummary {
            load: LoadSummary {
                file_count: 2,
                failures: vec![FileFailure {
                    path: PathBuf::from("/project/src/page.tsx"),
                    error: "boom".to_string(),
                }],
            },
            message_count: 0,
            locales: vec!["en".to_string()],
        };
        assert_eq!(
            render(&summary),
            "\u{2718} src/page.tsx: boom\n\
             \u{2718} Extracted 0 messages from 2 files into en (1 file skipped)\n"
        );
    }
}
