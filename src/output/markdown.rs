//! Markdown summary generation
//!
//! This module generates a human-readable markdown report of a mirror run,
//! including counts, failed targets and the list of saved files.

use crate::output::summary::RunSummary;
use crate::output::OutputResult;
use crate::state::{FailureKind, SkipReason};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown report from a run summary
///
/// # Arguments
///
/// * `summary` - The run summary
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn generate_markdown_summary(summary: &RunSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str("# Sumi-Mirror Run Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Root URL**: {}\n", summary.root_url));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        summary.duration_seconds()
    ));
    md.push_str(&format!("- **Status**: {}\n", summary.status()));
    md.push_str(&format!("- **Strategy**: {}\n", summary.strategy));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push_str(&format!(
        "- **Output Directory**: {}\n\n",
        summary.output_dir.display()
    ));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Visited**: {}\n", summary.pages_visited));
    md.push_str(&format!("- **Files Saved**: {}\n", summary.files_saved()));
    md.push_str(&format!("- **Pages Saved**: {}\n", summary.stats.pages_saved));
    md.push_str(&format!("- **Assets Saved**: {}\n", summary.stats.assets_saved));
    md.push_str(&format!("- **Failures**: {}\n", summary.total_failures()));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        summary.success_rate()
    ));

    if summary.total_failures() > 0 {
        md.push_str("## Failures by Kind\n\n");
        md.push_str("| Kind | Count |\n");
        md.push_str("|------|-------|\n");
        for kind in FailureKind::all() {
            let count = summary.stats.failure_count(kind);
            if count > 0 {
                md.push_str(&format!("| {} | {} |\n", kind, count));
            }
        }
        md.push('\n');
    }

    if summary.stats.total_skipped() > 0 {
        md.push_str("## Skipped by Reason\n\n");
        md.push_str("| Reason | Count |\n");
        md.push_str("|--------|-------|\n");
        for reason in SkipReason::all() {
            let count = summary.stats.skip_count(reason);
            if count > 0 {
                md.push_str(&format!("| {} | {} |\n", reason, count));
            }
        }
        md.push('\n');
    }

    let failed: Vec<_> = summary.stats.failed().collect();
    if !failed.is_empty() {
        md.push_str("## Failed Targets\n\n");
        md.push_str("| URL | Kind | State | Detail |\n");
        md.push_str("|-----|------|-------|--------|\n");
        for record in failed {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                record.url,
                record.kind,
                record.state,
                record.detail.as_deref().unwrap_or("")
            ));
        }
        md.push('\n');
    }

    let saved: Vec<_> = summary.stats.saved().collect();
    if !saved.is_empty() {
        md.push_str("## Saved Files\n\n");
        md.push_str("| URL | Kind | Depth | Local Path |\n");
        md.push_str("|-----|------|-------|------------|\n");
        for record in saved {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                record.url,
                record.kind,
                record.depth,
                record
                    .local_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            ));
        }
        md.push('\n');
    }

    md.push_str("---\n\n");
    md.push_str(&format!(
        "*Generated by Sumi-Mirror v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    md
}
