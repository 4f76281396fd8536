use crate::pipeline::{RunMode, RunReport};
use crate::undo::UndoReport;
use std::io::{self, Write};

/// Display dry run results in a formatted output
pub fn display_dry_run(report: &RunReport, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "========================================")?;
    writeln!(writer, "              DRY RUN")?;
    writeln!(writer, "========================================")?;
    writeln!(writer)?;
    writeln!(writer, "Operations: {}", report.planned.len())?;
    writeln!(writer)?;

    if report.planned.is_empty() {
        writeln!(writer, "No files to rename.")?;
    } else {
        writeln!(writer, "Planned changes:")?;
        writeln!(writer)?;

        for (i, op) in report.planned.iter().enumerate() {
            writeln!(writer, "  {}. From: {}", i + 1, op.source)?;
            writeln!(writer, "     To:   {}", op.target)?;
            writeln!(writer)?;
        }
    }

    writeln!(writer, "----------------------------------------")?;
    writeln!(writer, "Summary:")?;
    writeln!(writer, "  {} files would be renamed", report.planned.len())?;
    write_problems(report, writer)?;

    writeln!(writer)?;
    writeln!(writer, "Run without --dry to apply these changes.")?;

    Ok(())
}

/// Display execution results (non-dry-run)
pub fn display_run_result(report: &RunReport, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "Renamed {} files.", report.renamed.len())?;

    if report.mode == RunMode::Interactive {
        writeln!(writer, "  {} declined.", report.skipped.len())?;
    }
    write_problems(report, writer)?;

    if let Some(path) = &report.journal_path {
        writeln!(writer, "Undo with: --undo (journal: {})", path.display())?;
    }

    Ok(())
}

fn write_problems(report: &RunReport, writer: &mut impl Write) -> io::Result<()> {
    if report.ignored > 0 {
        writeln!(writer, "  {} files not recognised as episodes", report.ignored)?;
    }

    if !report.failures.is_empty() {
        writeln!(writer, "  {} files failed:", report.failures.len())?;
        for failure in &report.failures {
            writeln!(writer, "    - {}: {}", failure.file_name, failure.error)?;
        }
    }

    Ok(())
}

pub fn display_undo_result(report: &UndoReport, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "Restored {} files in {}.",
        report.restored.len(),
        report.working_directory.display()
    )?;

    if !report.failed.is_empty() {
        writeln!(writer, "  {} files could not be restored:", report.failed.len())?;
        for failure in &report.failed {
            writeln!(
                writer,
                "    - {} -> {}: {}",
                failure.op.source, failure.op.target, failure.error
            )?;
        }
    }

    Ok(())
}
