//! Report rendering for batch passes.

use std::io::{self, Write};

use autoledger_rules::{BatchReport, JournalReport};

/// Render a batch report as human-readable text.
pub fn print_text(batch: &BatchReport, out: &mut impl Write) -> io::Result<()> {
    for report in &batch.reports {
        print_journal(report, out)?;
    }

    let failures: usize = batch
        .reports
        .iter()
        .flat_map(|r| &r.outcomes)
        .map(|o| o.failures.len())
        .sum();
    let applied: usize = batch
        .reports
        .iter()
        .flat_map(|r| &r.outcomes)
        .map(|o| o.applied.len())
        .sum();

    writeln!(out)?;
    writeln!(
        out,
        "{} journal(s), {} action(s) applied, {} failure(s){}",
        batch.reports.len(),
        applied,
        failures,
        if batch.cancelled { ", cancelled" } else { "" }
    )
}

fn print_journal(report: &JournalReport, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", report.journal)?;

    for outcome in &report.outcomes {
        if !outcome.match_result.matched {
            continue;
        }
        writeln!(out, "  matched rule #{} \"{}\"", outcome.rule_id, outcome.title)?;
        for applied in &outcome.applied {
            match &applied.previous {
                Some(previous) => writeln!(
                    out,
                    "    + {} (was '{previous}')",
                    applied.action.describe()
                )?,
                None => writeln!(out, "    + {}", applied.action.describe())?,
            }
        }
        for failure in &outcome.failures {
            writeln!(out, "    ! {}: {}", failure.action.describe(), failure.error)?;
        }
    }
    if let Some(rule_id) = report.stopped_by {
        writeln!(out, "  pass stopped by rule #{rule_id}")?;
    }
    Ok(())
}

/// Render a batch report as pretty-printed JSON.
pub fn print_json(batch: &BatchReport, out: &mut impl Write) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, batch)?;
    writeln!(out)?;
    Ok(())
}
