//! Terminal output for a run report.

use std::io::{self, Write};

use clap::ValueEnum;
use hallucheck_core::Verdict;
use hallucheck_runtime::{RunOutcome, RunReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable sections
    Text,
    /// The full report as JSON
    Json,
}

pub const NO_CLAIMS_WARNING: &str = "No factual claims detected.";

pub fn render(report: &RunReport, format: OutputFormat, out: &mut impl Write) -> io::Result<()> {
    match format {
        OutputFormat::Text => render_text(report, out),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)
        }
    }
}

/// Answer, claims, then either the warning or per-claim verdicts and the
/// final banner.
fn render_text(report: &RunReport, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Generated Answer")?;
    writeln!(out, "{}", report.answer)?;
    writeln!(out)?;

    writeln!(out, "Extracted Claims")?;
    for claim in &report.claims {
        writeln!(out, "- {}", claim)?;
    }

    let (results, assessment) = match &report.outcome {
        RunOutcome::NoClaims => {
            return writeln!(out, "Warning: {}", NO_CLAIMS_WARNING);
        }
        RunOutcome::Assessed {
            results,
            assessment,
        } => (results, assessment),
    };

    writeln!(out)?;
    writeln!(out, "Claim Verification")?;
    for result in results {
        writeln!(out, "{} {}", tag(result.verdict), result.claim)?;
    }

    writeln!(out)?;
    writeln!(out, "Final Verdict")?;
    writeln!(out, "{}", assessment.banner())
}

fn tag(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::True => "[Correct]",
        Verdict::False => "[Wrong]",
    }
}
