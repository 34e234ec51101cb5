//! autoledger: apply transaction rules to double-entry journals.
//!
//! This binary is strictly a caller: it assembles the four collaborators
//! (resolver, source, rule store, sink) from JSON files and invokes the
//! dispatcher. All rule and ledger semantics live in the library crates.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use autoledger_core::{Account, Journal};
use autoledger_rules::memory::{MemoryResolver, MemorySink, VecSource};
use autoledger_rules::{BatchReport, CancelToken, Dispatcher, Rule};

mod report;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply rules to journals and print a report
    Apply(ApplyArgs),
}

/// Output format for the pass report.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output for tooling
    Json,
}

#[derive(Args)]
struct ApplyArgs {
    /// Rules file (JSON array of rules)
    #[arg(long, value_name = "FILE")]
    rules: PathBuf,

    /// Journals file (JSON array of journals; invalid journals fail the load)
    #[arg(long, value_name = "FILE")]
    journals: PathBuf,

    /// Accounts file (JSON array of accounts known to the resolver)
    #[arg(long, value_name = "FILE")]
    accounts: Option<PathBuf>,

    /// Write the mutated journals to this file after the pass
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Evaluate and report without writing the output file
    #[arg(long)]
    dry_run: bool,

    /// Fan the pass out across journals
    #[arg(long)]
    parallel: bool,

    /// Output format (text or json)
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    format: OutputFormat,

    /// Suppress the report (just use the exit code)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Apply(args) => run_apply(&args),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening {what} file {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {what} file {}", path.display()))
}

fn run_apply(args: &ApplyArgs) -> Result<ExitCode> {
    let rules: Vec<Rule> = load_json(&args.rules, "rules")?;
    let journals: Vec<Journal> = load_json(&args.journals, "journals")?;

    let mut resolver = MemoryResolver::new().create_missing();
    if let Some(path) = &args.accounts {
        let accounts: Vec<Account> = load_json(path, "accounts")?;
        for account in accounts {
            resolver = resolver.with_account(account);
        }
    }

    let dispatcher = Dispatcher::new(rules);
    let sink = MemorySink::new();
    let cancel = CancelToken::new();

    let batch = if args.parallel {
        dispatcher.run_batch_parallel(journals, &resolver, &sink, &cancel)
    } else {
        dispatcher.run_batch(&mut VecSource::new(journals), &resolver, &sink, &cancel)
    };

    let batch = match batch {
        Ok(batch) => batch,
        Err(abort) => {
            eprintln!(
                "{abort} ({} journal(s) completed before the abort)",
                abort.completed.len()
            );
            return Ok(ExitCode::from(2));
        }
    };

    if !args.quiet {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match args.format {
            OutputFormat::Text => report::print_text(&batch, &mut out)?,
            OutputFormat::Json => report::print_json(&batch, &mut out)?,
        }
    }

    if let Some(path) = &args.output {
        if args.dry_run {
            tracing::info!(path = %path.display(), "dry run, not writing output");
        } else {
            write_journals(path, &batch)?;
        }
    }

    let any_failures = batch.reports.iter().any(|r| r.has_failures());
    Ok(if any_failures {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn write_journals(path: &Path, batch: &BatchReport) -> Result<()> {
    let journals: Vec<&Journal> = batch.reports.iter().map(|r| &r.journal).collect();
    let file =
        File::create(path).with_context(|| format!("creating output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &journals)?;
    writeln!(writer)?;
    Ok(())
}
