use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use gridstore_cli::cli::IngestCommands;
use gridstore_io::{ingest_five_bus, ingest_rts, IngestConfig, IngestReport};
use tabwriter::TabWriter;
use tracing::info;

pub fn handle(command: &IngestCommands) -> Result<()> {
    let args = command.args();
    let config = IngestConfig::load(args.config.as_deref())
        .with_context(|| match &args.config {
            Some(path) => format!("loading config {}", path.display()),
            None => "loading default config".to_string(),
        })?;

    info!(
        family = command.family(),
        source = %args.source.display(),
        db = %args.db.display(),
        "starting ingestion"
    );
    let start = Instant::now();
    let report = match command {
        IngestCommands::Rts(_) => ingest_rts(&args.db, &args.source, &args.schemas, &config),
        IngestCommands::FiveBus(_) => {
            ingest_five_bus(&args.db, &args.source, &args.schemas, &config)
        }
    }
    .with_context(|| format!("ingesting {} dataset from {}", command.family(), args.source.display()))?;

    println!("{}", summary_table(&report)?);
    for issue in &report.diagnostics.issues {
        eprintln!("{issue}");
    }
    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }
    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        db = %args.db.display(),
        "ingestion complete"
    );
    Ok(())
}

fn summary_table(report: &IngestReport) -> Result<String> {
    let mut writer = TabWriter::new(Vec::new()).padding(2);
    writeln!(writer, "Phase\tRows")?;
    for (phase, rows) in report.counts.iter() {
        writeln!(writer, "{}\t{}", phase, rows)?;
    }
    writeln!(writer, "total\t{}", report.counts.total())?;
    writeln!(writer, "diagnostics\t{}", report.diagnostics.summary())?;
    writer.flush()?;
    Ok(String::from_utf8(writer.into_inner()?)?)
}

fn write_report(path: &Path, report: &IngestReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).with_context(|| format!("writing report {}", path.display()))
}
