//! `quay cache print-hashes`: compute and print the cache key of every target.

use std::io::{self, Write};

use quay_cache::{
    CacheGraphContentHasher, CachePrintHashesService, CancellationFlag, FsContentHasher, HashEntry,
    TargetFilter,
};
use quay_config::FsConfigLoader;
use quay_graph::ManifestGenerator;
use tracing::warn;

use crate::pipeline::{resolve_project_path, CommandError};
use crate::{PrintHashesArgs, ReportFormat};

/// Runs the command. The report goes to stdout; everything else to stderr.
pub fn run(args: &PrintHashesArgs, cancellation: CancellationFlag) -> Result<i32, CommandError> {
    let path = resolve_project_path(args.path.as_deref())?;

    let mut engine = CacheGraphContentHasher::new(FsContentHasher);
    if let Some(jobs) = args.jobs {
        engine = engine.with_jobs(jobs);
    }
    let service = CachePrintHashesService::new(ManifestGenerator, FsConfigLoader, engine)
        .with_cancellation(cancellation.clone());

    let filter = if args.targets.is_empty() {
        TargetFilter::All
    } else {
        TargetFilter::Roots(args.targets.clone())
    };
    let entries =
        service.run_with_filter(&path, args.xcframeworks, args.profile.as_deref(), filter)?;
    if entries.is_empty() {
        warn!(path = %path.display(), "no targets to hash");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    emit_report(&mut out, &entries, args.format, &cancellation)?;
    out.flush()?;
    Ok(0)
}

/// Writes the report unless the run was interrupted after hashing finished.
fn emit_report(
    out: &mut impl Write,
    entries: &[HashEntry],
    format: ReportFormat,
    cancellation: &CancellationFlag,
) -> Result<(), CommandError> {
    cancellation.check()?;
    write_report(out, entries, format)?;
    Ok(())
}

/// Writes `entries` in the requested format.
pub fn write_report(
    out: &mut impl Write,
    entries: &[HashEntry],
    format: ReportFormat,
) -> io::Result<()> {
    match format {
        ReportFormat::Text => {
            for entry in entries {
                writeln!(out, "{entry}")?;
            }
        }
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, entries)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
