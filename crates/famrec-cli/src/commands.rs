use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::runtime::Builder;
use tracing::{debug, info, info_span, warn};

use famrec_cli::config::Settings;
use famrec_cli::sinks::{CsvAuditWriter, DiscardGrants, JsonlGrantWriter};
use famrec_core::{
    AuditSink, GrantSink, ImportContext, ImportError, ImportSummary, ProgressRegistry, run_import,
};
use famrec_ingest::{CsvRowReader, Dataset};
use famrec_model::ImportStage;

use crate::cli::ImportArgs;

pub const GRANTS_FILE: &str = "grants.jsonl";
pub const REJECTIONS_FILE: &str = "rejections.csv";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

type Rows = CsvRowReader<File>;

pub fn run_import_command(args: &ImportArgs) -> Result<ImportSummary> {
    let span = info_span!("tenant", tenant = %args.tenant);
    let _guard = span.enter();

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    apply_overrides(&mut settings, args);
    let csv_options = settings.csv_options()?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output directory {}", args.out_dir.display()))?;
    let benefits = CsvRowReader::open(&args.benefits, Dataset::Benefits, csv_options)
        .with_context(|| format!("open benefit registry {}", args.benefits.display()))?;
    let enrollments = CsvRowReader::open(&args.enrollment, Dataset::Enrollment, csv_options)
        .with_context(|| format!("open school enrollment {}", args.enrollment.display()))?;
    let audit_path = args.out_dir.join(REJECTIONS_FILE);
    let mut audit = CsvAuditWriter::create(&audit_path, csv_options.delimiter, benefits.headers())
        .with_context(|| format!("create {}", audit_path.display()))?;

    let registry = ProgressRegistry::new();
    let ctx = ImportContext::new(args.tenant.clone(), registry).with_options(settings.import);
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;

    let started = Instant::now();
    let summary = if args.dry_run {
        let mut grants = DiscardGrants::default();
        runtime.block_on(reconcile(&ctx, benefits, enrollments, &mut grants, &mut audit))?
    } else {
        let grants_path = args.out_dir.join(GRANTS_FILE);
        let mut grants = JsonlGrantWriter::create(&grants_path)
            .with_context(|| format!("create {}", grants_path.display()))?;
        runtime.block_on(reconcile(&ctx, benefits, enrollments, &mut grants, &mut audit))?
    };
    info!(
        elapsed_ms = started.elapsed().as_millis(),
        accepted = summary.accepted(),
        rejected = summary.audit_records(),
        "import finished"
    );

    if let Some(path) = &args.summary_json {
        write_summary_json(path, &summary)?;
    }
    Ok(summary)
}

fn apply_overrides(settings: &mut Settings, args: &ImportArgs) {
    if let Some(as_of) = args.as_of {
        settings.import.as_of = Some(as_of);
    }
    if let Some(age_limit) = args.age_limit {
        settings.import.age_limit = age_limit;
    }
    if let Some(batch_size) = args.batch_size {
        settings.import.persist_batch_size = batch_size;
    }
    if let Some(delimiter) = args.delimiter {
        settings.input.delimiter = delimiter;
    }
}

async fn reconcile<G, A>(
    ctx: &ImportContext,
    benefits: Rows,
    enrollments: Rows,
    grants: &mut G,
    audit: &mut A,
) -> Result<ImportSummary>
where
    G: GrantSink,
    A: AuditSink,
{
    let watcher = tokio::spawn(watch_progress(ctx.progress.clone(), ctx.tenant.clone()));
    let result = run_import(ctx, benefits, enrollments, grants, audit).await;
    if let Err(error) = watcher.await {
        warn!(%error, "progress watcher stopped");
    }
    result.map_err(describe_failure)
}

/// Polls the registry the way an external dashboard would, logging every
/// stage transition until the import reaches a terminal stage.
async fn watch_progress(registry: ProgressRegistry, tenant: String) {
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let mut last_stage = ImportStage::Idle;
    loop {
        ticker.tick().await;
        let report = registry.get_stage(&tenant);
        if report.stage != last_stage {
            info!(
                tenant = %tenant,
                stage = %report.stage,
                message = report.message.as_deref().unwrap_or_default(),
                "import stage changed"
            );
            last_stage = report.stage;
        } else if let Some(percentage) = report.percentage {
            debug!(
                tenant = %tenant,
                stage = %report.stage,
                percent = (percentage * 100.0).round(),
                "import progress"
            );
        }
        if matches!(report.stage, ImportStage::Completed | ImportStage::Failed) {
            break;
        }
    }
}

fn describe_failure(error: ImportError) -> anyhow::Error {
    let message = match error.suggestion() {
        Some(hint) => format!("{}\nhint: {hint}", error.user_message()),
        None => error.user_message(),
    };
    anyhow::Error::new(error).context(message)
}

fn write_summary_json(path: &Path, summary: &ImportSummary) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary)
        .with_context(|| format!("write {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
