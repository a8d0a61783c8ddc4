//! The import pipeline.
//!
//! One run is a single sequential fold over both datasets:
//!
//! ```text
//! rows -> schema check -> normalize -> dedupe -> eligibility
//!      -> cross-reference -> duplicate groups -> persist grants
//! ```
//!
//! Rejections are appended to the audit sink as soon as they are decided,
//! one awaited write at a time, so the audit order is the discovery order
//! and everything appended before a failure stays appended.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{Instrument, debug, error, info, info_span};

use famrec_ingest::{
    Dataset, IngestError, check_required_columns, normalize_benefits, normalize_enrollments,
};
use famrec_model::{ImportReport, ImportStage, MatchOutcome, OutcomeKind, RawRow, RejectionRecord};

use crate::dedupe::{dedupe_benefits, dedupe_enrollments};
use crate::decision::Decision;
use crate::duplicates::resolve_priority_group;
use crate::eligibility::filter_minors;
use crate::error::{ImportError, Result};
use crate::grants::GrantBook;
use crate::options::ImportContext;
use crate::resolver::{EnrollmentPool, resolve};
use crate::sink::{AuditSink, GrantSink};

/// Candidates resolved between two cross-referencing progress updates.
const PROGRESS_INTERVAL: usize = 100;

/// Counters for a finished import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub tenant: String,
    pub benefit_rows: usize,
    pub enrollment_rows: usize,
    /// Benefit rows rejected before becoming candidates.
    pub conversion_rejections: usize,
    pub benefit_duplicates_dropped: usize,
    pub enrollment_duplicates_dropped: usize,
    /// Benefit candidates left after deduplication; each gets one outcome.
    pub candidates: usize,
    pub split_groups: usize,
    pub outcomes: BTreeMap<OutcomeKind, usize>,
    pub grants_written: usize,
    pub dependents_granted: usize,
}

impl ImportSummary {
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.outcomes.get(&kind).copied().unwrap_or(0)
    }

    pub fn accepted(&self) -> usize {
        self.count(OutcomeKind::Accepted)
    }

    /// Candidates with any rejected outcome; conversion rejections excluded.
    pub fn rejected(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(kind, _)| **kind != OutcomeKind::Accepted)
            .map(|(_, count)| count)
            .sum()
    }

    /// Every rejection written to the audit sink.
    pub fn audit_records(&self) -> usize {
        self.conversion_rejections + self.rejected()
    }
}

/// Runs one import for `ctx.tenant`.
///
/// Both row sources are pulled lazily; the first row of each is checked for
/// the required columns before anything else is read. Any error marks the
/// tenant's report as failed and is returned to the caller. Grants written
/// before a persistence failure are not rolled back.
pub async fn run_import<B, E, G, A>(
    ctx: &ImportContext,
    benefits: B,
    enrollments: E,
    grants: &mut G,
    audit: &mut A,
) -> Result<ImportSummary>
where
    B: IntoIterator<Item = famrec_ingest::Result<RawRow>>,
    E: IntoIterator<Item = famrec_ingest::Result<RawRow>>,
    G: GrantSink,
    A: AuditSink,
{
    let span = info_span!("import", tenant = %ctx.tenant);
    let importer = Importer {
        ctx,
        grants,
        audit,
        book: GrantBook::new(),
        summary: ImportSummary {
            tenant: ctx.tenant.clone(),
            ..ImportSummary::default()
        },
    };
    let result = importer
        .run(benefits.into_iter(), enrollments.into_iter())
        .instrument(span)
        .await;
    if let Err(failure) = &result {
        error!(tenant = %ctx.tenant, error = %failure, "import failed");
        ctx.report(ImportReport::new(ImportStage::Failed).with_message(failure.user_message()));
    }
    result
}

struct Importer<'a, G, A> {
    ctx: &'a ImportContext,
    grants: &'a mut G,
    audit: &'a mut A,
    book: GrantBook,
    summary: ImportSummary,
}

impl<G: GrantSink, A: AuditSink> Importer<'_, G, A> {
    async fn run<B, E>(mut self, mut benefits: B, mut enrollments: E) -> Result<ImportSummary>
    where
        B: Iterator<Item = famrec_ingest::Result<RawRow>>,
        E: Iterator<Item = famrec_ingest::Result<RawRow>>,
    {
        let ctx = self.ctx;
        let options = &ctx.options;

        ctx.stage(ImportStage::Validating);
        let first_benefit = benefits.next().transpose().map_err(source_error)?;
        let first_enrollment = enrollments.next().transpose().map_err(source_error)?;
        if let Some(row) = &first_benefit {
            check_required_columns(Dataset::Benefits, row).map_err(ImportError::Schema)?;
        }
        if let Some(row) = &first_enrollment {
            check_required_columns(Dataset::Enrollment, row).map_err(ImportError::Schema)?;
        }
        let benefit_rows = collect_rows(first_benefit, benefits)?;
        let enrollment_rows = collect_rows(first_enrollment, enrollments)?;
        self.summary.benefit_rows = benefit_rows.len();
        self.summary.enrollment_rows = enrollment_rows.len();
        info!(
            benefit_rows = benefit_rows.len(),
            enrollment_rows = enrollment_rows.len(),
            "sources validated"
        );

        ctx.stage(ImportStage::Normalizing);
        let normalized = normalize_benefits(benefit_rows, &options.date_format)
            .map_err(ImportError::Normalization)?;
        let enrollment_candidates = normalize_enrollments(&enrollment_rows, &options.date_format)
            .map_err(ImportError::Normalization)?;
        drop(enrollment_rows);
        self.summary.conversion_rejections = normalized.rejected.len();
        for record in &normalized.rejected {
            self.append(record).await?;
        }
        info!(
            candidates = normalized.candidates.len(),
            rejected = normalized.rejected.len(),
            "rows normalized"
        );

        ctx.stage(ImportStage::Deduplicating);
        let dedupe = dedupe_benefits(normalized.candidates);
        let (enrollment_candidates, enrollment_dropped) =
            dedupe_enrollments(enrollment_candidates);
        self.summary.benefit_duplicates_dropped = dedupe.duplicates_dropped;
        self.summary.enrollment_duplicates_dropped = enrollment_dropped;
        self.summary.candidates = dedupe.candidate_count();
        self.summary.split_groups = dedupe.split_groups.len();
        let pool = EnrollmentPool::new(enrollment_candidates);
        info!(
            candidates = self.summary.candidates,
            split_groups = dedupe.split_groups.len(),
            benefit_duplicates = dedupe.duplicates_dropped,
            enrollment_duplicates = enrollment_dropped,
            enrollment_pool = pool.len(),
            "datasets deduplicated"
        );

        ctx.stage(ImportStage::Filtering);
        let policy = options.age_policy();
        let (eligible, overage) = filter_minors(dedupe.unique, &policy);
        info!(
            eligible = eligible.len(),
            rejected = overage.len(),
            reference = %policy.reference,
            age_limit = policy.age_limit,
            "eligibility filter applied"
        );
        for decision in overage {
            self.settle(decision).await?;
        }

        ctx.report(ImportReport::new(ImportStage::CrossReferencing).with_percentage(0.0));
        let total = eligible.len();
        for (idx, candidate) in eligible.into_iter().enumerate() {
            let outcome = resolve(&candidate, &pool, &policy);
            self.settle(Decision::new(candidate, outcome)).await?;
            let done = idx + 1;
            if done % PROGRESS_INTERVAL == 0 || done == total {
                ctx.report(
                    ImportReport::new(ImportStage::CrossReferencing)
                        .with_percentage(fraction(done, total))
                        .with_message(format!("{done} of {total} candidates cross-referenced")),
                );
            }
        }
        info!(
            accepted = self.summary.accepted(),
            rejected = self.summary.rejected(),
            "candidates cross-referenced"
        );

        ctx.stage(ImportStage::ResolvingDuplicates);
        for group in dedupe.split_groups {
            let outcomes = resolve_priority_group(&group, &pool, &policy);
            for (candidate, outcome) in group.claimants.into_iter().zip(outcomes) {
                self.settle(Decision::new(candidate, outcome)).await?;
            }
        }
        debug_assert_eq!(
            self.summary.accepted() + self.summary.rejected(),
            self.summary.candidates
        );

        self.persist().await?;

        let summary = self.summary;
        info!(
            grants = summary.grants_written,
            dependents = summary.dependents_granted,
            rejections = summary.audit_records(),
            "import completed"
        );
        ctx.report(
            ImportReport::new(ImportStage::Completed)
                .with_percentage(1.0)
                .with_message(format!(
                    "{} grants written, {} rows rejected",
                    summary.grants_written,
                    summary.audit_records()
                )),
        );
        Ok(summary)
    }

    /// Records the outcome of one candidate, auditing it if rejected.
    async fn settle(&mut self, decision: Decision) -> Result<()> {
        *self
            .summary
            .outcomes
            .entry(decision.outcome.kind())
            .or_default() += 1;
        if let Some(record) = decision.rejection() {
            debug!(
                line = decision.candidate.line,
                outcome = %decision.outcome.kind(),
                "candidate rejected"
            );
            return self.append(&record).await;
        }
        if let MatchOutcome::Accepted(dependent) = decision.outcome {
            self.book.accept(&decision.candidate, dependent);
        }
        Ok(())
    }

    async fn append(&mut self, record: &RejectionRecord) -> Result<()> {
        self.audit
            .append(record)
            .await
            .map_err(|source| ImportError::Audit {
                line: record.row.line,
                source,
            })
    }

    async fn persist(&mut self) -> Result<()> {
        let grants = std::mem::take(&mut self.book).into_grants();
        let total = grants.len();
        let batch_size = self.ctx.options.batch_size();
        self.ctx.report(ImportReport::new(ImportStage::Persisting).with_percentage(0.0));
        for batch in grants.chunks(batch_size) {
            for grant in batch {
                self.grants
                    .upsert(grant)
                    .await
                    .map_err(|source| ImportError::Persistence {
                        guardian_nid: grant.guardian_nid.clone(),
                        source,
                    })?;
                self.summary.grants_written += 1;
                self.summary.dependents_granted += grant.dependents.len();
            }
            let written = self.summary.grants_written;
            debug!(written, total, "grant batch persisted");
            self.ctx.report(
                ImportReport::new(ImportStage::Persisting)
                    .with_percentage(fraction(written, total))
                    .with_message(format!("{written} of {total} grants written")),
            );
        }
        Ok(())
    }
}

fn collect_rows<I>(first: Option<RawRow>, rest: I) -> Result<Vec<RawRow>>
where
    I: Iterator<Item = famrec_ingest::Result<RawRow>>,
{
    let Some(first) = first else {
        return Ok(Vec::new());
    };
    std::iter::once(Ok(first))
        .chain(rest)
        .collect::<std::result::Result<Vec<_>, IngestError>>()
        .map_err(source_error)
}

/// A source that reports missing columns itself (no data rows to check)
/// fails the same way as a bad first row.
fn source_error(error: IngestError) -> ImportError {
    match error {
        IngestError::MissingColumns { .. } => ImportError::Schema(error),
        other => ImportError::Source(other),
    }
}

fn fraction(done: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        done as f64 / total as f64
    }
}
