//! Import options and the per-run context.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use famrec_ingest::DEFAULT_DATE_FORMAT;
use famrec_model::{ImportReport, ImportStage};

use crate::eligibility::{AgePolicy, DEFAULT_AGE_LIMIT};
use crate::progress::ProgressRegistry;

/// Default number of grants persisted between progress updates.
pub const DEFAULT_PERSIST_BATCH_SIZE: usize = 100;

/// Tunable behaviour of an import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportOptions {
    /// Dependents must be strictly younger than this many years.
    pub age_limit: u32,
    /// `chrono` format of birthdates in both datasets.
    pub date_format: String,
    /// Grants written per batch; progress is reported after each batch.
    pub persist_batch_size: usize,
    /// Processing date; defaults to today.
    pub as_of: Option<NaiveDate>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            age_limit: DEFAULT_AGE_LIMIT,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            persist_batch_size: DEFAULT_PERSIST_BATCH_SIZE,
            as_of: None,
        }
    }
}

impl ImportOptions {
    pub fn age_policy(&self) -> AgePolicy {
        let as_of = self.as_of.unwrap_or_else(|| Local::now().date_naive());
        AgePolicy::new(as_of, self.age_limit)
    }

    pub fn batch_size(&self) -> usize {
        self.persist_batch_size.max(1)
    }
}

/// Everything one import run needs besides its data and sinks.
#[derive(Debug, Clone)]
pub struct ImportContext {
    /// External identifier (city) the import belongs to.
    pub tenant: String,
    pub options: ImportOptions,
    pub progress: ProgressRegistry,
}

impl ImportContext {
    pub fn new(tenant: impl Into<String>, progress: ProgressRegistry) -> Self {
        Self {
            tenant: tenant.into(),
            options: ImportOptions::default(),
            progress,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    pub(crate) fn stage(&self, stage: ImportStage) {
        self.progress.set_report(&self.tenant, ImportReport::new(stage));
    }

    pub(crate) fn report(&self, report: ImportReport) {
        self.progress.set_report(&self.tenant, report);
    }
}
