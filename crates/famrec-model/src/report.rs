use serde::{Deserialize, Serialize};

/// Stage of a tenant's import, as seen by pollers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStage {
    #[default]
    Idle,
    Validating,
    Normalizing,
    Deduplicating,
    Filtering,
    CrossReferencing,
    ResolvingDuplicates,
    Persisting,
    Completed,
    Failed,
}

impl ImportStage {
    /// True while a run is active in this stage.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Idle | Self::Completed | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Normalizing => "normalizing",
            Self::Deduplicating => "deduplicating",
            Self::Filtering => "filtering",
            Self::CrossReferencing => "cross_referencing",
            Self::ResolvingDuplicates => "resolving_duplicates",
            Self::Persisting => "persisting",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ImportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of an import's progress for one tenant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub stage: ImportStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Fraction of the current stage completed, in `0.0..=1.0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    pub in_progress: bool,
}

impl ImportReport {
    pub fn new(stage: ImportStage) -> Self {
        Self {
            stage,
            message: None,
            percentage: None,
            in_progress: stage.is_active(),
        }
    }

    /// Sets the fraction done, clamped to `0..=1`. Non-finite values clear it.
    #[must_use]
    pub fn with_percentage(mut self, percentage: f64) -> Self {
        self.percentage = percentage
            .is_finite()
            .then(|| percentage.clamp(0.0, 1.0));
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
