//! Progress Reporter.
//!
//! A process-wide registry of the latest [`ImportReport`] per tenant. Each
//! tenant has its own slot lock, so writes for one tenant are serialised
//! while different tenants update concurrently. Writes replace the whole
//! report; nothing is merged and no history is kept.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::trace;

use famrec_model::{ImportReport, ImportStage};

type Slot = Arc<Mutex<ImportReport>>;

/// Cloneable handle to the shared progress registry.
#[derive(Debug, Clone, Default)]
pub struct ProgressRegistry {
    slots: Arc<RwLock<HashMap<String, Slot>>>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, tenant: &str) -> Slot {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tenant)
        {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(tenant.to_string()).or_default())
    }

    /// Replaces the stored report for `tenant`.
    pub fn set_report(&self, tenant: &str, report: ImportReport) {
        trace!(tenant, stage = %report.stage, percentage = ?report.percentage, "progress updated");
        let slot = self.slot(tenant);
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = report;
    }

    /// Replaces the stored report for `tenant` with a report for `stage`.
    pub fn set_stage(
        &self,
        tenant: &str,
        stage: ImportStage,
        percentage: Option<f64>,
        message: Option<String>,
    ) {
        let mut report = ImportReport::new(stage);
        if let Some(percentage) = percentage {
            report = report.with_percentage(percentage);
        }
        report.message = message;
        self.set_report(tenant, report);
    }

    /// Latest report for `tenant`, or the idle default when none exists.
    pub fn get_stage(&self, tenant: &str) -> ImportReport {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots
            .get(tenant)
            .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .unwrap_or_default()
    }

    /// Tenants that have reported at least once.
    pub fn tenants(&self) -> Vec<String> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        let mut tenants: Vec<String> = slots.keys().cloned().collect();
        tenants.sort();
        tenants
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn unknown_tenant_is_idle() {
        let registry = ProgressRegistry::new();
        let report = registry.get_stage("recife");
        assert_eq!(report.stage, ImportStage::Idle);
        assert!(!report.in_progress);
        assert!(registry.tenants().is_empty());
    }

    #[test]
    fn writes_replace_rather_than_merge() {
        let registry = ProgressRegistry::new();
        registry.set_stage(
            "recife",
            ImportStage::CrossReferencing,
            Some(0.5),
            Some("halfway".to_string()),
        );
        registry.set_stage("recife", ImportStage::Persisting, None, None);
        let report = registry.get_stage("recife");
        assert_eq!(report.stage, ImportStage::Persisting);
        assert_eq!(report.percentage, None);
        assert_eq!(report.message, None);
        assert!(report.in_progress);
    }

    #[test]
    fn nan_percentage_is_not_stored() {
        let registry = ProgressRegistry::new();
        registry.set_stage("recife", ImportStage::Persisting, Some(f64::NAN), None);
        assert_eq!(registry.get_stage("recife").percentage, None);
    }

    #[test]
    fn tenants_are_isolated_across_threads() {
        let registry = ProgressRegistry::new();
        let handles: Vec<_> = ["olinda", "recife", "caruaru"]
            .into_iter()
            .map(|tenant| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for step in 0..100 {
                        registry.set_stage(
                            tenant,
                            ImportStage::CrossReferencing,
                            Some(f64::from(step) / 100.0),
                            Some(tenant.to_string()),
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread");
        }
        assert_eq!(registry.tenants(), vec!["caruaru", "olinda", "recife"]);
        for tenant in registry.tenants() {
            let report = registry.get_stage(&tenant);
            assert_eq!(report.message.as_deref(), Some(tenant.as_str()));
            assert_eq!(report.percentage, Some(0.99));
        }
    }
}
