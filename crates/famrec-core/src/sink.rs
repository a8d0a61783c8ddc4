//! Output collaborators of an import run.
//!
//! The pipeline awaits every call before issuing the next one, so the order
//! in which a sink observes records is exactly the order they were produced.

use std::collections::HashMap;
use std::future::Future;

use thiserror::Error;

use famrec_model::{Grant, RejectionRecord};

/// Failure reported by a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl SinkError {
    pub fn other(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(error))
    }
}

/// Persistence adapter for accepted grants.
///
/// Implementations must upsert by guardian national ID: the core may deliver
/// the same grant again when an import is retried.
pub trait GrantSink {
    fn upsert(&mut self, grant: &Grant) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Append-only destination for rejection records.
pub trait AuditSink {
    fn append(
        &mut self,
        record: &RejectionRecord,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// In-memory grant store keyed by guardian national ID.
#[derive(Debug, Default)]
pub struct MemoryGrantStore {
    grants: Vec<Grant>,
    index: HashMap<String, usize>,
    writes: usize,
}

impl MemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn get(&self, guardian_nid: &str) -> Option<&Grant> {
        self.index.get(guardian_nid).map(|&idx| &self.grants[idx])
    }

    /// Number of upsert calls received, including repeats.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl GrantSink for MemoryGrantStore {
    async fn upsert(&mut self, grant: &Grant) -> Result<(), SinkError> {
        self.writes += 1;
        match self.index.get(&grant.guardian_nid) {
            Some(&idx) => self.grants[idx] = grant.clone(),
            None => {
                self.index
                    .insert(grant.guardian_nid.clone(), self.grants.len());
                self.grants.push(grant.clone());
            }
        }
        Ok(())
    }
}

/// In-memory audit log preserving append order.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: Vec<RejectionRecord>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[RejectionRecord] {
        &self.records
    }
}

impl AuditSink for MemoryAuditLog {
    async fn append(&mut self, record: &RejectionRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(nid: &str, household_size: Option<u32>) -> Grant {
        Grant {
            guardian_nid: nid.to_string(),
            guardian_name: format!("GUARDIAN {nid}"),
            guardian_birthdate: None,
            family_code: None,
            household_size,
            dependents: Vec::new(),
        }
    }

    #[tokio::test]
    async fn upsert_replaces_by_guardian_nid() {
        let mut store = MemoryGrantStore::new();
        store.upsert(&grant("1", Some(3))).await.expect("first");
        store.upsert(&grant("2", None)).await.expect("second");
        store.upsert(&grant("1", Some(4))).await.expect("repeat");
        assert_eq!(store.writes(), 3);
        assert_eq!(store.grants().len(), 2);
        assert_eq!(store.get("1").map(|g| g.household_size), Some(Some(4)));
        assert_eq!(store.grants()[1].guardian_nid, "2");
    }
}
