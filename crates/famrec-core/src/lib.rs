//! Family/dependent reconciliation engine.
//!
//! Cross-references a benefit-registry extract against a school-enrollment
//! extract, deciding for every benefit row whether its dependent is granted
//! to the guardian or rejected, and streaming each rejection to an audit
//! sink as it is found.

pub mod decision;
pub mod dedupe;
pub mod duplicates;
pub mod eligibility;
pub mod error;
pub mod grants;
pub mod matcher;
pub mod options;
pub mod pipeline;
pub mod progress;
pub mod resolver;
pub mod sink;

pub use decision::Decision;
pub use dedupe::{BenefitDedupe, SplitGroup, dedupe_benefits, dedupe_by_key, dedupe_enrollments};
pub use duplicates::resolve_priority_group;
pub use eligibility::{AgePolicy, AgeStatus, DEFAULT_AGE_LIMIT, filter_minors, start_of_month};
pub use error::{ImportError, Result};
pub use grants::GrantBook;
pub use matcher::{NameKey, names_match, normalize_name};
pub use options::{DEFAULT_PERSIST_BATCH_SIZE, ImportContext, ImportOptions};
pub use pipeline::{ImportSummary, run_import};
pub use progress::ProgressRegistry;
pub use resolver::{EnrollmentPool, accept_if_minor, describe_guardians, resolve};
pub use sink::{AuditSink, GrantSink, MemoryAuditLog, MemoryGrantStore, SinkError};
