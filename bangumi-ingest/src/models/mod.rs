//! Data models for bangumi-ingest
//!
//! - Ingestion state machine
//! - Per-record outcomes, stage statistics and the run report

pub mod ingest_report;
pub mod ingest_state;

pub use ingest_report::{FilterReason, IngestReport, RecordOutcome, StageStats};
pub use ingest_state::{IngestState, StateTransition};
