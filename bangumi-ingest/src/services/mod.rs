//! Ingestion services

pub mod ingest_orchestrator;
pub mod jsonl_reader;
pub mod label_resolver;
pub mod reference_index;

pub use ingest_orchestrator::{IngestFailure, IngestOrchestrator, IngestSettings};
pub use jsonl_reader::JsonLinesReader;
pub use label_resolver::{role_performance_label, LabelResolver};
pub use reference_index::{ReferenceIndex, ReferenceIndexBuilder};
