//! # attendance-core
//!
//! Consolidation and cross-reference engine for clinic attendance workbooks.
//!
//! A workbook holds one sheet per day (`Dia 01`, `Dia 02`, ...) and may carry
//! a month marker in A1 of another sheet. This crate:
//! - loads the day sheets and the month ([`loader`])
//! - stacks them into one typed table with derived day, month and status
//!   fields ([`consolidate`])
//! - flags realized physician visits with no same-day technician visit for
//!   the same patient ([`matching`]) and aggregates them per provider ([`stats`])
//! - filters, summarizes and caches tables for dashboards ([`filter`], [`kpi`],
//!   [`selection`], [`cache`])
//! - writes the report workbook and charts ([`report`])

/// Consolidation cache keyed by file content.
pub mod cache;
/// Analysis configuration.
pub mod config;
/// Day-sheet consolidation.
pub mod consolidate;
/// Day label parsing.
pub mod day;
/// Error types and result aliases.
pub mod error;
/// Dashboard filters.
pub mod filter;
/// KPIs and breakdowns.
pub mod kpi;
/// Workbook loading.
pub mod loader;
/// Physician/technician cross-reference.
pub mod matching;
/// Batch runs.
pub mod pipeline;
/// Typed records.
pub mod record;
/// Report workbook and charts.
pub mod report;
/// Filter selection reducer.
pub mod selection;
/// Per-provider statistics.
pub mod stats;

pub use cache::ConsolidationCache;
pub use config::AnalysisConfig;
pub use consolidate::{consolidate, ConsolidatedTable};
pub use error::{AttendanceError, Result};
pub use filter::FilterCriteria;
pub use kpi::Kpis;
pub use loader::{load_bytes, load_path, load_workbook, LoadedWorkbook, WorkbookSource};
pub use matching::{cross_reference, CrossReference, MatchSummary, MatchedVisit};
pub use record::{AttendanceRecord, PatientId, StatusCategory, NOT_INFORMED};
pub use selection::{reduce, Catalog, SelectionEvent, SelectionState};
pub use stats::{provider_stats, ProviderStats};
