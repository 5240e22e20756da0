//! Persistent state: the feature table, the failure log, and the resume ledger derived from them.

pub mod csv;
mod ledger;
mod sink;

pub use ledger::ResumeLedger;
pub use sink::{feature_record, FailureSink, ResultSink};
