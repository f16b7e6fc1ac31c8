//! Observability boundary.
//!
//! Orchestrator code reports through [`CallSink`] only; the per-manager
//! [`CallLog`] is the default sink.
pub mod sink;

pub use sink::{CallEvent, CallKind, CallLog, CallSink, OperationKind};

pub(crate) use sink::Recorder;
