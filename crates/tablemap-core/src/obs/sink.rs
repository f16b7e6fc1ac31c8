//! Call sink boundary.
//!
//! Every manager operation and every store call it makes is recorded as a
//! [`CallEvent`]. Sinks only observe; they never influence the operation.
use parking_lot::Mutex;
use std::{fmt, sync::Arc};

///
/// OperationKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperationKind {
    Get,
    Create,
    Update,
    Delete,
    QueryFacet,
    QueryView,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::QueryFacet => "query_facet",
            Self::QueryView => "query_view",
        };
        write!(f, "{label}")
    }
}

///
/// CallKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CallKind {
    Get,
    Put,
    Delete,
    Query,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Query => "query",
        };
        write!(f, "{label}")
    }
}

///
/// CallEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CallEvent {
    OperationStart {
        operation: OperationKind,
        type_name: String,
    },
    StoreCall {
        kind: CallKind,
        table: String,
        index: Option<String>,
    },
    OperationFinish {
        operation: OperationKind,
        type_name: String,
        ok: bool,
    },
}

///
/// CallSink
///

pub trait CallSink: Send + Sync {
    fn record(&self, event: &CallEvent);
}

///
/// CallLog
///
/// Append-only event log shared by clones.
///

#[derive(Clone, Debug, Default)]
pub struct CallLog {
    events: Arc<Mutex<Vec<CallEvent>>>,
}

impl CallLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<CallEvent> {
        self.events.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Number of store calls recorded so far.
    #[must_use]
    pub fn store_calls(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, CallEvent::StoreCall { .. }))
            .count()
    }
}

impl CallSink for CallLog {
    fn record(&self, event: &CallEvent) {
        self.events.lock().push(event.clone());
    }
}

///
/// Recorder
///
/// Fans one event out to the manager's log and the optional external sink.
///

#[derive(Clone)]
pub(crate) struct Recorder {
    log: CallLog,
    sink: Option<Arc<dyn CallSink>>,
}

impl Recorder {
    pub(crate) const fn new(log: CallLog, sink: Option<Arc<dyn CallSink>>) -> Self {
        Self { log, sink }
    }

    pub(crate) fn record(&self, event: &CallEvent) {
        tracing::trace!(?event, "call event");

        self.log.record(event);
        if let Some(sink) = &self.sink {
            sink.record(event);
        }
    }
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("events", &self.log.len())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_log() {
        let log = CallLog::new();
        let shared = log.clone();

        shared.record(&CallEvent::OperationStart {
            operation: OperationKind::Get,
            type_name: "File".to_string(),
        });
        shared.record(&CallEvent::StoreCall {
            kind: CallKind::Get,
            table: "files".to_string(),
            index: None,
        });

        assert_eq!(log.len(), 2);
        assert_eq!(log.store_calls(), 1);
        assert_eq!(OperationKind::QueryFacet.to_string(), "query_facet");
    }
}
