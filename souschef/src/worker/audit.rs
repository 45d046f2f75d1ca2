//! Audit worker.
//!
//! Records one structured line per completed recipe request. Auditing is
//! fire-and-forget and best-effort: producers never learn whether the record
//! was written, and a failing sink never disturbs request handling. The
//! worker is a single sequential consumer, so records are written in arrival
//! order without external locking.

use crate::recipe::RecipeRequest;
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default capacity of the audit record channel.
pub const DEFAULT_AUDIT_CHANNEL_CAPACITY: usize = 256;

/// A completed request/response pair to record.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    /// The request that was served.
    pub request: RecipeRequest,
    /// The generated response text.
    pub response: String,
}

/// Destination for audit lines.
///
/// The sink seam keeps the worker testable and lets deployments choose
/// between console and file output.
pub trait AuditSink: Send + Sync {
    /// Records one completed request.
    fn record(&self, timestamp: DateTime<Local>, record: &AuditRecord);
}

/// Sink that emits audit lines through `tracing`.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, timestamp: DateTime<Local>, record: &AuditRecord) {
        info!(
            timestamp = %timestamp.format("%Y-%m-%d %H:%M:%S"),
            query = %record.request.query,
            dietary = %record.request.dietary_preference,
            substitutions = record.request.need_substitutions,
            response_length = record.response.len(),
            "recipe served"
        );
    }
}

/// Sink that appends audit lines to a file, best-effort.
///
/// Write failures are logged and otherwise ignored.
pub struct FileAuditSink {
    path: PathBuf,
}

impl FileAuditSink {
    /// Creates a sink appending to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, timestamp: DateTime<Local>, record: &AuditRecord) {
        let line = format!(
            "[{}] query='{}' dietary='{}' substitutions={} response_length={}\n",
            timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.request.query,
            record.request.dietary_preference,
            record.request.need_substitutions,
            record.response.len(),
        );

        if let Err(e) = self.append(&line) {
            warn!(error = %e, path = %self.path.display(), "audit write failed");
        }
    }
}

/// The audit worker.
pub struct AuditWorker {
    record_rx: mpsc::Receiver<AuditRecord>,
    sink: Arc<dyn AuditSink>,
}

impl AuditWorker {
    /// Creates a worker recording through `tracing`.
    ///
    /// Returns the worker and a sender for producers. Producers should use
    /// `try_send`; auditing is best-effort.
    pub fn new() -> (Self, mpsc::Sender<AuditRecord>) {
        Self::with_sink(Arc::new(TracingAuditSink))
    }

    /// Creates a worker with a custom sink.
    pub fn with_sink(sink: Arc<dyn AuditSink>) -> (Self, mpsc::Sender<AuditRecord>) {
        let (record_tx, record_rx) = mpsc::channel(DEFAULT_AUDIT_CHANNEL_CAPACITY);
        (Self { record_rx, sink }, record_tx)
    }

    /// Runs the worker until shutdown is signalled or the channel closes.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("audit worker starting");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("audit worker shutting down");
                    break;
                }

                record = self.record_rx.recv() => {
                    match record {
                        Some(record) => self.sink.record(Local::now(), &record),
                        None => {
                            debug!("audit channel closed, audit worker stopping");
                            break;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Sink that captures records for inspection.
    pub(crate) struct CaptureSink {
        pub records: Mutex<Vec<AuditRecord>>,
    }

    impl CaptureSink {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                records: Mutex::new(Vec::new()),
            })
        }
    }

    impl AuditSink for CaptureSink {
        fn record(&self, _timestamp: DateTime<Local>, record: &AuditRecord) {
            self.records.lock().unwrap().push(record.clone());
        }
    }

    #[tokio::test]
    async fn test_records_reach_the_sink() {
        let sink = CaptureSink::new();
        let (worker, record_tx) = AuditWorker::with_sink(sink.clone());
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        tokio::spawn(async move { worker.run(token).await });

        record_tx
            .try_send(AuditRecord {
                request: RecipeRequest::new("chicken curry", "spicy", true),
                response: "Recipe text".to_string(),
            })
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].request.query, "chicken curry");
        assert_eq!(records[0].response.len(), 11);

        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_file_sink_appends_structured_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let sink = FileAuditSink::new(&path);

        sink.record(
            Local::now(),
            &AuditRecord {
                request: RecipeRequest::new("beef stew", "healthy", false),
                response: "12345".to_string(),
            },
        );

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("query='beef stew'"));
        assert!(contents.contains("dietary='healthy'"));
        assert!(contents.contains("substitutions=false"));
        assert!(contents.contains("response_length=5"));
    }

    #[test]
    fn test_file_sink_swallows_write_failures() {
        // A directory path cannot be opened for append; the record call must
        // still return normally.
        let dir = tempfile::tempdir().unwrap();
        let sink = FileAuditSink::new(dir.path());

        sink.record(
            Local::now(),
            &AuditRecord {
                request: RecipeRequest::new("soup", "none", false),
                response: String::new(),
            },
        );
    }
}
