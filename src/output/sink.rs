//! Batching sink between extraction and the search index
//!
//! Delivery is at-most-once: the buffer is cleared after every flush attempt,
//! and a batch whose bulk request fails is dropped rather than requeued. The
//! crawl keeps running through an index outage at the cost of those documents.

use crate::config::IndexConfig;
use crate::extract::PatentDocument;
use crate::output::stats::SinkStats;
use crate::output::traits::{IndexClient, UpsertEntry};
use crate::HarvestError;
use std::time::Duration;

/// Buffers documents and submits them in fixed-size bulk requests
pub struct BatchSink {
    client: Box<dyn IndexClient>,
    buffer: Vec<UpsertEntry>,
    batch_size: usize,
    failure_pause: Duration,
    stats: SinkStats,
}

impl BatchSink {
    /// Creates a sink
    ///
    /// # Arguments
    ///
    /// * `client` - The index receiving bulk requests
    /// * `batch_size` - Documents per request (at least 1)
    /// * `failure_pause` - How long to wait after a failed request
    pub fn new(client: Box<dyn IndexClient>, batch_size: usize, failure_pause: Duration) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            client,
            buffer: Vec::with_capacity(batch_size),
            batch_size,
            failure_pause,
            stats: SinkStats::default(),
        }
    }

    /// Creates a sink using the batch size and pause from the configuration
    pub fn from_config(client: Box<dyn IndexClient>, config: &IndexConfig) -> Self {
        Self::new(
            client,
            config.batch_size,
            Duration::from_secs(config.failure_pause_secs),
        )
    }

    /// Adds a document to the buffer, flushing when the batch is full
    ///
    /// The flush (including the pause after a failure) completes before this
    /// returns, so documents reach the index in the order they were appended.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The document was buffered (and possibly flushed)
    /// * `Err(HarvestError::MissingIdentity)` - The document has no id and was
    ///   not buffered
    pub async fn append(&mut self, document: PatentDocument) -> Result<(), HarvestError> {
        let entry = UpsertEntry::try_from(document)?;
        self.buffer.push(entry);

        if self.buffer.len() >= self.batch_size {
            self.flush().await;
        }

        Ok(())
    }

    /// Submits the whole buffer as one bulk request
    ///
    /// The buffer is empty afterwards whatever the outcome. A failed request is
    /// logged, its documents are counted as dropped, and the sink sleeps for
    /// the failure pause before returning. Failures never propagate.
    pub async fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let batch = std::mem::take(&mut self.buffer);
        let count = batch.len();

        match self.client.bulk_upsert(&batch).await {
            Ok(outcome) => {
                self.stats.batches_flushed += 1;
                self.stats.documents_submitted += count as u64;

                if outcome.rejected > 0 {
                    self.stats.documents_rejected += outcome.rejected as u64;
                    tracing::warn!(
                        "Bulk request accepted {} documents but the index rejected {}",
                        count,
                        outcome.rejected
                    );
                } else {
                    tracing::info!("Indexed {} documents", count);
                }
            }
            Err(e) => {
                self.stats.batches_failed += 1;
                self.stats.documents_dropped += count as u64;
                tracing::error!(
                    "Bulk insert of {} documents failed, dropping batch: {}",
                    count,
                    e
                );

                if !self.failure_pause.is_zero() {
                    tracing::info!("Pausing {:?} before continuing", self.failure_pause);
                    tokio::time::sleep(self.failure_pause).await;
                }
            }
        }
    }

    /// Flushes any partial final batch and returns the sink counters
    pub async fn drain(&mut self) -> SinkStats {
        if !self.buffer.is_empty() {
            tracing::info!("Final flush: {} documents", self.buffer.len());
            self.flush().await;
        }
        self.stats.clone()
    }

    /// Number of documents waiting for the next flush
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Configured batch size
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Counters so far
    pub fn stats(&self) -> &SinkStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::traits::{BulkOutcome, FlushError, FlushResult};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Records every bulk request; fails the ones whose index is listed
    #[derive(Clone, Default)]
    struct RecordingClient {
        calls: Arc<Mutex<Vec<Vec<String>>>>,
        failing_calls: Arc<Mutex<Vec<usize>>>,
    }

    impl RecordingClient {
        fn failing_on(calls: &[usize]) -> Self {
            let client = Self::default();
            client.failing_calls.lock().unwrap().extend_from_slice(calls);
            client
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IndexClient for RecordingClient {
        async fn bulk_upsert(&self, entries: &[UpsertEntry]) -> FlushResult<BulkOutcome> {
            let mut calls = self.calls.lock().unwrap();
            let call_index = calls.len();
            calls.push(entries.iter().map(|e| e.id.clone()).collect());

            if self.failing_calls.lock().unwrap().contains(&call_index) {
                return Err(FlushError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }

            Ok(BulkOutcome {
                submitted: entries.len(),
                rejected: 0,
            })
        }
    }

    fn doc(id: usize) -> PatentDocument {
        let mut document = PatentDocument::new(format!("https://example.com/patent/{}", id));
        document.id = Some(id.to_string());
        document
    }

    fn sink(client: &RecordingClient, batch_size: usize) -> BatchSink {
        BatchSink::new(Box::new(client.clone()), batch_size, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_full_batch_triggers_one_flush() {
        let client = RecordingClient::default();
        let mut sink = sink(&client, 5);

        for id in 0..5 {
            sink.append(doc(id)).await.unwrap();
        }

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], vec!["0", "1", "2", "3", "4"]);
        assert_eq!(sink.buffered(), 0);
        assert_eq!(sink.stats().documents_submitted, 5);
    }

    #[tokio::test]
    async fn test_below_threshold_does_not_flush() {
        let client = RecordingClient::default();
        let mut sink = sink(&client, 5);

        for id in 0..4 {
            sink.append(doc(id)).await.unwrap();
        }

        assert!(client.calls().is_empty());
        assert_eq!(sink.buffered(), 4);
    }

    #[tokio::test]
    async fn test_drain_flushes_partial_batch() {
        let client = RecordingClient::default();
        let mut sink = sink(&client, 5);

        for id in 0..4 {
            sink.append(doc(id)).await.unwrap();
        }
        let stats = sink.drain().await;

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 4);
        assert_eq!(stats.documents_submitted, 4);
        assert_eq!(stats.batches_flushed, 1);
        assert_eq!(sink.buffered(), 0);
    }

    #[tokio::test]
    async fn test_drain_empty_buffer_sends_nothing() {
        let client = RecordingClient::default();
        let mut sink = sink(&client, 5);

        let stats = sink.drain().await;

        assert!(client.calls().is_empty());
        assert_eq!(stats, SinkStats::default());
    }

    #[tokio::test]
    async fn test_failed_flush_clears_buffer_and_continues() {
        let client = RecordingClient::failing_on(&[0]);
        let mut sink = sink(&client, 2);

        sink.append(doc(1)).await.unwrap();
        sink.append(doc(2)).await.unwrap();
        assert_eq!(sink.buffered(), 0);

        sink.append(doc(3)).await.unwrap();
        assert_eq!(sink.buffered(), 1);
        sink.append(doc(4)).await.unwrap();

        let stats = sink.drain().await;
        let calls = client.calls();

        assert_eq!(calls, vec![vec!["1", "2"], vec!["3", "4"]]);
        assert_eq!(stats.batches_failed, 1);
        assert_eq!(stats.documents_dropped, 2);
        assert_eq!(stats.batches_flushed, 1);
        assert_eq!(stats.documents_submitted, 2);
    }

    #[tokio::test]
    async fn test_failed_flush_pauses() {
        let client = RecordingClient::failing_on(&[0]);
        let mut sink = BatchSink::new(Box::new(client.clone()), 1, Duration::from_millis(50));

        let started = std::time::Instant::now();
        sink.append(doc(1)).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(sink.buffered(), 0);
    }

    #[tokio::test]
    async fn test_missing_identity_is_not_buffered() {
        let client = RecordingClient::default();
        let mut sink = sink(&client, 1);

        let result = sink.append(PatentDocument::new("https://example.com/patent/none")).await;

        assert!(matches!(result, Err(HarvestError::MissingIdentity { .. })));
        assert_eq!(sink.buffered(), 0);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_clamped() {
        let client = RecordingClient::default();
        let mut sink = sink(&client, 0);

        assert_eq!(sink.batch_size(), 1);
        sink.append(doc(7)).await.unwrap();
        assert_eq!(client.calls().len(), 1);
    }
}
