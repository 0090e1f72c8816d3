//! Run statistics and end-of-run reporting

/// Counters maintained by the batch sink
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Documents in bulk requests the index accepted
    pub documents_submitted: u64,

    /// Documents inside accepted requests that the index rejected individually
    pub documents_rejected: u64,

    /// Documents lost with a failed bulk request
    pub documents_dropped: u64,

    /// Bulk requests the index accepted
    pub batches_flushed: u64,

    /// Bulk requests that failed
    pub batches_failed: u64,
}

/// Summary of a complete crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Pages fetched successfully at any level
    pub pages_fetched: u64,

    /// Pages skipped because every fetch attempt failed
    pub fetch_failures: u64,

    /// Detail pages turned into documents
    pub details_extracted: u64,

    /// Documents skipped for lack of a patent or publication number
    pub missing_identity: u64,

    /// Links skipped because their page had already been visited
    pub repeated_urls: u64,

    /// Index-side counters
    pub sink: SinkStats,
}

impl CrawlReport {
    /// Total documents submitted to the index
    pub fn documents_submitted(&self) -> u64 {
        self.sink.documents_submitted
    }

    /// Returns the share of extracted documents that reached the index
    pub fn delivery_rate(&self) -> f64 {
        if self.details_extracted == 0 {
            return 0.0;
        }
        (self.sink.documents_submitted as f64 / self.details_extracted as f64) * 100.0
    }
}

/// Prints a report to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report to display
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Traversal:");
    println!("  Pages fetched: {}", report.pages_fetched);
    println!("  Pages skipped after fetch errors: {}", report.fetch_failures);
    println!("  Repeated links skipped: {}", report.repeated_urls);
    println!();

    println!("Extraction:");
    println!("  Detail pages extracted: {}", report.details_extracted);
    println!("  Missing patent/publication number: {}", report.missing_identity);
    println!();

    println!("Indexing:");
    println!("  Bulk requests accepted: {}", report.sink.batches_flushed);
    println!("  Bulk requests failed: {}", report.sink.batches_failed);
    println!("  Documents dropped with failed requests: {}", report.sink.documents_dropped);
    if report.sink.documents_rejected > 0 {
        println!("  Documents rejected by the index: {}", report.sink.documents_rejected);
    }
    println!();

    println!(
        "Total documents inserted: {} ({:.1}% of extracted)",
        report.documents_submitted(),
        report.delivery_rate()
    );
}
