//! Output module: delivering extracted documents to the search index
//!
//! This module handles:
//! - The `IndexClient` interface and its Elasticsearch `_bulk` implementation
//! - Buffering documents into fixed-size batches
//! - Counting what was submitted, dropped and rejected

mod elastic;
mod sink;
pub mod stats;
mod traits;

pub use elastic::ElasticsearchClient;
pub use sink::BatchSink;
pub use stats::{print_report, CrawlReport, SinkStats};
pub use traits::{BulkOutcome, FlushError, FlushResult, IndexClient, UpsertEntry};
