//! Index client trait and the types that cross it
//!
//! This module defines the interface to the search index and the entries
//! submitted through it.

use crate::extract::PatentDocument;
use crate::HarvestError;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while submitting a bulk request
#[derive(Debug, Error)]
pub enum FlushError {
    #[error("Bulk request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Bulk request rejected with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to encode bulk request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for index operations
pub type FlushResult<T> = Result<T, FlushError>;

/// A document keyed for upsert
///
/// Only documents with an identity can become entries, so every bulk request
/// is keyed by a real patent or publication number.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertEntry {
    pub id: String,
    pub document: PatentDocument,
}

impl TryFrom<PatentDocument> for UpsertEntry {
    type Error = HarvestError;

    fn try_from(document: PatentDocument) -> Result<Self, Self::Error> {
        match document.id.clone() {
            Some(id) if !id.is_empty() => Ok(Self { id, document }),
            _ => Err(HarvestError::MissingIdentity { url: document.url }),
        }
    }
}

/// What the index reported for an accepted bulk request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Entries sent in the request
    pub submitted: usize,

    /// Entries the index reported as individually failed
    pub rejected: usize,
}

/// Trait for search index clients
///
/// A bulk request succeeds or fails as a whole; per-item failures inside an
/// accepted request are only reported through [`BulkOutcome::rejected`].
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Submits one insert-or-update operation per entry, in order
    ///
    /// # Arguments
    ///
    /// * `entries` - The documents to upsert, keyed by id
    async fn bulk_upsert(&self, entries: &[UpsertEntry]) -> FlushResult<BulkOutcome>;
}
