//! Elasticsearch-compatible bulk upsert client
//!
//! Each entry becomes an `update` action with `doc_as_upsert`, so crawling the
//! same detail page twice converges on one document instead of duplicating it.

use crate::config::IndexConfig;
use crate::extract::PatentDocument;
use crate::output::traits::{BulkOutcome, FlushError, FlushResult, IndexClient, UpsertEntry};
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Serialize)]
struct UpdateAction<'a> {
    update: ActionMeta<'a>,
}

#[derive(Serialize)]
struct ActionMeta<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
    #[serde(rename = "_id")]
    id: &'a str,
}

#[derive(Serialize)]
struct UpsertBody<'a> {
    doc: &'a PatentDocument,
    doc_as_upsert: bool,
}

#[derive(Deserialize, Default)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// Client for the `_bulk` endpoint of an Elasticsearch-compatible index
pub struct ElasticsearchClient {
    client: Client,
    bulk_url: Url,
    index: String,
    username: Option<String>,
    password: Option<String>,
}

impl ElasticsearchClient {
    /// Builds a client for the configured endpoint and index
    ///
    /// # Returns
    ///
    /// * `Ok(ElasticsearchClient)` - Client ready to submit requests
    /// * `Err(HarvestError)` - The endpoint is not a valid URL or the HTTP
    ///   client could not be built
    pub fn new(config: &IndexConfig) -> Result<Self, HarvestError> {
        let mut endpoint = Url::parse(&config.endpoint)?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        let bulk_url = endpoint.join("_bulk")?;

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            bulk_url,
            index: config.name.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Returns the `_bulk` URL requests are posted to
    pub fn bulk_url(&self) -> &Url {
        &self.bulk_url
    }

    /// Encodes entries as a newline-delimited bulk request body
    ///
    /// Every entry contributes an action line and a document line; the body
    /// ends with a newline as the bulk API requires.
    pub fn encode_bulk_body(&self, entries: &[UpsertEntry]) -> FlushResult<String> {
        let mut body = String::new();

        for entry in entries {
            let action = UpdateAction {
                update: ActionMeta {
                    index: &self.index,
                    id: &entry.id,
                },
            };
            body.push_str(&serde_json::to_string(&action)?);
            body.push('\n');

            let upsert = UpsertBody {
                doc: &entry.document,
                doc_as_upsert: true,
            };
            body.push_str(&serde_json::to_string(&upsert)?);
            body.push('\n');
        }

        Ok(body)
    }
}

#[async_trait]
impl IndexClient for ElasticsearchClient {
    async fn bulk_upsert(&self, entries: &[UpsertEntry]) -> FlushResult<BulkOutcome> {
        let body = self.encode_bulk_body(entries)?;

        let mut request = self
            .client
            .post(self.bulk_url.clone())
            .header("content-type", "application/x-ndjson")
            .body(body);

        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(FlushError::Status {
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }

        let rejected = match serde_json::from_str::<BulkResponse>(&text) {
            Ok(parsed) if parsed.errors => count_rejected_items(&parsed.items),
            Ok(_) => 0,
            Err(e) => {
                tracing::debug!("Unreadable bulk response body: {}", e);
                0
            }
        };

        Ok(BulkOutcome {
            submitted: entries.len(),
            rejected,
        })
    }
}

/// Counts response items carrying an `error` object
fn count_rejected_items(items: &[serde_json::Value]) -> usize {
    items
        .iter()
        .filter(|item| {
            item.as_object()
                .and_then(|actions| actions.values().next())
                .and_then(|result| result.get("error"))
                .is_some()
        })
        .count()
}
