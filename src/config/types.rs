use crate::extract::{FieldRule, Schema};
use serde::Deserialize;

/// Main configuration structure for Patent-Harvester
///
/// Every section has defaults, so an empty file (or no file at all) targets
/// patents.justia.com and a local Elasticsearch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub index: IndexConfig,
    /// Extraction rules overriding the built-in patent schema
    #[serde(default)]
    pub schema: Vec<FieldRule>,
}

impl Config {
    /// Returns the configured extraction schema, or the built-in one
    pub fn schema(&self) -> Schema {
        if self.schema.is_empty() {
            Schema::patents()
        } else {
            Schema::new(self.schema.clone())
        }
    }
}

/// Site being crawled
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host of the site
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Path of the year index page
    #[serde(rename = "root-path", default = "default_root_path")]
    pub root_path: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Extra attempts for a detail page whose fetch failed
    #[serde(rename = "detail-retries", default = "default_detail_retries")]
    pub detail_retries: u32,

    /// Fixed pause before each request (milliseconds)
    #[serde(rename = "request-delay-ms", default)]
    pub request_delay_ms: u64,
}

/// CSS selectors used while walking the listing pages
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// Year links on the root index
    #[serde(rename = "year-links", default = "default_list_links")]
    pub year_links: String,

    /// Issue-date links on a year page
    #[serde(rename = "issue-links", default = "default_list_links")]
    pub issue_links: String,

    /// Detail links on a result page
    #[serde(rename = "result-links", default = "default_result_links")]
    pub result_links: String,

    /// Candidate pagination links on a result page
    #[serde(rename = "next-links", default = "default_next_links")]
    pub next_links: String,

    /// Text identifying the "next" pagination link (case-insensitive)
    #[serde(rename = "next-label", default = "default_next_label")]
    pub next_label: String,
}

/// Search index configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Base URL of the Elasticsearch-compatible endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Index receiving the documents
    #[serde(default = "default_index_name")]
    pub name: String,

    /// Documents per bulk request
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause after a failed bulk request (seconds)
    #[serde(rename = "failure-pause-secs", default = "default_failure_pause")]
    pub failure_pause_secs: u64,

    /// Basic-auth user name
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password
    #[serde(default)]
    pub password: Option<String>,
}

fn default_base_url() -> String {
    "https://patents.justia.com".to_string()
}

fn default_root_path() -> String {
    "/patents-by-issue-date".to_string()
}

fn default_user_agent() -> String {
    format!("patent-harvester/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_detail_retries() -> u32 {
    1
}

fn default_list_links() -> String {
    "ul.list-columns-three a".to_string()
}

fn default_result_links() -> String {
    "#search-results a".to_string()
}

fn default_next_links() -> String {
    ".pagination a".to_string()
}

fn default_next_label() -> String {
    "next".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:9200".to_string()
}

fn default_index_name() -> String {
    "patents".to_string()
}

fn default_batch_size() -> usize {
    100
}

fn default_failure_pause() -> u64 {
    300
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            root_path: default_root_path(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            detail_retries: default_detail_retries(),
            request_delay_ms: 0,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            year_links: default_list_links(),
            issue_links: default_list_links(),
            result_links: default_result_links(),
            next_links: default_next_links(),
            next_label: default_next_label(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            name: default_index_name(),
            batch_size: default_batch_size(),
            failure_pause_secs: default_failure_pause(),
            username: None,
            password: None,
        }
    }
}
