//! Crawler coordinator - main crawl orchestration logic
//!
//! This module walks the site hierarchy and feeds the batch sink:
//! - Root and year pages contribute links to the frontier
//! - Result pages dispatch every detail link straight to extraction, then
//!   queue their "next" page
//! - Detail pages are extracted and appended to the sink
//!
//! Every fetch and flush is awaited before the crawl moves on, so documents
//! reach the sink in discovery order.

use crate::config::{Config, CrawlerConfig, SelectorConfig};
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::frontier::{Frontier, Level, Task};
use crate::crawler::parser::{extract_links, find_next_link};
use crate::extract::{compile_selector, extract, CompiledSchema, Page};
use crate::output::{BatchSink, CrawlReport};
use crate::url::parse_http_url;
use crate::{ConfigError, HarvestError};
use scraper::Selector;
use std::time::Duration;
use url::Url;

/// Compiled selectors for the listing levels
struct ListingSelectors {
    year_links: Selector,
    issue_links: Selector,
    result_links: Selector,
    next_links: Selector,
    next_label: String,
}

impl ListingSelectors {
    fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            year_links: compile_selector(&config.year_links)?,
            issue_links: compile_selector(&config.issue_links)?,
            result_links: compile_selector(&config.result_links)?,
            next_links: compile_selector(&config.next_links)?,
            next_label: config.next_label.clone(),
        })
    }

    /// Selector for the links found on a page of the given level
    fn links_for(&self, level: Level) -> Option<&Selector> {
        match level {
            Level::Root => Some(&self.year_links),
            Level::Year => Some(&self.issue_links),
            Level::IssueDate => Some(&self.result_links),
            Level::Detail => None,
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    fetcher: Box<dyn Fetcher>,
    sink: BatchSink,
    schema: CompiledSchema,
    selectors: ListingSelectors,
    crawler: CrawlerConfig,
    root_url: Url,
    frontier: Frontier,
    report: CrawlReport,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `fetcher` - Source of page bodies
    /// * `sink` - Destination of extracted documents
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - The root URL or a selector is invalid
    pub fn new(config: &Config, fetcher: Box<dyn Fetcher>, sink: BatchSink) -> Result<Self, HarvestError> {
        let base_url = parse_http_url(&config.site.base_url)?;
        let root_url = base_url.join(&config.site.root_path)?;

        Ok(Self {
            fetcher,
            sink,
            schema: config.schema().compile()?,
            selectors: ListingSelectors::compile(&config.selectors)?,
            crawler: config.crawler.clone(),
            frontier: Frontier::new(root_url.clone()),
            root_url,
            report: CrawlReport::default(),
        })
    }

    /// Runs the crawl until the frontier is exhausted
    ///
    /// Failures below the root are logged and skipped. The sink is drained
    /// before returning, including when the root page cannot be fetched.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl ran to completion
    /// * `Err(HarvestError::RootUnavailable)` - The year index could not be fetched
    pub async fn run(mut self) -> Result<CrawlReport, HarvestError> {
        tracing::info!("Starting crawl at {}", self.root_url);
        let start_time = std::time::Instant::now();

        while let Some(task) = self.frontier.pop() {
            if !self.frontier.mark_visited(&task.url) {
                self.skip_repeated(&task);
                continue;
            }

            match task.level {
                Level::Root | Level::Year => {
                    if let Err(e) = self.crawl_index_page(&task).await {
                        if task.level == Level::Root {
                            self.sink.drain().await;
                            return Err(HarvestError::RootUnavailable {
                                url: task.url.to_string(),
                                source: e,
                            });
                        }
                        tracing::warn!("Skipping {:?} page {}: {}", task.level, task.url, e);
                    }
                }
                Level::IssueDate => self.crawl_result_page(&task.url).await,
                Level::Detail => self.process_detail(&task.url).await,
            }
        }

        self.report.sink = self.sink.drain().await;

        tracing::info!(
            "Crawl completed: {} pages fetched ({} distinct URLs), {} documents submitted in {:?}",
            self.report.pages_fetched,
            self.frontier.visited_count(),
            self.report.documents_submitted(),
            start_time.elapsed()
        );

        Ok(self.report)
    }

    /// Fetches a root or year page and queues its links
    async fn crawl_index_page(&mut self, task: &Task) -> Result<(), FetchError> {
        let body = self.fetch(&task.url).await.inspect_err(|_| {
            self.report.fetch_failures += 1;
        })?;

        let (child_level, links) = match (task.level.child(), self.selectors.links_for(task.level)) {
            (Some(child_level), Some(selector)) => {
                let page = Page::parse(&body);
                (child_level, extract_links(&page, selector, &task.url))
            }
            _ => return Ok(()),
        };

        tracing::info!(
            "Found {} {:?} links on {}",
            links.len(),
            child_level,
            task.url
        );
        self.frontier.push_children(child_level, links);
        Ok(())
    }

    /// Processes one page of results for an issue date
    ///
    /// Detail pages are processed in row order before the next page of results
    /// is queued, so documents are appended page-then-row.
    async fn crawl_result_page(&mut self, url: &Url) {
        let body = match self.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                self.report.fetch_failures += 1;
                tracing::warn!("Skipping result page {}: {}", url, e);
                return;
            }
        };

        let (details, next) = {
            let page = Page::parse(&body);
            (
                extract_links(&page, &self.selectors.result_links, url),
                find_next_link(
                    &page,
                    &self.selectors.next_links,
                    &self.selectors.next_label,
                    url,
                ),
            )
        };

        tracing::info!("Found {} results on {}", details.len(), url);

        for detail in details {
            if !self.frontier.mark_visited(&detail) {
                self.skip_repeated(&Task::new(Level::Detail, detail));
                continue;
            }
            self.process_detail(&detail).await;
        }

        if let Some(next) = next {
            tracing::debug!("Following next page {}", next);
            self.frontier.push(Task::new(Level::IssueDate, next));
        }
    }

    /// Fetches, extracts and appends a single detail page
    async fn process_detail(&mut self, url: &Url) {
        let body = match self.fetch_with_retry(url).await {
            Ok(body) => body,
            Err(e) => {
                self.report.fetch_failures += 1;
                tracing::warn!("Skipping detail page {}: {}", url, e);
                return;
            }
        };

        let document = {
            let page = Page::parse(&body);
            extract(&page, &self.schema, url.as_str())
        };
        self.report.details_extracted += 1;

        if let Err(e) = self.sink.append(document).await {
            self.report.missing_identity += 1;
            tracing::warn!("Skipping document: {}", e);
        }
    }

    /// Fetches a detail page, retrying transient failures
    async fn fetch_with_retry(&mut self, url: &Url) -> Result<String, FetchError> {
        let mut attempts_left = self.crawler.detail_retries;

        loop {
            match self.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempts_left > 0 => {
                    attempts_left -= 1;
                    tracing::debug!("Retrying {} after error: {}", url, e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Fetches a page after the configured politeness delay
    async fn fetch(&mut self, url: &Url) -> Result<String, FetchError> {
        if self.crawler.request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.crawler.request_delay_ms)).await;
        }

        tracing::debug!("Fetching {}", url);
        let body = self.fetcher.fetch(url).await?;
        self.report.pages_fetched += 1;

        if self.report.pages_fetched % 100 == 0 {
            tracing::info!(
                "Progress: {} pages fetched, {} documents buffered, {} submitted",
                self.report.pages_fetched,
                self.sink.buffered(),
                self.sink.stats().documents_submitted
            );
        }

        Ok(body)
    }

    fn skip_repeated(&mut self, task: &Task) {
        self.report.repeated_urls += 1;
        tracing::warn!("Skipping already visited {:?} page {}", task.level, task.url);
    }
}

/// Runs a complete crawl with the HTTP fetcher and Elasticsearch sink
///
/// This function orchestrates the entire crawl process:
///
/// 1. Build the HTTP fetcher and the index client
/// 2. Walk years, issue dates and result pages depth-first
/// 3. Extract every detail page and append it to the sink
/// 4. Flush the final partial batch
///
/// # Example
///
/// ```no_run
/// use patent_harvester::config::Config;
/// use patent_harvester::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default()).await?;
/// println!("Total documents inserted: {}", report.documents_submitted());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, HarvestError> {
    use crate::crawler::fetcher::HttpFetcher;
    use crate::output::ElasticsearchClient;

    let fetcher = HttpFetcher::new(&config.crawler)?;
    let client = ElasticsearchClient::new(&config.index)?;
    tracing::info!(
        "Indexing into '{}' at {} in batches of {}",
        config.index.name,
        client.bulk_url(),
        config.index.batch_size
    );

    let sink = BatchSink::from_config(Box::new(client), &config.index);
    let coordinator = Coordinator::new(&config, Box::new(fetcher), sink)?;
    coordinator.run().await
}
