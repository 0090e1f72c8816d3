//! Integration tests for the crawler
//!
//! These tests use wiremock to stand up both the patent site and the search
//! index, and run the full crawl cycle end-to-end.

use patent_harvester::config::Config;
use patent_harvester::crawler::crawl;
use patent_harvester::HarvestError;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROOT_PATH: &str = "/patents-by-issue-date";

/// Creates a test configuration pointing at the mock site and index
fn create_test_config(site: &MockServer, index: &MockServer) -> Config {
    let mut config = Config::default();
    config.site.base_url = site.uri();
    config.site.root_path = ROOT_PATH.to_string();
    config.crawler.request_delay_ms = 0;
    config.index.endpoint = index.uri();
    config.index.failure_pause_secs = 0;
    config
}

fn listing_page(links: &[(&str, &str)]) -> String {
    let items: String = links
        .iter()
        .map(|(href, text)| format!(r#"<li><a href="{}">{}</a></li>"#, href, text))
        .collect();
    format!(
        r#"<html><body>
             <nav><a href="/about">About</a></nav>
             <ul class="list-columns-three">{}</ul>
           </body></html>"#,
        items
    )
}

fn results_page(details: &[&str], next: Option<&str>) -> String {
    let rows: String = details
        .iter()
        .map(|href| {
            format!(
                r#"<div class="has-padding-content-block"><strong><a href="{}">Patent</a></strong></div>"#,
                href
            )
        })
        .collect();
    let pagination = next
        .map(|href| {
            format!(
                r#"<div class="pagination"><a href="?page=0">previous</a> <a href="{}">next</a></div>"#,
                href
            )
        })
        .unwrap_or_default();
    format!(
        r#"<html><body><div id="search-results">{}</div>{}</body></html>"#,
        rows, pagination
    )
}

fn detail_page(number: &str, title: &str) -> String {
    format!(
        r#"<html><body>
             <h1 class="heading-1">{title}</h1>
             <div id="byline"><time datetime="2018-03-02">Mar 2, 2018</time>
               <a href="/assignee/acme">Acme Corp</a></div>
             <div id="abstract"><p>A device for {title}.</p></div>
             <table><tr><td><strong>Patent number:</strong> <span>{number}</span></td></tr>
                    <tr><td><strong>Date of Patent:</strong> <span>Jan 7, 2020</span></td></tr>
                    <tr><td><strong>Inventor:</strong> <a href="/inventor/1">Jane Roe</a></td></tr></table>
             <div id="claims"><div class="wrap"><p>1. A widget.</p></div></div>
           </body></html>"#,
        number = number,
        title = title
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_index(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(
            ResponseTemplate::new(status).set_body_string(r#"{"errors":false,"items":[]}"#),
        )
        .mount(server)
        .await;
}

/// Splits every bulk request received by the index into its NDJSON lines
async fn bulk_requests(index: &MockServer) -> Vec<Vec<Value>> {
    index
        .received_requests()
        .await
        .expect("request recording is enabled")
        .iter()
        .filter(|request| request.url.path() == "/_bulk")
        .map(|request| {
            String::from_utf8(request.body.clone())
                .expect("bulk body is UTF-8")
                .lines()
                .map(|line| serde_json::from_str(line).expect("bulk line is JSON"))
                .collect()
        })
        .collect()
}

#[tokio::test]
async fn test_full_crawl_single_issue_date() {
    let site = MockServer::start().await;
    let index = MockServer::start().await;

    mount_page(&site, ROOT_PATH, listing_page(&[("/patents-by-issue-date/2020", "2020")])).await;
    mount_page(
        &site,
        "/patents-by-issue-date/2020",
        listing_page(&[("/patents-by-issue-date/2020/01/07", "January 7")]),
    )
    .await;
    mount_page(
        &site,
        "/patents-by-issue-date/2020/01/07",
        results_page(&["/patent/10529001", "/patent/10529002"], None),
    )
    .await;
    mount_page(&site, "/patent/10529001", detail_page("10529001", "First widget")).await;
    mount_page(&site, "/patent/10529002", detail_page("10529002", "Second widget")).await;
    mount_index(&index, 200).await;

    let report = crawl(create_test_config(&site, &index))
        .await
        .expect("crawl should succeed");

    assert_eq!(report.pages_fetched, 5);
    assert_eq!(report.details_extracted, 2);
    assert_eq!(report.documents_submitted(), 2);
    assert_eq!(report.sink.batches_flushed, 1);

    let requests = bulk_requests(&index).await;
    assert_eq!(requests.len(), 1, "final partial batch is flushed exactly once");

    let lines = &requests[0];
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["update"]["_index"], "patents");
    assert_eq!(lines[0]["update"]["_id"], "10529001");
    assert_eq!(lines[2]["update"]["_id"], "10529002");

    let first = &lines[1]["doc"];
    assert_eq!(lines[1]["doc_as_upsert"], true);
    assert_eq!(first["title"], "First widget");
    assert_eq!(first["patent_number"], "10529001");
    assert_eq!(first["date_of_patent"], "2020-01-07");
    assert_eq!(first["filed"], "2018-03-02");
    assert_eq!(first["company"], "Acme Corp");
    assert_eq!(first["inventor"], "Jane Roe");
    assert!(first["url"].as_str().unwrap().ends_with("/patent/10529001"));
    assert_eq!(lines[3]["doc"]["title"], "Second widget");
}

#[tokio::test]
async fn test_self_referential_next_link_terminates() {
    let site = MockServer::start().await;
    let index = MockServer::start().await;
    let issue_path = "/patents-by-issue-date/2020/01/07";

    mount_page(&site, ROOT_PATH, listing_page(&[("/patents-by-issue-date/2020", "2020")])).await;
    mount_page(
        &site,
        "/patents-by-issue-date/2020",
        listing_page(&[(issue_path, "January 7")]),
    )
    .await;
    // `expect(1)` is verified when the server drops: the page is fetched once
    mount_page(&site, issue_path, results_page(&["/patent/1"], Some(issue_path))).await;
    mount_page(&site, "/patent/1", detail_page("1", "Looped widget")).await;
    mount_index(&index, 200).await;

    let report = crawl(create_test_config(&site, &index))
        .await
        .expect("crawl should terminate");

    assert_eq!(report.repeated_urls, 1);
    assert_eq!(report.documents_submitted(), 1);
}

#[tokio::test]
async fn test_missing_detail_page_is_skipped() {
    let site = MockServer::start().await;
    let index = MockServer::start().await;

    mount_page(&site, ROOT_PATH, listing_page(&[("/patents-by-issue-date/2020", "2020")])).await;
    mount_page(
        &site,
        "/patents-by-issue-date/2020",
        listing_page(&[("/patents-by-issue-date/2020/01/07", "January 7")]),
    )
    .await;
    mount_page(
        &site,
        "/patents-by-issue-date/2020/01/07",
        results_page(&["/patent/gone", "/patent/2"], None),
    )
    .await;
    mount_page(&site, "/patent/2", detail_page("2", "Surviving widget")).await;
    mount_index(&index, 200).await;

    let report = crawl(create_test_config(&site, &index))
        .await
        .expect("crawl should succeed");

    assert_eq!(report.fetch_failures, 1);
    assert_eq!(report.documents_submitted(), 1);

    let requests = bulk_requests(&index).await;
    assert_eq!(requests[0][0]["update"]["_id"], "2");
}

#[tokio::test]
async fn test_pagination_processed_page_then_row() {
    let site = MockServer::start().await;
    let index = MockServer::start().await;
    let issue_path = "/patents-by-issue-date/2020/01/07";
    let second_page = "/patents-by-issue-date/2020/01/07/page2";

    mount_page(&site, ROOT_PATH, listing_page(&[("/patents-by-issue-date/2020", "2020")])).await;
    mount_page(
        &site,
        "/patents-by-issue-date/2020",
        listing_page(&[(issue_path, "January 7")]),
    )
    .await;
    mount_page(&site, issue_path, results_page(&["/patent/1", "/patent/2"], Some(second_page))).await;
    mount_page(&site, second_page, results_page(&["/patent/3"], None)).await;
    mount_page(&site, "/patent/1", detail_page("1", "One")).await;
    mount_page(&site, "/patent/2", detail_page("2", "Two")).await;
    mount_page(&site, "/patent/3", detail_page("3", "Three")).await;
    mount_index(&index, 200).await;

    let mut config = create_test_config(&site, &index);
    config.index.batch_size = 2;

    let report = crawl(config).await.expect("crawl should succeed");
    assert_eq!(report.sink.batches_flushed, 2);

    let ids: Vec<Vec<String>> = bulk_requests(&index)
        .await
        .iter()
        .map(|lines| {
            lines
                .iter()
                .step_by(2)
                .map(|action| action["update"]["_id"].as_str().unwrap().to_string())
                .collect()
        })
        .collect();
    assert_eq!(ids, vec![vec!["1", "2"], vec!["3"]]);
}

#[tokio::test]
async fn test_failed_flush_does_not_stop_crawl() {
    let site = MockServer::start().await;
    let index = MockServer::start().await;

    mount_page(&site, ROOT_PATH, listing_page(&[("/patents-by-issue-date/2020", "2020")])).await;
    mount_page(
        &site,
        "/patents-by-issue-date/2020",
        listing_page(&[("/patents-by-issue-date/2020/01/07", "January 7")]),
    )
    .await;
    mount_page(
        &site,
        "/patents-by-issue-date/2020/01/07",
        results_page(&["/patent/1", "/patent/2"], None),
    )
    .await;
    mount_page(&site, "/patent/1", detail_page("1", "One")).await;
    mount_page(&site, "/patent/2", detail_page("2", "Two")).await;
    mount_index(&index, 503).await;

    let mut config = create_test_config(&site, &index);
    config.index.batch_size = 1;

    let report = crawl(config).await.expect("flush failures are absorbed");

    assert_eq!(report.details_extracted, 2);
    assert_eq!(report.documents_submitted(), 0);
    assert_eq!(report.sink.batches_failed, 2);
    assert_eq!(report.sink.documents_dropped, 2);
}

#[tokio::test]
async fn test_unavailable_root_fails_crawl() {
    let site = MockServer::start().await;
    let index = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ROOT_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&site)
        .await;
    mount_index(&index, 200).await;

    let result = crawl(create_test_config(&site, &index)).await;

    assert!(matches!(result, Err(HarvestError::RootUnavailable { .. })));
    assert!(bulk_requests(&index).await.is_empty());
}
