use shelfwatch::fetch::{HttpFetcher, HttpSettings};
use shelfwatch::jobs::index_audit::{self, IndexEstimate};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRODUCT_SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://www.rademar.ee/toode/1</loc></url>
  <url><loc>https://www.rademar.ee/toode/2</loc></url>
  <url><loc>https://www.rademar.ee/toode/3</loc></url>
</urlset>"#;

const CATEGORY_SITEMAP: &str = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://www.rademar.ee/naised</loc></url>
</urlset>"#;

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(&HttpSettings::default()).unwrap()
}

async fn serve_sitemaps(server: &MockServer) -> Vec<String> {
    Mock::given(method("GET"))
        .and(path("/google/product_sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_SITEMAP))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/google/category_sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATEGORY_SITEMAP))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/google/broken_sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<urlset><url>"))
        .mount(server)
        .await;

    ["product_sitemap.xml", "category_sitemap.xml", "broken_sitemap.xml", "missing.xml"]
        .iter()
        .map(|name| format!("{}/google/{}", server.uri(), name))
        .collect()
}

#[tokio::test]
async fn audit_reports_gap() {
    let server = MockServer::start().await;
    let sitemaps = serve_sitemaps(&server).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "site:rademar.ee"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><div id="result-stats">About 3 results<nobr> (0.21 seconds)</nobr></div></html>"#,
        ))
        .mount(&server)
        .await;

    let audit = index_audit::run(&fetcher(), &server.uri(), "rademar.ee", &sitemaps).await;

    let counts: Vec<_> = audit.sitemaps.iter().map(|s| s.count).collect();
    assert_eq!(counts, [Some(3), Some(1), None, None]);
    assert_eq!(audit.total(), 4);
    assert_eq!(audit.estimate, IndexEstimate::Count(3));
    assert_eq!(audit.gap(), Some(1));
    assert!(audit.report().contains("Indexing Gap: 1 pages are missing from search results."));
}

#[tokio::test]
async fn rate_limited_search_has_no_gap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let estimate = index_audit::indexed_count(&fetcher(), &server.uri(), "rademar.ee").await;
    assert_eq!(estimate, IndexEstimate::RateLimited);
    assert_eq!(estimate.to_string(), "Blocked by Google (Rate Limited)");
}

#[tokio::test]
async fn layout_without_result_stats() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><div id=\"search\"></div></html>"))
        .mount(&server)
        .await;

    let estimate = index_audit::indexed_count(&fetcher(), &server.uri(), "rademar.ee").await;
    assert_eq!(estimate, IndexEstimate::NotFound);
}

#[tokio::test]
async fn server_error_is_reported_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    match index_audit::indexed_count(&fetcher(), &server.uri(), "rademar.ee").await {
        IndexEstimate::Failed(msg) => assert!(msg.contains("503"), "{msg}"),
        other => panic!("expected failure, got {:?}", other),
    }
}
