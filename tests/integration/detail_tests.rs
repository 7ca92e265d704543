//! Detail fetcher tests against a mock HTTP server

use listing_sweep::config::DetailsConfig;
use listing_sweep::crawler::{DetailFetcher, FailureReason};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn detail_page(zip: &str) -> String {
    format!(
        r#"<html><body>
            <h2 class="street-address">1 Test St, San Francisco, CA {zip}</h2>
            <span class="attr important">2BR / 1Ba</span>
            <section id="postingbody">Listing in {zip}</section>
        </body></html>"#
    )
}

fn details_config(max_workers: usize, timeout_secs: u64) -> DetailsConfig {
    DetailsConfig {
        max_workers: Some(max_workers),
        request_timeout_secs: timeout_secs,
        ..DetailsConfig::default()
    }
}

#[tokio::test]
async fn test_worker_cap_bounds_concurrency() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(detail_page("94110"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(12)
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = (0..12)
        .map(|i| format!("{}/apa/{}.html", mock_server.uri(), i))
        .collect();

    let fetcher = DetailFetcher::new(&details_config(3, 10)).unwrap();
    let started = Instant::now();
    let batch = fetcher.fetch_all(urls).await;
    let elapsed = started.elapsed();

    assert_eq!(batch.details.len(), 12);
    assert!(batch.failures.is_empty());
    // 12 requests at 200ms with 3 in flight need at least four waves
    assert!(
        elapsed >= Duration::from_millis(750),
        "finished too fast for a cap of 3: {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_details_keep_their_own_url_under_worker_cap() {
    let mock_server = MockServer::start().await;

    // Earlier paths answer slower, so completions arrive out of input order
    for i in 0..10u64 {
        Mock::given(method("GET"))
            .and(path(format!("/apa/{}.html", i)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(detail_page(&format!("9410{}", i)))
                    .set_delay(Duration::from_millis((10 - i) * 30)),
            )
            .mount(&mock_server)
            .await;
    }

    let base = mock_server.uri();
    let urls: Vec<String> = (0..10)
        .map(|i| format!("{}/apa/{}.html", base, i))
        .collect();

    let fetcher = DetailFetcher::new(&details_config(3, 10)).unwrap();
    let batch = fetcher.fetch_all(urls.clone()).await;

    assert_eq!(batch.details.len(), 10);
    assert!(batch.failures.is_empty());

    let completion_order: Vec<&str> = batch.details.iter().map(|d| d.url.as_str()).collect();
    assert_ne!(completion_order, urls.iter().map(String::as_str).collect::<Vec<_>>());

    for i in 0..10 {
        let url = format!("{}/apa/{}.html", base, i);
        let detail = batch
            .details
            .iter()
            .find(|d| d.url == url)
            .unwrap_or_else(|| panic!("no detail for {}", url));
        let expected_zip = format!("9410{}", i);
        assert_eq!(detail.zip_code.as_deref(), Some(expected_zip.as_str()));
        assert_eq!(detail.description, format!("Listing in {}", expected_zip));
    }
}

#[tokio::test]
async fn test_server_error_is_isolated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apa/bad.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("94117")))
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let urls = vec![
        format!("{}/apa/1.html", base),
        format!("{}/apa/bad.html", base),
        format!("{}/apa/2.html", base),
    ];

    let fetcher = DetailFetcher::new(&details_config(2, 10)).unwrap();
    let batch = fetcher.fetch_all(urls).await;

    assert_eq!(batch.details.len(), 2);
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].url, format!("{}/apa/bad.html", base));
    assert_eq!(batch.failures[0].reason, FailureReason::HttpStatus(500));

    for detail in &batch.details {
        assert_eq!(detail.zip_code.as_deref(), Some("94117"));
        assert_eq!(detail.bathrooms, Some(1));
        assert_eq!(detail.description, "Listing in 94117");
    }
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apa/slow.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(detail_page("94110"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/apa/fast.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("94110")))
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let fetcher = DetailFetcher::new(&details_config(4, 1)).unwrap();
    let batch = fetcher
        .fetch_all(vec![
            format!("{}/apa/slow.html", base),
            format!("{}/apa/fast.html", base),
        ])
        .await;

    assert_eq!(batch.details.len(), 1);
    assert_eq!(batch.details[0].url, format!("{}/apa/fast.html", base));
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].reason, FailureReason::Timeout);
}

#[tokio::test]
async fn test_duplicate_urls_fetched_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apa/1.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("94110")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/apa/1.html", mock_server.uri());
    let fetcher = DetailFetcher::new(&details_config(4, 10)).unwrap();
    let batch = fetcher
        .fetch_all(vec![url.clone(), url.clone(), url])
        .await;

    assert_eq!(batch.len(), 1);
    assert_eq!(batch.details.len(), 1);
}

#[tokio::test]
async fn test_requests_carry_configured_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", "sweep-test-agent/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("94110")))
        .mount(&mock_server)
        .await;

    let config = DetailsConfig {
        user_agents: vec!["sweep-test-agent/1.0".to_string()],
        ..details_config(2, 10)
    };
    let fetcher = DetailFetcher::new(&config).unwrap();
    let batch = fetcher
        .fetch_all(vec![format!("{}/apa/1.html", mock_server.uri())])
        .await;

    // An unmatched request would get wiremock's 404
    assert_eq!(batch.details.len(), 1);
    assert!(batch.failures.is_empty());
}
