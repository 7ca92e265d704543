//! End-to-end pipeline tests
//!
//! Enumeration runs against a scripted renderer whose cards link to a mock
//! server; details, CSV export and the SQLite load then run for real.

use listing_sweep::config::{Config, EnumeratorConfig, OutputConfig, SearchConfig};
use listing_sweep::crawler::{enumerate_listings, process_listings};
use listing_sweep::listing::Bucket;
use listing_sweep::output::{read_listings, RunStatistics};
use listing_sweep::render::{ScriptedCard, ScriptedRenderer};
use listing_sweep::storage::{RunStatus, SqliteStorage, Storage};
use listing_sweep::StopReason;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn card(pid: &str, price: u32, base: &str) -> ScriptedCard {
    ScriptedCard::new(
        pid,
        format!(
            r#"<div data-pid="{pid}">
                <a class="cl-app-anchor" href="{base}/apa/{pid}.html">listing {pid}</a>
                <span class="priceinfo">${price}</span>
                <div class="meta">2br<br><span class="post-sqft">850ft2</span><br>mission district</div>
            </div>"#
        ),
    )
}

fn detail_page(zip: &str, baths: u32) -> String {
    format!(
        r#"<html><body>
            <h2 class="street-address">1 Test St, San Francisco, CA {zip}</h2>
            <span class="attr important">2BR / {baths}Ba</span>
            <section id="postingbody">Quiet street.</section>
        </body></html>"#
    )
}

fn create_test_config(temp_dir: &TempDir) -> Config {
    let out = |name: &str| temp_dir.path().join(name).to_string_lossy().to_string();

    Config {
        search: SearchConfig {
            base_url: "https://listings.test/search/apa".to_string(),
            max_price: 1000,
            ..SearchConfig::default()
        },
        enumerator: EnumeratorConfig {
            settle_delay_ms: 0,
            ..EnumeratorConfig::default()
        },
        output: OutputConfig {
            listings_path: out("samples.csv"),
            merged_path: out("merged.csv"),
            database_path: Some(out("rentals.db")),
        },
        ..Config::default()
    }
}

fn bucket_url(config: &Config, min: u32, max: u32) -> String {
    config
        .search
        .bucket_url(&Bucket::new(min, max))
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_full_pipeline() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/apa/101.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("94110", 1)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/apa/102.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("94103", 2)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/apa/103.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&temp_dir);

    // 102 is re-rendered in the second window at its out-of-window price
    let renderer = ScriptedRenderer::new()
        .with_page(
            bucket_url(&config, 600, 800),
            vec![
                vec![card("101", 700, &base)],
                vec![card("101", 700, &base), card("102", 750, &base)],
            ],
        )
        .with_page(
            bucket_url(&config, 800, 1000),
            vec![vec![card("103", 950, &base), card("102", 750, &base)]],
        );

    let (renderer, listings, report) = enumerate_listings(&config, renderer).await.unwrap();

    assert_eq!(renderer.navigations().len(), 2);
    assert_eq!(report.buckets.len(), 2);
    assert_eq!(report.buckets[0].found, 2);
    assert_eq!(report.buckets[1].found, 1);
    assert!(report
        .buckets
        .iter()
        .all(|b| b.stop == StopReason::Exhausted));

    let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["101", "102", "103"]);
    assert_eq!(listings[0].square_feet, Some(850));
    assert_eq!(listings[0].neighborhood.as_deref(), Some("mission district"));

    // The listings file is written before details are fetched
    let written = read_listings(temp_dir.path().join("samples.csv").as_path()).unwrap();
    assert_eq!(written, listings);

    let stats = process_listings(
        &config,
        "test-hash",
        listings,
        false,
        RunStatistics {
            crawl: Some(report),
            ..RunStatistics::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(stats.listings, 3);
    assert_eq!(stats.details, 2);
    assert_eq!(stats.total_failures(), 1);
    assert_eq!(stats.merged_rows, 3);
    assert_eq!(stats.rows_with_detail, 2);
    assert_eq!(stats.stored_rows, Some(3));

    let merged = std::fs::read_to_string(temp_dir.path().join("merged.csv")).unwrap();
    let lines: Vec<&str> = merged.lines().collect();
    assert_eq!(
        lines[0],
        "pid,url,price,beds,sqft,hood,zip code,description,bathrooms"
    );
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("101,"));
    assert!(lines[1].ends_with(",94110,Quiet street.,1"));
    assert!(lines[3].starts_with("103,"));
    assert!(lines[3].ends_with("mission district,,,"));

    let storage = SqliteStorage::new(temp_dir.path().join("rentals.db").as_path()).unwrap();
    assert_eq!(storage.count_rentals().unwrap(), 3);

    let rental = storage.get_rental("102").unwrap().unwrap();
    assert_eq!(rental.price, 750);
    assert_eq!(rental.zip_code.as_deref(), Some("94103"));
    assert_eq!(rental.bathrooms, Some(2.0));

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
    assert_eq!(run.counts.listings_found, 3);
    assert_eq!(run.counts.details_fetched, 2);
    assert_eq!(run.counts.rows_loaded, 3);
}

#[tokio::test]
async fn test_skip_details_writes_null_detail_columns() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&temp_dir);
    config.output.database_path = None;

    let renderer = ScriptedRenderer::new().with_page(
        bucket_url(&config, 600, 800),
        vec![vec![card("201", 650, "http://127.0.0.1:9")]],
    );

    let (_, listings, report) = enumerate_listings(&config, renderer).await.unwrap();
    // The ceiling of 1000 ends the plan after the second bucket
    assert_eq!(report.buckets.len(), 2);
    assert_eq!(report.buckets[1].stop, StopReason::NoResults);

    let stats = process_listings(&config, "h", listings, true, RunStatistics::default())
        .await
        .unwrap();

    assert_eq!(stats.details, 0);
    assert_eq!(stats.total_failures(), 0);
    assert_eq!(stats.merged_rows, 1);
    assert_eq!(stats.rows_with_detail, 0);
    assert_eq!(stats.stored_rows, None);

    let merged = std::fs::read_to_string(temp_dir.path().join("merged.csv")).unwrap();
    let lines: Vec<&str> = merged.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].ends_with(",,,"));
}

#[tokio::test]
async fn test_no_results_still_writes_headers() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = create_test_config(&temp_dir);
    config.output.database_path = None;

    let (_, listings, report) = enumerate_listings(&config, ScriptedRenderer::new())
        .await
        .unwrap();

    assert!(listings.is_empty());
    assert_eq!(report.buckets.len(), 2);
    assert!(report
        .buckets
        .iter()
        .all(|b| b.stop == StopReason::NoResults));

    let stats = process_listings(&config, "h", listings, false, RunStatistics::default())
        .await
        .unwrap();
    assert_eq!(stats.merged_rows, 0);

    let samples = std::fs::read_to_string(temp_dir.path().join("samples.csv")).unwrap();
    assert_eq!(samples.trim_end(), "pid,url,price,beds,sqft,hood");
    let merged = std::fs::read_to_string(temp_dir.path().join("merged.csv")).unwrap();
    assert_eq!(
        merged.trim_end(),
        "pid,url,price,beds,sqft,hood,zip code,description,bathrooms"
    );
}
