//! Integration tests for the downloader over real HTTP

use statute_harvest::catalog::{DocumentRecord, Group};
use statute_harvest::config::Config;
use statute_harvest::crawler::{Harvester, HttpTransport, Stage};
use statute_harvest::download::Downloader;
use statute_harvest::storage::Storage;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(data_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.output.data_dir = data_dir.path().to_path_buf();
    config.download.pacing_delay_ms = 20;
    config.download.backoff_base_ms = 10;
    config.download.timeout_secs = 1;
    config
}

fn downloader(config: &Config) -> Downloader {
    let transport = HttpTransport::new(&config.http).unwrap();
    Downloader::new(Arc::new(transport), config).unwrap()
}

fn record(server: &MockServer, title: &str, pdf_path: Option<&str>) -> DocumentRecord {
    DocumentRecord {
        webpage_link: format!("{}/{}/index.html", server.uri(), title.to_lowercase()),
        title: title.to_string(),
        description: String::new(),
        pdf_link: pdf_path.map(|p| format!("{}{}", server.uri(), p)),
    }
}

async fn mount_pdf(server: &MockServer, pdf_path: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(pdf_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_http_error_is_not_retried() {
    let mock_server = MockServer::start().await;
    mount_pdf(&mock_server, "/ao/AO.pdf", b"%PDF AO").await;
    Mock::given(method("GET"))
        .and(path("/gone/Gone.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let group = Group::new(
        "Teilliste_A",
        vec![
            record(&mock_server, "AO", Some("/ao/AO.pdf")),
            record(&mock_server, "Gone", Some("/gone/Gone.pdf")),
        ],
    );

    let report = downloader(&config).run(vec![group]).await.unwrap();

    assert_eq!(report.total_succeeded(), 1);
    assert_eq!(report.total_failed(), 1);
    let failure = report.failures().next().unwrap();
    assert!(failure.source_url.ends_with("/gone/Gone.pdf"));
    assert_eq!(failure.attempts, 1);
    assert!(failure.reason.contains("404"));
    assert!(dir.path().join("pdf").join("A").join("AO.pdf").is_file());
}

#[tokio::test]
async fn test_timeout_is_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow/Slow.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"late".to_vec())
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_pdf(&mock_server, "/slow/Slow.pdf", b"%PDF Slow").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let group = Group::new(
        "Teilliste_S",
        vec![record(&mock_server, "Slow", Some("/slow/Slow.pdf"))],
    );

    let report = downloader(&config).run(vec![group]).await.unwrap();

    assert!(report.is_clean());
    assert_eq!(
        std::fs::read(dir.path().join("pdf").join("S").join("Slow.pdf")).unwrap(),
        b"%PDF Slow"
    );
}

#[tokio::test]
async fn test_rerun_overwrites_artifacts() {
    let mock_server = MockServer::start().await;
    mount_pdf(&mock_server, "/bgb/BGB.pdf", b"first edition").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let group = Group::new(
        "Teilliste_B",
        vec![record(&mock_server, "BGB", Some("/bgb/BGB.pdf"))],
    );
    let dest = dir.path().join("pdf").join("B").join("BGB.pdf");

    downloader(&config).run(vec![group.clone()]).await.unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"first edition");

    mock_server.reset().await;
    mount_pdf(&mock_server, "/bgb/BGB.pdf", b"second edition").await;

    downloader(&config).run(vec![group]).await.unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"second edition");
}

#[tokio::test]
async fn test_download_stage_reads_stored_groups() {
    let mock_server = MockServer::start().await;
    mount_pdf(&mock_server, "/ao/AO.pdf", b"%PDF AO").await;
    mount_pdf(&mock_server, "/vwgo/VwGO.pdf", b"%PDF VwGO").await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir);
    config.site.base_url = mock_server.uri();
    let harvester = Harvester::from_config(config).unwrap();

    let storage = harvester.storage();
    storage
        .save_group(&Group::new(
            "Teilliste_V",
            vec![record(&mock_server, "VwGO", Some("/vwgo/VwGO.pdf"))],
        ))
        .unwrap();
    storage
        .save_group(&Group::new(
            "Teilliste_A",
            vec![
                record(&mock_server, "AO", Some("/ao/AO.pdf")),
                record(&mock_server, "AbgG", None),
            ],
        ))
        .unwrap();

    let outcome = harvester.run_from(Stage::Download, true).await.unwrap();
    assert!(outcome.crawl.is_none());

    let report = outcome.download.unwrap();
    let labels: Vec<_> = report.groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["A", "V"]);
    assert_eq!(report.total_succeeded(), 2);
    assert_eq!(report.total_skipped(), 1);
    assert_eq!(report.pacing_pauses, 1);

    let pdf = dir.path().join("pdf");
    assert!(pdf.join("A").join("AO.pdf").is_file());
    assert!(pdf.join("V").join("VwGO.pdf").is_file());

    // No catalog pages were fetched
    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
}
