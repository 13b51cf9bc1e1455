//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a small statute catalog and run the
//! stages end-to-end against it.

use statute_harvest::catalog::DocumentRecord;
use statute_harvest::config::Config;
use statute_harvest::crawler::{Harvester, Stage};
use statute_harvest::storage::Storage;
use statute_harvest::HarvestError;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str, data_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.output.data_dir = data_dir.path().to_path_buf();
    config.download.pacing_delay_ms = 20;
    config.download.backoff_base_ms = 10;
    config.download.timeout_secs = 5;
    config
}

async fn mount_html(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, page: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

const INDEX: &str = r#"<html><body>
    <div id="nav_2022"><ul>
        <li><a href="aktuell.html">Gesetze / Verordnungen</a></li>
        <li><a href="titelsuche.html">Titelsuche</a></li>
    </ul></div>
</body></html>"#;

const GROUP_INDEX: &str = r#"<html><body>
    <div id="content_2022"><div id="paddingLR12">
        <a href="./Teilliste_A.html">A</a>
        <a href="./Teilliste_B.html">B</a>
        <a href="./Teilliste_1.html">1</a>
    </div></div>
</body></html>"#;

const GROUP_A: &str = r#"<html><body>
    <div id="content_2022"><div id="paddingLR12">
        <p><a href="ao_1977/index.html"><abbr title="Abgabenordnung">AO</abbr></a>
           <a href="ao_1977/AO.pdf" title="PDF-Datei zum Herunterladen">PDF</a></p>
        <p><a href="aktg/index.html"><abbr title="Aktiengesetz">AktG</abbr></a></p>
    </div></div>
</body></html>"#;

const GROUP_B: &str = r#"<html><body>
    <div id="content_2022"><div id="paddingLR12">
        <p><a href="bgb/index.html"><abbr title="Bürgerliches Gesetzbuch">BGB</abbr></a>
           <a href="bgb/BGB.pdf" title="PDF">PDF</a></p>
    </div></div>
</body></html>"#;

const GROUP_1: &str = r#"<html><body>
    <div id="content_2022"><div id="paddingLR12">
        <p><a href="1-dm-goldm_nzg/index.html"><abbr title="Gesetz über Goldmünzen">1-DM-GoldMüG</abbr></a>
           <a href="1-dm-goldm_nzg/1-DM-GoldM_nzG.pdf" title="PDF">PDF</a></p>
    </div></div>
</body></html>"#;

async fn mount_catalog(server: &MockServer) {
    mount_html(server, "/", INDEX).await;
    mount_html(server, "/aktuell.html", GROUP_INDEX).await;
    mount_html(server, "/Teilliste_A.html", GROUP_A).await;
    mount_html(server, "/Teilliste_B.html", GROUP_B).await;
    mount_html(server, "/Teilliste_1.html", GROUP_1).await;
}

#[tokio::test]
async fn test_full_harvest() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    for (pdf, body) in [
        ("/ao_1977/AO.pdf", "%PDF AO"),
        ("/bgb/BGB.pdf", "%PDF BGB"),
        ("/1-dm-goldm_nzg/1-DM-GoldM_nzG.pdf", "%PDF Gold"),
    ] {
        Mock::given(method("GET"))
            .and(path(pdf))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.as_bytes()))
            .mount(&mock_server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir);
    let harvester = Harvester::from_config(config).unwrap();

    let outcome = harvester.run_from(Stage::Index, true).await.unwrap();

    let crawl = outcome.crawl.unwrap();
    assert_eq!(crawl.groups_attempted, 3);
    assert_eq!(crawl.groups_succeeded, 3);
    assert_eq!(crawl.records_found, 4);
    assert_eq!(crawl.artifacts_linked, 3);

    let report = outcome.download.unwrap();
    assert_eq!(report.total_succeeded(), 3);
    assert_eq!(report.total_skipped(), 1);
    assert_eq!(report.pacing_pauses, 2);
    assert!(report.is_clean());

    let data = dir.path();
    assert!(data.join("home_page_list.json").is_file());
    assert!(data.join("laws_list.json").is_file());
    assert!(data.join("laws_list_by_alphabet").join("Teilliste_A.json").is_file());

    let catalog = harvester.storage().load_catalog().unwrap();
    let titles: Vec<_> = catalog.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["AO", "AktG", "BGB", "1-DM-GoldMüG"]);
    assert_eq!(
        catalog[0],
        DocumentRecord {
            webpage_link: format!("{}/ao_1977/index.html", mock_server.uri()),
            title: "AO".to_string(),
            description: "Abgabenordnung".to_string(),
            pdf_link: Some(format!("{}/ao_1977/AO.pdf", mock_server.uri())),
        }
    );

    let pdf = data.join("pdf");
    assert_eq!(std::fs::read(pdf.join("A").join("AO.pdf")).unwrap(), b"%PDF AO");
    assert_eq!(std::fs::read(pdf.join("B").join("BGB.pdf")).unwrap(), b"%PDF BGB");
    assert!(pdf.join("1").join("1-DM-GoldMüG.pdf").is_file());
    assert!(!pdf.join("A").join("AktG.pdf").exists());
}

#[tokio::test]
async fn test_index_without_navigation_is_fatal() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", "<html><body><p>Wartungsarbeiten</p></body></html>").await;

    let dir = TempDir::new().unwrap();
    let harvester =
        Harvester::from_config(create_test_config(&mock_server.uri(), &dir)).unwrap();

    let err = harvester.run_from(Stage::Index, true).await.unwrap_err();
    assert!(err.is_structure_missing());
    assert!(!dir.path().join("home_page_list.json").exists());
}

#[tokio::test]
async fn test_index_server_error_is_fatal() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/", 503).await;

    let dir = TempDir::new().unwrap();
    let harvester =
        Harvester::from_config(create_test_config(&mock_server.uri(), &dir)).unwrap();

    let err = harvester.run_from(Stage::Index, false).await.unwrap_err();
    assert!(matches!(err, HarvestError::Fetch(_)));
}

#[tokio::test]
async fn test_partial_group_failure() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", INDEX).await;
    mount_html(&mock_server, "/aktuell.html", GROUP_INDEX).await;
    mount_html(&mock_server, "/Teilliste_A.html", GROUP_A).await;
    mount_status(&mock_server, "/Teilliste_B.html", 500).await;
    mount_html(&mock_server, "/Teilliste_1.html", "<html><body>umgebaut</body></html>").await;

    let dir = TempDir::new().unwrap();
    let harvester =
        Harvester::from_config(create_test_config(&mock_server.uri(), &dir)).unwrap();

    let outcome = harvester.run_from(Stage::Index, false).await.unwrap();
    let crawl = outcome.crawl.unwrap();

    assert_eq!(crawl.groups_succeeded, 1);
    assert_eq!(
        crawl.failed_groups,
        vec!["Teilliste_1".to_string(), "Teilliste_B".to_string()]
    );
    assert_eq!(crawl.records_found, 2);
    assert!(outcome.download.is_none());

    let storage = harvester.storage();
    assert_eq!(storage.list_groups().unwrap(), vec!["Teilliste_A.json"]);
    assert_eq!(storage.load_catalog().unwrap().len(), 2);
}

#[tokio::test]
async fn test_rerun_details_overwrites_groups() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let harvester =
        Harvester::from_config(create_test_config(&mock_server.uri(), &dir)).unwrap();
    harvester.run_from(Stage::Index, false).await.unwrap();

    // Only the detail pages are needed from here on
    mock_server.reset().await;
    mount_html(&mock_server, "/Teilliste_A.html", GROUP_A).await;
    mount_html(&mock_server, "/Teilliste_B.html", GROUP_B).await;
    mount_html(&mock_server, "/Teilliste_1.html", GROUP_1).await;

    let outcome = harvester.run_from(Stage::Details, false).await.unwrap();
    assert_eq!(outcome.crawl.unwrap().groups_succeeded, 3);

    let catalog = harvester.storage().load_catalog().unwrap();
    assert_eq!(catalog.len(), 4);

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 3);
    assert!(received.iter().all(|r| r.url.path() != "/"));
}
