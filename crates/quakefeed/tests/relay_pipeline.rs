//! End-to-end dispatch tests for the relay deployment, with the messaging
//! gateway mocked.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quakefeed::{DispatchSummary, Pipeline, PipelineError};
use quakefeed_sinks::ChannelClient;

const GOOD_ROW: &str =
    r#"2024-01-01,12:00:00,19.4,-99.1,10.0,4.5,"CDMX, Mexico",2024-01-01,18:00:00"#;

async fn relay_pipeline(server: &MockServer) -> Pipeline {
    Mock::given(method("GET"))
        .and(path("/newsletters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "newsletters": [{ "id": "222@newsletter", "name": "Alertas" }]
        })))
        .mount(server)
        .await;

    let client = ChannelClient::new(server.uri(), "test-token");
    let channel = client.resolve_channel("Alertas").await.unwrap();
    Pipeline::relay(client, channel)
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn two_line_bulletin_produces_one_formatted_message() {
    let server = MockServer::start().await;
    let pipeline = relay_pipeline(&server).await;
    Mock::given(method("POST"))
        .and(path("/messages/text"))
        .and(body_string_contains("Magnitud: 4.5"))
        .and(body_string_contains("CDMX, Mexico"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "boletin.csv", &format!("header\n{GOOD_ROW}\n"));

    let summary = pipeline.dispatch(&file).await.unwrap();
    assert_eq!(
        summary,
        DispatchSummary {
            sent: 1,
            skipped_rows: 1, // the non-record "header" line
            failed_sends: 0,
        }
    );
}

#[tokio::test]
async fn time_remnant_header_is_skipped_silently() {
    let server = MockServer::start().await;
    let pipeline = relay_pipeline(&server).await;
    Mock::given(method("POST"))
        .and(path("/messages/text"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "boletin.csv", &format!("12:00:05\n{GOOD_ROW}\n"));

    let summary = pipeline.dispatch(&file).await.unwrap();
    // The stray time stamp is a header remnant, not a malformed row.
    assert_eq!(summary.skipped_rows, 0);
    assert_eq!(summary.sent, 1);
}

#[tokio::test]
async fn malformed_row_is_skipped_but_siblings_send() {
    let server = MockServer::start().await;
    let pipeline = relay_pipeline(&server).await;
    Mock::given(method("POST"))
        .and(path("/messages/text"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let contents = format!("{GOOD_ROW}\nnot,a,record\n{GOOD_ROW}\n");
    let file = write_file(&dir, "boletin.csv", &contents);

    let summary = pipeline.dispatch(&file).await.unwrap();
    assert_eq!(summary.sent, 2);
    assert_eq!(summary.skipped_rows, 1);
    assert_eq!(summary.failed_sends, 0);
}

#[tokio::test]
async fn send_failure_does_not_stop_later_messages() {
    let server = MockServer::start().await;
    let pipeline = relay_pipeline(&server).await;
    Mock::given(method("POST"))
        .and(path("/messages/text"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let contents = format!("header\n{GOOD_ROW}\n{GOOD_ROW}\n");
    let file = write_file(&dir, "boletin.csv", &contents);

    let summary = pipeline.dispatch(&file).await.unwrap();
    // Both sends were attempted despite the first failing.
    assert_eq!(summary.failed_sends, 2);
    assert_eq!(summary.sent, 0);
}

#[tokio::test]
async fn bulletin_with_too_few_rows_dispatches_nothing() {
    let server = MockServer::start().await;
    let pipeline = relay_pipeline(&server).await;
    Mock::given(method("POST"))
        .and(path("/messages/text"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "boletin.csv", &format!("{GOOD_ROW}\n"));

    let summary = pipeline.dispatch(&file).await.unwrap();
    assert_eq!(summary, DispatchSummary::default());
}

#[tokio::test]
async fn free_text_is_relayed_verbatim() {
    let server = MockServer::start().await;
    let pipeline = relay_pipeline(&server).await;
    Mock::given(method("POST"))
        .and(path("/messages/text"))
        .and(body_string_contains("Reporte preliminar"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "reporte.txt", "Reporte preliminar\nsin revisar\n");

    let summary = pipeline.dispatch(&file).await.unwrap();
    assert_eq!(summary.sent, 1);
}

#[tokio::test]
async fn image_dispatch_selects_mime_from_extension() {
    let server = MockServer::start().await;
    let pipeline = relay_pipeline(&server).await;
    Mock::given(method("POST"))
        .and(path("/messages/image"))
        .and(body_string_contains("data:image/jpeg;name=mapa.JPG;base64,"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = dir.path().join("mapa.JPG");
    fs::write(&file, b"\xff\xd8\xff\xe0not-really-a-jpeg").unwrap();

    let summary = pipeline.dispatch(&file).await.unwrap();
    assert_eq!(summary.sent, 1);
}

#[tokio::test]
async fn unreadable_file_aborts_that_dispatch() {
    let server = MockServer::start().await;
    let pipeline = relay_pipeline(&server).await;

    let missing = Path::new("/nonexistent/boletin.csv");
    let err = pipeline.dispatch(missing).await.unwrap_err();
    assert!(matches!(err, PipelineError::Read { .. }));
}

#[tokio::test]
async fn relay_accepts_bulletins_text_and_images_only() {
    let server = MockServer::start().await;
    let pipeline = relay_pipeline(&server).await;

    assert!(pipeline.accepts(Path::new("/spool/boletin.csv")));
    assert!(pipeline.accepts(Path::new("/spool/reporte.TXT")));
    assert!(pipeline.accepts(Path::new("/spool/mapa.png")));
    assert!(!pipeline.accepts(Path::new("/spool/datos.json")));
}
