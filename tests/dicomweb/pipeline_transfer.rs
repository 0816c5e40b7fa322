mod common;

use bytes::Bytes;
use common::start_mock_pacs;
use dicomweb::ReqwestTransport;
use dicomweb_plane::config::Config;
use dicomweb_plane::models::address::{DataAddress, DICOM_WEB_DATA, DICOM_WEB_DATA_PUSH};
use dicomweb_plane::models::DataFlowRequest;
use dicomweb_plane::monitor::TracingMonitor;
use dicomweb_plane::pipeline::{PipelineService, TransferError, TransferSummary};
use std::sync::Arc;

fn create_service(config_toml: &str) -> PipelineService {
    let config = Config::from_toml(config_toml).unwrap();
    let transport = ReqwestTransport::new(&config.http).unwrap();
    PipelineService::dicom_web(Arc::new(transport), Arc::new(TracingMonitor), &config.transfer)
}

fn create_address(address_type: &str, url: String) -> DataAddress {
    DataAddress::dicom_web(address_type, url, "orthanc", "orthanc")
}

#[tokio::test]
async fn transfers_study_between_archives() {
    let pacs = start_mock_pacs().await;
    let service = create_service("");

    let request = DataFlowRequest::with_id("transfer-1")
        .source(create_address(DICOM_WEB_DATA, pacs.url("/dicom-web/studies/1.2.3")))
        .destination(create_address(DICOM_WEB_DATA_PUSH, pacs.url("/dicom-web/studies")));

    service.validate(&request).unwrap();
    let summary = service.transfer(&request).await.unwrap();
    assert_eq!(summary, TransferSummary { batches: 1, parts: 2 });
    assert_eq!(
        pacs.state.archive(),
        vec![Bytes::from_static(&[0x01, 0x02]), Bytes::from_static(&[0x03])]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_batches_respect_worker_bound() {
    let pacs = start_mock_pacs().await;
    let service = create_service(
        r#"
        [transfer]
        workers = 2
        partition_size = 3
        "#,
    );

    let request = DataFlowRequest::with_id("transfer-2")
        .source(create_address(DICOM_WEB_DATA, pacs.url("/dicom-web/studies/generated-14")))
        .destination(create_address(DICOM_WEB_DATA, pacs.url("/dicom-web/studies")));

    let summary = service.transfer(&request).await.unwrap();
    assert_eq!(summary, TransferSummary { batches: 5, parts: 14 });
    assert!(pacs.state.peak() <= 2);

    let stored = pacs.state.stored();
    let mut sizes: Vec<usize> = stored.iter().map(|r| r.objects.len()).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![2, 3, 3, 3, 3]);

    let mut archive = pacs.state.archive();
    archive.sort();
    let expected: Vec<Bytes> = (0..14)
        .map(|i| Bytes::from(format!("instance-{:02}", i)))
        .collect();
    assert_eq!(archive, expected);
}

#[tokio::test]
async fn failing_destination_fails_transfer() {
    let pacs = start_mock_pacs().await;
    let service = create_service("");

    let request = DataFlowRequest::with_id("transfer-3")
        .source(create_address(DICOM_WEB_DATA, pacs.url("/dicom-web/studies/1.2.3")))
        .destination(create_address(DICOM_WEB_DATA_PUSH, pacs.url("/dicom-web/broken")));

    let err = service.transfer(&request).await.unwrap_err();
    assert!(matches!(err, TransferError::Protocol(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn missing_source_study_fails_before_any_store() {
    let pacs = start_mock_pacs().await;
    let service = create_service("");

    let request = DataFlowRequest::with_id("transfer-4")
        .source(create_address(DICOM_WEB_DATA, pacs.url("/dicom-web/studies/4.5.6")))
        .destination(create_address(DICOM_WEB_DATA_PUSH, pacs.url("/dicom-web/studies")));

    let err = service.transfer(&request).await.unwrap_err();
    assert!(err
        .to_string()
        .starts_with("Failed to retrieve data from PACS: WADO-RS failed with status 404"));
    assert!(pacs.state.stored().is_empty());
}

#[test]
fn invalid_destination_fails_validation() {
    let service = create_service("");
    let mut destination = create_address(DICOM_WEB_DATA_PUSH, "not a url".to_string());
    destination.set_property("username", "orthanc");

    let request = DataFlowRequest::with_id("transfer-5")
        .source(create_address(DICOM_WEB_DATA, "http://pacs.local/studies/1".to_string()))
        .destination(destination);

    match service.validate(&request) {
        Err(TransferError::Validation(msg)) => {
            assert!(msg.starts_with("Failed to build DicomWebDataSink: "), "{}", msg)
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}
