mod common;

use bytes::Bytes;
use common::start_mock_pacs;
use dicomweb::{DicomWebClient, DicomWebError, Endpoint, ReqwestTransport, TransportConfig};
use std::sync::Arc;

fn create_client() -> DicomWebClient {
    let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();
    DicomWebClient::new(Arc::new(transport))
}

#[tokio::test]
async fn stow_then_wado_round_trip() {
    let pacs = start_mock_pacs().await;
    let client = create_client();

    let objects = vec![
        Bytes::from_static(b"DICM-first"),
        Bytes::new(),
        Bytes::from(vec![0xffu8; 64 * 1024]),
    ];

    let response = client
        .store(&pacs.endpoint("/dicom-web/studies"), objects.clone())
        .await
        .unwrap();
    assert_eq!(response, "{\"stored\":3}");

    let stored = pacs.state.stored();
    assert_eq!(stored.len(), 1);
    assert!(stored[0]
        .content_type
        .starts_with("multipart/related; type=application/dicom; boundary="));
    assert_eq!(stored[0].accept.as_deref(), Some("application/json"));
    assert_eq!(stored[0].objects, objects);

    let retrieved = client
        .retrieve(&pacs.endpoint("/dicom-web/studies/uploaded"))
        .await
        .unwrap();
    assert_eq!(retrieved, objects);
}

#[tokio::test]
async fn stow_empty_batch_is_well_formed() {
    let pacs = start_mock_pacs().await;
    let client = create_client();

    let response = client
        .store(&pacs.endpoint("/dicom-web/studies"), Vec::new())
        .await
        .unwrap();
    assert_eq!(response, "{\"stored\":0}");
    assert!(pacs.state.stored()[0].objects.is_empty());
}

#[tokio::test]
async fn wado_returns_segments_in_order() {
    let pacs = start_mock_pacs().await;
    let objects = create_client()
        .retrieve(&pacs.endpoint("/dicom-web/studies/1.2.3"))
        .await
        .unwrap();
    assert_eq!(
        objects,
        vec![Bytes::from_static(&[0x01, 0x02]), Bytes::from_static(&[0x03])]
    );
}

#[tokio::test]
async fn wado_decodes_base64_segments() {
    let pacs = start_mock_pacs().await;
    let objects = create_client()
        .retrieve(&pacs.endpoint("/dicom-web/studies/encoded"))
        .await
        .unwrap();
    assert_eq!(
        objects,
        vec![Bytes::from_static(b"DICM"), Bytes::from_static(b"raw")]
    );
}

#[tokio::test]
async fn wado_empty_study() {
    let pacs = start_mock_pacs().await;
    let objects = create_client()
        .retrieve(&pacs.endpoint("/dicom-web/studies/empty"))
        .await
        .unwrap();
    assert!(objects.is_empty());
}

#[tokio::test]
async fn wado_not_found_reports_status() {
    let pacs = start_mock_pacs().await;
    let err = create_client()
        .retrieve(&pacs.endpoint("/dicom-web/studies/9.9.9"))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(404));
    assert!(err.to_string().contains("Not Found"));
}

#[tokio::test]
async fn wado_non_multipart_is_decode_error() {
    let pacs = start_mock_pacs().await;
    let err = create_client()
        .retrieve(&pacs.endpoint("/dicom-web/studies/json"))
        .await
        .unwrap_err();
    assert!(matches!(err, DicomWebError::Decode(_)));
}

#[tokio::test]
async fn stow_with_wrong_credentials_is_rejected() {
    let pacs = start_mock_pacs().await;
    let endpoint = Endpoint::new(pacs.url("/dicom-web/studies"), "orthanc", "wrong");

    let err = create_client()
        .store(&endpoint, vec![Bytes::from_static(b"x")])
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(401));
    assert!(pacs.state.stored().is_empty());
}

#[tokio::test]
async fn unreachable_archive_is_transport_error() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let endpoint = Endpoint::new(format!("http://{}/dicom-web/studies", addr), "u", "p");
    let err = create_client().retrieve(&endpoint).await.unwrap_err();
    assert!(matches!(err, DicomWebError::Transport(_)));
}
