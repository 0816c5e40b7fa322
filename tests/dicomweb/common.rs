use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use dicomweb::multipart::{frame_and_parse, MultipartRelated};
use dicomweb::{Endpoint, APPLICATION_DICOM};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// `orthanc:orthanc`
pub const AUTH: &str = "Basic b3J0aGFuYzpvcnRoYW5j";

/// One STOW-RS request as seen by the mock archive
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct StoredRequest {
    pub content_type: String,
    pub accept: Option<String>,
    pub objects: Vec<Bytes>,
}

#[derive(Clone, Default)]
pub struct PacsState {
    pub stored: Arc<Mutex<Vec<StoredRequest>>>,
    pub in_flight: Arc<AtomicUsize>,
    pub peak: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl PacsState {
    pub fn stored(&self) -> Vec<StoredRequest> {
        self.stored.lock().unwrap().clone()
    }

    /// Every stored object across all requests, in arrival order
    pub fn archive(&self) -> Vec<Bytes> {
        self.stored()
            .into_iter()
            .flat_map(|r| r.objects)
            .collect()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct MockPacs {
    pub base_url: String,
    pub state: PacsState,
    #[allow(dead_code)]
    pub handle: tokio::task::JoinHandle<()>,
}

#[allow(dead_code)]
impl MockPacs {
    pub fn endpoint(&self, path: &str) -> Endpoint {
        Endpoint::new(format!("{}{}", self.base_url, path), "orthanc", "orthanc")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == AUTH)
}

async fn store(State(state): State<PacsState>, headers: HeaderMap, body: Bytes) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak.fetch_max(now, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;
    state.in_flight.fetch_sub(1, Ordering::SeqCst);

    let message = match frame_and_parse(&headers, &body) {
        Ok(message) => message,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let accept = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let count = message.segments.len();
    state.stored.lock().unwrap().push(StoredRequest {
        content_type,
        accept,
        objects: message.into_payloads(),
    });

    (
        [(CONTENT_TYPE, "application/dicom+json")],
        format!("{{\"stored\":{}}}", count),
    )
        .into_response()
}

fn multipart_response(objects: &[Bytes]) -> Response {
    let mut body = MultipartRelated::new(APPLICATION_DICOM);
    for object in objects {
        body.add_segment(&[], APPLICATION_DICOM, object);
    }
    let content_type = body.content_type();
    ([(CONTENT_TYPE, content_type)], body.finish()).into_response()
}

/// Hand-written body: quoted boundary, LF line endings, base64 segment, preamble
fn encoded_response() -> Response {
    let body = concat!(
        "this preamble is ignored\n",
        "--wado-boundary\n",
        "Content-Type: application/dicom\n",
        "Content-Transfer-Encoding: base64\n",
        "\n",
        "RElDTQ==\n",
        "--wado-boundary\n",
        "Content-Type: application/dicom\n",
        "\n",
        "raw\n",
        "--wado-boundary--\n",
    );
    (
        [(
            CONTENT_TYPE,
            "multipart/related; type=\"application/dicom\"; boundary=\"wado-boundary\"",
        )],
        body,
    )
        .into_response()
}

async fn retrieve(
    State(state): State<PacsState>,
    Path(study): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match study.as_str() {
        "1.2.3" => multipart_response(&[
            Bytes::from_static(&[0x01, 0x02]),
            Bytes::from_static(&[0x03]),
        ]),
        "uploaded" => multipart_response(&state.archive()),
        "encoded" => encoded_response(),
        "empty" => multipart_response(&[]),
        "json" => ([(CONTENT_TYPE, "application/json")], "{}").into_response(),
        other => match other.strip_prefix("generated-").and_then(|n| n.parse::<usize>().ok()) {
            Some(count) => {
                let objects: Vec<Bytes> = (0..count)
                    .map(|i| Bytes::from(format!("instance-{:02}", i)))
                    .collect();
                multipart_response(&objects)
            }
            None => StatusCode::NOT_FOUND.into_response(),
        },
    }
}

/// Start a mock DICOMweb archive on an ephemeral port
pub async fn start_mock_pacs() -> MockPacs {
    let state = PacsState::default();
    let app = Router::new()
        .route("/dicom-web/studies", post(store))
        .route("/dicom-web/studies/{study}", get(retrieve))
        .route(
            "/dicom-web/broken",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockPacs {
        base_url,
        state,
        handle,
    }
}
