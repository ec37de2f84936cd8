//! Web服务器

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use dcmvault_core::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::handlers::{
    api_root, delete_dicom, get_dicom, get_dicom_attributes, get_dicom_png, health, list_dicoms,
    upload_dicom, AppState,
};
use crate::service::DicomService;

pub struct WebServer {
    addr: SocketAddr,
    app: Router,
}

impl WebServer {
    pub fn new(addr: SocketAddr, service: Arc<DicomService>, max_upload_bytes: usize) -> Self {
        let app = Self::create_app(service, max_upload_bytes);

        Self { addr, app }
    }

    pub fn create_app(service: Arc<DicomService>, max_upload_bytes: usize) -> Router {
        Router::new()
            // 根路径
            .route("/", get(api_root))

            // 健康检查
            .route("/health", get(health))

            // DICOM文件路由
            .merge(dicom_routes())
            .with_state(service)

            // 全局中间件
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(
                        CorsLayer::new()
                            .allow_origin(Any)
                            .allow_methods(Any)
                            .allow_headers(Any),
                    )
                    .layer(DefaultBodyLimit::max(max_upload_bytes)),
            )
    }

    pub async fn run(self) -> Result<()> {
        info!("Starting web server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, self.app).await?;

        Ok(())
    }
}

/// DICOM 文件路由
fn dicom_routes() -> Router<AppState> {
    Router::new()
        .route("/dicom", get(list_dicoms).post(upload_dicom))
        .route("/dicom/:id", get(get_dicom).delete(delete_dicom))
        .route("/dicom/:id/attributes", get(get_dicom_attributes))
        .route("/dicom/:id/png", get(get_dicom_png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use dcmvault_dicom::fixtures;
    use dcmvault_storage::{LocalStorage, StorageGateway};
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "dcmvault-test-boundary";
    const MAX_UPLOAD: usize = 10 * 1024 * 1024;

    struct TestApp {
        _dir: tempfile::TempDir,
        storage: Arc<LocalStorage>,
        app: Router,
    }

    async fn test_app() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path().join("storage")));
        storage.init().await.unwrap();
        let service = Arc::new(DicomService::new(storage.clone()));

        TestApp {
            _dir: dir,
            storage,
            app: WebServer::create_app(service, MAX_UPLOAD),
        }
    }

    fn upload_request(field: &str, filename: &str, data: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/dicom\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/dicom")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn upload_sample(app: &Router) -> String {
        let (status, body) = send_json(
            app,
            upload_request("file", "sample.dcm", &fixtures::sample_document_bytes()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let test = test_app().await;
        let app = &test.app;

        let (status, receipt) = send_json(
            app,
            upload_request("file", "sample.dcm", &fixtures::sample_document_bytes()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(receipt["filename"], "sample.dcm");
        assert_eq!(receipt["message"], "DICOM file uploaded successfully");
        let id = receipt["id"].as_str().unwrap().to_string();

        let (status, body) =
            send_json(app, request("GET", &format!("/dicom/{id}/attributes?tag=0010%2C0010"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tag"], "0010,0010");
        assert_eq!(body["value"], "Doe^John");

        let (status, body) =
            send_json(app, request("GET", &format!("/dicom/{id}/attributes?tag=0010%2C0030"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["value"], "Tag not found");

        let (status, png) = send(app, request("GET", &format!("/dicom/{id}/png"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let (status, body) = send_json(app, request("GET", &format!("/dicom/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.as_str());
        assert_eq!(body["dicom_info"]["PatientName"], "Doe^John");
        assert_eq!(body["dicom_info"]["ImageDimensions"]["rows"], 2);
        assert_eq!(body["dicom_info"]["ImageDimensions"]["columns"], 2);
    }

    #[tokio::test]
    async fn test_list_attributes() {
        let test = test_app().await;
        let id = upload_sample(&test.app).await;

        let (status, body) =
            send_json(&test.app, request("GET", &format!("/dicom/{id}/attributes"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["attributes"]["0010,0010"]["name"], "PatientName");
        assert_eq!(body["attributes"]["0010,0010"]["value"], "Doe^John");
        assert_eq!(
            body["count"].as_u64().unwrap() as usize,
            body["attributes"].as_object().unwrap().len()
        );
    }

    #[tokio::test]
    async fn test_malformed_tag_is_bad_request() {
        let test = test_app().await;
        let id = upload_sample(&test.app).await;

        let (status, body) =
            send_json(&test.app, request("GET", &format!("/dicom/{id}/attributes?tag=00100010"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid tag format"));
    }

    #[tokio::test]
    async fn test_upload_validation() {
        let test = test_app().await;
        let bytes = fixtures::sample_document_bytes();

        let (status, body) = send_json(&test.app, upload_request("file", "scan.png", &bytes)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "File must be a DICOM file (.dcm or .dicom)");

        let (status, body) = send_json(&test.app, upload_request("file", "", &bytes)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file selected");

        let (status, body) = send_json(&test.app, upload_request("other", "scan.dcm", &bytes)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file uploaded");

        let (status, _) =
            send_json(&test.app, upload_request("file", "broken.dcm", b"not a dicom file")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // 无效文件不会留在存储中
        assert!(test.storage.list_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_skips_corrupt_items() {
        let test = test_app().await;
        upload_sample(&test.app).await;
        upload_sample(&test.app).await;

        let corrupt = dcmvault_core::utils::generate_item_id();
        let truncated = &fixtures::sample_document_bytes()[..140];
        test.storage.store(&corrupt, truncated).await.unwrap();

        let (status, body) = send_json(&test.app, request("GET", "/dicom")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["files"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_cascade() {
        let test = test_app().await;
        let id = upload_sample(&test.app).await;

        let (status, _) = send(&test.app, request("GET", &format!("/dicom/{id}/png"))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(test.storage.has_raster(&id).await.unwrap());

        let (status, body) = send_json(&test.app, request("DELETE", &format!("/dicom/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "DICOM file deleted successfully");
        assert!(!test.storage.has_raster(&id).await.unwrap());

        let (status, _) = send_json(&test.app, request("GET", &format!("/dicom/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send_json(&test.app, request("DELETE", &format!("/dicom/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "DICOM file not found");
    }

    #[tokio::test]
    async fn test_png_without_pixel_data() {
        let test = test_app().await;
        let bytes = fixtures::document_bytes(fixtures::patient_dataset("Roe^Jane"));
        let (status, receipt) = send_json(&test.app, upload_request("file", "nopixels.dcm", &bytes)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = receipt["id"].as_str().unwrap();

        let (status, body) = send_json(&test.app, request("GET", &format!("/dicom/{id}/png"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "DICOM file does not contain pixel data");
    }

    #[tokio::test]
    async fn test_health() {
        let test = test_app().await;
        let (status, body) = send_json(&test.app, request("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
