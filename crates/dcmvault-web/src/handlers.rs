//! HTTP处理器

use crate::service::DicomService;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use dcmvault_core::VaultError;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

/// 上传表单中的文件字段名
const UPLOAD_FIELD: &str = "file";

/// 处理器共享状态
pub type AppState = Arc<DicomService>;

/// 处理器结果类型
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// 转换为HTTP响应的服务错误
#[derive(Debug)]
pub struct ApiError(pub VaultError);

impl From<VaultError> for ApiError {
    fn from(error: VaultError) -> Self {
        Self(error)
    }
}

/// 错误处理
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            VaultError::NotFound(_) => StatusCode::NOT_FOUND,
            VaultError::MalformedTag(_)
            | VaultError::Validation(_)
            | VaultError::DocumentUnreadable(_)
            | VaultError::NoPixelData => StatusCode::BAD_REQUEST,
            VaultError::ConversionFailed(_)
            | VaultError::Io(_)
            | VaultError::Config(_)
            | VaultError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match self.0 {
            VaultError::NotFound(_) => "DICOM file not found".to_string(),
            VaultError::Validation(msg) => msg,
            other => other.to_string(),
        };

        if status.is_server_error() {
            error!("请求处理失败: {}", message);
        }

        let body = Json(json!({
            "error": message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// 属性查询参数
#[derive(Debug, Deserialize)]
pub struct AttributeQueryParams {
    pub tag: Option<String>,
}

/// API根路径处理器
pub async fn api_root() -> impl IntoResponse {
    Json(json!({
        "service": "DcmVault DICOM API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "dicom": "/dicom"
        }
    }))
}

/// 健康检查处理器
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// 上传DICOM文件
pub async fn upload_dicom(
    State(service): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| VaultError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| VaultError::Validation(format!("Failed to read upload: {}", e)))?;

        info!("Uploading DICOM file: {} ({} bytes)", filename, data.len());
        let receipt = service.upload(&filename, data.to_vec()).await?;
        return Ok((StatusCode::CREATED, Json(receipt)));
    }

    Err(VaultError::Validation("No file uploaded".to_string()).into())
}

/// 列出全部DICOM文件
pub async fn list_dicoms(State(service): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(service.list().await?))
}

/// DICOM文件基本信息
pub async fn get_dicom(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(service.summary(&id).await?))
}

/// DICOM属性，可按 `tag` 过滤
pub async fn get_dicom_attributes(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<AttributeQueryParams>,
) -> ApiResult<Response> {
    match params.tag.as_deref().filter(|tag| !tag.is_empty()) {
        Some(tag) => Ok(Json(service.attribute(&id, tag).await?).into_response()),
        None => Ok(Json(service.attributes(&id).await?).into_response()),
    }
}

/// DICOM文件的PNG转换
pub async fn get_dicom_png(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let png = service.png(&id).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// 删除DICOM文件
pub async fn delete_dicom(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    service.delete(&id).await?;
    info!("Deleted DICOM file: {}", id);
    Ok(Json(json!({ "message": "DICOM file deleted successfully" })))
}
