//! DICOM文件服务
//!
//! 组合存储网关与DICOM处理模块，每个方法对应一个REST操作。

use dcmvault_core::utils::{generate_item_id, has_dicom_extension};
use dcmvault_core::{
    AttributeListing, AttributeValueResponse, Result, Summary, SummaryListing, UploadReceipt,
    VaultError,
};
use dcmvault_dicom::{AttributeExtractor, DicomDecoder, Document, RasterConverter, SummaryBuilder};
use dcmvault_storage::StorageGateway;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// DICOM文件服务
pub struct DicomService {
    storage: Arc<dyn StorageGateway>,
    extractor: AttributeExtractor,
    summaries: SummaryBuilder,
}

impl DicomService {
    pub fn new(storage: Arc<dyn StorageGateway>) -> Self {
        let extractor = AttributeExtractor::new();
        Self {
            storage,
            summaries: SummaryBuilder::with_extractor(extractor.clone()),
            extractor,
        }
    }

    /// 上传DICOM文件，解码失败的数据不会被保存
    pub async fn upload(&self, filename: &str, data: Vec<u8>) -> Result<UploadReceipt> {
        if filename.is_empty() {
            return Err(VaultError::Validation("No file selected".to_string()));
        }
        if !has_dicom_extension(filename) {
            return Err(VaultError::Validation(
                "File must be a DICOM file (.dcm or .dicom)".to_string(),
            ));
        }

        let data = run_blocking(move || DicomDecoder::validate_bytes(&data).map(|_| data)).await?;

        let id = generate_item_id();
        self.storage.store(&id, &data).await?;
        info!("DICOM文件上传成功: id={}, filename={}, size={} bytes", id, filename, data.len());

        Ok(UploadReceipt {
            id,
            filename: filename.to_string(),
            message: "DICOM file uploaded successfully".to_string(),
        })
    }

    /// 列出全部条目，无法读取的条目被跳过
    pub async fn list(&self) -> Result<SummaryListing> {
        let mut files = Vec::new();
        for id in self.storage.list_ids().await? {
            match self.summary(&id).await {
                Ok(summary) => files.push(summary),
                Err(e) => warn!("跳过无法读取的DICOM文件 {}: {}", id, e),
            }
        }
        Ok(SummaryListing::from(files))
    }

    /// 单个条目的摘要
    pub async fn summary(&self, id: &str) -> Result<Summary> {
        let document = self.load(id).await?;
        let meta = self.storage.file_meta(id).await?;
        Ok(self.summaries.build_summary(&document, meta))
    }

    /// 按标签查询属性值
    pub async fn attribute(&self, id: &str, tag: &str) -> Result<AttributeValueResponse> {
        let document = self.load(id).await?;
        let value = self.extractor.lookup_by_tag(&document, tag)?;
        Ok(AttributeValueResponse {
            tag: tag.to_string(),
            value,
        })
    }

    /// 全部属性
    pub async fn attributes(&self, id: &str) -> Result<AttributeListing> {
        let document = self.load(id).await?;
        Ok(AttributeListing::from(self.extractor.list_all(&document)))
    }

    /// 转换为PNG并写入缓存
    pub async fn png(&self, id: &str) -> Result<Vec<u8>> {
        let document = self.load(id).await?;
        let png = run_blocking(move || RasterConverter::to_raster(&document)).await?;
        self.storage.store_raster(id, &png).await?;
        debug!("PNG转换完成: id={}, size={} bytes", id, png.len());
        Ok(png)
    }

    /// 删除条目及其PNG缓存
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.storage.remove(id).await
    }

    async fn load(&self, id: &str) -> Result<Document> {
        let data = self.storage.read(id).await?;
        run_blocking(move || DicomDecoder::decode_bytes(&data)).await
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| VaultError::Internal(format!("blocking task failed: {}", e)))?
}
