//! 影像存储管理

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dcmvault_core::utils::is_valid_item_id;
use dcmvault_core::{FileMeta, Result, VaultError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// DICOM文件扩展名
const DICOM_EXTENSION: &str = "dcm";
/// PNG缓存扩展名
const RASTER_EXTENSION: &str = "png";

/// 存储网关
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// 初始化存储位置，启动时调用一次
    async fn init(&self) -> Result<()>;

    /// 存储DICOM文件
    async fn store(&self, id: &str, data: &[u8]) -> Result<()>;

    /// 读取DICOM文件
    async fn read(&self, id: &str) -> Result<Vec<u8>>;

    /// 获取文件信息
    async fn file_meta(&self, id: &str) -> Result<FileMeta>;

    /// 删除DICOM文件及其PNG缓存
    async fn remove(&self, id: &str) -> Result<()>;

    /// 列出全部条目标识符
    async fn list_ids(&self) -> Result<Vec<String>>;

    /// 写入PNG缓存
    async fn store_raster(&self, id: &str, png: &[u8]) -> Result<()>;

    /// 是否存在PNG缓存
    async fn has_raster(&self, id: &str) -> Result<bool>;
}

/// 本地目录存储，`<root>/<id>.dcm` 与 `<root>/<id>.png`
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// DICOM文件路径
    pub fn dicom_path(&self, id: &str) -> Result<PathBuf> {
        self.item_path(id, DICOM_EXTENSION)
    }

    /// PNG缓存路径
    pub fn raster_path(&self, id: &str) -> Result<PathBuf> {
        self.item_path(id, RASTER_EXTENSION)
    }

    fn item_path(&self, id: &str, extension: &str) -> Result<PathBuf> {
        if !is_valid_item_id(id) {
            return Err(VaultError::item_not_found(id));
        }
        Ok(self.root.join(format!("{}.{}", id, extension)))
    }
}

#[async_trait]
impl StorageGateway for LocalStorage {
    async fn init(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        info!("存储目录已就绪: {}", self.root.display());
        Ok(())
    }

    async fn store(&self, id: &str, data: &[u8]) -> Result<()> {
        let path = self.dicom_path(id)?;
        tokio::fs::write(&path, data).await?;
        debug!("DICOM文件已存储: {}", path.display());
        Ok(())
    }

    async fn read(&self, id: &str) -> Result<Vec<u8>> {
        let path = self.dicom_path(id)?;
        tokio::fs::read(&path).await.map_err(|e| not_found_or_io(e, id))
    }

    async fn file_meta(&self, id: &str) -> Result<FileMeta> {
        let path = self.dicom_path(id)?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| not_found_or_io(e, id))?;

        let modified_at: DateTime<Utc> = metadata.modified()?.into();
        let created_at = metadata
            .created()
            .map(DateTime::<Utc>::from)
            .unwrap_or(modified_at);

        Ok(FileMeta {
            id: id.to_string(),
            filename: format!("{}.{}", id, DICOM_EXTENSION),
            size_bytes: metadata.len(),
            created_at,
            modified_at,
        })
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let path = self.dicom_path(id)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(e, id))?;

        match tokio::fs::remove_file(self.raster_path(id)?).await {
            Ok(()) => debug!("PNG缓存已删除: {}", id),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        info!("DICOM文件已删除: {}", id);
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DICOM_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if is_valid_item_id(stem) {
                    ids.push(stem.to_string());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    async fn store_raster(&self, id: &str, png: &[u8]) -> Result<()> {
        let path = self.raster_path(id)?;
        tokio::fs::write(&path, png).await?;
        debug!("PNG缓存已写入: {}", path.display());
        Ok(())
    }

    async fn has_raster(&self, id: &str) -> Result<bool> {
        let path = self.raster_path(id)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

fn not_found_or_io(error: std::io::Error, id: &str) -> VaultError {
    if error.kind() == ErrorKind::NotFound {
        VaultError::item_not_found(id)
    } else {
        VaultError::Io(error)
    }
}
