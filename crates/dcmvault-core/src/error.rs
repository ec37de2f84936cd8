//! 错误定义模块

use thiserror::Error;

/// 影像存储服务统一错误类型
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Invalid tag format: {0}")]
    MalformedTag(String),

    #[error("无法读取DICOM文件: {0}")]
    DocumentUnreadable(String),

    #[error("DICOM file does not contain pixel data")]
    NoPixelData,

    #[error("Error converting DICOM to PNG: {0}")]
    ConversionFailed(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("系统内部错误: {0}")]
    Internal(String),
}

/// 影像存储服务统一结果类型
pub type Result<T> = std::result::Result<T, VaultError>;

impl VaultError {
    /// 条目不存在
    pub fn item_not_found(id: &str) -> Self {
        VaultError::NotFound(format!("DICOM file with ID {} not found", id))
    }
}
