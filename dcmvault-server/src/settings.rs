//! 配置管理
//!
//! 默认值 -> 配置文件 -> 环境变量 (`DCMVAULT_SERVER__PORT` 形式) -> 命令行参数，后者覆盖前者。

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use dcmvault_core::VaultError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tracing::info;

/// 服务完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 存储配置
    pub storage: StorageConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听主机
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 上传大小上限
    pub max_upload_bytes: usize,
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 根目录
    pub root: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别或过滤指令
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: "storage".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl VaultConfig {
    /// 加载配置，配置文件可选
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("DCMVAULT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: VaultConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        if let Some(path) = config_path {
            info!("Configuration loaded successfully from: {}", path);
        }
        Ok(config)
    }

    /// 检查各层合并后的配置是否可用
    pub fn validate(&self) -> dcmvault_core::Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(VaultError::Config("server.host must not be empty".to_string()));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(VaultError::Config(
                "server.max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        if self.storage.root.trim().is_empty() {
            return Err(VaultError::Config("storage.root must not be empty".to_string()));
        }
        Ok(())
    }

    /// 监听地址
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address: {}:{}",
                    self.server.host, self.server.port
                )
            })
    }
}
