//! DcmVault 服务器主程序

mod settings;

use clap::Parser;
use settings::VaultConfig;
use dcmvault_storage::{LocalStorage, StorageGateway};
use dcmvault_web::{DicomService, WebServer};
use std::sync::Arc;
use tracing::{error, info};

/// DcmVault服务器命令行参数
#[derive(Parser, Debug)]
#[command(name = "dcmvault-server")]
#[command(about = "DICOM 文件存储与转换 REST 服务")]
struct Args {
    /// 监听主机
    #[arg(long)]
    host: Option<String>,

    /// 服务器端口
    #[arg(short, long)]
    port: Option<u16>,

    /// DICOM文件存储目录
    #[arg(short, long)]
    storage_dir: Option<String>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(short, long)]
    log_level: Option<String>,
}

impl Args {
    /// 命令行参数覆盖配置
    fn apply(self, config: &mut VaultConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(storage_dir) = self.storage_dir {
            config.storage.root = storage_dir;
        }
        if let Some(log_level) = self.log_level {
            config.logging.level = log_level;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = VaultConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(config.logging.level.as_str())
        .init();

    info!("启动DcmVault服务器...");
    info!("  监听地址: {}:{}", config.server.host, config.server.port);
    info!("  存储目录: {}", config.storage.root);

    let storage = Arc::new(LocalStorage::new(&config.storage.root));
    storage.init().await?;

    let service = Arc::new(DicomService::new(storage));
    let server = WebServer::new(config.listen_addr()?, service, config.server.max_upload_bytes);

    if let Err(e) = server.run().await {
        error!("服务器启动失败: {}", e);
        return Err(e.into());
    }

    Ok(())
}
