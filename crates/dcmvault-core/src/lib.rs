//! # DcmVault Core
//!
//! 影像存储服务的核心模块，提供错误定义、数据模型和通用工具。

pub mod error;
pub mod models;
pub mod utils;

pub use error::{Result, VaultError};
pub use models::*;
