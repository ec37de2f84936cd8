//! # 存储模块
//!
//! 负责DICOM文件及其PNG缓存的存储管理。

pub mod storage;

pub use storage::*;
