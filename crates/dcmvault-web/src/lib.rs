//! # Web服务模块
//!
//! 提供DICOM文件上传、查询、转换和删除的REST接口。

pub mod handlers;
pub mod server;
pub mod service;

pub use handlers::ApiError;
pub use server::WebServer;
pub use service::DicomService;
