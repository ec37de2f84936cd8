//! # DICOM处理模块
//!
//! 负责DICOM文档的解码、属性提取、摘要构建和PNG转换。

pub mod decoder;
pub mod dictionary;
pub mod extractor;
pub mod raster;
pub mod summary;
pub mod tag;
pub mod value;

#[cfg(any(test, feature = "testing"))]
pub mod fixtures;

pub use decoder::{DicomDecoder, Document};
pub use dictionary::AttributeDictionary;
pub use extractor::{AttributeExtractor, TAG_NOT_FOUND, VALUE_NOT_AVAILABLE};
pub use raster::{PixelGrid, RasterConverter};
pub use summary::SummaryBuilder;
pub use tag::{format_tag, parse_tag};
pub use value::{AttributeValue, ValueKind};
