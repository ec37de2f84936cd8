//! DICOM文档解码

use dcmvault_core::{Result, VaultError};
use dicom::core::Tag;
use dicom::dictionary_std::tags;
use dicom::object::mem::InMemElement;
use dicom::object::{DefaultDicomObject, InMemDicomObject};
use std::path::Path;
use tracing::{debug, warn};

/// 文件前导区长度
const PREAMBLE_LEN: usize = 128;
/// DICOM魔数
const MAGIC_CODE: &[u8; 4] = b"DICM";

/// 解码后的DICOM文档
#[derive(Debug, Clone)]
pub struct Document {
    object: DefaultDicomObject,
}

impl Document {
    pub fn new(object: DefaultDicomObject) -> Self {
        Self { object }
    }

    /// 底层DICOM对象（含文件元信息）
    pub fn object(&self) -> &DefaultDicomObject {
        &self.object
    }

    /// 数据集本体，不含文件元信息组
    pub fn dataset(&self) -> &InMemDicomObject {
        &self.object
    }

    /// 按标签获取顶层元素
    pub fn element(&self, tag: Tag) -> Option<&InMemElement> {
        self.dataset().element(tag).ok()
    }

    /// 是否包含像素数据（整数或浮点）
    pub fn has_pixel_data(&self) -> bool {
        [
            tags::PIXEL_DATA,
            tags::FLOAT_PIXEL_DATA,
            tags::DOUBLE_FLOAT_PIXEL_DATA,
        ]
        .into_iter()
        .any(|tag| self.element(tag).is_some())
    }
}

/// DICOM解码器
pub struct DicomDecoder;

impl DicomDecoder {
    /// 解码DICOM字节数据
    ///
    /// 同时接受带128字节前导区的标准文件和直接以 `DICM` 开头的数据。
    pub fn decode_bytes(data: &[u8]) -> Result<Document> {
        debug!("开始解码DICOM数据，大小: {} bytes", data.len());

        let object = dicom::object::from_reader(strip_preamble(data)).map_err(|e| {
            warn!("DICOM数据解码失败: {}", e);
            VaultError::DocumentUnreadable(e.to_string())
        })?;

        Ok(Document::new(object))
    }

    /// 解码DICOM文件
    pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Document> {
        let data = std::fs::read(path.as_ref())?;
        Self::decode_bytes(&data)
    }

    /// 验证字节数据能否被解码
    pub fn validate_bytes(data: &[u8]) -> Result<()> {
        Self::decode_bytes(data).map(|_| ())
    }
}

fn strip_preamble(data: &[u8]) -> &[u8] {
    match data.get(PREAMBLE_LEN..PREAMBLE_LEN + MAGIC_CODE.len()) {
        Some(magic) if magic == MAGIC_CODE => &data[PREAMBLE_LEN..],
        _ => data,
    }
}
