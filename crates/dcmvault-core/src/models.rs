//! 核心数据模型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 存储条目的文件信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMeta {
    pub id: String,
    pub filename: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// 图像尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub rows: Option<u32>,
    pub columns: Option<u32>,
}

/// 从DICOM文档中提取的常用字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DicomInfo {
    #[serde(rename = "PatientName")]
    pub patient_name: Option<String>,
    #[serde(rename = "PatientID")]
    pub patient_id: Option<String>,
    #[serde(rename = "StudyDate")]
    pub study_date: Option<String>,
    #[serde(rename = "StudyDescription")]
    pub study_description: Option<String>,
    #[serde(rename = "Modality")]
    pub modality: Option<String>,
    #[serde(rename = "SOPInstanceUID")]
    pub sop_instance_uid: Option<String>,
    /// 仅在文档包含像素数据时存在
    #[serde(rename = "ImageDimensions", skip_serializing_if = "Option::is_none", default)]
    pub image_dimensions: Option<ImageDimensions>,
}

/// 单个存储条目的摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub id: String,
    pub filename: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub dicom_info: DicomInfo,
}

impl Summary {
    pub fn new(meta: FileMeta, dicom_info: DicomInfo) -> Self {
        Self {
            id: meta.id,
            filename: meta.filename,
            size_bytes: meta.size_bytes,
            created_at: meta.created_at,
            modified_at: meta.modified_at,
            dicom_info,
        }
    }
}

/// 属性名称与文本值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEntry {
    pub name: String,
    pub value: String,
}

/// 上传结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub id: String,
    pub filename: String,
    pub message: String,
}

/// 条目列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryListing {
    pub count: usize,
    pub files: Vec<Summary>,
}

impl From<Vec<Summary>> for SummaryListing {
    fn from(files: Vec<Summary>) -> Self {
        Self {
            count: files.len(),
            files,
        }
    }
}

/// 全部属性列表，以 `GGGG,EEEE` 为键
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeListing {
    pub count: usize,
    pub attributes: BTreeMap<String, AttributeEntry>,
}

impl From<BTreeMap<String, AttributeEntry>> for AttributeListing {
    fn from(attributes: BTreeMap<String, AttributeEntry>) -> Self {
        Self {
            count: attributes.len(),
            attributes,
        }
    }
}

/// 单个属性查询结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValueResponse {
    pub tag: String,
    pub value: String,
}
