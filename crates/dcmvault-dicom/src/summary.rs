//! 摘要构建

use crate::decoder::Document;
use crate::dictionary::AttributeDictionary;
use crate::extractor::AttributeExtractor;
use dcmvault_core::{DicomInfo, FileMeta, ImageDimensions, Summary};
use dicom::core::Tag;
use dicom::dictionary_std::{tags, StandardDataDictionary};

/// 摘要构建器
#[derive(Debug, Clone)]
pub struct SummaryBuilder<D = StandardDataDictionary> {
    extractor: AttributeExtractor<D>,
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryBuilder {
    pub fn new() -> Self {
        Self {
            extractor: AttributeExtractor::new(),
        }
    }
}

impl<D: AttributeDictionary> SummaryBuilder<D> {
    pub fn with_extractor(extractor: AttributeExtractor<D>) -> Self {
        Self { extractor }
    }

    /// 组合文档字段与文件信息
    pub fn build_summary(&self, document: &Document, meta: FileMeta) -> Summary {
        Summary::new(meta, self.dicom_info(document))
    }

    /// 提取常用字段，缺失的标签为 `None`
    pub fn dicom_info(&self, document: &Document) -> DicomInfo {
        let field = |tag: Tag| {
            self.extractor
                .lookup(document, tag)
                .map(|value| value.text_or_empty())
        };

        let image_dimensions = document.has_pixel_data().then(|| ImageDimensions {
            rows: integer_field(document, tags::ROWS),
            columns: integer_field(document, tags::COLUMNS),
        });

        DicomInfo {
            patient_name: field(tags::PATIENT_NAME),
            patient_id: field(tags::PATIENT_ID),
            study_date: field(tags::STUDY_DATE),
            study_description: field(tags::STUDY_DESCRIPTION),
            modality: field(tags::MODALITY),
            sop_instance_uid: field(tags::SOP_INSTANCE_UID),
            image_dimensions,
        }
    }
}

fn integer_field(document: &Document, tag: Tag) -> Option<u32> {
    document
        .element(tag)
        .and_then(|element| element.to_int::<u32>().ok())
}
