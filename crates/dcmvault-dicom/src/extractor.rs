//! 属性提取器
//!
//! 按标签查询单个属性，或列出文档中的全部属性（包括序列中的嵌套属性）。

use crate::decoder::Document;
use crate::dictionary::AttributeDictionary;
use crate::tag::{format_tag, parse_tag};
use crate::value::AttributeValue;
use dcmvault_core::{AttributeEntry, Result};
use dicom::core::header::Header;
use dicom::core::value::Value;
use dicom::core::Tag;
use dicom::dictionary_std::StandardDataDictionary;
use dicom::object::InMemDicomObject;
use std::collections::BTreeMap;
use tracing::debug;

/// 查询的标签不在文档中
pub const TAG_NOT_FOUND: &str = "Tag not found";
/// 属性没有可表示的值
pub const VALUE_NOT_AVAILABLE: &str = "N/A";

/// 属性提取器
#[derive(Debug, Clone)]
pub struct AttributeExtractor<D = StandardDataDictionary> {
    dictionary: D,
}

impl Default for AttributeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeExtractor {
    /// 使用标准数据字典创建提取器
    pub fn new() -> Self {
        Self {
            dictionary: StandardDataDictionary,
        }
    }
}

impl<D: AttributeDictionary> AttributeExtractor<D> {
    /// 使用指定字典创建提取器
    pub fn with_dictionary(dictionary: D) -> Self {
        Self { dictionary }
    }

    /// 按标签文本查询属性值
    ///
    /// 标签不在文档中时返回 [`TAG_NOT_FOUND`]，不视为错误。
    pub fn lookup_by_tag(&self, document: &Document, tag_text: &str) -> Result<String> {
        let tag = parse_tag(tag_text)?;

        Ok(match self.lookup(document, tag) {
            Some(value) => value.text_or_empty(),
            None => {
                debug!("未找到标签: {}", format_tag(tag));
                TAG_NOT_FOUND.to_string()
            }
        })
    }

    /// 顶层属性是否存在，存在时返回其值
    pub fn lookup(&self, document: &Document, tag: Tag) -> Option<AttributeValue> {
        document.element(tag).map(AttributeValue::from_element)
    }

    /// 列出全部属性，序列中的属性展开到同一映射中
    pub fn list_all(&self, document: &Document) -> BTreeMap<String, AttributeEntry> {
        let mut attributes = BTreeMap::new();
        self.collect(document.dataset(), &mut attributes);
        attributes
    }

    fn collect(&self, object: &InMemDicomObject, out: &mut BTreeMap<String, AttributeEntry>) {
        for element in object.iter() {
            let tag = element.tag();
            let value = AttributeValue::from_element(element)
                .text
                .unwrap_or_else(|| VALUE_NOT_AVAILABLE.to_string());

            out.insert(
                format_tag(tag),
                AttributeEntry {
                    name: self.dictionary.name_or_fallback(tag),
                    value,
                },
            );

            if let Value::Sequence(sequence) = element.value() {
                for item in sequence.items() {
                    self.collect(item, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DicomDecoder;
    use crate::fixtures;
    use dcmvault_core::VaultError;
    use std::collections::HashMap;

    fn sample_document() -> Document {
        DicomDecoder::decode_bytes(&fixtures::sample_document_bytes()).unwrap()
    }

    #[test]
    fn test_lookup_by_tag() {
        let extractor = AttributeExtractor::new();
        let document = sample_document();

        assert_eq!(extractor.lookup_by_tag(&document, "0010,0010").unwrap(), "Doe^John");
        assert_eq!(extractor.lookup_by_tag(&document, "0028,0010").unwrap(), "2");
    }

    #[test]
    fn test_lookup_absent_tag_is_not_an_error() {
        let extractor = AttributeExtractor::new();
        let document = sample_document();

        assert_eq!(extractor.lookup_by_tag(&document, "0010,0030").unwrap(), TAG_NOT_FOUND);
    }

    #[test]
    fn test_lookup_malformed_tag() {
        let extractor = AttributeExtractor::new();
        let document = sample_document();

        assert!(matches!(
            extractor.lookup_by_tag(&document, "00100010"),
            Err(VaultError::MalformedTag(_))
        ));
        assert!(matches!(
            extractor.lookup_by_tag(&document, "zz10,0010"),
            Err(VaultError::MalformedTag(_))
        ));
    }

    #[test]
    fn test_list_all() {
        let extractor = AttributeExtractor::new();
        let attributes = extractor.list_all(&sample_document());

        let name = &attributes["0010,0010"];
        assert_eq!(name.name, "PatientName");
        assert_eq!(name.value, "Doe^John");
        assert_eq!(attributes["0028,0011"].value, "2");
        assert!(attributes.contains_key("7FE0,0010"));
        // 文件元信息组不属于数据集
        assert!(!attributes.keys().any(|key| key.starts_with("0002,")));
    }

    #[test]
    fn test_list_all_flattens_sequences_and_marks_empty_values() {
        let bytes = fixtures::document_bytes(fixtures::dataset_with_sequence());
        let document = DicomDecoder::decode_bytes(&bytes).unwrap();
        let attributes = AttributeExtractor::new().list_all(&document);

        assert_eq!(attributes["0008,1140"].value, "Sequence (1 item)");
        assert_eq!(attributes["0008,1155"].value, "1.2.3.4.5");
        assert_eq!(attributes["0010,0030"].value, VALUE_NOT_AVAILABLE);
    }

    #[test]
    fn test_list_all_with_injected_dictionary() {
        let mut dictionary = HashMap::new();
        dictionary.insert(Tag(0x0010, 0x0010), "Patient's Name".to_string());
        let extractor = AttributeExtractor::with_dictionary(dictionary);

        let attributes = extractor.list_all(&sample_document());
        assert_eq!(attributes["0010,0010"].name, "Patient's Name");
        assert_eq!(attributes["0028,0010"].name, crate::dictionary::UNKNOWN_TAG_LABEL);
    }
}
