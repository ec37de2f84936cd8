//! 属性名称字典

use dicom::core::dictionary::DataDictionary;
use dicom::core::Tag;
use dicom::dictionary_std::StandardDataDictionary;
use std::collections::HashMap;

/// 字典中没有条目的私有标签
pub const PRIVATE_TAG_LABEL: &str = "Private Tag";
/// 字典中没有条目的其他标签
pub const UNKNOWN_TAG_LABEL: &str = "Unknown";

/// 只读的 标签 -> 属性名称 映射
pub trait AttributeDictionary {
    /// 字典中定义的属性名称
    fn name_of(&self, tag: Tag) -> Option<String>;

    /// 属性名称，字典中没有时返回后备标签
    fn name_or_fallback(&self, tag: Tag) -> String {
        self.name_of(tag).unwrap_or_else(|| {
            if tag.group() % 2 == 1 {
                PRIVATE_TAG_LABEL.to_string()
            } else {
                UNKNOWN_TAG_LABEL.to_string()
            }
        })
    }
}

impl AttributeDictionary for StandardDataDictionary {
    fn name_of(&self, tag: Tag) -> Option<String> {
        self.by_tag(tag).map(|entry| entry.alias.to_string())
    }
}

impl AttributeDictionary for HashMap<Tag, String> {
    fn name_of(&self, tag: Tag) -> Option<String> {
        self.get(&tag).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom::dictionary_std::tags;

    #[test]
    fn test_standard_names() {
        let dictionary = StandardDataDictionary;
        assert_eq!(dictionary.name_of(tags::PATIENT_NAME).as_deref(), Some("PatientName"));
        assert_eq!(dictionary.name_of(tags::ROWS).as_deref(), Some("Rows"));
    }

    #[test]
    fn test_fallback_labels() {
        let dictionary: HashMap<Tag, String> = HashMap::new();
        assert_eq!(dictionary.name_or_fallback(Tag(0x0009, 0x0010)), PRIVATE_TAG_LABEL);
        assert_eq!(dictionary.name_or_fallback(Tag(0x0010, 0x0010)), UNKNOWN_TAG_LABEL);
    }

    #[test]
    fn test_injected_dictionary() {
        let mut dictionary = HashMap::new();
        dictionary.insert(tags::PATIENT_NAME, "Patient's Name".to_string());
        assert_eq!(dictionary.name_or_fallback(tags::PATIENT_NAME), "Patient's Name");
    }
}
