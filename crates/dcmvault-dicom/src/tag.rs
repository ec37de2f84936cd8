//! 标签文本格式 `GGGG,EEEE`

use dcmvault_core::{Result, VaultError};
use dicom::core::Tag;

/// 每个分量最多4位十六进制数字
const MAX_COMPONENT_DIGITS: usize = 4;

/// 解析 `GGGG,EEEE` 格式的标签文本
pub fn parse_tag(text: &str) -> Result<Tag> {
    let (group, element) = text.split_once(',').ok_or_else(|| {
        VaultError::MalformedTag("Tag must be in format 'XXXX,XXXX' (e.g., '0010,0010')".to_string())
    })?;

    if element.contains(',') {
        return Err(VaultError::MalformedTag(
            "Tag must have exactly two components".to_string(),
        ));
    }

    Ok(Tag(parse_component(group)?, parse_component(element)?))
}

/// 标签的规范文本形式，大写并补零到4位
pub fn format_tag(tag: Tag) -> String {
    format!("{:04X},{:04X}", tag.group(), tag.element())
}

fn parse_component(text: &str) -> Result<u16> {
    let text = text.trim();
    let valid = !text.is_empty()
        && text.len() <= MAX_COMPONENT_DIGITS
        && text.chars().all(|c| c.is_ascii_hexdigit());

    if !valid {
        return Err(VaultError::MalformedTag(
            "Tag must contain valid hexadecimal values".to_string(),
        ));
    }

    u16::from_str_radix(text, 16)
        .map_err(|_| VaultError::MalformedTag("Tag must contain valid hexadecimal values".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        assert_eq!(parse_tag("0010,0010").unwrap(), Tag(0x0010, 0x0010));
        assert_eq!(parse_tag("7fe0,0010").unwrap(), Tag(0x7FE0, 0x0010));
        assert_eq!(parse_tag("10, 20").unwrap(), Tag(0x0010, 0x0020));
        assert_eq!(parse_tag("FFFF,FFFF").unwrap(), Tag(0xFFFF, 0xFFFF));
    }

    #[test]
    fn test_format_tag() {
        assert_eq!(format_tag(Tag(0x0010, 0x0010)), "0010,0010");
        assert_eq!(format_tag(Tag(0x7FE0, 0x0010)), "7FE0,0010");
        assert_eq!(format_tag(Tag(0x0008, 0x103E)), "0008,103E");
    }

    #[test]
    fn test_canonical_text_round_trip() {
        for &(group, element) in &[(0u16, 0u16), (0x0008, 0x0018), (0xABCD, 0x00ef), (0xFFFF, 0x0001)] {
            let text = format_tag(Tag(group, element));
            assert_eq!(format_tag(parse_tag(&text).unwrap()), text);
        }
    }

    #[test]
    fn test_malformed_tags() {
        let inputs = [
            "00100010",
            "",
            "0010,",
            ",0010",
            "0010,0010,0010",
            "00G0,0010",
            "0010,00x1",
            "+010,0010",
            "00010,0010",
            "0x10,0010",
        ];

        for input in inputs {
            assert!(
                matches!(parse_tag(input), Err(VaultError::MalformedTag(_))),
                "expected MalformedTag for {:?}",
                input
            );
        }
    }
}
