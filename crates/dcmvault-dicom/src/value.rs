//! 属性值的文本表示
//!
//! 解码时即按值的类别计算文本，下游只接触文本。

use crate::tag::format_tag;
use dicom::core::value::{PrimitiveValue, Value};
use dicom::core::VR;
use dicom::object::mem::InMemElement;

/// DICOM多值分隔符
const MULTI_VALUE_SEPARATOR: &str = "\\";

/// 属性值类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Empty,
    Text,
    Number,
    Date,
    Time,
    DateTime,
    Tags,
    Binary,
    Sequence,
    /// 封装（压缩）的像素数据
    Encapsulated,
}

/// 带类别的属性值，`text` 为 `None` 表示没有可表示的值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValue {
    pub kind: ValueKind,
    pub text: Option<String>,
}

impl AttributeValue {
    pub fn new(kind: ValueKind, text: Option<String>) -> Self {
        Self { kind, text }
    }

    /// 从数据元素计算属性值
    pub fn from_element(element: &InMemElement) -> Self {
        match element.value() {
            Value::Primitive(primitive) => Self::from_primitive(primitive, element.vr()),
            Value::Sequence(sequence) => {
                let count = sequence.items().len();
                let suffix = if count == 1 { "" } else { "s" };
                Self::new(
                    ValueKind::Sequence,
                    Some(format!("Sequence ({count} item{suffix})")),
                )
            }
            Value::PixelSequence(_) => Self::new(ValueKind::Encapsulated, None),
        }
    }

    /// 从原始值计算属性值
    pub fn from_primitive(primitive: &PrimitiveValue, vr: VR) -> Self {
        match primitive {
            PrimitiveValue::Empty => Self::new(ValueKind::Empty, None),
            _ if is_binary_vr(vr) => Self::new(
                ValueKind::Binary,
                Some(format!("Binary data ({} bytes)", primitive.calculate_byte_len())),
            ),
            PrimitiveValue::Str(value) => {
                Self::new(ValueKind::Text, Some(trim_padding(value).to_string()))
            }
            PrimitiveValue::Strs(values) => {
                let text = values
                    .iter()
                    .map(|value| trim_padding(value))
                    .collect::<Vec<_>>()
                    .join(MULTI_VALUE_SEPARATOR);
                Self::new(ValueKind::Text, Some(text))
            }
            PrimitiveValue::Tags(values) => {
                let text = values
                    .iter()
                    .map(|tag| format_tag(*tag))
                    .collect::<Vec<_>>()
                    .join(MULTI_VALUE_SEPARATOR);
                Self::new(ValueKind::Tags, Some(text))
            }
            PrimitiveValue::Date(_) => Self::rendered(ValueKind::Date, primitive),
            PrimitiveValue::Time(_) => Self::rendered(ValueKind::Time, primitive),
            PrimitiveValue::DateTime(_) => Self::rendered(ValueKind::DateTime, primitive),
            _ => Self::rendered(ValueKind::Number, primitive),
        }
    }

    /// 文本值，无值时为空字符串
    pub fn text_or_empty(&self) -> String {
        self.text.clone().unwrap_or_default()
    }

    fn rendered(kind: ValueKind, primitive: &PrimitiveValue) -> Self {
        Self::new(kind, Some(trim_padding(&primitive.to_str()).to_string()))
    }
}

fn trim_padding(text: &str) -> &str {
    text.trim_end_matches(|c: char| c == '\0' || c == ' ')
}

fn is_binary_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::OB | VR::OD | VR::OF | VR::OL | VR::OV | VR::OW | VR::UN
    )
}
