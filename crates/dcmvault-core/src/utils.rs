//! 通用工具函数

use uuid::Uuid;

/// 允许上传的文件扩展名
pub const DICOM_EXTENSIONS: [&str; 2] = [".dcm", ".dicom"];

/// 生成新的条目标识符
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}

/// 验证条目标识符格式
pub fn is_valid_item_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

/// 文件名是否带有DICOM扩展名（不区分大小写）
pub fn has_dicom_extension(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    DICOM_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
