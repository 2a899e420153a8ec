// ==========================================
// 联系人名单分配系统 - 领域类型定义
// ==========================================
// 职责: 文件格式、标准字段等枚举类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 文件格式 (File Format)
// ==========================================
// 白名单: csv / xlsx / xls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,  // 分隔文本
    Xlsx, // Excel 2007+
    Xls,  // Excel 97-2003
}

impl FileFormat {
    /// 全部受支持的扩展名（小写，不含点）
    pub const ALL_EXTENSIONS: [&'static str; 3] = ["csv", "xlsx", "xls"];

    /// 由扩展名识别格式（忽略大小写、前导点与首尾空白）
    pub fn from_extension(ext: &str) -> Option<Self> {
        let normalized = ext.trim().trim_start_matches('.').to_lowercase();
        match normalized.as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" => Some(FileFormat::Xlsx),
            "xls" => Some(FileFormat::Xls),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Xls => "xls",
        }
    }

    /// 是否为工作簿格式（走 Excel 解析器）
    pub fn is_workbook(&self) -> bool {
        matches!(self, FileFormat::Xlsx | FileFormat::Xls)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

// ==========================================
// 标准字段 (Canonical Field)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    FirstName, // 姓名（必填）
    Phone,     // 电话（必填）
    Notes,     // 备注（可选）
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalField::FirstName => write!(f, "firstName"),
            CanonicalField::Phone => write!(f, "phone"),
            CanonicalField::Notes => write!(f, "notes"),
        }
    }
}
