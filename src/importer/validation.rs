// ==========================================
// 联系人名单分配系统 - 校验结果聚合
// ==========================================
// 职责: 汇总全部校验失败项，一次性作为单个 ValidationError 返回
// ==========================================

use crate::domain::types::CanonicalField;
use crate::importer::column_resolver::{NAME_ALIASES, PHONE_ALIASES};
use serde::Serialize;
use std::fmt;

/// 单项校验失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValidationFailure {
    /// 没有任何数据行
    EmptyInput,

    /// 表头（取自第 1 行）无法解析出必需列
    #[serde(rename_all = "camelCase")]
    MissingColumns {
        missing: Vec<CanonicalField>,
        found_columns: Vec<String>,
    },

    /// 某行的必填值去空白后为空
    #[serde(rename_all = "camelCase")]
    IncompleteRow {
        row: usize, // 1-based
        missing: Vec<CanonicalField>,
    },
}

impl ValidationFailure {
    pub fn incomplete_row(row: usize, name_missing: bool, phone_missing: bool) -> Self {
        let mut missing = Vec::new();
        if name_missing {
            missing.push(CanonicalField::FirstName);
        }
        if phone_missing {
            missing.push(CanonicalField::Phone);
        }
        ValidationFailure::IncompleteRow { row, missing }
    }

    /// 关联的行号；列缺失归属于提供表头的第 1 行
    pub fn row_index(&self) -> Option<usize> {
        match self {
            ValidationFailure::EmptyInput => None,
            ValidationFailure::MissingColumns { .. } => Some(1),
            ValidationFailure::IncompleteRow { row, .. } => Some(*row),
        }
    }
}

/// 校验报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_failures(failures: Vec<ValidationFailure>) -> Self {
        Self { failures }
    }

    pub fn push(&mut self, failure: ValidationFailure) {
        self.failures.push(failure);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    /// 全部出错行号（升序去重）
    pub fn row_indices(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self
            .failures
            .iter()
            .filter_map(ValidationFailure::row_index)
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        for failure in &self.failures {
            match failure {
                ValidationFailure::EmptyInput => {
                    parts.push("文件为空，请上传包含数据的文件".to_string());
                }
                ValidationFailure::MissingColumns {
                    missing,
                    found_columns,
                } => {
                    let mut need = Vec::new();
                    if missing.contains(&CanonicalField::FirstName) {
                        need.push(format!("姓名列（{}之一）", NAME_ALIASES.join(", ")));
                    }
                    if missing.contains(&CanonicalField::Phone) {
                        need.push(format!("电话列（{}之一）", PHONE_ALIASES.join(", ")));
                    }
                    parts.push(format!(
                        "第 1 行缺少必需列: {}；实际列: {}",
                        need.join("、"),
                        found_columns.join(", ")
                    ));
                }
                ValidationFailure::IncompleteRow { .. } => {}
            }
        }

        let bad_rows: Vec<String> = self
            .failures
            .iter()
            .filter_map(|f| match f {
                ValidationFailure::IncompleteRow { row, .. } => Some(row.to_string()),
                _ => None,
            })
            .collect();
        if !bad_rows.is_empty() {
            parts.push(format!(
                "发现 {} 行缺少必填数据（姓名或电话），请检查第 {} 行",
                bad_rows.len(),
                bad_rows.join(", ")
            ));
        }

        write!(f, "{}", parts.join("；"))
    }
}
