// ==========================================
// 联系人名单分配系统 - 记录规范化器
// ==========================================
// 职责: 原始行 → CanonicalRecord {firstName, phone, notes}
// 规则:
// - 列解析只做一次，取第一行表头（假定全文件表头一致）
// - 姓名/电话去空白后为空的行全部收集，整体作为一个 ValidationError 返回
// - 备注缺失时为空字符串
// 纯同步变换，无 I/O
// ==========================================

use crate::domain::contact::{CanonicalRecord, RawRow};
use crate::importer::column_resolver::{ColumnResolution, ColumnResolver};
use crate::importer::error::IngestResult;
use crate::importer::validation::{ValidationFailure, ValidationReport};
use tracing::{debug, warn};

pub struct RecordNormalizer {
    resolver: ColumnResolver,
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordNormalizer {
    pub fn new() -> Self {
        Self {
            resolver: ColumnResolver,
        }
    }

    /// 依据第一行表头解析列
    pub fn resolve_columns(&self, rows: &[RawRow]) -> Result<ColumnResolution, ValidationReport> {
        let first = rows
            .first()
            .ok_or_else(|| ValidationReport::from_failures(vec![ValidationFailure::EmptyInput]))?;

        let resolution = self.resolver.resolve(first.headers());
        if !resolution.is_complete() {
            let found_columns: Vec<String> = first.headers().map(str::to_string).collect();
            warn!(
                found = ?found_columns,
                missing = ?resolution.missing_required(),
                "无法解析必需列"
            );
            return Err(ValidationReport::from_failures(vec![
                ValidationFailure::MissingColumns {
                    missing: resolution.missing_required(),
                    found_columns,
                },
            ]));
        }

        debug!(
            name_key = ?resolution.name_key,
            phone_key = ?resolution.phone_key,
            notes_key = ?resolution.notes_key,
            "列解析完成"
        );
        Ok(resolution)
    }

    /// 解析列并规范化
    pub fn normalize(&self, rows: &[RawRow]) -> IngestResult<Vec<CanonicalRecord>> {
        let resolution = self.resolve_columns(rows)?;
        self.normalize_with(rows, &resolution)
    }

    /// 使用已解析的列规范化全部行
    ///
    /// # 返回
    /// - Ok(Vec<CanonicalRecord>): 与输入同序
    /// - Err(ValidationError): 零行 / 必需列缺失 / 存在不完整行（带全部行号）
    pub fn normalize_with(
        &self,
        rows: &[RawRow],
        resolution: &ColumnResolution,
    ) -> IngestResult<Vec<CanonicalRecord>> {
        if rows.is_empty() {
            return Err(ValidationReport::from_failures(vec![ValidationFailure::EmptyInput]).into());
        }

        let (name_key, phone_key) = match (&resolution.name_key, &resolution.phone_key) {
            (Some(name_key), Some(phone_key)) => (name_key.as_str(), phone_key.as_str()),
            _ => {
                let found_columns = rows[0].headers().map(str::to_string).collect();
                return Err(ValidationReport::from_failures(vec![
                    ValidationFailure::MissingColumns {
                        missing: resolution.missing_required(),
                        found_columns,
                    },
                ])
                .into());
            }
        };

        let mut report = ValidationReport::new();
        let mut records = Vec::with_capacity(rows.len());

        for (idx, row) in rows.iter().enumerate() {
            let first_name = cell(row, name_key);
            let phone = cell(row, phone_key);
            let notes = resolution
                .notes_key
                .as_deref()
                .map(|key| cell(row, key))
                .unwrap_or_default();

            if first_name.is_empty() || phone.is_empty() {
                report.push(ValidationFailure::incomplete_row(
                    idx + 1,
                    first_name.is_empty(),
                    phone.is_empty(),
                ));
                continue;
            }

            records.push(CanonicalRecord {
                first_name,
                phone,
                notes,
            });
        }

        if !report.is_empty() {
            warn!(rows = ?report.row_indices(), "存在缺少必填数据的行");
            return Err(report.into());
        }

        debug!(count = records.len(), "记录规范化完成");
        Ok(records)
    }
}

fn cell(row: &RawRow, key: &str) -> String {
    row.get(key).map(|v| v.trim().to_string()).unwrap_or_default()
}
