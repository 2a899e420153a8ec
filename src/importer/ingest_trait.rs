// ==========================================
// 联系人名单分配系统 - 导入接口定义
// ==========================================
// 职责: 定义文件解析接口（不包含实现）
// 约束: 流式（CSV）与整体读取（Excel）统一为单遍、有限的行序列
// ==========================================

use crate::domain::contact::RawRow;
use crate::importer::error::{IngestError, IngestResult};
use std::path::Path;

// ==========================================
// RawRows - 单遍行序列
// ==========================================
// 不可重启: 消费后即耗尽
// 读取失败以 Err 项出现，不做静默截断
pub struct RawRows {
    inner: Box<dyn Iterator<Item = IngestResult<RawRow>> + Send>,
}

impl RawRows {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = IngestResult<RawRow>> + Send + 'static,
    {
        Self {
            inner: Box::new(iter),
        }
    }

    pub fn from_vec(rows: Vec<RawRow>) -> Self {
        Self::new(rows.into_iter().map(Ok))
    }

    /// 读取完整序列
    ///
    /// # 返回
    /// - Ok(Vec<RawRow>): 至少一行
    /// - Err(ParseError): 任一行读取失败（不返回部分结果），或零行
    pub fn collect_all(self) -> IngestResult<Vec<RawRow>> {
        let rows = self.collect::<IngestResult<Vec<RawRow>>>()?;
        if rows.is_empty() {
            return Err(IngestError::ParseError("文件不含数据行".to_string()));
        }
        Ok(rows)
    }
}

impl Iterator for RawRows {
    type Item = IngestResult<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 打开文件并返回原始行序列
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(RawRows): 行序列（表头取自文件首行）
    /// - Err(ParseError): 无法打开、文件损坏、无工作表等
    fn parse_rows(&self, file_path: &Path) -> IngestResult<RawRows>;
}
