// ==========================================
// 联系人名单分配系统 - 联系人领域模型
// ==========================================
// 职责: 原始行记录（导入中间产物）与标准联系人记录
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// CanonicalRecord - 标准联系人记录
// ==========================================
// 不变量: first_name 与 phone 规范化后非空
// 序列化: {firstName, phone, notes}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub first_name: String,
    pub phone: String,
    #[serde(default)]
    pub notes: String,
}

impl CanonicalRecord {
    pub fn new(
        first_name: impl Into<String>,
        phone: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            phone: phone.into(),
            notes: notes.into(),
        }
    }
}

// ==========================================
// RawRow - 原始行记录
// ==========================================
// 用途: 文件解析产物（表头 → 单元格文本），保留原始表头与列顺序
// 生命周期: 仅在单次导入流程内
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由 (表头, 值) 序列构造
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut row = Self::new();
        for (header, value) in pairs {
            row.insert(header, value);
        }
        row
    }

    /// 写入单元格；表头完全相同时后值覆盖前值
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        let header = header.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(h, _)| *h == header) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((header, value)),
        }
    }

    /// 按原始表头精确读取
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// 表头（保持文件中的列顺序）
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 所有单元格去空白后为空
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }
}
