// ==========================================
// 联系人名单分配系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 格式不支持 / 解析失败 / 校验失败 / 无坐席 / 持久化失败
// ==========================================

use crate::importer::validation::ValidationReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 导入模块错误类型（面向调用方的五类错误）
#[derive(Error, Debug)]
pub enum IngestError {
    // ===== 文件相关错误 =====
    #[error("文件格式不支持: {0}（仅支持 .csv/.xlsx/.xls）")]
    UnsupportedFormat(String),

    #[error("文件解析失败: {0}")]
    ParseError(String),

    // ===== 数据质量错误 =====
    #[error("数据校验失败: {0}")]
    ValidationError(ValidationReport),

    // ===== 分配错误 =====
    #[error("没有可用坐席，未执行分配")]
    NoAgentsError,

    #[error("分配结果持久化失败 (阶段 {phase}): {message}")]
    DistributionPersistError { phase: PersistPhase, message: String },
}

/// 错误类别（对外稳定的名称）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestErrorKind {
    UnsupportedFormat,
    ParseError,
    ValidationError,
    NoAgentsError,
    DistributionPersistError,
}

impl fmt::Display for IngestErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IngestErrorKind::UnsupportedFormat => "UnsupportedFormat",
            IngestErrorKind::ParseError => "ParseError",
            IngestErrorKind::ValidationError => "ValidationError",
            IngestErrorKind::NoAgentsError => "NoAgentsError",
            IngestErrorKind::DistributionPersistError => "DistributionPersistError",
        };
        write!(f, "{}", name)
    }
}

/// 持久化失败所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistPhase {
    LoadAgents, // 读取坐席名册
    Clear,      // 删除既有分配
    Insert,     // 写入新分配
}

impl fmt::Display for PersistPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistPhase::LoadAgents => write!(f, "load_agents"),
            PersistPhase::Clear => write!(f, "clear"),
            PersistPhase::Insert => write!(f, "insert"),
        }
    }
}

impl IngestError {
    pub fn kind(&self) -> IngestErrorKind {
        match self {
            IngestError::UnsupportedFormat(_) => IngestErrorKind::UnsupportedFormat,
            IngestError::ParseError(_) => IngestErrorKind::ParseError,
            IngestError::ValidationError(_) => IngestErrorKind::ValidationError,
            IngestError::NoAgentsError => IngestErrorKind::NoAgentsError,
            IngestError::DistributionPersistError { .. } => {
                IngestErrorKind::DistributionPersistError
            }
        }
    }

    /// 出错行号（1-based，仅校验错误携带）
    pub fn row_indices(&self) -> Vec<usize> {
        match self {
            IngestError::ValidationError(report) => report.row_indices(),
            _ => Vec::new(),
        }
    }

    pub fn persist(phase: PersistPhase, err: impl fmt::Display) -> Self {
        IngestError::DistributionPersistError {
            phase,
            message: err.to_string(),
        }
    }
}

impl From<ValidationReport> for IngestError {
    fn from(report: ValidationReport) -> Self {
        IngestError::ValidationError(report)
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::ParseError(format!("文件读取失败: {}", err))
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::ParseError(format!("CSV 解析失败: {}", err))
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for IngestError {
    fn from(err: calamine::Error) -> Self {
        IngestError::ParseError(format!("Excel 解析失败: {}", err))
    }
}

/// Result 类型别名
pub type IngestResult<T> = Result<T, IngestError>;
