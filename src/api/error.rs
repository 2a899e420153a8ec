// ==========================================
// 联系人名单分配系统 - API层错误类型
// ==========================================
// 职责: 汇总导入/仓储/上传准入错误，转换为调用方可读的结构化响应
// ==========================================

use crate::importer::column_resolver::{NAME_ALIASES, PHONE_ALIASES};
use crate::importer::error::IngestError;
use crate::importer::upload_policy::UploadRejection;
use crate::importer::validation::ValidationFailure;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    /// 导入流程错误（五类之一）
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// 上传准入拒绝
    #[error(transparent)]
    Upload(#[from] UploadRejection),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::ForeignKeyViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::LockError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::SerializationError(msg) | RepositoryError::FileSystemError(msg) => {
                ApiError::InternalError(msg)
            }
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// ErrorResponse - 结构化错误响应
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误类别（UnsupportedFormat / ParseError / ValidationError / ...）
    pub kind: String,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn kind(&self) -> String {
        match self {
            ApiError::Ingest(e) => e.kind().to_string(),
            ApiError::Upload(UploadRejection::UnsupportedFormat(e)) => e.kind().to_string(),
            ApiError::Upload(UploadRejection::MissingFileName) => "MissingFileName".to_string(),
            ApiError::Upload(UploadRejection::TooLarge { .. }) => "FileTooLarge".to_string(),
            ApiError::InvalidInput(_) => "InvalidInput".to_string(),
            ApiError::NotFound(_) => "NotFound".to_string(),
            ApiError::BusinessRuleViolation(_) => "BusinessRuleViolation".to_string(),
            ApiError::DatabaseError(_) => "DatabaseError".to_string(),
            ApiError::InternalError(_) => "InternalError".to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Ingest(IngestError::ValidationError(report)) => {
                let mut details = json!({
                    "rowIndices": report.row_indices(),
                    "failures": report.failures(),
                });
                let found = report.failures().iter().find_map(|f| match f {
                    ValidationFailure::MissingColumns { found_columns, .. } => Some(found_columns),
                    _ => None,
                });
                if let Some(found_columns) = found {
                    details["foundColumns"] = json!(found_columns);
                    details["expectedColumns"] = json!({
                        "firstName": NAME_ALIASES,
                        "phone": PHONE_ALIASES,
                    });
                }
                Some(details)
            }
            ApiError::Ingest(IngestError::DistributionPersistError { phase, .. }) => {
                Some(json!({ "phase": phase }))
            }
            ApiError::Upload(UploadRejection::TooLarge { size, limit }) => {
                Some(json!({ "size": size, "limit": limit }))
            }
            _ => None,
        }
    }

    /// 转换为结构化响应
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            kind: self.kind(),
            message: self.to_string(),
            details: self.details(),
        }
    }
}
