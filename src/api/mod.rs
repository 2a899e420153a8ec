// ==========================================
// 联系人名单分配系统 - API 层
// ==========================================
// 职责: 提供调用方边界接口（HTTP 层 / CLI）
// ==========================================

pub mod error;
pub mod ingest_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use ingest_api::IngestApi;
