// ==========================================
// 联系人名单分配系统 - 导入层
// ==========================================
// 职责: 外部名单文件 → 标准联系人记录
// 支持: CSV, Excel (.xlsx/.xls)
// 流程: 准入 → 解析 → 列解析 → 规范化/校验
// ==========================================

// 模块声明
pub mod column_resolver;
pub mod error;
pub mod file_parser;
pub mod ingest_trait;
pub mod record_normalizer;
pub mod upload_policy;
pub mod validation;

// 重导出核心类型
pub use column_resolver::{
    ColumnResolution, ColumnResolver, NAME_ALIASES, NOTES_ALIASES, PHONE_ALIASES,
};
pub use error::{IngestError, IngestErrorKind, IngestResult, PersistPhase};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use ingest_trait::{FileParser, RawRows};
pub use record_normalizer::RecordNormalizer;
pub use upload_policy::{AcceptedUpload, UploadPolicy, UploadRejection, DEFAULT_MAX_UPLOAD_BYTES};
pub use validation::{ValidationFailure, ValidationReport};
