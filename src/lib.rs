// ==========================================
// 联系人名单分配系统 - 核心库
// ==========================================
// 流程: 上传名单文件 (CSV/Excel) → 解析 → 列解析与规范化 → 按坐席等量分配
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 分配与编排
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 调用方边界
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Agent, CanonicalField, CanonicalRecord, Distribution, DistributionSummary, DistributionView,
    FileFormat, NewAgent,
};

// 引擎
pub use engine::{DistributionEngine, IngestionOrchestrator};

// 导入
pub use importer::{IngestError, IngestErrorKind, UploadPolicy};

// API
pub use api::{ApiError, ErrorResponse, IngestApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "联系人名单分配系统";
