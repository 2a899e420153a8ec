// ==========================================
// 联系人名单分配系统 - 配置层
// ==========================================
// 职责: 系统配置管理（上传大小、扩展名白名单、上传目录）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod ingest_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use ingest_config_trait::IngestConfigReader;
