// ==========================================
// 联系人名单分配系统 - 应用层
// ==========================================
// 职责: 组装应用状态，供 CLI / HTTP 层使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
