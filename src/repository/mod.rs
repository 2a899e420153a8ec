// ==========================================
// 联系人名单分配系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口，屏蔽数据库与文件系统细节
// 约束: 所有查询使用参数化，防止 SQL 注入
// ==========================================

pub mod agent_repo;
pub mod distribution_repo;
pub mod error;
pub mod temp_file_store;

// 重导出核心仓储
pub use agent_repo::{AgentRepository, SqliteAgentRepository};
pub use distribution_repo::{DistributionRepository, ReplaceError, SqliteDistributionRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use temp_file_store::{LocalTempFileStore, TempFileStore};
