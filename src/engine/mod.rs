// ==========================================
// 联系人名单分配系统 - 引擎层
// ==========================================
// 职责: 分块分配与导入流程编排
// 红线: Engine 不拼 SQL，存储操作全部经由 Repository
// ==========================================

pub mod distribution;
pub mod orchestrator;

// 重导出核心引擎
pub use distribution::{chunk_size, partition, DistributionEngine};
pub use orchestrator::IngestionOrchestrator;
