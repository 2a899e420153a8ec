// ==========================================
// 联系人名单分配系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod agent;
pub mod contact;
pub mod distribution;
pub mod types;

// 重导出核心类型
pub use agent::{Agent, NewAgent};
pub use contact::{CanonicalRecord, RawRow};
pub use distribution::{AgentRef, Distribution, DistributionSummary, DistributionView, UploadJob};
pub use types::{CanonicalField, FileFormat};
