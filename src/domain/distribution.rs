// ==========================================
// 联系人名单分配系统 - 分配领域模型
// ==========================================
// 生命周期:
// - 每次分配开始时删除全部既有 Distribution（整体替换，不合并）
// - 每个获得至少一条记录的坐席生成一条 Distribution
// - 持续到下一次成功分配或外部删除
// ==========================================

use crate::domain::contact::CanonicalRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ==========================================
// Distribution - 单个坐席的分配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub distribution_id: String,
    pub run_id: String,   // 同一次分配共享
    pub agent_id: String, // 关联 agent（FK）
    pub records: Vec<CanonicalRecord>, // 保持输入顺序
    pub created_at: DateTime<Utc>,
}

// ==========================================
// DistributionSummary - 分配汇总
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub total_records: usize,
    pub agents_count: usize,
    pub records_per_agent: usize, // = chunk_size
    pub distributions_created: usize,
}

// ==========================================
// DistributionView - 分配查询视图
// ==========================================
// 用途: 列表查询，带坐席姓名/邮箱（不含口令哈希）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionView {
    pub distribution_id: String,
    pub agent: AgentRef,
    pub records: Vec<CanonicalRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    pub id: String,
    pub name: String,
    pub email: String,
}

// ==========================================
// UploadJob - 单次导入的瞬态上下文（不落库）
// ==========================================
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub source_path: PathBuf,
    pub declared_extension: String,
    pub raw_row_count: usize,
}

impl UploadJob {
    pub fn new(source_path: impl Into<PathBuf>, declared_extension: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            declared_extension: declared_extension.into(),
            raw_row_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = DistributionSummary {
            total_records: 5,
            agents_count: 2,
            records_per_agent: 3,
            distributions_created: 2,
        };
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["totalRecords"], 5);
        assert_eq!(json["agentsCount"], 2);
        assert_eq!(json["recordsPerAgent"], 3);
        assert_eq!(json["distributionsCreated"], 2);
    }
}
