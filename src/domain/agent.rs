// ==========================================
// 联系人名单分配系统 - 坐席领域模型
// ==========================================
// 归属: 坐席名册存储（外部协作方）
// 分配引擎只读取 id 与 name，从不修改坐席
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 坐席
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub mobile: String,
    // 口令哈希永不对外序列化
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// 新建坐席请求（口令已由认证协作方完成哈希）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAgent {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password_hash: String,
}

impl NewAgent {
    /// 返回第一个为空的必填字段名
    pub fn first_missing_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("mobile", &self.mobile),
            ("password_hash", &self.password_hash),
        ]
        .into_iter()
        .find(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
    }
}
