// ==========================================
// 联系人名单分配系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义上传接收与导入所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// IngestConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait IngestConfigReader: Send + Sync {
    /// 获取上传文件大小上限（字节）
    ///
    /// # 默认值
    /// - 10485760 (10 MiB)
    async fn get_max_upload_bytes(&self) -> RepositoryResult<u64>;

    /// 获取允许的扩展名列表（小写，不含点）
    ///
    /// # 默认值
    /// - ["csv", "xlsx", "xls"]
    async fn get_allowed_extensions(&self) -> RepositoryResult<Vec<String>>;

    /// 获取上传临时目录
    ///
    /// # 默认值
    /// - "./uploads"
    async fn get_upload_dir(&self) -> RepositoryResult<String>;
}
