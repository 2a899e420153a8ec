// ==========================================
// 联系人名单分配系统 - 临时文件存储
// ==========================================
// 职责: 上传临时文件的存在性检查与删除
// 约束: 删除不存在的文件视为成功（容忍重复删除）
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;

#[async_trait]
pub trait TempFileStore: Send + Sync {
    async fn exists(&self, path: &Path) -> bool;

    async fn remove(&self, path: &Path) -> RepositoryResult<()>;
}

/// 本地文件系统实现
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTempFileStore;

impl LocalTempFileStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TempFileStore for LocalTempFileStore {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn remove(&self, path: &Path) -> RepositoryResult<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RepositoryError::FileSystemError(format!(
                "删除临时文件失败 {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
