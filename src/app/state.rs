// ==========================================
// 联系人名单分配系统 - 应用状态
// ==========================================
// 职责: 组装共享连接、仓储、引擎与 API 实例
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::IngestApi;
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::engine::IngestionOrchestrator;
use crate::importer::UploadPolicy;
use crate::repository::{
    AgentRepository, DistributionRepository, LocalTempFileStore, RepositoryError, RepositoryResult,
    SqliteAgentRepository, SqliteDistributionRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "LEAD_DISTRIBUTION_DB_PATH";

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 导入 API
    pub ingest_api: Arc<IngestApi>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,

    /// 坐席名册仓储
    pub agent_repo: Arc<dyn AgentRepository>,
}

impl AppState {
    /// 创建新的 AppState 实例
    ///
    /// # 说明
    /// 1. 打开共享连接并建表（幂等）
    /// 2. 从 config_kv 读取上传策略
    /// 3. 组装仓储、编排器与 API
    pub async fn new(db_path: String) -> RepositoryResult<Self> {
        tracing::info!(db_path = %db_path, "初始化 AppState");

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        ensure_schema(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        let config = Arc::new(ConfigManager::from_connection(conn.clone())?);
        let policy = UploadPolicy::from_config(config.as_ref()).await?;
        tracing::debug!(
            max_bytes = policy.max_bytes(),
            allowed = ?policy.allowed_extensions(),
            upload_dir = %policy.upload_dir().display(),
            "上传策略已加载"
        );

        let agent_repo: Arc<dyn AgentRepository> =
            Arc::new(SqliteAgentRepository::from_connection(conn.clone()));
        let distribution_repo: Arc<dyn DistributionRepository> =
            Arc::new(SqliteDistributionRepository::from_connection(conn));

        let orchestrator = Arc::new(IngestionOrchestrator::new(
            agent_repo.clone(),
            distribution_repo.clone(),
            Arc::new(LocalTempFileStore::new()),
            policy,
        ));
        let ingest_api = Arc::new(IngestApi::new(
            orchestrator,
            agent_repo.clone(),
            distribution_repo,
        ));

        Ok(Self {
            db_path,
            ingest_api,
            config,
            agent_repo,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./lead_distribution.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("lead-distribution");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("lead_distribution.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::NewAgent;

    #[tokio::test]
    async fn test_app_state_wires_shared_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("app.db").to_string_lossy().to_string();

        let state = AppState::new(db_path).await.unwrap();
        state
            .ingest_api
            .register_agent(NewAgent {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                mobile: "1".to_string(),
                password_hash: "h".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(state.agent_repo.count_agents().await.unwrap(), 1);
        assert!(state.ingest_api.list_distributions().await.unwrap().is_empty());
    }
}
