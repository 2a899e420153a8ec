// ==========================================
// 导入编排器失败路径测试
// ==========================================
// 测试目标: 存储层失败时的错误分类、阶段与临时文件清理
// ==========================================


use async_trait::async_trait;
use lead_distribution::domain::{Agent, Distribution, NewAgent};
use lead_distribution::engine::IngestionOrchestrator;
use lead_distribution::importer::{IngestError, PersistPhase, UploadPolicy};
use lead_distribution::logging;
use lead_distribution::repository::{
    AgentRepository, DistributionRepository, LocalTempFileStore, RepositoryError,
    RepositoryResult,
};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use test_helpers::{contacts_csv, write_upload};

/// 固定名册（可注入读取失败）
struct FixedRoster {
    agents: Vec<Agent>,
    fail: bool,
}

#[async_trait]
impl AgentRepository for FixedRoster {
    async fn list_agents(&self) -> RepositoryResult<Vec<Agent>> {
        if self.fail {
            return Err(RepositoryError::DatabaseConnectionError("roster offline".into()));
        }
        Ok(self.agents.clone())
    }

    async fn insert_agent(&self, _agent: NewAgent) -> RepositoryResult<Agent> {
        Err(RepositoryError::DatabaseQueryError("read-only roster".into()))
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Agent>> {
        Ok(self.agents.iter().find(|a| a.email == email).cloned())
    }

    async fn count_agents(&self) -> RepositoryResult<usize> {
        Ok(self.agents.len())
    }
}

/// 不支持事务的分配存储（使用默认两阶段 replace_all）
#[derive(Default)]
struct FlakyStore {
    rows: Mutex<Vec<Distribution>>,
    fail_clear: bool,
    fail_insert: bool,
}

#[async_trait]
impl DistributionRepository for FlakyStore {
    async fn delete_all(&self) -> RepositoryResult<usize> {
        if self.fail_clear {
            return Err(RepositoryError::DatabaseQueryError("database is locked".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        let n = rows.len();
        rows.clear();
        Ok(n)
    }

    async fn insert_many(&self, distributions: &[Distribution]) -> RepositoryResult<usize> {
        if self.fail_insert {
            return Err(RepositoryError::DatabaseQueryError("disk full".into()));
        }
        self.rows.lock().unwrap().extend_from_slice(distributions);
        Ok(distributions.len())
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Distribution>> {
        Ok(self.rows.lock().unwrap().clone())
    }
}

fn roster(n: usize) -> Vec<Agent> {
    (1..=n)
        .map(|i| Agent {
            id: format!("agent-{}", i),
            name: format!("Agent {}", i),
            email: format!("agent{}@example.com", i),
            mobile: "1".to_string(),
            password_hash: "h".to_string(),
            created_at: Utc::now(),
        })
        .collect()
}

fn orchestrator(roster: FixedRoster, store: Arc<FlakyStore>) -> IngestionOrchestrator {
    IngestionOrchestrator::new(
        Arc::new(roster),
        store,
        Arc::new(LocalTempFileStore::new()),
        UploadPolicy::default(),
    )
}

fn stale_distribution() -> Distribution {
    Distribution {
        distribution_id: "old".to_string(),
        run_id: "old-run".to_string(),
        agent_id: "agent-1".to_string(),
        records: Vec::new(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_clear_failure_keeps_old_state_and_cleans_up() {
    logging::init_test();

    let store = Arc::new(FlakyStore {
        fail_clear: true,
        ..Default::default()
    });
    store.rows.lock().unwrap().push(stale_distribution());
    let orchestrator = orchestrator(FixedRoster { agents: roster(2), fail: false }, store.clone());

    let dir = tempfile::tempdir().unwrap();
    let path = write_upload(dir.path(), "leads.csv", contacts_csv(3).as_bytes());

    let err = orchestrator.ingest(&path, "csv").await.unwrap_err();
    assert!(matches!(
        err,
        IngestError::DistributionPersistError { phase: PersistPhase::Clear, .. }
    ));
    assert!(!path.exists());
    assert_eq!(store.list_all().await.unwrap()[0].distribution_id, "old");
}

#[tokio::test]
async fn test_insert_failure_leaves_store_cleared() {
    logging::init_test();

    let store = Arc::new(FlakyStore {
        fail_insert: true,
        ..Default::default()
    });
    store.rows.lock().unwrap().push(stale_distribution());
    let orchestrator = orchestrator(FixedRoster { agents: roster(2), fail: false }, store.clone());

    let dir = tempfile::tempdir().unwrap();
    let path = write_upload(dir.path(), "leads.csv", contacts_csv(3).as_bytes());

    let err = orchestrator.ingest(&path, "csv").await.unwrap_err();
    assert!(matches!(
        err,
        IngestError::DistributionPersistError { phase: PersistPhase::Insert, .. }
    ));
    assert!(!path.exists());
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_roster_failure_is_persist_error() {
    logging::init_test();

    let store = Arc::new(FlakyStore::default());
    let orchestrator = orchestrator(FixedRoster { agents: Vec::new(), fail: true }, store.clone());

    let dir = tempfile::tempdir().unwrap();
    let path = write_upload(dir.path(), "leads.csv", contacts_csv(3).as_bytes());

    let err = orchestrator.ingest(&path, "csv").await.unwrap_err();
    assert!(matches!(
        err,
        IngestError::DistributionPersistError { phase: PersistPhase::LoadAgents, .. }
    ));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_file_removed_by_caller_is_tolerated() {
    logging::init_test();

    let store = Arc::new(FlakyStore::default());
    let orchestrator = orchestrator(FixedRoster { agents: roster(1), fail: false }, store);

    let dir = tempfile::tempdir().unwrap();
    let path = write_upload(dir.path(), "leads.csv", contacts_csv(2).as_bytes());

    orchestrator.ingest(&path, "csv").await.unwrap();
    // 同一路径再次导入: 文件已不存在，解析失败但清理不报错
    let err = orchestrator.ingest(&path, "csv").await.unwrap_err();
    assert!(matches!(err, IngestError::ParseError(_)));
}
