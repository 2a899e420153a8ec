// ==========================================
// 联系人名单分配系统 - 分配引擎
// ==========================================
// 职责: 将标准联系人记录按坐席名册等量分块，并整体替换持久化
// 算法（保持兼容，不得改动）:
// 1. chunk_size = ceil(记录数 / 坐席数)
// 2. 按名册顺序，第 i 个坐席获得 records[i*chunk_size .. (i+1)*chunk_size]
// 3. 分块为空的坐席不生成 Distribution
// 4. 连续分块，不是轮询；块内保持输入顺序
// 红线: Engine 不拼 SQL，所有存储操作经由 Repository
// ==========================================

use crate::domain::agent::Agent;
use crate::domain::contact::CanonicalRecord;
use crate::domain::distribution::{Distribution, DistributionSummary};
use crate::importer::error::{IngestError, IngestResult};
use crate::repository::distribution_repo::DistributionRepository;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// 每个坐席的分块大小: ceil(n / a)
///
/// a 为 0 时返回 0（调用方应先拒绝空名册）
pub fn chunk_size(record_count: usize, agent_count: usize) -> usize {
    if agent_count == 0 {
        return 0;
    }
    record_count.div_ceil(agent_count)
}

/// 纯函数分块（不落库）
///
/// 名册为空时返回空列表
pub fn partition(records: &[CanonicalRecord], agents: &[Agent], run_id: &str) -> Vec<Distribution> {
    let size = chunk_size(records.len(), agents.len());
    if size == 0 {
        return Vec::new();
    }

    let created_at = Utc::now();
    agents
        .iter()
        .zip(records.chunks(size))
        .map(|(agent, chunk)| Distribution {
            distribution_id: Uuid::new_v4().to_string(),
            run_id: run_id.to_string(),
            agent_id: agent.id.clone(),
            records: chunk.to_vec(),
            created_at,
        })
        .collect()
}

// ==========================================
// DistributionEngine - 分配引擎
// ==========================================
pub struct DistributionEngine<D>
where
    D: DistributionRepository + ?Sized,
{
    repo: Arc<D>,
}

impl<D> DistributionEngine<D>
where
    D: DistributionRepository + ?Sized,
{
    pub fn new(repo: Arc<D>) -> Self {
        Self { repo }
    }

    /// 分配并整体替换持久化
    ///
    /// # 参数
    /// - records: 标准联系人记录（已通过校验）
    /// - agents: 本次分配开始时的坐席名册（顺序决定归属）
    ///
    /// # 返回
    /// - Ok(DistributionSummary): 全部写入成功
    /// - Err(NoAgentsError): 名册为空，存储不做任何修改
    /// - Err(DistributionPersistError): 清空或写入失败（带阶段）
    pub async fn distribute(
        &self,
        records: &[CanonicalRecord],
        agents: &[Agent],
    ) -> IngestResult<DistributionSummary> {
        if agents.is_empty() {
            error!(total_records = records.len(), "坐席名册为空，拒绝分配");
            return Err(IngestError::NoAgentsError);
        }

        let run_id = Uuid::new_v4().to_string();
        let size = chunk_size(records.len(), agents.len());
        let distributions = partition(records, agents, &run_id);

        debug!(
            run_id = %run_id,
            total_records = records.len(),
            agents = agents.len(),
            chunk_size = size,
            distributions = distributions.len(),
            "分块完成，开始整体替换"
        );

        let created = self.repo.replace_all(&distributions).await.map_err(|e| {
            let phase = e.phase();
            error!(run_id = %run_id, phase = %phase, error = %e, "分配持久化失败");
            IngestError::persist(phase, e.into_inner())
        })?;

        info!(
            run_id = %run_id,
            total_records = records.len(),
            agents = agents.len(),
            chunk_size = size,
            distributions_created = created,
            "分配完成"
        );

        Ok(DistributionSummary {
            total_records: records.len(),
            agents_count: agents.len(),
            records_per_agent: size,
            distributions_created: created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::PersistPhase;
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn agents(n: usize) -> Vec<Agent> {
        (0..n)
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

    fn records(n: usize) -> Vec<CanonicalRecord> {
        (0..n)
            .map(|i| CanonicalRecord::new(format!("Lead {}", i), format!("555{:04}", i), ""))
            .collect()
    }

    /// 内存分配存储，可注入清空/写入失败
    #[derive(Default)]
    struct MemoryRepo {
        rows: Mutex<Vec<Distribution>>,
        fail_clear: bool,
        fail_insert: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl DistributionRepository for MemoryRepo {
        async fn delete_all(&self) -> RepositoryResult<usize> {
            self.calls.lock().unwrap().push("delete_all");
            if self.fail_clear {
                return Err(RepositoryError::DatabaseQueryError("disk I/O error".into()));
            }
            let mut rows = self.rows.lock().unwrap();
            let n = rows.len();
            rows.clear();
            Ok(n)
        }

        async fn insert_many(&self, distributions: &[Distribution]) -> RepositoryResult<usize> {
            self.calls.lock().unwrap().push("insert_many");
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

    #[test]
    fn test_chunk_size() {
        assert_eq!(chunk_size(5, 2), 3);
        assert_eq!(chunk_size(2, 5), 1);
        assert_eq!(chunk_size(6, 3), 2);
        assert_eq!(chunk_size(0, 3), 0);
        assert_eq!(chunk_size(3, 0), 0);
    }

    #[test]
    fn test_five_records_two_agents() {
        let recs = records(5);
        let dists = partition(&recs, &agents(2), "run");
        assert_eq!(dists.len(), 2);
        assert_eq!(dists[0].agent_id, "agent-0");
        assert_eq!(dists[0].records, recs[0..3].to_vec());
        assert_eq!(dists[1].agent_id, "agent-1");
        assert_eq!(dists[1].records, recs[3..5].to_vec());
    }

    #[test]
    fn test_trailing_agents_get_no_distribution() {
        let recs = records(2);
        let dists = partition(&recs, &agents(5), "run");
        assert_eq!(dists.len(), 2);
        assert_eq!(dists[0].records.len(), 1);
        assert_eq!(dists[1].records.len(), 1);
        assert!(dists.iter().all(|d| d.run_id == "run"));
    }

    #[test]
    fn test_partition_preserves_count_and_order() {
        for n in 1..=23 {
            for a in 1..=7 {
                let recs = records(n);
                let dists = partition(&recs, &agents(a), "run");
                let size = chunk_size(n, a);

                let flattened: Vec<CanonicalRecord> =
                    dists.iter().flat_map(|d| d.records.clone()).collect();
                assert_eq!(flattened, recs, "n={} a={}", n, a);
                assert!(dists.len() <= a);

                // 仅最后一个非空分块可以小于 chunk_size
                let (last, rest) = dists.split_last().unwrap();
                assert!(rest.iter().all(|d| d.records.len() == size));
                assert!(!last.records.is_empty() && last.records.len() <= size);
            }
        }
    }

    #[tokio::test]
    async fn test_empty_roster_leaves_store_untouched() {
        let repo = Arc::new(MemoryRepo::default());
        let engine = DistributionEngine::new(repo.clone());

        let err = engine
            .distribute(&[CanonicalRecord::new("A", "123", "")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::NoAgentsError));
        assert!(repo.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_distribute_summary() {
        let repo = Arc::new(MemoryRepo::default());
        let engine = DistributionEngine::new(repo.clone());

        let summary = engine.distribute(&records(5), &agents(2)).await.unwrap();
        assert_eq!(
            summary,
            DistributionSummary {
                total_records: 5,
                agents_count: 2,
                records_per_agent: 3,
                distributions_created: 2,
            }
        );
        assert_eq!(*repo.calls.lock().unwrap(), vec!["delete_all", "insert_many"]);
    }

    #[tokio::test]
    async fn test_clear_failure_writes_nothing() {
        let repo = Arc::new(MemoryRepo {
            fail_clear: true,
            ..Default::default()
        });
        let engine = DistributionEngine::new(repo.clone());

        let err = engine.distribute(&records(3), &agents(1)).await.unwrap_err();
        assert!(matches!(
            err,
            IngestError::DistributionPersistError { phase: PersistPhase::Clear, .. }
        ));
        assert_eq!(*repo.calls.lock().unwrap(), vec!["delete_all"]);
    }

    #[tokio::test]
    async fn test_insert_failure_leaves_store_cleared() {
        let repo = Arc::new(MemoryRepo {
            fail_insert: true,
            ..Default::default()
        });
        repo.rows
            .lock()
            .unwrap()
            .extend(partition(&records(2), &agents(1), "old"));
        let engine = DistributionEngine::new(repo.clone());

        let err = engine.distribute(&records(3), &agents(1)).await.unwrap_err();
        assert!(matches!(
            err,
            IngestError::DistributionPersistError { phase: PersistPhase::Insert, .. }
        ));
        assert!(repo.list_all().await.unwrap().is_empty());
    }
}
