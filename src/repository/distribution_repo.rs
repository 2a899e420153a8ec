// ==========================================
// 联系人名单分配系统 - 分配结果仓储
// ==========================================
// 职责: distribution 表的整体替换与查询
// 约束:
// - 整体替换语义: 先清空全部既有分配，再写入本次分配（不合并）
// - 两阶段失败契约:
//   - 清空失败 → 不写入任何新分配
//   - 清空成功但写入失败 → 存储停留在已清空状态
// - SQLite 实现在单事务内完成替换，写入失败时回滚保留旧状态
// ==========================================

use crate::domain::contact::CanonicalRecord;
use crate::domain::distribution::Distribution;
use crate::importer::error::PersistPhase;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

// ==========================================
// ReplaceError - 整体替换失败（带阶段）
// ==========================================
#[derive(Error, Debug)]
pub enum ReplaceError {
    #[error("清空既有分配失败: {0}")]
    Clear(#[source] RepositoryError),

    #[error("写入新分配失败: {0}")]
    Insert(#[source] RepositoryError),
}

impl ReplaceError {
    pub fn phase(&self) -> PersistPhase {
        match self {
            ReplaceError::Clear(_) => PersistPhase::Clear,
            ReplaceError::Insert(_) => PersistPhase::Insert,
        }
    }

    pub fn into_inner(self) -> RepositoryError {
        match self {
            ReplaceError::Clear(e) | ReplaceError::Insert(e) => e,
        }
    }
}

// ==========================================
// DistributionRepository Trait
// ==========================================
#[async_trait]
pub trait DistributionRepository: Send + Sync {
    /// 删除全部分配
    async fn delete_all(&self) -> RepositoryResult<usize>;

    /// 批量写入分配，返回写入条数
    async fn insert_many(&self, distributions: &[Distribution]) -> RepositoryResult<usize>;

    /// 列出全部分配（按创建顺序）
    async fn list_all(&self) -> RepositoryResult<Vec<Distribution>>;

    /// 整体替换（两阶段，非原子）
    ///
    /// 存储不支持事务时使用此默认实现:
    /// - delete_all 失败: 返回 Clear，未写入任何新分配
    /// - insert_many 失败: 返回 Insert，存储为空
    async fn replace_all(&self, distributions: &[Distribution]) -> Result<usize, ReplaceError> {
        self.delete_all().await.map_err(ReplaceError::Clear)?;
        self.insert_many(distributions)
            .await
            .map_err(ReplaceError::Insert)
    }
}

// ==========================================
// SqliteDistributionRepository
// ==========================================
pub struct SqliteDistributionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDistributionRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn insert_rows(conn: &Connection, distributions: &[Distribution]) -> RepositoryResult<usize> {
        let mut stmt = conn.prepare(
            r#"
            INSERT INTO distribution (
                distribution_id, run_id, agent_id, record_count, records_json, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )?;

        for dist in distributions {
            let records_json = serde_json::to_string(&dist.records)?;
            stmt.execute(params![
                dist.distribution_id,
                dist.run_id,
                dist.agent_id,
                dist.records.len() as i64,
                records_json,
                dist.created_at,
            ])?;
        }
        Ok(distributions.len())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<(Distribution, String)> {
        Ok((
            Distribution {
                distribution_id: row.get(0)?,
                run_id: row.get(1)?,
                agent_id: row.get(2)?,
                records: Vec::new(),
                created_at: row.get(4)?,
            },
            row.get(3)?,
        ))
    }
}

#[async_trait]
impl DistributionRepository for SqliteDistributionRepository {
    async fn delete_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let deleted = conn.execute("DELETE FROM distribution", [])?;
        Ok(deleted)
    }

    async fn insert_many(&self, distributions: &[Distribution]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let inserted = Self::insert_rows(&tx, distributions)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(inserted)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Distribution>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT distribution_id, run_id, agent_id, records_json, created_at
            FROM distribution
            ORDER BY rowid ASC
            "#,
        )?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(mut dist, records_json)| {
                dist.records = serde_json::from_str::<Vec<CanonicalRecord>>(&records_json)?;
                Ok(dist)
            })
            .collect()
    }

    /// 单事务整体替换；任一阶段失败均回滚，旧分配保持不变
    async fn replace_all(&self, distributions: &[Distribution]) -> Result<usize, ReplaceError> {
        let conn = self.get_conn().map_err(ReplaceError::Clear)?;
        let tx = conn.unchecked_transaction().map_err(|e| {
            ReplaceError::Clear(RepositoryError::DatabaseTransactionError(e.to_string()))
        })?;

        tx.execute("DELETE FROM distribution", [])
            .map_err(|e| ReplaceError::Clear(e.into()))?;
        let inserted = Self::insert_rows(&tx, distributions).map_err(ReplaceError::Insert)?;

        tx.commit().map_err(|e| {
            ReplaceError::Insert(RepositoryError::DatabaseTransactionError(e.to_string()))
        })?;
        Ok(inserted)
    }
}
