// ==========================================
// 联系人名单分配系统 - 坐席名册仓储
// ==========================================
// 职责: agent 表的读写（名册 CRUD 的最小实现）
// 红线: 不含业务逻辑，只负责数据访问
// 约束: list_agents 按写入顺序 (rowid) 返回，顺序决定分块归属，必须稳定
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::agent::{Agent, NewAgent};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

// ==========================================
// AgentRepository Trait
// ==========================================
#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// 按写入顺序列出全部坐席
    async fn list_agents(&self) -> RepositoryResult<Vec<Agent>>;

    /// 新增坐席
    ///
    /// # 返回
    /// - Err(FieldValueError): 必填字段为空
    /// - Err(UniqueConstraintViolation): 邮箱已存在
    async fn insert_agent(&self, agent: NewAgent) -> RepositoryResult<Agent>;

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Agent>>;

    async fn count_agents(&self) -> RepositoryResult<usize>;
}

// ==========================================
// SqliteAgentRepository
// ==========================================
pub struct SqliteAgentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAgentRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Agent> {
        Ok(Agent {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            mobile: row.get(3)?,
            password_hash: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

const AGENT_COLUMNS: &str = "agent_id, name, email, mobile, password_hash, created_at";

#[async_trait]
impl AgentRepository for SqliteAgentRepository {
    async fn list_agents(&self) -> RepositoryResult<Vec<Agent>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM agent ORDER BY rowid ASC",
            AGENT_COLUMNS
        ))?;
        let agents = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(agents)
    }

    async fn insert_agent(&self, agent: NewAgent) -> RepositoryResult<Agent> {
        if let Some(field) = agent.first_missing_field() {
            return Err(RepositoryError::FieldValueError {
                field: field.to_string(),
                message: "必填字段为空".to_string(),
            });
        }

        let email = agent.email.trim().to_string();
        if self.find_by_email(&email).await?.is_some() {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "坐席邮箱已存在: {}",
                email
            )));
        }

        let created = Agent {
            id: Uuid::new_v4().to_string(),
            name: agent.name.trim().to_string(),
            email,
            mobile: agent.mobile.trim().to_string(),
            password_hash: agent.password_hash,
            created_at: Utc::now(),
        };

        let conn = self.get_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO agent ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                AGENT_COLUMNS
            ),
            params![
                created.id,
                created.name,
                created.email,
                created.mobile,
                created.password_hash,
                created.created_at,
            ],
        )?;

        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Agent>> {
        let conn = self.get_conn()?;
        let agent = conn
            .query_row(
                &format!("SELECT {} FROM agent WHERE email = ?1", AGENT_COLUMNS),
                params![email.trim()],
                Self::map_row,
            )
            .optional()?;
        Ok(agent)
    }

    async fn count_agents(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM agent", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
