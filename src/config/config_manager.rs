// ==========================================
// 联系人名单分配系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)，当前只使用 global 作用域
// ==========================================

use crate::config::ingest_config_trait::IngestConfigReader;
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::types::FileFormat;
use crate::importer::upload_policy::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_UPLOAD_DIR};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global 作用域的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global 作用域的配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 获取全部 global 配置的快照（按键排序）
    pub fn get_config_snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let snapshot = stmt
            .query_map(params![GLOBAL_SCOPE], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(snapshot)
    }
}

// ==========================================
// IngestConfigReader Trait 实现
// ==========================================
#[async_trait]
impl IngestConfigReader for ConfigManager {
    async fn get_max_upload_bytes(&self) -> RepositoryResult<u64> {
        let default = DEFAULT_MAX_UPLOAD_BYTES.to_string();
        let value = self.get_config_or_default(config_keys::UPLOAD_MAX_BYTES, &default)?;
        match value.trim().parse::<u64>() {
            Ok(v) if v > 0 => Ok(v),
            _ => {
                tracing::warn!(
                    config_key = config_keys::UPLOAD_MAX_BYTES,
                    raw_value = %value,
                    "上传大小上限配置无效，使用默认值"
                );
                Ok(DEFAULT_MAX_UPLOAD_BYTES)
            }
        }
    }

    async fn get_allowed_extensions(&self) -> RepositoryResult<Vec<String>> {
        let default = FileFormat::ALL_EXTENSIONS.join(",");
        let value = self.get_config_or_default(config_keys::UPLOAD_ALLOWED_EXTENSIONS, &default)?;

        let extensions: Vec<String> = value
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        if extensions.is_empty() {
            Ok(FileFormat::ALL_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect())
        } else {
            Ok(extensions)
        }
    }

    async fn get_upload_dir(&self) -> RepositoryResult<String> {
        let value = self.get_config_or_default(config_keys::UPLOAD_DIR, DEFAULT_UPLOAD_DIR)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok(DEFAULT_UPLOAD_DIR.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 上传接收
    pub const UPLOAD_MAX_BYTES: &str = "upload.max_bytes";
    pub const UPLOAD_ALLOWED_EXTENSIONS: &str = "upload.allowed_extensions"; // 逗号分隔
    pub const UPLOAD_DIR: &str = "upload.dir";
}
