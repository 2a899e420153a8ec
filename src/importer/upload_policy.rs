// ==========================================
// 联系人名单分配系统 - 上传准入策略
// ==========================================
// 职责: 统一的上传准入规则（扩展名白名单 + 大小上限 + 存储命名）
// 上传接收层与导入编排器共用同一份策略，不再各自重复校验
// ==========================================

use crate::config::IngestConfigReader;
use crate::domain::types::FileFormat;
use crate::importer::error::{IngestError, IngestResult};
use crate::repository::error::RepositoryResult;
use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// 默认上传大小上限: 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// 默认上传目录
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// 上传拒绝原因
#[derive(Error, Debug)]
pub enum UploadRejection {
    #[error("未提供文件名")]
    MissingFileName,

    #[error(transparent)]
    UnsupportedFormat(#[from] IngestError),

    #[error("文件过大: {size} 字节，上限 {limit} 字节")]
    TooLarge { size: u64, limit: u64 },
}

/// 通过准入的上传
#[derive(Debug, Clone)]
pub struct AcceptedUpload {
    pub format: FileFormat,
    pub declared_extension: String,
    pub stored_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed: Vec<FileFormat>,
    max_bytes: u64,
    upload_dir: PathBuf,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed: vec![FileFormat::Csv, FileFormat::Xlsx, FileFormat::Xls],
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
        }
    }
}

impl UploadPolicy {
    pub fn new(allowed: Vec<FileFormat>, max_bytes: u64, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            allowed,
            max_bytes,
            upload_dir: upload_dir.into(),
        }
    }

    /// 从配置构造（缺省项取默认值）
    pub async fn from_config<C: IngestConfigReader + ?Sized>(config: &C) -> RepositoryResult<Self> {
        let mut allowed = Vec::new();
        for ext in config.get_allowed_extensions().await? {
            match FileFormat::from_extension(&ext) {
                Some(format) if !allowed.contains(&format) => allowed.push(format),
                Some(_) => {}
                None => warn!(extension = %ext, "忽略无法识别的扩展名配置"),
            }
        }
        if allowed.is_empty() {
            allowed = Self::default().allowed;
        }

        Ok(Self {
            allowed,
            max_bytes: config.get_max_upload_bytes().await?,
            upload_dir: PathBuf::from(config.get_upload_dir().await?),
        })
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn allowed_extensions(&self) -> Vec<&'static str> {
        self.allowed.iter().map(FileFormat::extension).collect()
    }

    /// 取文件名最后一个 '.' 之后的部分（小写）
    pub fn declared_extension(file_name: &str) -> Option<String> {
        let (_, ext) = file_name.trim().rsplit_once('.')?;
        if ext.is_empty() {
            None
        } else {
            Some(ext.to_lowercase())
        }
    }

    /// 校验扩展名（不读取文件内容）
    pub fn check_extension(&self, declared_extension: &str) -> IngestResult<FileFormat> {
        FileFormat::from_extension(declared_extension)
            .filter(|format| self.allowed.contains(format))
            .ok_or_else(|| {
                IngestError::UnsupportedFormat(format!(
                    "{}（允许: {}）",
                    declared_extension.trim(),
                    self.allowed_extensions().join(", ")
                ))
            })
    }

    pub fn check_size(&self, size: u64) -> Result<(), UploadRejection> {
        if size > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    /// 上传准入（扩展名 + 大小），并分配存储路径
    pub fn accept(&self, original_name: &str, size: u64) -> Result<AcceptedUpload, UploadRejection> {
        if original_name.trim().is_empty() {
            return Err(UploadRejection::MissingFileName);
        }

        let declared_extension = Self::declared_extension(original_name).unwrap_or_default();
        let format = self.check_extension(&declared_extension)?;
        self.check_size(size)?;

        Ok(AcceptedUpload {
            format,
            declared_extension,
            stored_path: self.upload_dir.join(Self::stored_file_name(original_name)),
        })
    }

    /// 存储文件名: <毫秒时间戳>-<uuid>-<清洗后的原名>
    pub fn stored_file_name(original_name: &str) -> String {
        let clean: String = original_name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            clean
        )
    }

    /// 确保上传目录存在
    pub fn ensure_upload_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_extension() {
        assert_eq!(UploadPolicy::declared_extension("leads.CSV"), Some("csv".to_string()));
        assert_eq!(
            UploadPolicy::declared_extension("q3.leads.xlsx"),
            Some("xlsx".to_string())
        );
        assert_eq!(UploadPolicy::declared_extension("noext"), None);
        assert_eq!(UploadPolicy::declared_extension("trailing."), None);
    }

    #[test]
    fn test_check_extension_allow_list() {
        let policy = UploadPolicy::default();
        assert_eq!(policy.check_extension("csv").unwrap(), FileFormat::Csv);
        assert_eq!(policy.check_extension("XLS").unwrap(), FileFormat::Xls);
        assert!(matches!(
            policy.check_extension("pdf"),
            Err(IngestError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_restricted_policy_rejects_unlisted_format() {
        let policy = UploadPolicy::new(vec![FileFormat::Csv], DEFAULT_MAX_UPLOAD_BYTES, "/tmp");
        assert!(policy.check_extension("xlsx").is_err());
    }

    #[test]
    fn test_accept_enforces_size_limit() {
        let policy = UploadPolicy::default();
        assert!(policy.accept("leads.csv", DEFAULT_MAX_UPLOAD_BYTES).is_ok());
        assert!(matches!(
            policy.accept("leads.csv", DEFAULT_MAX_UPLOAD_BYTES + 1),
            Err(UploadRejection::TooLarge { .. })
        ));
        assert!(matches!(
            policy.accept("leads.txt", 10),
            Err(UploadRejection::UnsupportedFormat(_))
        ));
        assert!(matches!(
            policy.accept("  ", 10),
            Err(UploadRejection::MissingFileName)
        ));
    }

    #[test]
    fn test_stored_file_name_is_sanitized() {
        let name = UploadPolicy::stored_file_name("my leads (v2).xlsx");
        assert!(name.ends_with("-my_leads__v2_.xlsx"));
        assert!(name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'));
    }

    #[test]
    fn test_accepted_upload_lives_in_upload_dir() {
        let policy = UploadPolicy::new(vec![FileFormat::Csv], 100, "/var/uploads");
        let accepted = policy.accept("a.csv", 10).unwrap();
        assert!(accepted.stored_path.starts_with("/var/uploads"));
        assert_eq!(accepted.format, FileFormat::Csv);
    }
}
