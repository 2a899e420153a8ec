// ==========================================
// 联系人名单分配系统 - 导入编排器
// ==========================================
// 职责: 协调 准入 → 解析 → 规范化 → 分配 的完整流程
// 约束:
// - 临时上传文件在每条退出路径上都恰好清理一次（先检查存在性）
// - 解析在阻塞线程池执行，等待完整行序列（成功或失败）后才规范化
// - 不报告部分成功: 要么返回完整汇总，要么返回错误
// ==========================================

use crate::domain::distribution::{DistributionSummary, UploadJob};
use crate::engine::distribution::DistributionEngine;
use crate::importer::error::{IngestError, IngestResult, PersistPhase};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::record_normalizer::RecordNormalizer;
use crate::importer::upload_policy::UploadPolicy;
use crate::repository::agent_repo::AgentRepository;
use crate::repository::distribution_repo::DistributionRepository;
use crate::repository::temp_file_store::TempFileStore;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ==========================================
// IngestionOrchestrator - 导入编排器
// ==========================================
pub struct IngestionOrchestrator {
    agents: Arc<dyn AgentRepository>,
    engine: DistributionEngine<dyn DistributionRepository>,
    temp_files: Arc<dyn TempFileStore>,
    normalizer: RecordNormalizer,
    policy: UploadPolicy,
}

impl IngestionOrchestrator {
    pub fn new(
        agents: Arc<dyn AgentRepository>,
        distributions: Arc<dyn DistributionRepository>,
        temp_files: Arc<dyn TempFileStore>,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            agents,
            engine: DistributionEngine::new(distributions),
            temp_files,
            normalizer: RecordNormalizer::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// 导入一个上传文件并完成分配（主入口）
    ///
    /// # 参数
    /// - file_path: 临时上传文件路径（调用结束后一定被删除）
    /// - declared_extension: 声明的扩展名
    ///
    /// # 返回
    /// - Ok(DistributionSummary)
    /// - Err(IngestError): 五类错误之一
    #[instrument(skip(self, file_path), fields(file = %file_path.display()))]
    pub async fn ingest(
        &self,
        file_path: &Path,
        declared_extension: &str,
    ) -> IngestResult<DistributionSummary> {
        let mut job = UploadJob::new(file_path, declared_extension);
        let result = self.run_pipeline(&mut job).await;
        self.cleanup(&job.source_path).await;

        match &result {
            Ok(summary) => info!(
                raw_rows = job.raw_row_count,
                total_records = summary.total_records,
                distributions_created = summary.distributions_created,
                "导入完成"
            ),
            Err(e) => warn!(
                kind = %e.kind(),
                raw_rows = job.raw_row_count,
                error = %e,
                "导入失败"
            ),
        }
        result
    }

    async fn run_pipeline(&self, job: &mut UploadJob) -> IngestResult<DistributionSummary> {
        // === 步骤 1: 扩展名白名单（不读取文件内容） ===
        let format = self.policy.check_extension(&job.declared_extension)?;

        // === 步骤 2: 解析（等待完整序列） ===
        let path = job.source_path.clone();
        let rows = tokio::task::spawn_blocking(move || {
            UniversalFileParser.parse(&path, format)?.collect_all()
        })
        .await
        .map_err(|e| IngestError::ParseError(format!("解析任务异常终止: {}", e)))??;
        job.raw_row_count = rows.len();
        debug!(format = %format, raw_rows = rows.len(), "解析完成");

        // === 步骤 3: 列解析 + 规范化 + 校验 ===
        let records = self.normalizer.normalize(&rows)?;
        debug!(records = records.len(), "规范化完成");

        // === 步骤 4: 读取当前名册并分配 ===
        let agents = self
            .agents
            .list_agents()
            .await
            .map_err(|e| IngestError::persist(PersistPhase::LoadAgents, e))?;

        self.engine.distribute(&records, &agents).await
    }

    /// 删除临时文件；失败只记录告警，不覆盖流程结果
    async fn cleanup(&self, path: &Path) {
        if !self.temp_files.exists(path).await {
            debug!(path = %path.display(), "临时文件已不存在，跳过清理");
            return;
        }
        if let Err(e) = self.temp_files.remove(path).await {
            warn!(path = %path.display(), error = %e, "临时文件清理失败");
        }
    }
}
