// ==========================================
// 联系人名单分配系统 - 导入 API
// ==========================================
// 职责: 面向调用方（HTTP 层 / CLI）的边界接口
// - 上传准入
// - 导入并分配
// - 分配结果查询
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::agent::{Agent, NewAgent};
use crate::domain::distribution::{AgentRef, DistributionSummary, DistributionView};
use crate::engine::orchestrator::IngestionOrchestrator;
use crate::importer::upload_policy::AcceptedUpload;
use crate::repository::agent_repo::AgentRepository;
use crate::repository::distribution_repo::DistributionRepository;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// 导入 API
pub struct IngestApi {
    orchestrator: Arc<IngestionOrchestrator>,
    agents: Arc<dyn AgentRepository>,
    distributions: Arc<dyn DistributionRepository>,
}

impl IngestApi {
    pub fn new(
        orchestrator: Arc<IngestionOrchestrator>,
        agents: Arc<dyn AgentRepository>,
        distributions: Arc<dyn DistributionRepository>,
    ) -> Self {
        Self {
            orchestrator,
            agents,
            distributions,
        }
    }

    /// 上传准入（扩展名 + 大小），返回存储路径
    ///
    /// 上传目录不存在时自动创建
    pub fn accept_upload(&self, original_name: &str, size: u64) -> ApiResult<AcceptedUpload> {
        let policy = self.orchestrator.policy();
        let accepted = policy.accept(original_name, size)?;
        policy.ensure_upload_dir().map_err(|e| {
            ApiError::InternalError(format!(
                "创建上传目录失败 {}: {}",
                policy.upload_dir().display(),
                e
            ))
        })?;
        Ok(accepted)
    }

    /// 导入并分配
    ///
    /// # 返回
    /// - Ok(DistributionSummary)
    /// - Err(ApiError::Ingest): 五类导入错误之一，可通过 to_response() 转为结构化结果
    pub async fn ingest(
        &self,
        file_path: &Path,
        declared_extension: &str,
    ) -> ApiResult<DistributionSummary> {
        Ok(self
            .orchestrator
            .ingest(file_path, declared_extension)
            .await?)
    }

    /// 列出全部分配（按名册顺序，附坐席姓名与邮箱）
    pub async fn list_distributions(&self) -> ApiResult<Vec<DistributionView>> {
        let (agents, distributions) = futures::try_join!(
            self.agents.list_agents(),
            self.distributions.list_all()
        )?;

        let position: HashMap<&str, usize> = agents
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.as_str(), i))
            .collect();

        let mut views: Vec<(usize, DistributionView)> = Vec::with_capacity(distributions.len());
        for dist in distributions {
            let Some(&idx) = position.get(dist.agent_id.as_str()) else {
                warn!(agent_id = %dist.agent_id, "分配引用了不存在的坐席，已跳过");
                continue;
            };
            let agent = &agents[idx];
            views.push((
                idx,
                DistributionView {
                    distribution_id: dist.distribution_id,
                    agent: AgentRef {
                        id: agent.id.clone(),
                        name: agent.name.clone(),
                        email: agent.email.clone(),
                    },
                    records: dist.records,
                },
            ));
        }
        views.sort_by_key(|(idx, _)| *idx);

        Ok(views.into_iter().map(|(_, view)| view).collect())
    }

    /// 新增坐席（口令须已哈希）
    pub async fn register_agent(&self, agent: NewAgent) -> ApiResult<Agent> {
        let created = self.agents.insert_agent(agent).await?;
        info!(agent_id = %created.id, email = %created.email, "坐席已创建");
        Ok(created)
    }
}
