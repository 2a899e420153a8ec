// ==========================================
// 联系人名单分配系统 - 命令行入口
// ==========================================
// 用法: lead-distribution <文件> [数据库路径]
// - 扩展名取自文件名
// - 成功: 输出 DistributionSummary JSON
// - 失败: 输出 ErrorResponse JSON，退出码 1
// 注意: 导入结束后输入文件会被删除
// ==========================================

use anyhow::{bail, Context};
use lead_distribution::app::{get_default_db_path, AppState};
use lead_distribution::importer::UploadPolicy;
use lead_distribution::logging;
use std::path::PathBuf;
use std::process::ExitCode;

fn usage() -> String {
    "用法: lead-distribution <文件.csv|文件.xlsx|文件.xls> [数据库路径]".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let Some(file) = args.next() else {
        bail!(usage());
    };
    let file_path = PathBuf::from(file);
    let db_path = args.next().unwrap_or_else(get_default_db_path);

    tracing::info!(
        version = lead_distribution::VERSION,
        db_path = %db_path,
        "{}",
        lead_distribution::APP_NAME
    );

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let declared_extension = UploadPolicy::declared_extension(&file_name).unwrap_or_default();

    let state = AppState::new(db_path)
        .await
        .context("无法初始化 AppState")?;

    match state.ingest_api.ingest(&file_path, &declared_extension).await {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&e.to_response())?);
            Ok(ExitCode::FAILURE)
        }
    }
}
