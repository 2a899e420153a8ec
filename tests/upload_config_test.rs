// ==========================================
// 上传准入与配置集成测试
// ==========================================
// 测试目标: config_kv 配置 → UploadPolicy → IngestApi::accept_upload
// ==========================================


use lead_distribution::app::AppState;
use lead_distribution::config::{config_keys, ConfigManager, IngestConfigReader};
use lead_distribution::domain::{FileFormat, NewAgent};
use lead_distribution::importer::UploadPolicy;
use lead_distribution::logging;
use lead_distribution::ApiError;
use test_helpers::create_test_db;

#[tokio::test]
async fn test_policy_follows_config_kv() {
    logging::init_test();

    let (_db_file, db_path) = create_test_db().unwrap();
    let upload_dir = tempfile::tempdir().unwrap();

    let config = ConfigManager::new(&db_path).unwrap();
    config.set_config_value(config_keys::UPLOAD_MAX_BYTES, "100").unwrap();
    config
        .set_config_value(config_keys::UPLOAD_ALLOWED_EXTENSIONS, "csv,docx")
        .unwrap();
    config
        .set_config_value(
            config_keys::UPLOAD_DIR,
            &upload_dir.path().join("incoming").to_string_lossy(),
        )
        .unwrap();

    let policy = UploadPolicy::from_config(&config).await.unwrap();
    assert_eq!(policy.max_bytes(), 100);
    assert_eq!(policy.allowed_extensions(), vec!["csv"]);
    assert_eq!(policy.check_extension("csv").unwrap(), FileFormat::Csv);
    assert!(policy.check_extension("xlsx").is_err());

    let state = AppState::new(db_path).await.unwrap();
    let accepted = state.ingest_api.accept_upload("Leads Q3.csv", 99).unwrap();
    assert!(accepted.stored_path.starts_with(upload_dir.path().join("incoming")));
    assert!(accepted.stored_path.to_string_lossy().ends_with("-Leads_Q3.csv"));
    assert!(upload_dir.path().join("incoming").is_dir());

    let too_large = state.ingest_api.accept_upload("leads.csv", 101).unwrap_err();
    assert_eq!(too_large.to_response().kind, "FileTooLarge");

    let wrong_type = state.ingest_api.accept_upload("leads.xlsx", 10).unwrap_err();
    assert_eq!(wrong_type.to_response().kind, "UnsupportedFormat");
}

#[tokio::test]
async fn test_config_defaults_on_fresh_database() {
    let (_db_file, db_path) = create_test_db().unwrap();
    let config = ConfigManager::new(&db_path).unwrap();

    assert_eq!(config.get_max_upload_bytes().await.unwrap(), 10 * 1024 * 1024);
    assert_eq!(config.get_upload_dir().await.unwrap(), "./uploads");
    assert!(config.get_config_snapshot().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_agent_rejects_duplicate_email() {
    let (_db_file, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).await.unwrap();

    let agent = NewAgent {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        mobile: "+15550001".to_string(),
        password_hash: "$2b$10$hash".to_string(),
    };
    state.ingest_api.register_agent(agent.clone()).await.unwrap();

    let err = state.ingest_api.register_agent(agent).await.unwrap_err();
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));

    let found = state
        .agent_repo
        .find_by_email("alice@example.com")
        .await
        .unwrap();
    assert!(found.is_some());
}
