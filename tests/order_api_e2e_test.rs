// ==========================================
// 订单处理 API 端到端测试
// ==========================================
// 测试目标: 订单表文件 → 结果 xlsx + 批次日志
// CRM: StaticDirectory / 故障目录
// ==========================================

mod test_helpers;

use async_trait::async_trait;
use so_generation::api::{ApiError, ConfigApi, OrderApi};
use so_generation::config::config_keys;
use so_generation::crm::{CrmError, CrmResult, CustomerDirectory, StaticDirectory};
use so_generation::domain::CustomerContact;
use std::sync::Arc;
use test_helpers::{
    create_test_db, read_sheet, seed_reference_data, write_order_workbook, SheetRow,
    STANDARD_COLUMNS,
};

/// 始终不可达的 CRM
struct UnreachableCrm;

#[async_trait]
impl CustomerDirectory for UnreachableCrm {
    async fn fetch_customer_and_poc(&self, _order_id: &str) -> CrmResult<CustomerContact> {
        Err(CrmError::Status {
            status: 503,
            body: "maintenance".to_string(),
        })
    }
}

fn sample_rows() -> Vec<SheetRow<'static>> {
    vec![
        (Some("Wall A"), Some("Base cabinet"), None),
        (
            Some("Wall B"),
            Some("Model: MK-100\nWidth: 600"),
            Some("Carcass: White\nShutter Finish: Red\nHandle: G-profile"),
        ),
        (None, None, None),
        (Some("Wall C"), Some("Model: FIL-0043"), Some("Shutter Finish : Oak")),
        (Some("Wall D"), Some("Model: HW-9"), None),
    ]
}

fn directory() -> Arc<dyn CustomerDirectory> {
    Arc::new(StaticDirectory::empty().with_contact("4521", Some("Sharma Residence"), None))
}

#[tokio::test]
async fn test_process_file_writes_both_sheets() {
    so_generation::logging::init_test();
    let (_temp_db, db_path) = create_test_db().expect("Failed to create test db");
    seed_reference_data(&db_path).expect("Failed to seed");

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("order.xlsx");
    let output = dir.path().join("result.xlsx");
    write_order_workbook(&input, "4521 - Sharma", &STANDARD_COLUMNS, &sample_rows()).unwrap();

    let api = OrderApi::new(&db_path, directory()).expect("Failed to create OrderApi");
    let summary = api
        .process_file(&input, Some(output.as_path()))
        .await
        .expect("processing should succeed");

    assert_eq!(summary.order_id, "4521");
    assert_eq!(summary.customer, "Sharma Residence");
    assert_eq!(summary.poc, "Default POC");
    assert_eq!(summary.total_rows, 5);
    assert_eq!(summary.success_lines, 4);
    assert_eq!(summary.failed_rows, 3);
    assert_eq!(summary.file_name.as_deref(), Some("order.xlsx"));

    let success = read_sheet(&output, "Success").unwrap();
    assert_eq!(
        success[0],
        vec!["Order Lines/Product", "Cabinet Position", "Customer", "GST Treatment", "POC"]
    );
    assert_eq!(
        success[1],
        vec!["MK-100", "Wall B", "Sharma Residence", "Consumer", "Default POC"]
    );
    assert_eq!(success[2], vec!["MK-100", "Wall B", "", "", ""]);
    assert_eq!(success[3], vec!["RAW1-R1", "Wall B", "", "", ""]);
    assert_eq!(success[4], vec!["FIL-0043-OK9", "Wall C", "", "", ""]);
    assert_eq!(success.len(), 5);

    let failed = read_sheet(&output, "Failed").unwrap();
    assert_eq!(failed[0], vec!["Row", "Model", "Cabinet Position", "Reason"]);
    assert_eq!(failed[1], vec!["1", "", "Wall A", "Model missing"]);
    // 中间空行按源行号进入 Failed 表
    assert_eq!(failed[2], vec!["3", "", "", "Model missing"]);
    assert_eq!(
        failed[3],
        vec![
            "5",
            "HW-9",
            "Wall D",
            "No mapping found in code_raw for model 'HW-9'"
        ]
    );

    let batches = api.recent_batches(10).unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].batch_id, summary.batch_id);
    assert_eq!(batches[0].failed_rows, 3);
    assert!(batches[0].config_snapshot_json.is_some());
}

#[tokio::test]
async fn test_default_output_path_next_to_input() {
    let (_temp_db, db_path) = create_test_db().expect("Failed to create test db");
    seed_reference_data(&db_path).expect("Failed to seed");

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("Project 4521.xlsx");
    write_order_workbook(&input, "4521", &STANDARD_COLUMNS, &sample_rows()).unwrap();

    let api = OrderApi::new(&db_path, directory()).unwrap();
    let summary = api.process_file(&input, None).await.unwrap();

    let expected = dir.path().join("Project 4521_processed_output.xlsx");
    assert_eq!(summary.output_path, expected.display().to_string());
    assert!(expected.exists());
}

#[tokio::test]
async fn test_missing_column_fails_before_processing() {
    let (_temp_db, db_path) = create_test_db().expect("Failed to create test db");
    seed_reference_data(&db_path).expect("Failed to seed");

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("order.xlsx");
    let output = dir.path().join("result.xlsx");
    write_order_workbook(&input, "4521", &["Reference", "Item", "Finish"], &sample_rows())
        .unwrap();

    let api = OrderApi::new(&db_path, directory()).unwrap();
    let err = api.process_file(&input, Some(output.as_path())).await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidSheet(ref msg) if msg.contains("Finishes")));
    assert!(!output.exists());
    assert!(api.recent_batches(10).unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_order_id_fails() {
    let (_temp_db, db_path) = create_test_db().expect("Failed to create test db");

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("order.xlsx");
    write_order_workbook(&input, "Project TBD", &STANDARD_COLUMNS, &sample_rows()).unwrap();

    let api = OrderApi::new(&db_path, directory()).unwrap();
    let err = api.process_file(&input, None).await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidSheet(ref msg) if msg.contains("C2")));
}

#[tokio::test]
async fn test_crm_failure_aborts_without_output() {
    let (_temp_db, db_path) = create_test_db().expect("Failed to create test db");
    seed_reference_data(&db_path).expect("Failed to seed");

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("order.xlsx");
    let output = dir.path().join("result.xlsx");
    write_order_workbook(&input, "4521", &STANDARD_COLUMNS, &sample_rows()).unwrap();

    let api = OrderApi::new(&db_path, Arc::new(UnreachableCrm)).unwrap();
    let err = api.process_file(&input, Some(output.as_path())).await.unwrap_err();

    assert!(matches!(err, ApiError::CrmUnavailable(ref msg) if msg.contains("503")));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_configured_defaults_used_when_crm_has_no_record() {
    let (_temp_db, db_path) = create_test_db().expect("Failed to create test db");
    seed_reference_data(&db_path).expect("Failed to seed");

    let config = ConfigApi::new(&db_path).unwrap();
    config
        .update_config(config_keys::DEFAULT_CUSTOMER, "Walk-in Customer")
        .unwrap();
    config
        .update_config(config_keys::DEFAULT_GST_TREATMENT, "Registered")
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("order.xlsx");
    let output = dir.path().join("result.xlsx");
    write_order_workbook(&input, "7788", &STANDARD_COLUMNS, &sample_rows()).unwrap();

    let api = OrderApi::new(&db_path, directory()).unwrap();
    let summary = api.process_file(&input, Some(output.as_path())).await.unwrap();
    assert_eq!(summary.customer, "Walk-in Customer");

    let success = read_sheet(&output, "Success").unwrap();
    assert_eq!(
        success[1],
        vec!["MK-100", "Wall B", "Walk-in Customer", "Registered", "Default POC"]
    );
}

#[tokio::test]
async fn test_csv_input_is_supported() {
    let (_temp_db, db_path) = create_test_db().expect("Failed to create test db");
    seed_reference_data(&db_path).expect("Failed to seed");

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("order.csv");
    let output = dir.path().join("result.xlsx");
    std::fs::write(
        &input,
        "Cabinet Order Sheet,,\n,Project,4521\nReference,Item,Finishes\nWall B,Model: HW-7,\nWall C,Model: FIL-0043,\"Shutter Finish: Red\"\n",
    )
    .unwrap();

    let api = OrderApi::new(&db_path, directory()).unwrap();
    let summary = api.process_file(&input, Some(output.as_path())).await.unwrap();

    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.failed_rows, 0);

    let success = read_sheet(&output, "Success").unwrap();
    let products: Vec<&str> = success.iter().skip(1).map(|r| r[0].as_str()).collect();
    assert_eq!(products, vec!["HW-7", "ODO-7", "FIL-0043-R1"]);
}
