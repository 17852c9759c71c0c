// ==========================================
// 销售订单生成系统 - 订单处理 API
// ==========================================
// 职责: 文件级入口（读取 → CRM → 批次解析 → 写出 → 批次日志）
// 说明: 任何结构性错误/外部依赖错误都在写出之前返回，不产生部分结果文件
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, OrderConfigReader};
use crate::crm::CustomerDirectory;
use crate::db::open_sqlite_connection;
use crate::domain::{BatchResult, CustomerHeader, OrderSheet};
use crate::engine::BatchOrchestrator;
use crate::exporter::XlsxResultWriter;
use crate::importer::{FileParser, OrderSheetParser, UniversalFileParser};
use crate::repository::{BatchLogEntity, BatchLogRepository, ReferenceRepository, RepositoryError};
use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// 默认输出文件后缀
const OUTPUT_SUFFIX: &str = "_processed_output.xlsx";

/// 单文件处理结果摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSummary {
    /// 批次ID
    pub batch_id: String,
    /// 源文件名
    pub file_name: Option<String>,
    /// 工作表名
    pub sheet_name: String,
    /// 订单/项目号
    pub order_id: String,
    /// 客户（表头行实际写入值）
    pub customer: String,
    /// 销售对接人（表头行实际写入值）
    pub poc: String,
    /// 数据行数
    pub total_rows: usize,
    /// Success 表行数
    pub success_lines: usize,
    /// Failed 表行数
    pub failed_rows: usize,
    /// 结果文件路径
    pub output_path: String,
    /// 处理耗时（毫秒）
    pub elapsed_ms: u64,
}

/// 批次解析结果（含表头信息）
#[derive(Debug, Clone)]
pub struct SheetOutcome {
    pub header: CustomerHeader,
    pub result: BatchResult,
}

/// 默认输出路径: 与输入同目录，`<文件名>_processed_output.xlsx`
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "order".to_string());
    input.with_file_name(format!("{}{}", stem, OUTPUT_SUFFIX))
}

/// 订单处理 API
pub struct OrderApi {
    config: Arc<ConfigManager>,
    batch_log: BatchLogRepository,
    orchestrator: BatchOrchestrator,
    directory: Arc<dyn CustomerDirectory>,
    parser: Box<dyn FileParser>,
    writer: XlsxResultWriter,
}

impl OrderApi {
    /// 按数据库路径创建
    pub fn new(db_path: &str, directory: Arc<dyn CustomerDirectory>) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(RepositoryError::from)?;
        Self::from_connection(Arc::new(Mutex::new(conn)), directory)
    }

    /// 共享已有连接创建
    pub fn from_connection(
        conn: Arc<Mutex<Connection>>,
        directory: Arc<dyn CustomerDirectory>,
    ) -> ApiResult<Self> {
        let reference = Arc::new(ReferenceRepository::from_connection(conn.clone())?);
        let config = Arc::new(ConfigManager::from_connection(conn.clone())?);
        let batch_log = BatchLogRepository::from_connection(conn)?;

        Ok(Self {
            config,
            batch_log,
            orchestrator: BatchOrchestrator::new(reference),
            directory,
            parser: Box::new(UniversalFileParser),
            writer: XlsxResultWriter::new(),
        })
    }

    /// 处理已解析的订单表（不写文件、不记批次日志）
    ///
    /// # 返回
    /// - Ok(SheetOutcome): 表头信息与批次结果
    /// - Err(ApiError): CRM 或参考表查询故障（整批失败）
    pub async fn process_sheet(&self, sheet: &OrderSheet) -> ApiResult<SheetOutcome> {
        let defaults = self.config.get_header_defaults()?;

        let contact = self
            .directory
            .fetch_customer_and_poc(&sheet.order_id)
            .await
            .map_err(|e| {
                error!(order_id = %sheet.order_id, error = %e, "CRM 查询失败，批次中止");
                ApiError::from(e)
            })?;

        let header = CustomerHeader::resolve(&contact, &defaults);
        let result = self.orchestrator.run(&sheet.rows, header.clone())?;

        Ok(SheetOutcome { header, result })
    }

    /// 处理订单文件
    ///
    /// # 参数
    /// - input: 订单表文件（.xlsx/.xls/.csv）
    /// - output: 结果文件路径（None 时使用默认路径）
    ///
    /// # 返回
    /// - Ok(ProcessSummary): 处理摘要
    /// - Err(ApiError): 结构性错误或外部依赖错误
    #[instrument(
        skip(self, input, output),
        fields(input = %input.display(), batch_id = tracing::field::Empty)
    )]
    pub async fn process_file(
        &self,
        input: &Path,
        output: Option<&Path>,
    ) -> ApiResult<ProcessSummary> {
        let start = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let layout = self.config.get_sheet_layout()?;
        let (sheet_name, grid) = self.parser.parse_to_grid(input)?;
        let sheet = OrderSheetParser::new(layout).parse_grid(&sheet_name, &grid)?;
        info!(
            sheet = %sheet.sheet_name,
            order_id = %sheet.order_id,
            rows = sheet.rows.len(),
            "订单表读取完成"
        );

        let outcome = self.process_sheet(&sheet).await?;

        let output_path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_path(input));
        self.writer.write_to_path(&outcome.result, &output_path)?;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        let file_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());

        self.batch_log.insert(&BatchLogEntity {
            batch_id: batch_id.clone(),
            file_name: file_name.clone(),
            order_id: sheet.order_id.clone(),
            total_rows: sheet.rows.len(),
            success_lines: outcome.result.success_count(),
            failed_rows: outcome.result.failure_count(),
            elapsed_ms,
            processed_at: Utc::now(),
            config_snapshot_json: Some(self.config.get_config_snapshot()?),
        })?;

        info!(
            success_lines = outcome.result.success_count(),
            failed_rows = outcome.result.failure_count(),
            elapsed_ms,
            "订单文件处理完成"
        );

        Ok(ProcessSummary {
            batch_id,
            file_name,
            sheet_name: sheet.sheet_name,
            order_id: sheet.order_id,
            customer: outcome.header.customer,
            poc: outcome.header.poc,
            total_rows: sheet.rows.len(),
            success_lines: outcome.result.success_count(),
            failed_rows: outcome.result.failure_count(),
            output_path: output_path.display().to_string(),
            elapsed_ms,
        })
    }

    /// 最近的批次日志
    pub fn recent_batches(&self, limit: usize) -> ApiResult<Vec<BatchLogEntity>> {
        Ok(self.batch_log.list_recent(limit)?)
    }
}
