// ==========================================
// 销售订单生成系统 - 批次编排器
// ==========================================
// 流程: 逐行 字段提取 → 行解析 → 汇总成功行/失败记录
// 约束:
// - 行级失败不中断批次，部分成功保留
// - 查询故障中断整批，不返回部分结果
// - 批次状态（结果序列、表头注入状态）仅存在于单次调用内
// ==========================================

use crate::domain::{BatchResult, CustomerHeader, OrderRow};
use crate::engine::row_resolver::{HeaderSlot, RowResolver};
use crate::importer::{FieldExtractor, PatternFieldExtractor};
use crate::perf::BatchMeter;
use crate::repository::{LookupGateway, RepositoryResult};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub struct BatchOrchestrator {
    extractor: Box<dyn FieldExtractor>,
    resolver: RowResolver,
}

impl BatchOrchestrator {
    /// 创建编排器（默认正则字段提取器）
    pub fn new(gateway: Arc<dyn LookupGateway>) -> Self {
        Self {
            extractor: Box::new(PatternFieldExtractor),
            resolver: RowResolver::new(gateway),
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn FieldExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// 处理一批订单行
    ///
    /// # 参数
    /// - rows: 订单表数据行（表内顺序）
    /// - header: 批次客户表头（注入到第一条通过校验的行）
    ///
    /// # 返回
    /// - Ok(BatchResult): 成功行与失败记录，均保持源行顺序
    /// - Err: 参考表查询故障（整批失败）
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub fn run(&self, rows: &[OrderRow], header: CustomerHeader) -> RepositoryResult<BatchResult> {
        let meter = BatchMeter::start("batch_resolve", rows.len());

        let mut slot = HeaderSlot::new(header);
        let mut result = BatchResult::default();

        for order_row in rows {
            let extracted = self.extractor.extract_row(order_row);
            debug!(
                row = extracted.row_index,
                model = extracted.model.as_deref().unwrap_or("-"),
                finish = extracted.finish.as_deref().unwrap_or("-"),
                "字段提取完成"
            );

            let outcome = self
                .resolver
                .resolve(&extracted, &mut slot)
                .map_err(|e| {
                    error!(row = extracted.row_index, error = %e, "参考表查询失败，批次中止");
                    e
                })?;

            result.lines.extend(outcome.lines);
            if let Some(failure) = outcome.failure {
                warn!(
                    row = failure.row_index,
                    code = failure.reason.code(),
                    reason = %failure.reason,
                    "行解析失败"
                );
                result.failures.push(failure);
            }
        }

        info!(
            success_lines = result.success_count(),
            failed_rows = result.failure_count(),
            header_written = slot.is_written(),
            lookups = meter.stats().total(),
            "批次解析完成"
        );

        Ok(result)
    }
}
