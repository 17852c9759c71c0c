// ==========================================
// 销售订单生成系统 - 行分类与解析引擎
// ==========================================
// 职责: 校验门 → 表头注入 → 按型号前缀分派解析策略
// 策略:
// - MK-  : 柜体 BOM 展开（型号行 + 每个 BOM 物料-颜色码）
// - FIL- : 型号-颜色码
// - 其他 : code_raw 映射编码
// 约束:
// - 每行至多一条失败记录
// - 查询“未找到”是行级失败；存储层故障向上传播（整批失败）
// ==========================================

use crate::domain::{
    CustomerHeader, ExtractedRow, FailureReason, FailureRecord, ModelFamily, OutputLine,
};
use crate::repository::{LookupGateway, RepositoryResult};
use std::sync::Arc;
use tracing::debug;

// ==========================================
// ResolutionPlan - 通过校验门后的解析计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionPlan {
    Mk { model: String, finish: String },
    Fil { model: String, finish: String },
    Generic { model: String },
}

impl ResolutionPlan {
    /// 校验门
    ///
    /// - 型号缺失 → Model missing
    /// - MK-/FIL- 型号且饰面缺失 → Finish missing
    pub fn from_row(row: &ExtractedRow) -> Result<Self, FailureReason> {
        let model = row.model.clone().ok_or(FailureReason::ModelMissing)?;

        let family = ModelFamily::classify(&model);
        if !family.requires_finish() {
            return Ok(ResolutionPlan::Generic { model });
        }

        let finish = row.finish.clone().ok_or(FailureReason::FinishMissing)?;
        Ok(match family {
            ModelFamily::Mk => ResolutionPlan::Mk { model, finish },
            _ => ResolutionPlan::Fil { model, finish },
        })
    }

    pub fn model(&self) -> &str {
        match self {
            ResolutionPlan::Mk { model, .. }
            | ResolutionPlan::Fil { model, .. }
            | ResolutionPlan::Generic { model } => model,
        }
    }

    pub fn family(&self) -> ModelFamily {
        match self {
            ResolutionPlan::Mk { .. } => ModelFamily::Mk,
            ResolutionPlan::Fil { .. } => ModelFamily::Fil,
            ResolutionPlan::Generic { .. } => ModelFamily::Generic,
        }
    }
}

// ==========================================
// HeaderSlot - 批次内表头注入状态
// ==========================================
// 由编排器持有，每批新建一个
#[derive(Debug, Clone)]
pub struct HeaderSlot {
    pending: Option<CustomerHeader>,
}

impl HeaderSlot {
    pub fn new(header: CustomerHeader) -> Self {
        Self {
            pending: Some(header),
        }
    }

    /// 取出表头（只会成功一次）
    pub fn take(&mut self) -> Option<CustomerHeader> {
        self.pending.take()
    }

    pub fn is_written(&self) -> bool {
        self.pending.is_none()
    }
}

// ==========================================
// RowOutcome - 单行解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowOutcome {
    pub lines: Vec<OutputLine>,
    pub failure: Option<FailureRecord>,
}

impl RowOutcome {
    fn failed(row: &ExtractedRow, lines: Vec<OutputLine>, reason: FailureReason) -> Self {
        Self {
            lines,
            failure: Some(FailureRecord::new(row, reason)),
        }
    }
}

// ==========================================
// RowResolver
// ==========================================
pub struct RowResolver {
    gateway: Arc<dyn LookupGateway>,
}

impl RowResolver {
    pub fn new(gateway: Arc<dyn LookupGateway>) -> Self {
        Self { gateway }
    }

    /// 解析单行
    ///
    /// # 参数
    /// - row: 字段提取结果
    /// - header: 批次表头状态（第一条通过校验门的行消费）
    ///
    /// # 返回
    /// - Ok(RowOutcome): 产出的订单行（保持顺序）与可选失败记录
    /// - Err: 参考表查询故障
    pub fn resolve(
        &self,
        row: &ExtractedRow,
        header: &mut HeaderSlot,
    ) -> RepositoryResult<RowOutcome> {
        let plan = match ResolutionPlan::from_row(row) {
            Ok(plan) => plan,
            Err(reason) => return Ok(RowOutcome::failed(row, Vec::new(), reason)),
        };

        let mut lines = Vec::new();

        // 表头行与本行策略结果无关
        if let Some(customer_header) = header.take() {
            debug!(row = row.row_index, model = plan.model(), "注入客户表头行");
            lines.push(OutputLine::header(
                &customer_header,
                plan.model(),
                row.reference.clone(),
            ));
        }

        let result = match &plan {
            ResolutionPlan::Mk { model, finish } => {
                self.resolve_mk(row, model, finish, &mut lines)?
            }
            ResolutionPlan::Fil { model, finish } => {
                self.resolve_fil(row, model, finish, &mut lines)?
            }
            ResolutionPlan::Generic { model } => self.resolve_generic(row, model, &mut lines)?,
        };

        Ok(RowOutcome {
            lines,
            failure: result.err().map(|reason| FailureRecord::new(row, reason)),
        })
    }

    fn resolve_mk(
        &self,
        row: &ExtractedRow,
        model: &str,
        finish: &str,
        lines: &mut Vec<OutputLine>,
    ) -> RepositoryResult<Result<(), FailureReason>> {
        let Some(cabinet) = self.gateway.find_cabinet(model)? else {
            return Ok(Err(FailureReason::CabinetNotFound));
        };

        // 型号行先于颜色查询输出，颜色失败时保留
        lines.push(OutputLine::order_line(model, row.reference.clone()));

        let Some(colour_code) = self.colour_code(finish)? else {
            return Ok(Err(FailureReason::ColourNotFound {
                finish: finish.to_string(),
            }));
        };

        for bom_line in cabinet.present_bom_lines() {
            lines.push(OutputLine::order_line(
                format!("{}-{}", bom_line, colour_code),
                row.reference.clone(),
            ));
        }
        Ok(Ok(()))
    }

    fn resolve_fil(
        &self,
        row: &ExtractedRow,
        model: &str,
        finish: &str,
        lines: &mut Vec<OutputLine>,
    ) -> RepositoryResult<Result<(), FailureReason>> {
        let Some(colour_code) = self.colour_code(finish)? else {
            return Ok(Err(FailureReason::ColourNotFound {
                finish: finish.to_string(),
            }));
        };

        lines.push(OutputLine::order_line(
            format!("{}-{}", model, colour_code),
            row.reference.clone(),
        ));
        Ok(Ok(()))
    }

    fn resolve_generic(
        &self,
        row: &ExtractedRow,
        model: &str,
        lines: &mut Vec<OutputLine>,
    ) -> RepositoryResult<Result<(), FailureReason>> {
        let mapped = self
            .gateway
            .find_mapped_code(model)?
            .filter(|code| !code.trim().is_empty());

        let Some(code) = mapped else {
            return Ok(Err(FailureReason::MappingNotFound {
                model: model.to_string(),
            }));
        };

        lines.push(OutputLine::order_line(code, row.reference.clone()));
        Ok(Ok(()))
    }

    /// 空颜色码视为未找到
    fn colour_code(&self, finish: &str) -> RepositoryResult<Option<String>> {
        Ok(self
            .gateway
            .find_colour(finish)?
            .map(|record| record.colour_code)
            .filter(|code| !code.trim().is_empty()))
    }
}
