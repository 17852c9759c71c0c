// ==========================================
// 销售订单生成系统 - 引擎层
// ==========================================
// 职责: 行分类与解析、批次编排
// 红线: Engine 不拼 SQL，查询一律经 LookupGateway；每条失败必须带原因
// ==========================================

pub mod orchestrator;
pub mod row_resolver;

pub use orchestrator::BatchOrchestrator;
pub use row_resolver::{HeaderSlot, ResolutionPlan, RowOutcome, RowResolver};
