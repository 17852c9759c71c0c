// ==========================================
// 销售订单生成系统 - 领域层
// ==========================================
// 职责: 订单行、参考数据、批次结果的类型定义
// ==========================================

pub mod order;
pub mod reference;
pub mod types;

pub use order::{
    BatchResult, CustomerContact, CustomerHeader, ExtractedRow, FailureRecord, HeaderDefaults,
    OrderRow, OrderSheet, OutputLine,
};
pub use reference::{CabinetRecord, CodeMapping, ColourRecord};
pub use types::{FailureReason, ModelFamily};
