// ==========================================
// 销售订单生成系统 - API 层
// ==========================================
// 职责: 对外业务接口，供命令行调用
// ==========================================

pub mod config_api;
pub mod error;
pub mod order_api;
pub mod reference_api;

// 重导出核心类型
pub use config_api::{ConfigApi, ConfigItem};
pub use error::{ApiError, ApiResult};
pub use order_api::{default_output_path, OrderApi, ProcessSummary, SheetOutcome};
pub use reference_api::{ReferenceApi, ReferenceFiles};
