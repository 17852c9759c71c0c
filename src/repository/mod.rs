// ==========================================
// 销售订单生成系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod batch_log_repo;
pub mod error;
pub mod lookup_gateway;
pub mod reference_repo;

// 重导出核心仓储
pub use batch_log_repo::{BatchLogEntity, BatchLogRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use lookup_gateway::LookupGateway;
pub use reference_repo::{ReferenceCounts, ReferenceLoad, ReferenceRepository};
