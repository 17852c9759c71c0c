// ==========================================
// 销售订单生成系统 - 核心库
// ==========================================
// 流程: 订单表 → 字段提取 → 行分类与解析 → Success / Failed 结果表
// 技术栈: Rust + SQLite + Odoo JSON-RPC
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 参考表查询与批次日志
pub mod repository;

// 引擎层 - 行解析与批次编排
pub mod engine;

// 导入层 - 订单表与参考数据读取
pub mod importer;

// 导出层 - 结果表写出
pub mod exporter;

// 配置层 - 系统配置
pub mod config;

// CRM 集成
pub mod crm;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    BatchResult, CustomerHeader, ExtractedRow, FailureReason, FailureRecord, ModelFamily,
    OrderRow, OrderSheet, OutputLine,
};

// 引擎
pub use engine::{BatchOrchestrator, RowResolver};

// API
pub use api::{ConfigApi, OrderApi, ProcessSummary, ReferenceApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "销售订单生成系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
