// ==========================================
// 销售订单生成系统 - CRM 集成层
// ==========================================
// 职责: 按订单号查询客户名与销售对接人
// 实现: OdooClient（JSON-RPC）/ StaticDirectory（离线）
// ==========================================

pub mod error;
pub mod odoo_client;
pub mod static_directory;

use crate::domain::CustomerContact;
use async_trait::async_trait;

pub use error::{CrmError, CrmResult};
pub use odoo_client::OdooClient;
pub use static_directory::StaticDirectory;

// ==========================================
// CustomerDirectory Trait
// ==========================================
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// 按订单号查询客户与对接人
    ///
    /// # 返回
    /// - Ok(CustomerContact): 未找到记录时两个字段均为 None
    /// - Err: 网络/认证/协议错误（整批致命）
    async fn fetch_customer_and_poc(&self, order_id: &str) -> CrmResult<CustomerContact>;
}
