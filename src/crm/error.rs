// ==========================================
// 销售订单生成系统 - CRM 客户端错误类型
// ==========================================
// 说明: “记录不存在”不是错误；以下均为整批致命错误
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrmError {
    #[error("CRM 网络错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CRM 返回 HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("CRM 认证失败 (db={database}, user={username})")]
    AuthenticationFailed { database: String, username: String },

    #[error("CRM 调用失败 ({code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("CRM 响应格式错误: {0}")]
    Decode(String),

    #[error("订单号无效: {0}")]
    InvalidOrderId(String),
}

pub type CrmResult<T> = Result<T, CrmError>;
