// ==========================================
// 销售订单生成系统 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为用户可读的错误消息
// 说明: 行级失败不是错误，进入 Failed 表
// ==========================================

use crate::config::SettingsError;
use crate::crm::CrmError;
use crate::exporter::ExportError;
use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误（处理任何行之前即失败）
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("订单表结构无效: {0}")]
    InvalidSheet(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 外部依赖错误
    // ==========================================
    #[error("CRM 不可用: {0}")]
    CrmUnavailable(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("结果导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::MissingColumns(_)
            | ImportError::OrderIdNotFound { .. }
            | ImportError::EmptySheet(_) => ApiError::InvalidSheet(err.to_string()),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

impl From<CrmError> for ApiError {
    fn from(err: CrmError) -> Self {
        match err {
            CrmError::InvalidOrderId(id) => {
                ApiError::InvalidSheet(format!("订单号无法用于 CRM 查询: {}", id))
            }
            other => ApiError::CrmUnavailable(other.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
