// ==========================================
// 销售订单生成系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 行级解析问题不在此列（行级问题落入 FailureRecord）
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 表结构错误 =====
    #[error("工作表为空: {0}")]
    EmptySheet(String),

    #[error("Missing columns in sheet: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("Project ID not found in the file (cell {cell})")]
    OrderIdNotFound { cell: String },

    // ===== 参考数据错误 =====
    #[error("参考数据行无效 (行 {row}): {message}")]
    InvalidReferenceRow { row: usize, message: String },
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
