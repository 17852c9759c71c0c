// ==========================================
// 销售订单生成系统 - 导出层
// ==========================================
// 职责: 批次结果写出为 Success / Failed 双工作表 xlsx
// ==========================================

pub mod error;
pub mod xlsx_writer;

pub use error::{ExportError, ExportResult};
pub use xlsx_writer::{
    XlsxResultWriter, FAILED_COLUMNS, FAILED_SHEET, SUCCESS_COLUMNS, SUCCESS_SHEET,
};
