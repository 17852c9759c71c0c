// ==========================================
// 销售订单生成系统 - 导入层
// ==========================================
// 职责: 订单表读取、表结构校验、字段提取；参考数据 CSV 加载
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod field_extractor;
pub mod file_parser;
pub mod order_importer_trait;
pub mod order_sheet;
pub mod reference_loader;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_extractor::PatternFieldExtractor;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use order_sheet::{OrderSheetParser, SheetLayout, REQUIRED_COLUMNS};
pub use reference_loader::ReferenceLoader;

// 重导出 Trait 接口
pub use order_importer_trait::{CellGrid, FieldExtractor, FileParser};
