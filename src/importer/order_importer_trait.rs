// ==========================================
// 销售订单生成系统 - 订单导入 Trait
// ==========================================
// 职责: 定义订单表导入各阶段接口（不包含实现）
// 阶段: 文件解析 → 字段提取
// ==========================================

use crate::domain::{ExtractedRow, OrderRow};
use crate::importer::error::ImportResult;
use std::path::Path;

/// 单元格网格（行 × 列，空单元格为 None）
pub type CellGrid = Vec<Vec<Option<String>>>;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: ExcelParser, CsvParser
pub trait FileParser: Send + Sync {
    /// 解析文件第一张工作表为单元格网格
    ///
    /// # 返回
    /// - Ok((工作表名, 网格)): 网格坐标为绝对坐标（A1 = [0][0]）
    /// - Err: 文件读取错误、格式错误
    fn parse_to_grid(&self, file_path: &Path) -> ImportResult<(String, CellGrid)>;
}

// ==========================================
// FieldExtractor Trait
// ==========================================
// 用途: 字段提取接口（阶段 1）
// 实现者: PatternFieldExtractor
// 约束: 纯函数；空值/无法识别的文本一律返回 None，不报错
pub trait FieldExtractor: Send + Sync {
    /// 从 Item 文本中提取型号（"Model: XXX"）
    fn extract_model(&self, text: Option<&str>) -> Option<String>;

    /// 从 Finishes 文本中提取门板饰面（"Shutter ... Finish : XXX"）
    fn extract_finish(&self, text: Option<&str>) -> Option<String>;

    /// 去除首尾空白；空串视为缺失
    fn normalize(&self, text: Option<&str>) -> Option<String>;

    /// 提取整行
    fn extract_row(&self, row: &OrderRow) -> ExtractedRow {
        let model = self.extract_model(row.raw_model_text.as_deref());
        let finish = self.extract_finish(row.raw_finish_text.as_deref());

        ExtractedRow {
            row_index: row.row_index,
            model: self.normalize(model.as_deref()),
            finish: self.normalize(finish.as_deref()),
            reference: self.normalize(row.reference.as_deref()),
        }
    }
}
