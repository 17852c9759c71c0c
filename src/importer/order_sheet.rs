// ==========================================
// 销售订单生成系统 - 订单表结构解析
// ==========================================
// 职责: 在单元格网格上定位表头 / 校验必需列 / 提取订单号 / 生成 OrderRow
// 红线: 表结构不合法时在处理任何数据行之前失败
// ==========================================

use crate::domain::{OrderRow, OrderSheet};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::order_importer_trait::CellGrid;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// 柜体位置列
pub const COLUMN_REFERENCE: &str = "Reference";
/// 品名列（含 "Model: xxx"）
pub const COLUMN_ITEM: &str = "Item";
/// 饰面列（含 "Shutter Finish: xxx"）
pub const COLUMN_FINISHES: &str = "Finishes";

/// 必需列
pub const REQUIRED_COLUMNS: [&str; 3] = [COLUMN_REFERENCE, COLUMN_ITEM, COLUMN_FINISHES];

static ORDER_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)").expect("订单号正则无效"));

// ==========================================
// SheetLayout - 订单表版式（行列号均从 1 开始）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub header_row: usize,   // 列名所在行
    pub order_id_row: usize, // 订单号单元格所在行
    pub order_id_col: usize, // 订单号单元格所在列（3 = C 列）
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_row: 3,
            order_id_row: 2,
            order_id_col: 3,
        }
    }
}

impl SheetLayout {
    /// 订单号单元格的 A1 表示（用于报错）
    pub fn order_id_cell(&self) -> String {
        format!("{}{}", column_letter(self.order_id_col), self.order_id_row)
    }
}

/// 1 → A, 27 → AA
fn column_letter(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// 整行无任何单元格值（仅空白字符的单元格仍算有值）
fn is_absent_row(cells: &[Option<String>]) -> bool {
    cells.iter().all(Option::is_none)
}

fn cell(grid: &CellGrid, row: usize, col: usize) -> Option<&str> {
    grid.get(row)
        .and_then(|r| r.get(col))
        .and_then(|c| c.as_deref())
}

/// 从表头单元格文本中提取订单号（前导数字）
pub fn extract_order_id(text: &str) -> Option<String> {
    ORDER_ID_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

// ==========================================
// OrderSheetParser
// ==========================================
pub struct OrderSheetParser {
    layout: SheetLayout,
}

impl OrderSheetParser {
    pub fn new(layout: SheetLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    /// 网格 → OrderSheet
    ///
    /// # 顺序
    /// 1. 校验必需列（Reference / Item / Finishes，列名去空白后比较）
    /// 2. 提取订单号
    /// 3. 逐行生成 OrderRow（中间空行保留为全空行，尾部空行丢弃）
    pub fn parse_grid(&self, sheet_name: &str, grid: &CellGrid) -> ImportResult<OrderSheet> {
        if grid.is_empty() {
            return Err(ImportError::EmptySheet(sheet_name.to_string()));
        }

        let header_idx = self.layout.header_row.saturating_sub(1);
        let columns = self.locate_columns(grid, header_idx)?;

        let order_id = self.extract_order_id(grid)?;

        // 行号 = 表头之下的源行位置；仅尾部空行被丢弃
        let data = &grid[(header_idx + 1).min(grid.len())..];
        let used = data
            .iter()
            .rposition(|cells| !is_absent_row(cells))
            .map_or(0, |last| last + 1);

        let mut rows = Vec::with_capacity(used);
        for (offset, cells) in data[..used].iter().enumerate() {
            let value_at = |name: &str| {
                columns
                    .get(name)
                    .and_then(|&col| cells.get(col))
                    .and_then(|c| c.clone())
            };

            rows.push(OrderRow {
                row_index: offset + 1,
                raw_model_text: value_at(COLUMN_ITEM),
                raw_finish_text: value_at(COLUMN_FINISHES),
                reference: value_at(COLUMN_REFERENCE),
            });
        }

        debug!(order_id = %order_id, rows = rows.len(), "订单表解析完成");

        Ok(OrderSheet {
            sheet_name: sheet_name.to_string(),
            order_id,
            rows,
        })
    }

    /// 列名 → 列索引（同名列取第一个）
    fn locate_columns(
        &self,
        grid: &CellGrid,
        header_idx: usize,
    ) -> ImportResult<HashMap<String, usize>> {
        let mut columns = HashMap::new();
        if let Some(header) = grid.get(header_idx) {
            for (idx, name) in header.iter().enumerate() {
                if let Some(name) = name.as_deref().map(str::trim) {
                    columns.entry(name.to_string()).or_insert(idx);
                }
            }
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !columns.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        Ok(columns)
    }

    fn extract_order_id(&self, grid: &CellGrid) -> ImportResult<String> {
        let row = self.layout.order_id_row.saturating_sub(1);
        let col = self.layout.order_id_col.saturating_sub(1);

        cell(grid, row, col)
            .and_then(extract_order_id)
            .ok_or_else(|| ImportError::OrderIdNotFound {
                cell: self.layout.order_id_cell(),
            })
    }
}

impl Default for OrderSheetParser {
    fn default() -> Self {
        Self::new(SheetLayout::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn sample_grid() -> CellGrid {
        vec![
            vec![s("Quotation"), None, None],
            vec![s("Project"), None, s(" 4521 - Sharma Residence")],
            vec![s(" Reference "), s("Item"), s("Finishes")],
            vec![s("K1"), s("Model: MK-100"), s("Shutter Finish: Red")],
            vec![None, None, None],
            vec![s("K2"), s("Model: HW-12"), None],
        ]
    }

    #[test]
    fn test_parse_grid_basic() {
        let parser = OrderSheetParser::default();
        let sheet = parser.parse_grid("Sheet1", &sample_grid()).unwrap();

        assert_eq!(sheet.order_id, "4521");
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[0].row_index, 1);
        assert_eq!(sheet.rows[0].reference.as_deref(), Some("K1"));
        // 中间空行保留，后续行保持源行号
        assert_eq!(sheet.rows[1].row_index, 2);
        assert_eq!(sheet.rows[1].reference, None);
        assert_eq!(sheet.rows[1].raw_model_text, None);
        assert_eq!(sheet.rows[2].row_index, 3);
        assert_eq!(sheet.rows[2].reference.as_deref(), Some("K2"));
        assert_eq!(sheet.rows[2].raw_finish_text, None);
    }

    #[test]
    fn test_trailing_blank_rows_dropped() {
        let mut grid = sample_grid();
        grid.push(vec![None, None, None]);
        grid.push(vec![None, None]);

        let sheet = OrderSheetParser::default().parse_grid("Sheet1", &grid).unwrap();
        let indexes: Vec<usize> = sheet.rows.iter().map(|r| r.row_index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);
    }

    #[test]
    fn test_whitespace_only_row_is_data_row() {
        let mut grid = sample_grid();
        grid.insert(4, vec![s(" "), None, s("  ")]);

        let sheet = OrderSheetParser::default().parse_grid("Sheet1", &grid).unwrap();
        assert_eq!(sheet.rows.len(), 4);
        assert_eq!(sheet.rows[1].row_index, 2);
        assert_eq!(sheet.rows[1].reference.as_deref(), Some(" "));
        assert_eq!(sheet.rows[3].reference.as_deref(), Some("K2"));
        assert_eq!(sheet.rows[3].row_index, 4);
    }

    #[test]
    fn test_header_only_sheet_has_no_rows() {
        let grid = vec![
            vec![None, None, None],
            vec![None, None, s("88")],
            vec![s("Reference"), s("Item"), s("Finishes")],
            vec![None, None, None],
        ];
        let sheet = OrderSheetParser::default().parse_grid("Sheet1", &grid).unwrap();
        assert!(sheet.rows.is_empty());
    }

    #[test]
    fn test_missing_columns() {
        let mut grid = sample_grid();
        grid[2] = vec![s("Reference"), s("Description"), None];

        let err = OrderSheetParser::default()
            .parse_grid("Sheet1", &grid)
            .unwrap_err();
        match err {
            ImportError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["Item".to_string(), "Finishes".to_string()])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_order_id_not_found() {
        let mut grid = sample_grid();
        grid[1][2] = s("Sharma Residence");

        let err = OrderSheetParser::default()
            .parse_grid("Sheet1", &grid)
            .unwrap_err();
        assert!(matches!(err, ImportError::OrderIdNotFound { cell } if cell == "C2"));
    }

    #[test]
    fn test_order_id_cell_missing() {
        let grid = vec![vec![s("Reference"), s("Item"), s("Finishes")]];
        let layout = SheetLayout {
            header_row: 1,
            ..SheetLayout::default()
        };
        let err = OrderSheetParser::new(layout)
            .parse_grid("Sheet1", &grid)
            .unwrap_err();
        assert!(matches!(err, ImportError::OrderIdNotFound { .. }));
    }

    #[test]
    fn test_empty_grid() {
        let err = OrderSheetParser::default()
            .parse_grid("Sheet1", &CellGrid::new())
            .unwrap_err();
        assert!(matches!(err, ImportError::EmptySheet(_)));
    }

    #[test]
    fn test_extract_order_id() {
        assert_eq!(extract_order_id("1234"), Some("1234".to_string()));
        assert_eq!(extract_order_id("  77 / phase 2"), Some("77".to_string()));
        assert_eq!(extract_order_id("ID 77"), None);
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(3), "C");
        assert_eq!(column_letter(27), "AA");
    }
}
