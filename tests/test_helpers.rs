// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、参考数据种子、订单表文件生成、结果表读取
// ==========================================
#![allow(dead_code)]

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;
use so_generation::db::{ensure_schema, open_sqlite_connection};
use so_generation::domain::{CabinetRecord, CodeMapping, ColourRecord};
use so_generation::repository::ReferenceRepository;
use std::error::Error;
use std::path::Path;
use tempfile::NamedTempFile;

/// 标准列名
pub const STANDARD_COLUMNS: [&str; 3] = ["Reference", "Item", "Finishes"];

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = tempfile::Builder::new().suffix(".db").tempfile()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("非 UTF-8 路径")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

fn cabinet(code: &str, bom: [Option<&str>; 3]) -> CabinetRecord {
    CabinetRecord {
        cabinet_code: code.to_string(),
        bom_lines: bom.map(|b| b.map(str::to_string)),
    }
}

fn colour(name: &str, code: &str) -> ColourRecord {
    ColourRecord {
        colour_name: name.to_string(),
        colour_code: code.to_string(),
    }
}

fn mapping(model: &str, code: &str) -> CodeMapping {
    CodeMapping {
        infurnia_code: model.to_string(),
        odoo_code: code.to_string(),
    }
}

/// 写入标准参考数据
///
/// - cabinets: MK-100 [RAW1], MK-200 [P1, P2, P3], 重复键 MK-100 [DUP1]（后写入）
/// - colorcode: Red→R1, Oak→OK9, Blank→""（空颜色码）
/// - code_raw: HW-7→ODO-7, HW-8→""（空映射）
pub fn seed_reference_data(db_path: &str) -> Result<ReferenceRepository, Box<dyn Error>> {
    let repo = ReferenceRepository::new(db_path)?;

    repo.insert_cabinets(&[
        cabinet("MK-100", [Some("RAW1"), None, None]),
        cabinet("MK-200", [Some("P1"), Some("P2"), Some("P3")]),
        cabinet("MK-100", [Some("DUP1"), None, None]),
    ])?;
    repo.insert_colours(&[colour("Red", "R1"), colour("Oak", "OK9"), colour("Blank", "")])?;
    repo.insert_code_mappings(&[mapping("HW-7", "ODO-7"), mapping("HW-8", "")])?;

    Ok(repo)
}

/// 订单表数据行: (Reference, Item, Finishes)
pub type SheetRow<'a> = (Option<&'a str>, Option<&'a str>, Option<&'a str>);

/// 生成订单表 xlsx
///
/// 版式: A1 标题；B2 "Project" + C2 订单号单元格；第 3 行列名；第 4 行起数据
pub fn write_order_workbook(
    path: &Path,
    order_cell: &str,
    columns: &[&str],
    rows: &[SheetRow<'_>],
) -> Result<(), Box<dyn Error>> {
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();

    ws.write_string(0, 0, "Cabinet Order Sheet")?;
    ws.write_string(1, 1, "Project")?;
    ws.write_string(1, 2, order_cell)?;

    for (col, name) in columns.iter().enumerate() {
        ws.write_string(2, col as u16, *name)?;
    }

    for (idx, (reference, item, finishes)) in rows.iter().enumerate() {
        let row = (idx + 3) as u32;
        for (col, value) in [reference, item, finishes].into_iter().enumerate() {
            if let Some(text) = value {
                ws.write_string(row, col as u16, *text)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// 读取结果表某张工作表为文本网格（整数值按整数显示）
pub fn read_sheet(path: &Path, sheet: &str) -> Result<Vec<Vec<String>>, Box<dyn Error>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range(sheet)?;

    Ok(range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::String(s) => s.clone(),
                    Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect())
}
