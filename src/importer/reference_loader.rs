// ==========================================
// 销售订单生成系统 - 参考数据加载器
// ==========================================
// 职责: 从 CSV 加载 cabinets / colorcode / code_raw 三张参考表
// 表头:
// - cabinets:  cabinet_code,bom_line_1,bom_line_2,bom_line_3
// - colorcode: colour_name,colour_code
// - code_raw:  infurnia_code,odoo_code
// ==========================================

use crate::domain::{CabinetRecord, CodeMapping, ColourRecord};
use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct CabinetCsvRow {
    cabinet_code: Option<String>,
    bom_line_1: Option<String>,
    bom_line_2: Option<String>,
    bom_line_3: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ColourCsvRow {
    colour_name: Option<String>,
    colour_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CodeRawCsvRow {
    infurnia_code: Option<String>,
    odoo_code: Option<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn required(value: Option<String>, field: &str, row: usize) -> ImportResult<String> {
    clean(value).ok_or_else(|| ImportError::InvalidReferenceRow {
        row,
        message: format!("{} 为空", field),
    })
}

/// 读取 CSV 行（行号从 1 开始，不含表头）
fn read_rows<T: DeserializeOwned>(path: &Path) -> ImportResult<Vec<(usize, T)>> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<T>().enumerate() {
        rows.push((idx + 1, result?));
    }
    Ok(rows)
}

pub struct ReferenceLoader;

impl ReferenceLoader {
    /// 加载柜体 BOM 表
    pub fn load_cabinets(&self, path: &Path) -> ImportResult<Vec<CabinetRecord>> {
        let rows = read_rows::<CabinetCsvRow>(path)?;
        let records = rows
            .into_iter()
            .map(|(row, r)| {
                Ok(CabinetRecord {
                    cabinet_code: required(r.cabinet_code, "cabinet_code", row)?,
                    bom_lines: [clean(r.bom_line_1), clean(r.bom_line_2), clean(r.bom_line_3)],
                })
            })
            .collect::<ImportResult<Vec<_>>>()?;

        info!(file = %path.display(), count = records.len(), "柜体 BOM 表加载完成");
        Ok(records)
    }

    /// 加载颜色码表
    pub fn load_colours(&self, path: &Path) -> ImportResult<Vec<ColourRecord>> {
        let rows = read_rows::<ColourCsvRow>(path)?;
        let records = rows
            .into_iter()
            .map(|(row, r)| {
                Ok(ColourRecord {
                    colour_name: required(r.colour_name, "colour_name", row)?,
                    colour_code: required(r.colour_code, "colour_code", row)?,
                })
            })
            .collect::<ImportResult<Vec<_>>>()?;

        info!(file = %path.display(), count = records.len(), "颜色码表加载完成");
        Ok(records)
    }

    /// 加载型号映射表
    pub fn load_code_mappings(&self, path: &Path) -> ImportResult<Vec<CodeMapping>> {
        let rows = read_rows::<CodeRawCsvRow>(path)?;
        let records = rows
            .into_iter()
            .map(|(row, r)| {
                Ok(CodeMapping {
                    infurnia_code: required(r.infurnia_code, "infurnia_code", row)?,
                    odoo_code: required(r.odoo_code, "odoo_code", row)?,
                })
            })
            .collect::<ImportResult<Vec<_>>>()?;

        info!(file = %path.display(), count = records.len(), "型号映射表加载完成");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_cabinets_with_empty_slots() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "cabinet_code,bom_line_1,bom_line_2,bom_line_3").unwrap();
        writeln!(temp_file, "MK-100,RAW1,,").unwrap();
        writeln!(temp_file, "MK-200, RAW2 ,RAW3,RAW4").unwrap();

        let records = ReferenceLoader.load_cabinets(temp_file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].bom_lines, [Some("RAW1".to_string()), None, None]);
        assert_eq!(records[1].bom_lines[0].as_deref(), Some("RAW2"));
    }

    #[test]
    fn test_load_colours_rejects_blank_code() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "colour_name,colour_code").unwrap();
        writeln!(temp_file, "Red,R1").unwrap();
        writeln!(temp_file, "Blue,").unwrap();

        let err = ReferenceLoader.load_colours(temp_file.path()).unwrap_err();
        assert!(matches!(err, ImportError::InvalidReferenceRow { row: 2, .. }));
    }

    #[test]
    fn test_load_code_mappings() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "infurnia_code, odoo_code").unwrap();
        writeln!(temp_file, "HW-12,ODOO-HW-12").unwrap();

        let records = ReferenceLoader.load_code_mappings(temp_file.path()).unwrap();
        assert_eq!(
            records,
            vec![CodeMapping {
                infurnia_code: "HW-12".to_string(),
                odoo_code: "ODOO-HW-12".to_string(),
            }]
        );
    }
}
