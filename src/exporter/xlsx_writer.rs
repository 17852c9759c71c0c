// ==========================================
// 销售订单生成系统 - xlsx 结果写出
// ==========================================
// 工作表:
// - Success: Order Lines/Product | Cabinet Position | Customer | GST Treatment | POC
// - Failed : Row | Model | Cabinet Position | Reason
// 两张表总是写出（含表头），即使没有数据行
// ==========================================

use crate::domain::{BatchResult, FailureRecord, OutputLine};
use crate::exporter::error::ExportResult;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use tracing::info;

pub const SUCCESS_SHEET: &str = "Success";
pub const FAILED_SHEET: &str = "Failed";

pub const SUCCESS_COLUMNS: [&str; 5] = [
    "Order Lines/Product",
    "Cabinet Position",
    "Customer",
    "GST Treatment",
    "POC",
];

pub const FAILED_COLUMNS: [&str; 4] = ["Row", "Model", "Cabinet Position", "Reason"];

#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxResultWriter;

impl XlsxResultWriter {
    pub fn new() -> Self {
        Self
    }

    /// 写出到文件（自动创建父目录）
    pub fn write_to_path(&self, result: &BatchResult, path: &Path) -> ExportResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut workbook = self.build_workbook(result)?;
        workbook.save(path)?;

        info!(
            path = %path.display(),
            success_lines = result.success_count(),
            failed_rows = result.failure_count(),
            "结果文件已写出"
        );
        Ok(())
    }

    /// 写出到内存
    pub fn write_to_buffer(&self, result: &BatchResult) -> ExportResult<Vec<u8>> {
        let mut workbook = self.build_workbook(result)?;
        Ok(workbook.save_to_buffer()?)
    }

    fn build_workbook(&self, result: &BatchResult) -> ExportResult<Workbook> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        let success = workbook.add_worksheet();
        success.set_name(SUCCESS_SHEET)?;
        write_header(success, &SUCCESS_COLUMNS, &header_format)?;
        for (idx, line) in result.lines.iter().enumerate() {
            write_success_row(success, (idx + 1) as u32, line)?;
        }

        let failed = workbook.add_worksheet();
        failed.set_name(FAILED_SHEET)?;
        write_header(failed, &FAILED_COLUMNS, &header_format)?;
        for (idx, failure) in result.failures.iter().enumerate() {
            write_failed_row(failed, (idx + 1) as u32, failure)?;
        }

        Ok(workbook)
    }
}

fn write_header(ws: &mut Worksheet, columns: &[&str], format: &Format) -> ExportResult<()> {
    for (col, name) in columns.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, *name, format)?;
    }
    Ok(())
}

fn write_optional(ws: &mut Worksheet, row: u32, col: u16, value: Option<&str>) -> ExportResult<()> {
    if let Some(text) = value {
        ws.write_string(row, col, text)?;
    }
    Ok(())
}

fn write_success_row(ws: &mut Worksheet, row: u32, line: &OutputLine) -> ExportResult<()> {
    ws.write_string(row, 0, &line.product)?;
    write_optional(ws, row, 1, line.position_reference.as_deref())?;
    write_optional(ws, row, 2, line.customer.as_deref())?;
    write_optional(ws, row, 3, line.gst_treatment.as_deref())?;
    write_optional(ws, row, 4, line.poc.as_deref())?;
    Ok(())
}

fn write_failed_row(ws: &mut Worksheet, row: u32, failure: &FailureRecord) -> ExportResult<()> {
    ws.write_number(row, 0, failure.row_index as f64)?;
    write_optional(ws, row, 1, failure.model.as_deref())?;
    write_optional(ws, row, 2, failure.position_reference.as_deref())?;
    ws.write_string(row, 3, failure.reason.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerHeader, ExtractedRow, FailureReason};
    use calamine::{open_workbook_auto, Data, Reader};

    fn sample_result() -> BatchResult {
        let header = CustomerHeader {
            customer: "Acme Homes".to_string(),
            gst_treatment: "Consumer".to_string(),
            poc: "Ravi".to_string(),
        };
        let failed_row = ExtractedRow {
            row_index: 2,
            model: None,
            finish: None,
            reference: Some("Wall 3".to_string()),
        };

        BatchResult {
            lines: vec![
                OutputLine::header(&header, "MK-100", Some("Wall 1".to_string())),
                OutputLine::order_line("MK-100", Some("Wall 1".to_string())),
                OutputLine::order_line("RAW1-R1", None),
            ],
            failures: vec![FailureRecord::new(&failed_row, FailureReason::ModelMissing)],
        }
    }

    fn text(cell: Option<&Data>) -> String {
        match cell {
            Some(Data::String(s)) => s.clone(),
            Some(Data::Float(f)) => f.to_string(),
            Some(Data::Int(i)) => i.to_string(),
            _ => String::new(),
        }
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("result.xlsx");

        XlsxResultWriter::new()
            .write_to_path(&sample_result(), &path)
            .unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(
            workbook.sheet_names().to_vec(),
            vec![SUCCESS_SHEET.to_string(), FAILED_SHEET.to_string()]
        );

        let success = workbook.worksheet_range(SUCCESS_SHEET).unwrap();
        assert_eq!(text(success.get_value((0, 0))), "Order Lines/Product");
        assert_eq!(text(success.get_value((1, 0))), "MK-100");
        assert_eq!(text(success.get_value((1, 2))), "Acme Homes");
        assert_eq!(text(success.get_value((1, 3))), "Consumer");
        assert_eq!(text(success.get_value((1, 4))), "Ravi");
        assert_eq!(text(success.get_value((2, 2))), "");
        assert_eq!(text(success.get_value((3, 0))), "RAW1-R1");

        let failed = workbook.worksheet_range(FAILED_SHEET).unwrap();
        assert_eq!(text(failed.get_value((0, 3))), "Reason");
        assert_eq!(text(failed.get_value((1, 0))), "2");
        assert_eq!(text(failed.get_value((1, 2))), "Wall 3");
        assert_eq!(text(failed.get_value((1, 3))), "Model missing");
    }

    #[test]
    fn test_empty_result_still_has_both_sheets() {
        let bytes = XlsxResultWriter::new()
            .write_to_buffer(&BatchResult::default())
            .unwrap();
        assert!(!bytes.is_empty());

        let mut workbook =
            calamine::Xlsx::new(std::io::Cursor::new(bytes)).unwrap();
        let failed = workbook.worksheet_range(FAILED_SHEET).unwrap();
        assert_eq!(failed.height(), 1);
        assert_eq!(text(failed.get_value((0, 0))), "Row");
    }
}
