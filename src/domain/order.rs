// ==========================================
// 销售订单生成系统 - 订单领域模型
// ==========================================
// 职责: 订单表行 / 提取结果 / 输出订单行 / 失败记录 / 批次结果
// 流向: OrderRow → ExtractedRow → (OutputLine*, FailureRecord?) → BatchResult
// ==========================================

use crate::domain::types::FailureReason;
use serde::{Deserialize, Serialize};

/// 客户名缺省值
pub const DEFAULT_CUSTOMER: &str = "Default Customer";

/// 销售对接人缺省值
pub const DEFAULT_POC: &str = "Default POC";

/// GST 税务类型缺省值
pub const DEFAULT_GST_TREATMENT: &str = "Consumer";

// ==========================================
// OrderSheet - 已解析的订单表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSheet {
    pub sheet_name: String,   // 工作表名称
    pub order_id: String,     // 表头区提取的订单/项目号（CRM 主键）
    pub rows: Vec<OrderRow>,  // 数据行（保持表内顺序）
}

// ==========================================
// OrderRow - 订单表原始行
// ==========================================
// 单元格为空时为 None，其余保持原文（不做清洗）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub row_index: usize,                // 数据行号（从 1 开始，用于诊断）
    pub raw_model_text: Option<String>,  // Item 列原文
    pub raw_finish_text: Option<String>, // Finishes 列原文
    pub reference: Option<String>,       // Reference 列原文（柜体位置）
}

// ==========================================
// ExtractedRow - 字段提取结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedRow {
    pub row_index: usize,
    pub model: Option<String>,
    pub finish: Option<String>,
    pub reference: Option<String>,
}

// ==========================================
// CustomerContact - CRM 返回的客户信息
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerContact {
    pub customer: Option<String>,
    pub poc: Option<String>,
}

// ==========================================
// HeaderDefaults - 表头行缺省值
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderDefaults {
    pub customer: String,
    pub poc: String,
    pub gst_treatment: String,
}

impl Default for HeaderDefaults {
    fn default() -> Self {
        Self {
            customer: DEFAULT_CUSTOMER.to_string(),
            poc: DEFAULT_POC.to_string(),
            gst_treatment: DEFAULT_GST_TREATMENT.to_string(),
        }
    }
}

// ==========================================
// CustomerHeader - 批次首行客户信息
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerHeader {
    pub customer: String,
    pub gst_treatment: String,
    pub poc: String,
}

impl CustomerHeader {
    /// 合并 CRM 结果与缺省值（CRM 缺失字段使用缺省值）
    pub fn resolve(contact: &CustomerContact, defaults: &HeaderDefaults) -> Self {
        Self {
            customer: contact
                .customer
                .clone()
                .unwrap_or_else(|| defaults.customer.clone()),
            gst_treatment: defaults.gst_treatment.clone(),
            poc: contact.poc.clone().unwrap_or_else(|| defaults.poc.clone()),
        }
    }
}

// ==========================================
// OutputLine - 输出订单行（Success 表）
// ==========================================
// 客户/税务/对接人字段仅在整批第一行填充
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    pub product: String,
    pub position_reference: Option<String>,
    pub customer: Option<String>,
    pub gst_treatment: Option<String>,
    pub poc: Option<String>,
}

impl OutputLine {
    /// 普通订单行
    pub fn order_line(product: impl Into<String>, position_reference: Option<String>) -> Self {
        Self {
            product: product.into(),
            position_reference,
            customer: None,
            gst_treatment: None,
            poc: None,
        }
    }

    /// 携带客户信息的表头行
    pub fn header(
        header: &CustomerHeader,
        product: impl Into<String>,
        position_reference: Option<String>,
    ) -> Self {
        Self {
            product: product.into(),
            position_reference,
            customer: Some(header.customer.clone()),
            gst_treatment: Some(header.gst_treatment.clone()),
            poc: Some(header.poc.clone()),
        }
    }

    pub fn is_header(&self) -> bool {
        self.customer.is_some()
    }
}

// ==========================================
// FailureRecord - 失败记录（Failed 表）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub row_index: usize,
    pub model: Option<String>,
    pub position_reference: Option<String>,
    pub reason: FailureReason,
}

impl FailureRecord {
    pub fn new(row: &ExtractedRow, reason: FailureReason) -> Self {
        Self {
            row_index: row.row_index,
            model: row.model.clone(),
            position_reference: row.reference.clone(),
            reason,
        }
    }
}

// ==========================================
// BatchResult - 批次结果
// ==========================================
// 两个序列均只追加，顺序与源行顺序一致
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchResult {
    pub lines: Vec<OutputLine>,
    pub failures: Vec<FailureRecord>,
}

impl BatchResult {
    pub fn success_count(&self) -> usize {
        self.lines.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_header_defaults() {
        let header = CustomerHeader::resolve(&CustomerContact::default(), &HeaderDefaults::default());
        assert_eq!(header.customer, "Default Customer");
        assert_eq!(header.poc, "Default POC");
        assert_eq!(header.gst_treatment, "Consumer");
    }

    #[test]
    fn test_customer_header_partial_contact() {
        let contact = CustomerContact {
            customer: Some("Acme Homes".to_string()),
            poc: None,
        };
        let header = CustomerHeader::resolve(&contact, &HeaderDefaults::default());
        assert_eq!(header.customer, "Acme Homes");
        assert_eq!(header.poc, "Default POC");
    }

    #[test]
    fn test_output_line_kinds() {
        let header = CustomerHeader::resolve(&CustomerContact::default(), &HeaderDefaults::default());
        let first = OutputLine::header(&header, "MK-100", Some("K1".to_string()));
        let plain = OutputLine::order_line("RAW1-R1", Some("K1".to_string()));

        assert!(first.is_header());
        assert_eq!(first.gst_treatment.as_deref(), Some("Consumer"));
        assert!(!plain.is_header());
        assert_eq!(plain.poc, None);
    }
}
