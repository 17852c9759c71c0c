// ==========================================
// 销售订单生成系统 - 参考数据模型
// ==========================================
// 对齐: cabinets / colorcode / code_raw 表
// 用途: 查询网关只读，参考数据加载器写入
// ==========================================

use serde::{Deserialize, Serialize};

/// 单个柜体最多拆分的 BOM 行数
pub const BOM_SLOT_COUNT: usize = 3;

// ==========================================
// CabinetRecord - 柜体 BOM 拆分
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinetRecord {
    pub cabinet_code: String,
    pub bom_lines: [Option<String>; BOM_SLOT_COUNT],
}

impl CabinetRecord {
    /// 按槽位顺序返回非空 BOM 行（原样返回存储值，不做去空白）
    pub fn present_bom_lines(&self) -> impl Iterator<Item = &str> {
        self.bom_lines
            .iter()
            .filter_map(|slot| slot.as_deref())
            .filter(|bom| !bom.is_empty())
    }
}

// ==========================================
// ColourRecord - 饰面名称 ↔ 颜色码
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColourRecord {
    pub colour_name: String,
    pub colour_code: String,
}

// ==========================================
// CodeMapping - 设计软件型号 → ERP 产品编码
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMapping {
    pub infurnia_code: String,
    pub odoo_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_bom_lines_keeps_slot_order() {
        let cabinet = CabinetRecord {
            cabinet_code: "MK-100".to_string(),
            bom_lines: [
                Some("A".to_string()),
                None,
                Some("C".to_string()),
            ],
        };
        let lines: Vec<&str> = cabinet.present_bom_lines().collect();
        assert_eq!(lines, vec!["A", "C"]);
    }

    #[test]
    fn test_present_bom_lines_skips_empty_only() {
        let cabinet = CabinetRecord {
            cabinet_code: "MK-200".to_string(),
            bom_lines: [Some(String::new()), Some(" B ".to_string()), None],
        };
        assert_eq!(cabinet.present_bom_lines().collect::<Vec<_>>(), vec![" B "]);
    }
}
