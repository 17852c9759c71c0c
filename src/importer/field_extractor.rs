// ==========================================
// 销售订单生成系统 - 字段提取器实现
// ==========================================
// 职责: 从半结构化单元格文本中提取型号 / 门板饰面
// 规则:
// - 型号: "Model:" + 可选空白 + [A-Za-z0-9-]+
// - 饰面: "Shutter ... Finish :" 之后到行尾（忽略大小写，允许跨行）
// ==========================================

use crate::importer::order_importer_trait::FieldExtractor;
use once_cell::sync::Lazy;
use regex::Regex;

static MODEL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Model:\s*([A-Za-z0-9\-]+)").expect("型号正则无效"));

static FINISH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)Shutter.*?Finish\s*:\s*(.+?)(?:\n|$)").expect("饰面正则无效")
});

pub struct PatternFieldExtractor;

impl FieldExtractor for PatternFieldExtractor {
    fn extract_model(&self, text: Option<&str>) -> Option<String> {
        let text = text?;
        MODEL_PATTERN
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn extract_finish(&self, text: Option<&str>) -> Option<String> {
        let text = text?;
        FINISH_PATTERN
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    }

    fn normalize(&self, text: Option<&str>) -> Option<String> {
        text.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }
}
