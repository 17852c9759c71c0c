// ==========================================
// 销售订单生成系统 - 领域类型定义
// ==========================================
// 职责: 型号族分类 / 行级失败原因
// 红线: 失败原因文本为固定口径，输出表 Reason 列直接使用
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 柜体型号前缀（走 BOM 展开）
pub const MK_PREFIX: &str = "MK-";

/// 填充件型号前缀（型号 + 颜色码）
pub const FIL_PREFIX: &str = "FIL-";

// ==========================================
// ModelFamily - 型号族
// ==========================================
// 判定顺序: MK- → FIL- → 其他
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelFamily {
    Mk,
    Fil,
    Generic,
}

impl ModelFamily {
    /// 根据型号前缀判定型号族
    pub fn classify(model: &str) -> Self {
        if model.starts_with(MK_PREFIX) {
            ModelFamily::Mk
        } else if model.starts_with(FIL_PREFIX) {
            ModelFamily::Fil
        } else {
            ModelFamily::Generic
        }
    }

    /// 是否需要门板饰面（Generic 不使用饰面）
    pub fn requires_finish(&self) -> bool {
        matches!(self, ModelFamily::Mk | ModelFamily::Fil)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::Mk => "MK",
            ModelFamily::Fil => "FIL",
            ModelFamily::Generic => "GENERIC",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// FailureReason - 行级失败原因
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// 型号缺失
    ModelMissing,
    /// MK-/FIL- 型号缺少门板饰面
    FinishMissing,
    /// cabinets 表无此柜体
    CabinetNotFound,
    /// colorcode 表无此饰面
    ColourNotFound { finish: String },
    /// code_raw 表无此型号映射
    MappingNotFound { model: String },
}

impl FailureReason {
    /// 失败原因分类码（用于日志字段）
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::ModelMissing => "MODEL_MISSING",
            FailureReason::FinishMissing => "FINISH_MISSING",
            FailureReason::CabinetNotFound => "CABINET_NOT_FOUND",
            FailureReason::ColourNotFound { .. } => "COLOUR_NOT_FOUND",
            FailureReason::MappingNotFound { .. } => "MAPPING_NOT_FOUND",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ModelMissing => write!(f, "Model missing"),
            FailureReason::FinishMissing => write!(f, "Finish missing"),
            FailureReason::CabinetNotFound => write!(f, "Cabinet not found in DB"),
            FailureReason::ColourNotFound { finish } => {
                write!(f, "Cabinet processed but could not find colour '{}'", finish)
            }
            FailureReason::MappingNotFound { model } => {
                write!(f, "No mapping found in code_raw for model '{}'", model)
            }
        }
    }
}
